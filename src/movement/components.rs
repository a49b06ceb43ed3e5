//! Movement domain: components, input messages and physics layers for locomotion.

use avian2d::prelude::*;
use bevy::ecs::message::Message;
use bevy::prelude::*;

/// Physics layers for collision filtering
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Ground surfaces (floors, platforms)
    Ground,
    /// Wall surfaces
    Wall,
    /// Player character
    Player,
}

#[derive(Component, Debug)]
pub struct Player;

/// Marker for ground colliders
#[derive(Component, Debug)]
pub struct Ground;

/// Marker for wall colliders
#[derive(Component, Debug)]
pub struct Wall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1 for right, -1 for left.
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            Facing::Right => Facing::Left,
            Facing::Left => Facing::Right,
        }
    }
}

/// Environment contact snapshot, refreshed once per fixed step.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub grounded: bool,
    /// Inside the buffer zone just above the ground.
    pub near_ground: bool,
    pub touching_wall: bool,
}

/// Overlap probe points, local to the character and authored facing right.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct ContactProbes {
    pub radius: f32,
    pub ground: Vec<Vec2>,
    pub buffer: Vec2,
    pub wall: Vec<Vec2>,
}

impl Default for ContactProbes {
    fn default() -> Self {
        Self {
            radius: 1.0,
            ground: vec![
                Vec2::new(-10.0, -25.0),
                Vec2::new(0.0, -25.0),
                Vec2::new(10.0, -25.0),
            ],
            buffer: Vec2::new(0.0, -40.0),
            wall: vec![Vec2::new(13.0, 12.0), Vec2::new(13.0, -12.0)],
        }
    }
}

impl ContactProbes {
    /// World position of a local probe offset, mirrored to the facing side.
    pub fn world_point(origin: Vec2, offset: Vec2, facing: Facing) -> Vec2 {
        origin + Vec2::new(offset.x * facing.sign(), offset.y)
    }
}

/// Input from whatever device drives a character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    Move(Vec2),
    MoveCleared,
    JumpPressed,
    JumpReleased,
    DashPressed,
}

impl Message for ControlEvent {}

/// One-shot edges latched between fixed steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputEdges {
    pub jump_pressed: bool,
    pub jump_released: bool,
}
