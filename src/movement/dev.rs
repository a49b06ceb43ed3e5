//! Movement domain: a test room exercising every controller ability.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{GameLayer, Ground, Wall};

/// Spawns [`spawn_test_room`] at startup.
pub struct TestRoomPlugin;

impl Plugin for TestRoomPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_test_room);
    }
}

#[derive(Clone, Copy)]
enum Surface {
    Ground,
    Wall,
}

fn spawn_block(commands: &mut Commands, surface: Surface, center: Vec2, size: Vec2) {
    let (color, layer) = match surface {
        Surface::Ground => (Color::srgb(0.4, 0.5, 0.4), GameLayer::Ground),
        Surface::Wall => (Color::srgb(0.3, 0.3, 0.4), GameLayer::Wall),
    };

    let mut block = commands.spawn((
        Sprite {
            color,
            custom_size: Some(size),
            ..default()
        },
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(layer, [GameLayer::Player]),
    ));
    match surface {
        Surface::Ground => block.insert(Ground),
        Surface::Wall => block.insert(Wall),
    };
}

pub fn spawn_test_room(mut commands: Commands) {
    use Surface::{Ground as G, Wall as W};

    // Floor with a gap for coyote-time jumps
    spawn_block(&mut commands, G, Vec2::new(-260.0, -200.0), Vec2::new(520.0, 40.0));
    spawn_block(&mut commands, G, Vec2::new(380.0, -200.0), Vec2::new(360.0, 40.0));

    // Outer walls
    spawn_block(&mut commands, W, Vec2::new(-540.0, 60.0), Vec2::new(40.0, 560.0));
    spawn_block(&mut commands, W, Vec2::new(580.0, 60.0), Vec2::new(40.0, 560.0));

    // Shaft for chaining wall jumps
    spawn_block(&mut commands, W, Vec2::new(-440.0, 40.0), Vec2::new(30.0, 320.0));

    // Staircase of ledges, the last one only reachable with a double jump
    spawn_block(&mut commands, G, Vec2::new(-200.0, -80.0), Vec2::new(140.0, 20.0));
    spawn_block(&mut commands, G, Vec2::new(40.0, 20.0), Vec2::new(140.0, 20.0));
    spawn_block(&mut commands, G, Vec2::new(300.0, 200.0), Vec2::new(120.0, 20.0));

    info!("Test room spawned");
}
