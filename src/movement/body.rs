//! Movement domain: the rigid-body boundary the controller writes through.

use bevy::prelude::*;

/// What the controller may do to the body it drives.
///
/// Forces and impulses are deferred: [`PhysicsBody::velocity`] keeps
/// returning the velocity as of the last explicit write until the integrator
/// runs.
pub trait PhysicsBody {
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    /// Continuous force, integrated over the step.
    fn add_force(&mut self, force: Vec2);
    /// Instantaneous change in momentum.
    fn add_impulse(&mut self, impulse: Vec2);
    fn gravity_scale(&self) -> f32;
    fn set_gravity_scale(&mut self, scale: f32);
}

/// Stages one step's writes for an avian2d body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BufferedBody {
    velocity: Vec2,
    gravity_scale: f32,
    force: Vec2,
    impulse: Vec2,
}

impl BufferedBody {
    pub fn new(velocity: Vec2, gravity_scale: f32) -> Self {
        Self {
            velocity,
            gravity_scale,
            force: Vec2::ZERO,
            impulse: Vec2::ZERO,
        }
    }

    pub fn pending_force(&self) -> Vec2 {
        self.force
    }

    pub fn pending_impulse(&self) -> Vec2 {
        self.impulse
    }

    /// Velocity handed to the integrator once forces and impulses are applied.
    pub fn resolve(&self, inverse_mass: f32, dt: f32) -> Vec2 {
        self.velocity + (self.impulse + self.force * dt) * inverse_mass
    }
}

impl PhysicsBody for BufferedBody {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec2) {
        self.force += force;
    }

    fn add_impulse(&mut self, impulse: Vec2) {
        self.impulse += impulse;
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }
}
