//! A 2D platformer character controller for Bevy and avian2d.
//!
//! Coyote time, jump buffering, early-release jump cuts, wall slides and
//! wall jumps, double jumps and dashes, all resolved once per fixed step
//! from tuning data in `assets/data/player.ron`.

pub mod content;
#[cfg(feature = "dev-tools")]
pub mod debug;
pub mod movement;

use bevy::prelude::*;

/// Content loading plus the movement controller.
pub struct PlatformPlayerPlugin;

impl Plugin for PlatformPlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((content::ContentPlugin, movement::MovementPlugin));
    }
}
