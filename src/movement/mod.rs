//! Movement domain: character controller plugin wiring and public exports.

mod body;
mod bootstrap;
mod components;
mod controller;
mod resources;
mod schedule;
mod systems;

#[cfg(feature = "dev-tools")]
pub mod dev;

#[cfg(test)]
mod tests;

pub use body::{BufferedBody, PhysicsBody};
pub use components::{
    ContactProbes, Contacts, ControlEvent, Facing, GameLayer, Ground, InputEdges, Player, Wall,
};
pub use controller::{ControllerSnapshot, ControllerState, JumpKind, StepReport};
pub use resources::{ControllerConfig, MIN_ACCEL_RATE, SPEED_DEADZONE, SelectedProfile};
pub use schedule::{Transition, TransitionSchedule};

use bevy::prelude::*;

use crate::content::load_content;
use crate::movement::bootstrap::bootstrap_player_from_data;
use crate::movement::systems::{
    apply_control_events, check_controller_setup, detect_contacts, read_input, step_controllers,
    update_sprite_facing,
};

pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectedProfile>()
            .add_message::<ControlEvent>()
            .add_systems(Startup, bootstrap_player_from_data.after(load_content))
            .add_systems(PostStartup, check_controller_setup)
            .add_systems(
                Update,
                ((read_input, apply_control_events).chain(), update_sprite_facing),
            )
            .add_systems(FixedUpdate, (detect_contacts, step_controllers).chain());
    }
}
