//! Movement domain: system modules for input, sensing and the fixed step.

pub(crate) mod collisions;
pub(crate) mod input;
pub(crate) mod movement;

pub(crate) use collisions::detect_contacts;
pub(crate) use input::{apply_control_events, read_input};
pub(crate) use movement::{check_controller_setup, step_controllers, update_sprite_facing};
