//! Debug domain: state for the controller debug tooling.

use bevy::prelude::*;

/// Resource tracking debug mode state
#[derive(Resource, Debug, Default)]
pub struct DebugState {
    /// Whether the controller info overlay is visible
    pub show_info: bool,
    /// Whether contact probes are drawn
    pub show_probes: bool,
    /// Message to display temporarily in the overlay
    pub status_message: Option<(String, f32)>,
}

impl DebugState {
    /// Set a status message that will fade after a duration
    pub fn set_message(&mut self, message: impl Into<String>, duration: f32) {
        self.status_message = Some((message.into(), duration));
    }

    /// Count the status message down; clears it once expired.
    pub fn tick_message(&mut self, dt: f32) {
        if let Some((_, ref mut duration)) = self.status_message {
            *duration -= dt;
            if *duration <= 0.0 {
                self.status_message = None;
            }
        }
    }
}
