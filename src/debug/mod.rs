//! Debug tooling for tuning the controller at runtime.
//!
//! Features:
//! - F1 / backtick: controller state overlay
//! - F2: draw contact probes
//! - F3: dump controller state to the log as JSON
//! - F5: reload tuning from assets/data

mod state;
mod systems;
mod ui;


pub use state::DebugState;
pub use systems::reloaded_config;
pub use ui::{DebugInfoOverlay, format_controller_info};

use bevy::prelude::*;

use crate::debug::systems::{
    draw_contact_probes, dump_controller_state, reload_tuning, toggle_debug_views,
    update_debug_info_overlay, update_status_message,
};

pub struct DebugPlugin;

impl Plugin for DebugPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DebugState>().add_systems(
            Update,
            (
                (
                    toggle_debug_views,
                    dump_controller_state,
                    reload_tuning,
                    update_status_message,
                )
                    .chain(),
                update_debug_info_overlay,
                draw_contact_probes,
            ),
        );
    }
}
