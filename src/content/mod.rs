//! Content domain: RON tuning data loading, validation and lookup.

mod data;
mod loader;
mod registry;
mod validation;


pub use data::{BodyDef, DataFile, PlayerProfileDef, ProbeLayoutDef, SCHEMA_VERSION};
pub use loader::{
    ContentLoadError, PLAYER_FILE, load_all_content, load_validated, parse_data_file,
    registry_from_profiles,
};
pub use registry::ContentRegistry;
pub use validation::{ValidationError, validate_content, validate_profile, validate_timestep};

use bevy::prelude::*;
use std::path::Path;

/// Directory the tuning files are read from, relative to the working directory.
pub const CONTENT_DIR: &str = "assets/data";

pub struct ContentPlugin;

impl Plugin for ContentPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, load_content);
    }
}

/// Load and validate the tuning files. On any failure the registry is left
/// out and the player falls back to built-in defaults.
pub fn load_content(mut commands: Commands, fixed_time: Res<Time<Fixed>>) {
    if let Err(e) = validate_timestep(fixed_time.timestep().as_secs_f32()) {
        error!("{e}");
        return;
    }

    match load_validated(Path::new(CONTENT_DIR)) {
        Ok(registry) => {
            info!("{}", registry.summary());
            commands.insert_resource(registry);
        }
        Err(errors) => {
            for e in &errors {
                error!("{e}");
            }
            error!(
                "Content loading failed with {} error(s); using default tuning",
                errors.len()
            );
        }
    }
}
