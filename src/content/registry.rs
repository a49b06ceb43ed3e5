//! ContentRegistry resource providing lookups for loaded player profiles.

use bevy::prelude::*;
use std::collections::HashMap;

use super::data::PlayerProfileDef;

/// All loaded tuning content, keyed by profile id.
#[derive(Resource, Debug, Default, Clone)]
pub struct ContentRegistry {
    pub profiles: HashMap<String, PlayerProfileDef>,
}

impl ContentRegistry {
    pub fn from_profiles(profiles: impl IntoIterator<Item = PlayerProfileDef>) -> Self {
        Self {
            profiles: profiles
                .into_iter()
                .map(|profile| (profile.id.clone(), profile))
                .collect(),
        }
    }

    /// Returns a summary of loaded content for logging.
    pub fn summary(&self) -> String {
        let mut ids: Vec<&str> = self.profiles.keys().map(String::as_str).collect();
        ids.sort_unstable();
        format!(
            "ContentRegistry loaded:\n - Player profiles: {} ({})",
            self.profiles.len(),
            ids.join(", ")
        )
    }
}
