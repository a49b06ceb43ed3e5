//! Data definitions for the player tuning file.
//!
//! These structs mirror assets/data/player.ron and are used for
//! deserialization. The ContentRegistry provides lookup by id.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::movement::{ContactProbes, ControllerConfig, SelectedProfile};

// ============================================================================
// Common wrapper for RON files with schema_version and items
// ============================================================================

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataFile<T> {
    pub schema_version: u32,
    pub items: Vec<T>,
}

pub const SCHEMA_VERSION: u32 = 1;

// ============================================================================
// Player profiles (player.ron)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct PlayerProfileDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: (f32, f32, f32),
    #[serde(default)]
    pub body: BodyDef,
    /// Unlisted fields keep their [`ControllerConfig::default`] values.
    #[serde(default)]
    pub controller: ControllerConfig,
    #[serde(default)]
    pub probes: ProbeLayoutDef,
}

impl PlayerProfileDef {
    /// Built-in profile used when no content could be loaded.
    pub fn fallback() -> Self {
        Self {
            id: SelectedProfile::DEFAULT_ID.to_string(),
            name: "Default".to_string(),
            color: default_color(),
            body: BodyDef::default(),
            controller: ControllerConfig::default(),
            probes: ProbeLayoutDef::default(),
        }
    }
}

fn default_color() -> (f32, f32, f32) {
    (0.9, 0.9, 0.9)
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BodyDef {
    pub width: f32,
    pub height: f32,
    pub mass: f32,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            width: 24.0,
            height: 48.0,
            mass: 1.0,
        }
    }
}

/// Probe offsets as authored for a right-facing character.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ProbeLayoutDef {
    pub radius: f32,
    pub ground: Vec<(f32, f32)>,
    pub buffer: (f32, f32),
    pub wall: Vec<(f32, f32)>,
}

impl Default for ProbeLayoutDef {
    fn default() -> Self {
        ContactProbes::default().into()
    }
}

impl From<ProbeLayoutDef> for ContactProbes {
    fn from(def: ProbeLayoutDef) -> Self {
        let point = |(x, y): (f32, f32)| Vec2::new(x, y);
        Self {
            radius: def.radius,
            ground: def.ground.into_iter().map(point).collect(),
            buffer: point(def.buffer),
            wall: def.wall.into_iter().map(point).collect(),
        }
    }
}

impl From<ContactProbes> for ProbeLayoutDef {
    fn from(probes: ContactProbes) -> Self {
        let pair = |v: Vec2| (v.x, v.y);
        Self {
            radius: probes.radius,
            ground: probes.ground.into_iter().map(pair).collect(),
            buffer: pair(probes.buffer),
            wall: probes.wall.into_iter().map(pair).collect(),
        }
    }
}
