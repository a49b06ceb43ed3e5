//! Movement domain: player bootstrap from the selected tuning profile.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::content::{BodyDef, ContentRegistry, PlayerProfileDef};
use crate::movement::{
    ContactProbes, Contacts, ControllerState, GameLayer, Player, SelectedProfile,
};

/// Spawn the player with the selected profile's tuning, or the built-in
/// defaults when no content is available.
pub(crate) fn bootstrap_player_from_data(
    mut commands: Commands,
    selected: Res<SelectedProfile>,
    registry: Option<Res<ContentRegistry>>,
    fixed_time: Res<Time<Fixed>>,
    gravity: Option<Res<Gravity>>,
    existing_player: Query<Entity, With<Player>>,
) {
    // Don't spawn if player already exists
    if !existing_player.is_empty() {
        info!("Player already exists, skipping spawn");
        return;
    }

    let profile_id = selected.id();
    let profile = match registry.as_deref() {
        Some(reg) => match reg.profiles.get(profile_id) {
            Some(def) => def.clone(),
            None => {
                warn!("Profile '{profile_id}' not found in registry, using defaults");
                PlayerProfileDef::fallback()
            }
        },
        None => {
            warn!("ContentRegistry not available, using default controller tuning");
            PlayerProfileDef::fallback()
        }
    };

    let timestep = fixed_time.timestep().as_secs_f32();
    let config = profile.controller.clone().derive(timestep);
    let BodyDef {
        width,
        height,
        mass,
    } = profile.body;

    if let Some(gravity) = gravity {
        info!(
            "Spawning player '{}': max_speed={}, jump_height={:.1}, dt={:.4}",
            profile.name,
            config.max_ground_speed,
            config.single_jump_height(mass, gravity.0.length()),
            timestep
        );
    } else {
        info!(
            "Spawning player '{}': max_speed={}, dt={:.4}",
            profile.name, config.max_ground_speed, timestep
        );
    }

    let (r, g, b) = profile.color;

    commands.spawn((
        // Identity & control
        (
            Player,
            Name::new(profile.name.clone()),
            ControllerState::new(&config),
            Contacts::default(),
            ContactProbes::from(profile.probes.clone()),
            config.clone(),
        ),
        // Rendering
        Sprite {
            color: Color::srgb(r, g, b),
            custom_size: Some(Vec2::new(width, height)),
            ..default()
        },
        Transform::from_xyz(0.0, 100.0, 0.0),
        // Physics
        (
            RigidBody::Dynamic,
            Collider::rectangle(width, height),
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            GravityScale(config.jump_gravity),
            Mass(mass),
            NoAutoMass,
            Friction::new(0.0),
            CollisionLayers::new(GameLayer::Player, [GameLayer::Ground, GameLayer::Wall]),
        ),
    ));
}
