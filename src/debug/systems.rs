//! Debug domain: hotkeys, tuning reload and overlay updates.

use std::path::Path;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::content::{CONTENT_DIR, ContentRegistry, load_validated};
use crate::debug::state::DebugState;
use crate::debug::ui::{DebugInfoOverlay, format_controller_info, spawn_debug_info_overlay};
use crate::movement::{
    ContactProbes, Contacts, ControllerConfig, ControllerSnapshot, ControllerState, Player,
    SelectedProfile,
};

/// Toggle the info overlay with F1 or backtick, probe drawing with F2.
pub(crate) fn toggle_debug_views(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_state: ResMut<DebugState>,
) {
    if keyboard.any_just_pressed([KeyCode::F1, KeyCode::Backquote]) {
        debug_state.show_info = !debug_state.show_info;
    }
    if keyboard.just_pressed(KeyCode::F2) {
        debug_state.show_probes = !debug_state.show_probes;
    }
}

/// F3 logs every controller as JSON.
pub(crate) fn dump_controller_state(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_state: ResMut<DebugState>,
    query: Query<(Entity, &ControllerState), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::F3) {
        return;
    }

    for (entity, state) in &query {
        let snapshot = ControllerSnapshot::from(state);
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => info!("Controller {entity}:\n{json}"),
            Err(e) => warn!("Failed to serialize controller {entity}: {e}"),
        }
    }
    debug_state.set_message("Controller state dumped to log", 2.0);
}

/// Look up `profile_id` and derive its controller config for `fixed_timestep`.
pub fn reloaded_config(
    registry: &ContentRegistry,
    profile_id: &str,
    fixed_timestep: f32,
) -> Option<ControllerConfig> {
    registry
        .profiles
        .get(profile_id)
        .map(|profile| profile.controller.clone().derive(fixed_timestep))
}

/// F5 re-reads the tuning files and swaps every player's config in place.
/// Invalid files leave the running tuning untouched.
pub(crate) fn reload_tuning(
    mut commands: Commands,
    keyboard: Res<ButtonInput<KeyCode>>,
    mut debug_state: ResMut<DebugState>,
    selected: Res<SelectedProfile>,
    fixed_time: Res<Time<Fixed>>,
    mut players: Query<(&mut ControllerConfig, &mut ControllerState), With<Player>>,
) {
    if !keyboard.just_pressed(KeyCode::F5) {
        return;
    }

    let registry = match load_validated(Path::new(CONTENT_DIR)) {
        Ok(registry) => registry,
        Err(errors) => {
            for e in &errors {
                error!("{e}");
            }
            debug_state.set_message(format!("Reload failed: {} error(s)", errors.len()), 4.0);
            return;
        }
    };

    let timestep = fixed_time.timestep().as_secs_f32();
    let Some(new_config) = reloaded_config(&registry, selected.id(), timestep) else {
        warn!("Profile '{}' missing after reload", selected.id());
        debug_state.set_message(format!("Profile '{}' missing", selected.id()), 4.0);
        return;
    };

    for (mut config, mut state) in &mut players {
        *config = new_config.clone();
        state.clamp_counters(&config);
    }

    info!("Reloaded tuning for profile '{}'", selected.id());
    debug_state.set_message(format!("Reloaded '{}'", selected.id()), 2.0);
    commands.insert_resource(registry);
}

pub(crate) fn update_status_message(time: Res<Time>, mut debug_state: ResMut<DebugState>) {
    debug_state.tick_message(time.delta_secs());
}

/// Update the info overlay with the first player's controller state
pub(crate) fn update_debug_info_overlay(
    mut commands: Commands,
    debug_state: Res<DebugState>,
    player_query: Query<
        (&ControllerState, &Contacts, &LinearVelocity, &GravityScale),
        With<Player>,
    >,
    mut overlay_query: Query<(Entity, &mut Text), With<DebugInfoOverlay>>,
) {
    if !debug_state.show_info {
        // Cleanup overlay if it exists
        for (entity, _) in &overlay_query {
            commands.entity(entity).despawn();
        }
        return;
    }

    let Ok((_, mut text)) = overlay_query.single_mut() else {
        spawn_debug_info_overlay(&mut commands);
        return;
    };

    let Some((state, contacts, velocity, gravity)) = player_query.iter().next() else {
        return;
    };

    let mut info = format_controller_info(
        &ControllerSnapshot::from(state),
        *contacts,
        velocity.0,
        gravity.0,
    );
    if let Some((message, _)) = &debug_state.status_message {
        info.push_str("\n> ");
        info.push_str(message);
    }
    **text = info;
}

/// Draw each probe, green while it overlaps.
pub(crate) fn draw_contact_probes(
    debug_state: Res<DebugState>,
    mut gizmos: Gizmos,
    query: Query<(&Transform, &ContactProbes, &ControllerState, &Contacts), With<Player>>,
) {
    if !debug_state.show_probes {
        return;
    }

    let hit = Color::srgb(0.3, 0.9, 0.3);
    let miss = Color::srgb(0.9, 0.3, 0.3);

    for (transform, probes, state, contacts) in &query {
        let origin = transform.translation.truncate();
        let mut draw = |offset: Vec2, active: bool| {
            let point = ContactProbes::world_point(origin, offset, state.facing);
            let radius = probes.radius.max(2.0);
            gizmos.circle_2d(point, radius, if active { hit } else { miss });
        };

        for &offset in &probes.ground {
            draw(offset, contacts.grounded);
        }
        draw(probes.buffer, contacts.near_ground);
        for &offset in &probes.wall {
            draw(offset, contacts.touching_wall);
        }
    }
}
