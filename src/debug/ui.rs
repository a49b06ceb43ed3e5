//! Debug domain: overlay components and layout.

use bevy::prelude::*;

use crate::movement::{ControllerSnapshot, Contacts};

/// Marker for the controller info overlay
#[derive(Component, Debug)]
pub struct DebugInfoOverlay;

pub(crate) fn spawn_debug_info_overlay(commands: &mut Commands) {
    commands.spawn((
        DebugInfoOverlay,
        Text::new("Waiting for player..."),
        TextFont {
            font_size: 12.0,
            ..default()
        },
        TextColor(Color::srgb(0.8, 0.9, 0.8)),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            top: Val::Px(20.0),
            padding: UiRect::all(Val::Px(8.0)),
            ..default()
        },
        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.7)),
        ZIndex(500),
    ));
}

fn flag(on: bool, name: &str) -> String {
    if on { name.to_uppercase() } else { name.to_lowercase() }
}

/// Overlay text for one controller. Active flags are upper-cased.
pub fn format_controller_info(
    snapshot: &ControllerSnapshot,
    contacts: Contacts,
    velocity: Vec2,
    gravity_scale: f32,
) -> String {
    let pending: Vec<String> = snapshot
        .transitions
        .iter()
        .map(|(kind, at)| format!("{kind:?}@{at:.3}"))
        .collect();

    format!(
        "t={:.3}  facing={:+}\n\
         vel=({:.0}, {:.0})  g={:.2}\n\
         contacts: {} {} {}\n\
         coyote={:.3} buffer={:.3} cut={:.3} dash_cd={:.3}\n\
         double_jumps={} dashes={}\n\
         {} {} {} {} {} {} {}\n\
         pending: [{}]",
        snapshot.clock,
        snapshot.facing,
        velocity.x,
        velocity.y,
        gravity_scale,
        flag(contacts.grounded, "ground"),
        flag(contacts.near_ground, "near"),
        flag(contacts.touching_wall, "wall"),
        snapshot.coyote_timer,
        snapshot.jump_buffer_timer,
        snapshot.jump_cancel_buffer_timer,
        snapshot.dash_cooldown_timer,
        snapshot.double_jumps_remaining,
        snapshot.dashes_remaining,
        flag(snapshot.is_jumping, "jump"),
        flag(snapshot.is_wall_sliding, "slide"),
        flag(snapshot.is_wall_jumping, "walljump"),
        flag(snapshot.is_double_jumping, "double"),
        flag(snapshot.wants_dash, "wantdash"),
        flag(snapshot.is_dashing, "dash"),
        flag(snapshot.is_dash_cancel, "dashcancel"),
        pending.join(", "),
    )
}
