//! Movement domain: keyboard sampling and control-event delivery.

use bevy::prelude::*;

use crate::movement::{ControlEvent, ControllerState, Player};

/// Translate the keyboard into [`ControlEvent`] messages. Movement is only
/// sent when the axis changes.
pub(crate) fn read_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut last_axis: Local<Vec2>,
    mut events: MessageWriter<ControlEvent>,
) {
    // Horizontal axis
    let mut x = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        x += 1.0;
    }

    // Vertical axis only steers dashes
    let mut y = 0.0;
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        y += 1.0;
    }

    let axis = Vec2::new(x, y);
    if axis != *last_axis {
        *last_axis = axis;
        events.write(if axis == Vec2::ZERO {
            ControlEvent::MoveCleared
        } else {
            ControlEvent::Move(axis)
        });
    }

    let jump_keys = [KeyCode::Space, KeyCode::KeyK];
    if keyboard.any_just_pressed(jump_keys) {
        events.write(ControlEvent::JumpPressed);
    }
    if keyboard.any_just_released(jump_keys) {
        events.write(ControlEvent::JumpReleased);
    }
    if keyboard.any_just_pressed([KeyCode::ShiftLeft, KeyCode::KeyJ]) {
        events.write(ControlEvent::DashPressed);
    }
}

/// Fold pending control events into every player's controller state.
pub(crate) fn apply_control_events(
    mut events: MessageReader<ControlEvent>,
    mut query: Query<&mut ControllerState, With<Player>>,
) {
    for event in events.read() {
        for mut state in &mut query {
            state.handle_event(*event);
        }
    }
}
