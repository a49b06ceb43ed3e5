//! Movement domain: the fixed controller step and its visual follow-up.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::movement::{
    BufferedBody, ContactProbes, Contacts, ControllerConfig, ControllerState, Facing, JumpKind,
    PhysicsBody, Player,
};

/// Run one controller step per player and flush its staged writes into avian2d.
pub(crate) fn step_controllers(
    time: Res<Time>,
    mut query: Query<
        (
            Entity,
            &ControllerConfig,
            &Contacts,
            &ComputedMass,
            &mut ControllerState,
            &mut LinearVelocity,
            &mut GravityScale,
        ),
        With<Player>,
    >,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, config, contacts, mass, mut state, mut velocity, mut gravity) in &mut query {
        let mut body = BufferedBody::new(velocity.0, gravity.0);
        let report = state.step(config, *contacts, dt, &mut body);

        velocity.0 = body.resolve(mass.inverse(), dt);
        gravity.0 = body.gravity_scale();

        if report.landed {
            debug!("{entity}: landed, counters refilled");
        }
        match report.jump {
            Some(JumpKind::Ground) => debug!("{entity}: jump"),
            Some(JumpKind::Wall) => debug!("{entity}: wall jump away from {:?}", state.facing),
            Some(JumpKind::WallDash) => debug!("{entity}: wall dash"),
            Some(JumpKind::Double) => debug!(
                "{entity}: double jump ({} left)",
                state.double_jumps_remaining
            ),
            None => {}
        }
        if report.jump_cut {
            debug!("{entity}: jump cut, vy={:.1}", velocity.y);
        }
        if let Some(direction) = report.dash {
            debug!(
                "{entity}: dash toward {direction} ({} left)",
                state.dashes_remaining
            );
        }
        if report.dash_ended {
            debug!("{entity}: dash ended");
        }
    }
}

pub(crate) fn update_sprite_facing(
    mut query: Query<(&ControllerState, &mut Sprite), (With<Player>, Changed<ControllerState>)>,
) {
    for (state, mut sprite) in &mut query {
        let flip = state.facing == Facing::Left;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}

/// A controller without its collaborators cannot run; refuse to start.
pub(crate) fn check_controller_setup(
    query: Query<
        (
            Entity,
            Has<ControllerConfig>,
            Has<ControllerState>,
            Has<ContactProbes>,
            Has<Contacts>,
            Has<RigidBody>,
            Has<Mass>,
        ),
        With<Player>,
    >,
    mut exit: MessageWriter<AppExit>,
) {
    let mut broken = false;

    for (entity, config, state, probes, contacts, body, mass) in &query {
        let missing: Vec<&str> = [
            (config, "ControllerConfig"),
            (state, "ControllerState"),
            (probes, "ContactProbes"),
            (contacts, "Contacts"),
            (body, "RigidBody"),
            (mass, "Mass"),
        ]
        .into_iter()
        .filter_map(|(present, name)| (!present).then_some(name))
        .collect();

        if !missing.is_empty() {
            error!("Player {entity} is missing {}", missing.join(", "));
            broken = true;
        }
    }

    if broken {
        exit.write(AppExit::error());
    }
}
