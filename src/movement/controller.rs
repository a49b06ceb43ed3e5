//! Movement domain: per-step ability resolution and locomotion.
//!
//! [`ControllerState::step`] is engine-agnostic: it reads a [`Contacts`]
//! snapshot, the latched input and the tuning record, and writes through a
//! [`PhysicsBody`]. The Bevy systems in `movement::systems` feed it from
//! avian2d.

use bevy::prelude::*;
use serde::Serialize;

use crate::movement::body::PhysicsBody;
use crate::movement::components::{Contacts, ControlEvent, Facing, InputEdges};
use crate::movement::resources::{ControllerConfig, SPEED_DEADZONE};
use crate::movement::schedule::{Transition, TransitionSchedule};

/// Which vertical ability fired during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JumpKind {
    Ground,
    Wall,
    /// Wall jump out of an upward dash.
    WallDash,
    Double,
}

/// Everything that happened during one [`ControllerState::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    pub jump: Option<JumpKind>,
    pub jump_cut: bool,
    /// Dash direction, when a dash started.
    pub dash: Option<Vec2>,
    pub dash_ended: bool,
    /// Horizontal locomotion force; `None` while dashing.
    pub move_force: Option<f32>,
    pub landed: bool,
    pub flipped: bool,
}

#[derive(Component, Debug, Clone)]
pub struct ControllerState {
    pub facing: Facing,
    /// Latest movement input, each axis in [-1, 1].
    pub movement: Vec2,

    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub jump_cancel_buffer_timer: f32,
    pub dash_cooldown_timer: f32,

    pub double_jumps_remaining: u8,
    pub dashes_remaining: u8,

    pub is_jumping: bool,
    pub is_wall_sliding: bool,
    pub is_wall_jumping: bool,
    pub is_double_jumping: bool,
    pub wants_dash: bool,
    pub is_dashing: bool,
    /// A jump interrupted a dash; horizontal damping stays off until the
    /// next new contact.
    pub is_dash_cancel: bool,

    clock: f64,
    pending: InputEdges,
    previous_contacts: Contacts,
    transitions: TransitionSchedule,
}

impl ControllerState {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            facing: Facing::Right,
            movement: Vec2::ZERO,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            jump_cancel_buffer_timer: 0.0,
            dash_cooldown_timer: 0.0,
            double_jumps_remaining: config.double_jump_max,
            dashes_remaining: config.dash_max,
            is_jumping: false,
            is_wall_sliding: false,
            is_wall_jumping: false,
            is_double_jumping: false,
            wants_dash: false,
            is_dashing: false,
            is_dash_cancel: false,
            clock: 0.0,
            pending: InputEdges::default(),
            previous_contacts: Contacts::default(),
            transitions: TransitionSchedule::default(),
        }
    }

    /// Seconds of simulated time this controller has stepped through.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    #[cfg(test)]
    pub(crate) fn with_clock(mut self, clock: f64) -> Self {
        self.clock = clock;
        self
    }

    pub fn transitions(&self) -> &TransitionSchedule {
        &self.transitions
    }

    pub fn pending_edges(&self) -> InputEdges {
        self.pending
    }

    /// Keep the replenishable counters within a (possibly reloaded) config.
    pub fn clamp_counters(&mut self, config: &ControllerConfig) {
        self.double_jumps_remaining = self.double_jumps_remaining.min(config.double_jump_max);
        self.dashes_remaining = self.dashes_remaining.min(config.dash_max);
    }

    /// Fold an input event into the state. Edges stay latched until the next
    /// step drains them.
    pub fn handle_event(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::Move(axis) => self.movement = axis.clamp(Vec2::NEG_ONE, Vec2::ONE),
            ControlEvent::MoveCleared => self.movement = Vec2::ZERO,
            ControlEvent::JumpPressed => self.pending.jump_pressed = true,
            ControlEvent::JumpReleased => self.pending.jump_released = true,
            ControlEvent::DashPressed => self.wants_dash = true,
        }
    }

    /// Advance one fixed step of `dt` seconds.
    pub fn step(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        dt: f32,
        body: &mut impl PhysicsBody,
    ) -> StepReport {
        let mut report = StepReport::default();
        self.clock += f64::from(dt);
        let edges = std::mem::take(&mut self.pending);

        if self.contact_began(contacts) {
            self.is_dash_cancel = false;
        }
        report.landed = contacts.grounded && !self.previous_contacts.grounded;
        report.flipped = self.update_facing();
        self.update_wall_slide(config, contacts, body);
        self.update_timers(config, contacts, edges, dt);
        report.dash_ended = self.run_due_transitions(config, contacts, body);

        // Dash > hang time > rising/falling
        let gravity = self.gravity_scale(config, body.velocity().y);
        body.set_gravity_scale(gravity);

        if self.jump_buffer_timer > 0.0 {
            report.jump = self.resolve_jump(config, contacts, body);
        }

        if self.jump_cancel_buffer_timer > 0.0
            && body.velocity().y > 0.0
            && !self.is_wall_jumping
        {
            self.jump_cancel(config, body);
            report.jump_cut = true;
        }

        if self.wants_dash && self.dash_cooldown_timer <= 0.0 && self.dashes_remaining > 0 {
            report.dash = Some(self.dash(config, body));
        }

        if !self.is_dashing {
            report.move_force = Some(self.run(config, contacts, body));
        }

        let velocity = body.velocity();
        if velocity.y < 0.0 {
            body.set_velocity(Vec2::new(
                velocity.x,
                velocity.y.max(-config.max_fall_speed),
            ));
        }

        self.previous_contacts = contacts;
        report
    }

    /// Gravity multiplier for the current flags and vertical velocity.
    pub fn gravity_scale(&self, config: &ControllerConfig, vertical_velocity: f32) -> f32 {
        if self.is_dashing {
            return 0.0;
        }

        let mut scale = if vertical_velocity >= 0.0 {
            config.jump_gravity
        } else {
            config.jump_gravity * config.fall_gravity_modifier
        };

        let any_jump = self.is_jumping || self.is_wall_jumping || self.is_double_jumping;
        if any_jump && vertical_velocity.abs() < config.hang_abs_velocity {
            scale *= config.hang_gravity_modifier;
        }
        scale
    }

    fn contact_began(&self, contacts: Contacts) -> bool {
        (contacts.grounded && !self.previous_contacts.grounded)
            || (contacts.touching_wall && !self.previous_contacts.touching_wall)
    }

    fn update_facing(&mut self) -> bool {
        let flip = match self.facing {
            Facing::Right => self.movement.x < 0.0,
            Facing::Left => self.movement.x > 0.0,
        };
        if flip {
            self.facing = self.facing.flipped();
        }
        flip
    }

    fn update_wall_slide(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        body: &mut impl PhysicsBody,
    ) {
        self.is_wall_sliding =
            contacts.touching_wall && !contacts.grounded && self.movement.x != 0.0;

        if self.is_wall_sliding {
            let velocity = body.velocity();
            body.set_velocity(Vec2::new(
                velocity.x,
                velocity.y.max(-config.wall_sliding_speed),
            ));
        }
    }

    fn update_timers(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        edges: InputEdges,
        dt: f32,
    ) {
        if contacts.grounded {
            self.coyote_timer = config.coyote_time;
            self.double_jumps_remaining = config.double_jump_max;
            self.dashes_remaining = config.dash_max;
            self.is_jumping = false;
            self.is_wall_jumping = false;
            self.is_double_jumping = false;
            self.transitions.cancel(Transition::WallJumpUnlock);
        } else {
            self.coyote_timer -= dt;
        }

        if edges.jump_pressed {
            self.jump_buffer_timer = config.jump_buffer_time;
            self.jump_cancel_buffer_timer = 0.0;
        } else {
            self.jump_buffer_timer -= dt;
        }

        if edges.jump_released {
            self.jump_cancel_buffer_timer = config.jump_buffer_time;
        } else {
            self.jump_cancel_buffer_timer -= dt;
        }

        if !self.is_dashing {
            self.dash_cooldown_timer -= dt;
        }
    }

    /// Fire every transition due by now. Returns whether a dash finished.
    fn run_due_transitions(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        body: &mut impl PhysicsBody,
    ) -> bool {
        let mut dash_ended = false;

        while let Some(transition) = self.transitions.pop_due(self.clock) {
            match transition {
                Transition::WallJumpUnlock => self.is_wall_jumping = false,
                Transition::DashEnd => {
                    if !self.is_dashing {
                        continue;
                    }
                    body.set_velocity(Vec2::ZERO);
                    if contacts.grounded {
                        self.is_dashing = false;
                        dash_ended = true;
                    } else {
                        self.transitions.schedule(
                            Transition::DashGraceEnd,
                            self.clock + f64::from(config.dash_grace_time),
                        );
                    }
                }
                Transition::DashGraceEnd => {
                    self.is_dashing = false;
                    dash_ended = true;
                }
            }
        }

        dash_ended
    }

    fn resolve_jump(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        body: &mut impl PhysicsBody,
    ) -> Option<JumpKind> {
        let can_wall_jump = contacts.touching_wall
            && !contacts.grounded
            && (self.is_wall_sliding || !config.wall_jump_requires_slide);

        if can_wall_jump {
            Some(self.wall_jump(config, body))
        } else if self.coyote_timer > 0.0 {
            self.jump(config, body);
            Some(JumpKind::Ground)
        } else if self.double_jumps_remaining > 0 && !contacts.near_ground && !self.is_dashing {
            self.double_jump(config, body);
            Some(JumpKind::Double)
        } else {
            None
        }
    }

    fn jump(&mut self, config: &ControllerConfig, body: &mut impl PhysicsBody) {
        self.jump_buffer_timer = 0.0;
        self.coyote_timer = 0.0;
        self.is_jumping = true;
        if self.is_dashing {
            self.is_dash_cancel = true;
            self.end_dash();
        }
        body.add_impulse(Vec2::Y * config.jump_power);
    }

    fn wall_jump(&mut self, config: &ControllerConfig, body: &mut impl PhysicsBody) -> JumpKind {
        self.jump_buffer_timer = 0.0;
        self.is_wall_jumping = true;
        let direction = -self.facing.sign();
        let velocity = body.velocity();

        let kind = if self.is_dashing && velocity.y > 0.0 {
            body.add_impulse(Vec2::new(
                direction * config.wall_kick_off,
                config.wall_dash_power,
            ));
            self.end_dash();
            JumpKind::WallDash
        } else {
            body.set_velocity(Vec2::new(velocity.x, 0.0));
            body.add_impulse(Vec2::new(
                direction * config.wall_kick_off,
                config.wall_jump_power,
            ));
            JumpKind::Wall
        };

        self.transitions.schedule(
            Transition::WallJumpUnlock,
            self.clock + f64::from(config.wall_accel_time),
        );
        kind
    }

    fn double_jump(&mut self, config: &ControllerConfig, body: &mut impl PhysicsBody) {
        self.jump_buffer_timer = 0.0;
        self.double_jumps_remaining -= 1;
        self.is_double_jumping = true;
        let velocity = body.velocity();
        if velocity.y < 0.0 {
            body.set_velocity(Vec2::new(velocity.x, 0.0));
        }
        body.add_impulse(Vec2::Y * config.double_jump_power);
    }

    fn jump_cancel(&mut self, config: &ControllerConfig, body: &mut impl PhysicsBody) {
        self.jump_cancel_buffer_timer = 0.0;
        let velocity = body.velocity();
        body.set_velocity(Vec2::new(velocity.x, velocity.y * config.jump_slowdown));
    }

    fn dash(&mut self, config: &ControllerConfig, body: &mut impl PhysicsBody) -> Vec2 {
        self.wants_dash = false;
        self.dashes_remaining -= 1;
        self.is_dashing = true;
        self.dash_cooldown_timer = config.dash_cooldown;

        let direction = self
            .movement
            .try_normalize()
            .unwrap_or(Vec2::new(self.facing.sign(), 0.0));

        body.set_velocity(Vec2::ZERO);
        body.set_gravity_scale(0.0);
        body.add_impulse(direction * config.dash_power);

        self.transitions.cancel(Transition::DashGraceEnd);
        self.transitions
            .schedule(Transition::DashEnd, self.clock + f64::from(config.dash_duration));
        direction
    }

    fn end_dash(&mut self) {
        self.is_dashing = false;
        self.transitions.cancel(Transition::DashEnd);
        self.transitions.cancel(Transition::DashGraceEnd);
    }

    fn run(
        &mut self,
        config: &ControllerConfig,
        contacts: Contacts,
        body: &mut impl PhysicsBody,
    ) -> f32 {
        let target_speed = self.movement.x * config.max_ground_speed;
        let accelerating = target_speed.abs() > SPEED_DEADZONE;

        let mut accel_rate = match (contacts.grounded, accelerating) {
            (true, true) => config.ground_accel_amount,
            (true, false) => config.ground_deccel_amount,
            (false, true) => config.ground_accel_amount * config.air_accel_modifier,
            (false, false) => config.ground_deccel_amount * config.air_deccel_modifier,
        };

        if self.is_wall_jumping {
            accel_rate *= config.wall_accel_modifier;
        }

        let current_speed = body.velocity().x;
        let same_sign = sign(current_speed) == sign(target_speed);

        // Already faster than the target in the same direction: keep it.
        if config.conserve_momentum
            && contacts.grounded
            && accelerating
            && current_speed.abs() > target_speed.abs()
            && same_sign
        {
            accel_rate = 0.0;
        }

        if config.conserve_momentum && self.is_dash_cancel && (same_sign || target_speed == 0.0) {
            accel_rate = 0.0;
        }

        let force = (target_speed - current_speed) * accel_rate;
        body.add_force(Vec2::X * force);
        force
    }
}

/// Sign where zero counts as positive.
fn sign(value: f32) -> f32 {
    if value >= 0.0 { 1.0 } else { -1.0 }
}

/// Serializable view of a controller for debug dumps.
#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub clock: f64,
    pub facing: f32,
    pub movement: [f32; 2],
    pub coyote_timer: f32,
    pub jump_buffer_timer: f32,
    pub jump_cancel_buffer_timer: f32,
    pub dash_cooldown_timer: f32,
    pub double_jumps_remaining: u8,
    pub dashes_remaining: u8,
    pub is_jumping: bool,
    pub is_wall_sliding: bool,
    pub is_wall_jumping: bool,
    pub is_double_jumping: bool,
    pub wants_dash: bool,
    pub is_dashing: bool,
    pub is_dash_cancel: bool,
    pub transitions: TransitionSchedule,
}

impl From<&ControllerState> for ControllerSnapshot {
    fn from(state: &ControllerState) -> Self {
        Self {
            clock: state.clock,
            facing: state.facing.sign(),
            movement: state.movement.to_array(),
            coyote_timer: state.coyote_timer,
            jump_buffer_timer: state.jump_buffer_timer,
            jump_cancel_buffer_timer: state.jump_cancel_buffer_timer,
            dash_cooldown_timer: state.dash_cooldown_timer,
            double_jumps_remaining: state.double_jumps_remaining,
            dashes_remaining: state.dashes_remaining,
            is_jumping: state.is_jumping,
            is_wall_sliding: state.is_wall_sliding,
            is_wall_jumping: state.is_wall_jumping,
            is_double_jumping: state.is_double_jumping,
            wants_dash: state.wants_dash,
            is_dashing: state.is_dashing,
            is_dash_cancel: state.is_dash_cancel,
            transitions: state.transitions.clone(),
        }
    }
}
