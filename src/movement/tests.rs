//! Movement domain: unit tests for the controller state machine.

use std::time::Duration;

use avian2d::prelude::*;
use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use proptest::prelude::*;

use super::body::PhysicsBody;
use super::controller::{ControllerState, JumpKind, StepReport};
use super::schedule::Transition;
use super::systems;
use super::{ContactProbes, ControlEvent, ControllerConfig, Contacts, Facing, Player};

const DT: f32 = 1.0 / 64.0;
const GRAVITY: f32 = -20.0;

const GROUND: Contacts = Contacts {
    grounded: true,
    near_ground: true,
    touching_wall: false,
};
const NEAR_GROUND: Contacts = Contacts {
    grounded: false,
    near_ground: true,
    touching_wall: false,
};
const AIR: Contacts = Contacts {
    grounded: false,
    near_ground: false,
    touching_wall: false,
};
const WALL: Contacts = Contacts {
    grounded: false,
    near_ground: false,
    touching_wall: true,
};

// -----------------------------------------------------------------------------
// Harness
// -----------------------------------------------------------------------------

/// Body that records every write and integrates with unit mass.
#[derive(Debug, Default)]
struct TestBody {
    velocity: Vec2,
    gravity_scale: f32,
    forces: Vec<Vec2>,
    impulses: Vec<Vec2>,
}

impl PhysicsBody for TestBody {
    fn velocity(&self) -> Vec2 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec2) {
        self.forces.push(force);
    }

    fn add_impulse(&mut self, impulse: Vec2) {
        self.impulses.push(impulse);
    }

    fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }
}

impl TestBody {
    fn integrate(&mut self) {
        let impulse: Vec2 = self.impulses.drain(..).sum();
        let force: Vec2 = self.forces.drain(..).sum();
        self.velocity += impulse + force * DT;
        self.velocity.y += GRAVITY * self.gravity_scale * DT;
    }
}

struct Sim {
    config: ControllerConfig,
    state: ControllerState,
    body: TestBody,
}

impl Sim {
    fn new(config: ControllerConfig) -> Self {
        let state = ControllerState::new(&config);
        Self {
            config,
            state,
            body: TestBody::default(),
        }
    }

    fn send(&mut self, event: ControlEvent) {
        self.state.handle_event(event);
    }

    /// Step without integrating, leaving this step's writes on the body.
    fn step(&mut self, contacts: Contacts) -> StepReport {
        self.body.forces.clear();
        self.body.impulses.clear();
        self.state.step(&self.config, contacts, DT, &mut self.body)
    }

    fn tick(&mut self, contacts: Contacts) -> StepReport {
        let report = self.step(contacts);
        self.body.integrate();
        report
    }

    fn ticks(&mut self, contacts: Contacts, count: usize) -> Vec<StepReport> {
        (0..count).map(|_| self.tick(contacts)).collect()
    }
}

fn test_config() -> ControllerConfig {
    ControllerConfig {
        max_ground_speed: 8.0,
        ground_acceleration: 4.0,
        ground_decceleration: 8.0,
        air_accel_modifier: 0.5,
        air_deccel_modifier: 0.25,
        conserve_momentum: true,
        jump_power: 10.0,
        jump_gravity: 1.0,
        fall_gravity_modifier: 2.0,
        max_fall_speed: 20.0,
        hang_gravity_modifier: 0.5,
        hang_abs_velocity: 1.0,
        jump_slowdown: 0.5,
        coyote_time: 0.125,
        jump_buffer_time: 0.125,
        wall_sliding_speed: 2.0,
        wall_kick_off: 6.0,
        wall_jump_power: 9.0,
        wall_dash_power: 7.0,
        wall_accel_modifier: 0.25,
        wall_accel_time: 0.25,
        wall_jump_requires_slide: false,
        double_jump_power: 8.0,
        double_jump_max: 1,
        dash_power: 15.0,
        dash_duration: 0.125,
        dash_grace_time: 0.0625,
        dash_cooldown: 0.25,
        dash_max: 1,
        ..Default::default()
    }
    .derive(DT)
}

fn jumps(reports: &[StepReport]) -> usize {
    reports.iter().filter(|r| r.jump.is_some()).count()
}

// -----------------------------------------------------------------------------
// Config derivation
// -----------------------------------------------------------------------------

#[test]
fn test_derive_computes_per_step_amounts() {
    let config = test_config();
    assert_eq!(config.ground_accel_amount, 32.0);
    assert_eq!(config.ground_deccel_amount, 64.0);
}

#[test]
fn test_derive_clamps_raw_rates_to_max_speed() {
    let config = ControllerConfig {
        max_ground_speed: 8.0,
        ground_acceleration: 100.0,
        ground_decceleration: 0.0,
        ..test_config()
    }
    .derive(DT);

    assert_eq!(config.ground_acceleration, 8.0);
    assert_eq!(config.ground_decceleration, 0.01);
    assert_eq!(config.ground_accel_amount, 64.0);
}

// -----------------------------------------------------------------------------
// Landing and counters
// -----------------------------------------------------------------------------

#[test]
fn test_grounded_step_replenishes_counters() {
    let mut sim = Sim::new(ControllerConfig {
        double_jump_max: 2,
        dash_max: 3,
        ..test_config()
    });
    sim.state.double_jumps_remaining = 0;
    sim.state.dashes_remaining = 0;
    sim.state.is_jumping = true;
    sim.state.is_double_jumping = true;

    let report = sim.tick(GROUND);

    assert!(report.landed);
    assert_eq!(sim.state.double_jumps_remaining, 2);
    assert_eq!(sim.state.dashes_remaining, 3);
    assert_eq!(sim.state.coyote_timer, 0.125);
    assert!(!sim.state.is_jumping);
    assert!(!sim.state.is_double_jumping);
}

#[test]
fn test_ground_dash_spends_the_landing_charge() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(0.0, 1.0)));
    sim.send(ControlEvent::DashPressed);

    let report = sim.tick(GROUND);
    assert_eq!(report.dash, Some(Vec2::Y));
    assert_eq!(sim.state.dashes_remaining, 0);

    // Carried off the ground; dash, grace and cooldown all run out
    sim.ticks(AIR, 40);
    assert!(!sim.state.is_dashing);
    assert!(sim.state.dash_cooldown_timer <= 0.0);

    sim.send(ControlEvent::DashPressed);
    let reports = sim.ticks(AIR, 10);
    assert!(reports.iter().all(|r| r.dash.is_none()));

    // The next grounded step refills the charge
    assert!(sim.tick(GROUND).dash.is_some());
}

// -----------------------------------------------------------------------------
// Jump buffering and coyote time
// -----------------------------------------------------------------------------

#[test]
fn test_buffered_jump_fires_once_on_landing() {
    let mut sim = Sim::new(ControllerConfig {
        double_jump_max: 0,
        ..test_config()
    });
    sim.send(ControlEvent::JumpPressed);

    let mut reports = sim.ticks(AIR, 3);
    assert_eq!(jumps(&reports), 0);

    let landing = sim.step(GROUND);
    assert_eq!(landing.jump, Some(JumpKind::Ground));
    assert_eq!(sim.body.impulses, vec![Vec2::new(0.0, 10.0)]);
    assert_eq!(sim.state.jump_buffer_timer, 0.0);
    sim.body.integrate();
    reports.push(landing);

    reports.extend(sim.ticks(GROUND, 10));
    assert_eq!(jumps(&reports), 1);
}

#[test]
fn test_jump_buffer_expires() {
    let mut sim = Sim::new(ControllerConfig {
        double_jump_max: 0,
        ..test_config()
    });
    sim.send(ControlEvent::JumpPressed);

    let mut reports = sim.ticks(AIR, 8);
    reports.extend(sim.ticks(GROUND, 5));

    assert_eq!(jumps(&reports), 0);
}

#[test]
fn test_coyote_jump_after_leaving_ground() {
    let mut sim = Sim::new(test_config());
    sim.tick(GROUND);
    sim.ticks(AIR, 3);

    sim.send(ControlEvent::JumpPressed);
    let report = sim.tick(AIR);

    assert_eq!(report.jump, Some(JumpKind::Ground));
    assert!(sim.state.is_jumping);
    // The ground jump is spent, so the double jump is still there
    assert_eq!(sim.state.double_jumps_remaining, 1);
}

#[test]
fn test_expired_coyote_falls_through_to_double_jump() {
    let mut sim = Sim::new(test_config());
    sim.tick(GROUND);
    sim.ticks(AIR, 7);

    sim.send(ControlEvent::JumpPressed);
    let report = sim.tick(AIR);

    assert_eq!(report.jump, Some(JumpKind::Double));
    assert_eq!(sim.state.double_jumps_remaining, 0);
}

#[test]
fn test_ground_jump_consumes_coyote_time() {
    let mut sim = Sim::new(test_config());
    sim.tick(GROUND);
    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(GROUND).jump, Some(JumpKind::Ground));

    sim.send(ControlEvent::JumpPressed);
    let report = sim.tick(AIR);

    assert_eq!(report.jump, Some(JumpKind::Double));
}

// -----------------------------------------------------------------------------
// Priority
// -----------------------------------------------------------------------------

#[test]
fn test_wall_jump_beats_jump_and_double_jump() {
    let mut sim = Sim::new(test_config());
    sim.tick(GROUND);
    assert!(sim.state.coyote_timer > 0.0);
    assert_eq!(sim.state.double_jumps_remaining, 1);

    sim.send(ControlEvent::JumpPressed);
    let report = sim.step(WALL);

    assert_eq!(report.jump, Some(JumpKind::Wall));
    assert_eq!(sim.body.impulses, vec![Vec2::new(-6.0, 9.0)]);
    assert_eq!(sim.state.double_jumps_remaining, 1);
    assert!(!sim.state.is_jumping);
}

#[test]
fn test_wall_jump_requires_slide_when_configured() {
    let mut sim = Sim::new(ControllerConfig {
        wall_jump_requires_slide: true,
        ..test_config()
    });

    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(WALL).jump, Some(JumpKind::Double));

    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.send(ControlEvent::JumpPressed);
    let report = sim.tick(WALL);

    assert!(sim.state.is_wall_sliding);
    assert_eq!(report.jump, Some(JumpKind::Wall));
}

// -----------------------------------------------------------------------------
// Wall jumping
// -----------------------------------------------------------------------------

#[test]
fn test_wall_jump_kicks_away_and_unlocks_after_wall_accel_time() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(0.0, -4.0);
    sim.send(ControlEvent::JumpPressed);

    let report = sim.step(WALL);

    assert_eq!(report.jump, Some(JumpKind::Wall));
    assert_eq!(sim.state.facing, Facing::Right);
    assert_eq!(sim.body.impulses, vec![Vec2::new(-6.0, 9.0)]);
    assert_eq!(sim.body.velocity.y, 0.0);
    assert!(sim.state.is_wall_jumping);
    assert_eq!(
        sim.state.transitions().fire_time(Transition::WallJumpUnlock),
        Some(f64::from(DT) + 0.25)
    );
    sim.body.integrate();

    sim.ticks(AIR, 15);
    assert!(sim.state.is_wall_jumping);
    sim.tick(AIR);
    assert!(!sim.state.is_wall_jumping);
}

#[test]
fn test_wall_jump_from_left_facing_kicks_right() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(-1.0, 0.0)));
    sim.send(ControlEvent::JumpPressed);

    let report = sim.step(WALL);

    assert!(report.flipped);
    assert_eq!(sim.state.facing, Facing::Left);
    assert_eq!(sim.body.impulses, vec![Vec2::new(6.0, 9.0)]);
}

#[test]
fn test_second_wall_jump_replaces_pending_unlock() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::JumpPressed);
    sim.tick(WALL);
    sim.ticks(AIR, 10);

    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(WALL).jump, Some(JumpKind::Wall));
    let second_at = sim.state.clock();

    sim.ticks(AIR, 10);
    // The first lock would have expired by now
    assert!(sim.state.is_wall_jumping);
    assert_eq!(
        sim.state.transitions().fire_time(Transition::WallJumpUnlock),
        Some(second_at + 0.25)
    );
}

#[test]
fn test_wall_jump_slows_air_acceleration() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::JumpPressed);
    sim.tick(WALL);

    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.body.velocity = Vec2::ZERO;
    let report = sim.step(AIR);

    // 8 * (32 * 0.5 air) * 0.25 wall
    assert_eq!(report.move_force, Some(32.0));
}

#[test]
fn test_wall_slide_caps_descent() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.body.velocity = Vec2::new(0.0, -10.0);

    sim.step(WALL);

    assert!(sim.state.is_wall_sliding);
    assert_eq!(sim.body.velocity.y, -2.0);
}

#[test]
fn test_no_wall_slide_without_input() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(0.0, -10.0);

    sim.step(WALL);

    assert!(!sim.state.is_wall_sliding);
    assert_eq!(sim.body.velocity.y, -10.0);
}

// -----------------------------------------------------------------------------
// Double jumping
// -----------------------------------------------------------------------------

#[test]
fn test_double_jump_zeroes_fall_and_spends_counter() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(3.0, -5.0);
    sim.send(ControlEvent::JumpPressed);

    let report = sim.step(AIR);

    assert_eq!(report.jump, Some(JumpKind::Double));
    assert_eq!(sim.body.velocity, Vec2::new(3.0, 0.0));
    assert_eq!(sim.body.impulses, vec![Vec2::new(0.0, 8.0)]);
    assert_eq!(sim.state.double_jumps_remaining, 0);
    assert!(sim.state.is_double_jumping);
    sim.body.integrate();

    sim.ticks(AIR, 10);
    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(AIR).jump, None);
}

#[test]
fn test_no_double_jump_near_ground() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::JumpPressed);

    let report = sim.tick(NEAR_GROUND);

    assert_eq!(report.jump, None);
    assert_eq!(sim.state.double_jumps_remaining, 1);
    // Still buffered for the landing
    assert!(sim.state.jump_buffer_timer > 0.0);
    assert_eq!(sim.tick(GROUND).jump, Some(JumpKind::Ground));
}

#[test]
fn test_no_double_jump_while_dashing() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::DashPressed);
    sim.tick(AIR);
    assert!(sim.state.is_dashing);

    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(AIR).jump, None);
}

// -----------------------------------------------------------------------------
// Jump release
// -----------------------------------------------------------------------------

#[test]
fn test_jump_release_scales_rising_velocity_once() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(0.0, 6.0);
    sim.send(ControlEvent::JumpReleased);

    let report = sim.step(AIR);
    assert!(report.jump_cut);
    assert_eq!(sim.body.velocity.y, 3.0);
    assert_eq!(sim.state.jump_cancel_buffer_timer, 0.0);
    sim.body.integrate();

    let report = sim.tick(AIR);
    assert!(!report.jump_cut);
}

#[test]
fn test_jump_release_ignored_while_wall_jumping() {
    let mut sim = Sim::new(test_config());
    sim.state.is_wall_jumping = true;
    sim.body.velocity = Vec2::new(0.0, 6.0);
    sim.send(ControlEvent::JumpReleased);

    let report = sim.step(AIR);

    assert!(!report.jump_cut);
    assert_eq!(sim.body.velocity.y, 6.0);
}

#[test]
fn test_quick_tap_produces_short_hop() {
    let mut sim = Sim::new(test_config());
    sim.tick(GROUND);
    sim.send(ControlEvent::JumpPressed);
    sim.send(ControlEvent::JumpReleased);

    let report = sim.tick(GROUND);
    assert_eq!(report.jump, Some(JumpKind::Ground));
    assert!(!report.jump_cut);
    let rising = sim.body.velocity.y;
    assert!(rising > 0.0);

    let report = sim.step(AIR);
    assert!(report.jump_cut);
    assert_eq!(sim.body.velocity.y, rising * 0.5);
}

// -----------------------------------------------------------------------------
// Horizontal locomotion
// -----------------------------------------------------------------------------

#[test]
fn test_ground_force_scenario() {
    let mut sim = Sim::new(ControllerConfig {
        max_ground_speed: 5.0,
        ground_accel_amount: 2.0,
        ..test_config()
    });
    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.body.velocity = Vec2::new(1.5, 0.0);

    let report = sim.step(GROUND);

    assert_eq!(report.move_force, Some((5.0 - 1.5) * 2.0));
    assert_eq!(sim.body.forces, vec![Vec2::new(7.0, 0.0)]);
}

#[test]
fn test_deceleration_with_neutral_input() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(2.0, 0.0);

    assert_eq!(sim.step(GROUND).move_force, Some(-2.0 * 64.0));
    assert_eq!(sim.step(AIR).move_force, Some(-2.0 * 64.0 * 0.25));
}

#[test]
fn test_air_acceleration_uses_modifier() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(-0.5, 0.0)));

    let report = sim.step(AIR);

    assert_eq!(report.move_force, Some(-4.0 * 32.0 * 0.5));
}

#[test]
fn test_momentum_conserved_when_faster_than_target() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.body.velocity = Vec2::new(12.0, 0.0);
    assert_eq!(sim.step(GROUND).move_force, Some(0.0));

    sim.send(ControlEvent::Move(Vec2::new(-1.0, 0.0)));
    sim.body.velocity = Vec2::new(-12.0, 0.0);
    assert_eq!(sim.step(GROUND).move_force, Some(0.0));

    // Reversing direction is never conserved
    sim.body.velocity = Vec2::new(12.0, 0.0);
    assert_eq!(sim.step(GROUND).move_force, Some(-20.0 * 32.0));
}

#[test]
fn test_momentum_not_conserved_when_disabled() {
    let mut sim = Sim::new(ControllerConfig {
        conserve_momentum: false,
        ..test_config()
    });
    sim.send(ControlEvent::Move(Vec2::new(1.0, 0.0)));
    sim.body.velocity = Vec2::new(12.0, 0.0);

    assert_eq!(sim.step(GROUND).move_force, Some(-4.0 * 32.0));
}

#[test]
fn test_facing_follows_input_sign() {
    let mut sim = Sim::new(test_config());

    sim.send(ControlEvent::Move(Vec2::new(-0.3, 0.0)));
    assert!(sim.tick(GROUND).flipped);
    assert_eq!(sim.state.facing, Facing::Left);

    sim.send(ControlEvent::MoveCleared);
    assert!(!sim.tick(GROUND).flipped);
    assert_eq!(sim.state.facing, Facing::Left);

    sim.send(ControlEvent::Move(Vec2::new(0.8, 0.0)));
    assert!(sim.tick(GROUND).flipped);
    assert_eq!(sim.state.facing, Facing::Right);
}

#[test]
fn test_movement_input_is_clamped() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(3.0, -2.0)));
    assert_eq!(sim.state.movement, Vec2::new(1.0, -1.0));
}

// -----------------------------------------------------------------------------
// Gravity
// -----------------------------------------------------------------------------

#[test]
fn test_gravity_scale_selection() {
    let config = test_config();
    let mut state = ControllerState::new(&config);

    assert_eq!(state.gravity_scale(&config, 5.0), 1.0);
    assert_eq!(state.gravity_scale(&config, 0.0), 1.0);
    assert_eq!(state.gravity_scale(&config, -5.0), 2.0);
    // Not jumping: no hang time even near the apex
    assert_eq!(state.gravity_scale(&config, -0.5), 2.0);

    state.is_jumping = true;
    assert_eq!(state.gravity_scale(&config, 0.5), 0.5);
    assert_eq!(state.gravity_scale(&config, -0.5), 1.0);
    assert_eq!(state.gravity_scale(&config, 5.0), 1.0);

    state.is_dashing = true;
    assert_eq!(state.gravity_scale(&config, -5.0), 0.0);
}

#[test]
fn test_fall_speed_is_clamped() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(1.0, -50.0);

    sim.step(AIR);

    assert_eq!(sim.body.velocity, Vec2::new(1.0, -20.0));
}

// -----------------------------------------------------------------------------
// Dashing
// -----------------------------------------------------------------------------

#[test]
fn test_neutral_dash_uses_facing() {
    let mut sim = Sim::new(test_config());
    sim.body.velocity = Vec2::new(4.0, 3.0);
    sim.send(ControlEvent::DashPressed);

    let report = sim.step(AIR);

    assert_eq!(report.dash, Some(Vec2::new(1.0, 0.0)));
    assert_eq!(report.move_force, None);
    assert_eq!(sim.body.velocity, Vec2::ZERO);
    assert_eq!(sim.body.gravity_scale, 0.0);
    assert_eq!(sim.body.impulses, vec![Vec2::new(15.0, 0.0)]);
    assert!(sim.state.is_dashing);
    assert!(!sim.state.wants_dash);
    assert_eq!(sim.state.dashes_remaining, 0);
    assert_eq!(sim.state.dash_cooldown_timer, 0.25);
}

#[test]
fn test_dash_follows_normalized_input() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(-1.0, 1.0)));
    sim.send(ControlEvent::DashPressed);

    let report = sim.step(AIR);

    let expected = Vec2::new(-1.0, 1.0).normalize();
    assert_eq!(report.dash, Some(expected));
    assert_eq!(sim.body.impulses, vec![expected * 15.0]);
}

#[test]
fn test_dash_waits_for_cooldown() {
    let mut sim = Sim::new(ControllerConfig {
        dash_max: 2,
        ..test_config()
    });
    sim.send(ControlEvent::DashPressed);
    assert!(sim.tick(AIR).dash.is_some());

    // Pressed again mid-dash; the request is held until the cooldown runs out
    sim.send(ControlEvent::DashPressed);
    let reports = sim.ticks(AIR, 27);
    assert!(reports.iter().all(|r| r.dash.is_none()));
    assert!(sim.state.dash_cooldown_timer > 0.0);

    let report = sim.tick(AIR);
    assert!(report.dash.is_some());
    assert_eq!(sim.state.dashes_remaining, 0);
}

#[test]
fn test_air_dashes_limited_until_landing() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::DashPressed);
    assert!(sim.tick(AIR).dash.is_some());

    sim.ticks(AIR, 40);
    sim.send(ControlEvent::DashPressed);
    let reports = sim.ticks(AIR, 10);
    assert!(reports.iter().all(|r| r.dash.is_none()));
    assert!(sim.state.wants_dash);

    let report = sim.tick(GROUND);
    assert!(report.dash.is_some());
    assert_eq!(sim.state.dashes_remaining, 0);
}

#[test]
fn test_airborne_dash_end_keeps_gravity_off_for_grace() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::DashPressed);
    sim.tick(AIR);

    // dash_duration = 8 steps
    sim.ticks(AIR, 7);
    assert!(sim.state.is_dashing);
    assert!(sim.body.velocity.x > 0.0);

    let report = sim.step(AIR);
    assert!(!report.dash_ended);
    assert!(sim.state.is_dashing);
    assert_eq!(sim.body.velocity, Vec2::ZERO);
    assert_eq!(sim.body.gravity_scale, 0.0);
    assert!(sim.state.transitions().is_pending(Transition::DashGraceEnd));
    sim.body.integrate();

    // dash_grace_time = 4 steps
    let reports = sim.ticks(AIR, 3);
    assert!(reports.iter().all(|r| !r.dash_ended));
    assert!(sim.state.is_dashing);

    let report = sim.tick(AIR);
    assert!(report.dash_ended);
    assert!(!sim.state.is_dashing);
    assert!(sim.body.gravity_scale > 0.0);
}

#[test]
fn test_grounded_dash_end_clears_immediately() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::DashPressed);
    sim.tick(GROUND);
    sim.ticks(GROUND, 7);

    let report = sim.tick(GROUND);

    assert!(report.dash_ended);
    assert!(!sim.state.is_dashing);
    assert!(sim.state.transitions().is_empty());
}

#[test]
fn test_jump_cancels_dash_and_keeps_momentum() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::DashPressed);
    sim.tick(GROUND);
    assert_eq!(sim.body.velocity.x, 15.0);

    sim.send(ControlEvent::JumpPressed);
    let report = sim.tick(GROUND);
    assert_eq!(report.jump, Some(JumpKind::Ground));
    assert!(!sim.state.is_dashing);
    assert!(sim.state.is_dash_cancel);
    assert!(!sim.state.transitions().is_pending(Transition::DashEnd));
    assert_eq!(report.move_force, Some(0.0));

    // No damping in the air with neutral input
    assert_eq!(sim.tick(AIR).move_force, Some(0.0));
    assert_eq!(sim.body.velocity.x, 15.0);

    // Landing ends the cancel window
    let report = sim.tick(GROUND);
    assert!(!sim.state.is_dash_cancel);
    assert!(report.move_force.is_some_and(|force| force < 0.0));
}

#[test]
fn test_wall_jump_out_of_upward_dash() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::Move(Vec2::new(0.0, 1.0)));
    sim.send(ControlEvent::DashPressed);
    sim.tick(AIR);
    assert_eq!(sim.body.velocity, Vec2::new(0.0, 15.0));

    sim.send(ControlEvent::JumpPressed);
    let report = sim.step(WALL);

    assert_eq!(report.jump, Some(JumpKind::WallDash));
    assert_eq!(sim.body.impulses, vec![Vec2::new(-6.0, 7.0)]);
    assert_eq!(sim.body.velocity.y, 15.0);
    assert!(!sim.state.is_dashing);
    assert!(!sim.state.is_dash_cancel);
    assert!(!sim.state.transitions().is_pending(Transition::DashEnd));
}

#[test]
fn test_new_dash_replaces_stale_dash_end() {
    let mut sim = Sim::new(ControllerConfig {
        dash_cooldown: 0.0,
        dash_max: 2,
        ..test_config()
    });
    sim.send(ControlEvent::DashPressed);
    sim.tick(AIR);
    let first_end = sim.state.clock() + 0.125;
    sim.ticks(AIR, 3);

    sim.send(ControlEvent::DashPressed);
    assert!(sim.tick(AIR).dash.is_some());
    let second_at = sim.state.clock();
    assert_eq!(
        sim.state.transitions().fire_time(Transition::DashEnd),
        Some(second_at + 0.125)
    );

    // The first dash's end time passes without cutting the second one short
    sim.ticks(AIR, 5);
    assert!(sim.state.clock() > first_end);
    assert!(sim.state.is_dashing);
    assert!(sim.body.velocity.x > 0.0);
}

#[test]
fn test_transitions_still_fire_after_a_long_session() {
    let config = test_config();
    let start = 262_144.0;
    let mut sim = Sim::new(config.clone());
    sim.state = ControllerState::new(&config).with_clock(start);

    sim.send(ControlEvent::DashPressed);
    assert!(sim.tick(AIR).dash.is_some());
    sim.ticks(AIR, 7);
    assert!(sim.state.is_dashing);

    // Dash end on the next step, then four steps of grace
    sim.ticks(AIR, 5);
    assert!(!sim.state.is_dashing);
    assert_eq!(sim.state.clock(), start + 13.0 * f64::from(DT));

    sim.send(ControlEvent::JumpPressed);
    assert_eq!(sim.tick(WALL).jump, Some(JumpKind::Wall));
    sim.ticks(AIR, 15);
    assert!(sim.state.is_wall_jumping);
    sim.tick(AIR);
    assert!(!sim.state.is_wall_jumping);
}

// -----------------------------------------------------------------------------
// Probes and systems
// -----------------------------------------------------------------------------

#[test]
fn test_probe_points_mirror_with_facing() {
    let origin = Vec2::new(100.0, 50.0);
    let offset = Vec2::new(13.0, -12.0);

    assert_eq!(
        ContactProbes::world_point(origin, offset, Facing::Right),
        Vec2::new(113.0, 38.0)
    );
    assert_eq!(
        ContactProbes::world_point(origin, offset, Facing::Left),
        Vec2::new(87.0, 38.0)
    );
}

#[test]
fn test_edges_latch_until_next_step() {
    let mut sim = Sim::new(test_config());
    sim.send(ControlEvent::JumpPressed);
    sim.send(ControlEvent::JumpPressed);
    assert!(sim.state.pending_edges().jump_pressed);

    let report = sim.tick(GROUND);
    assert_eq!(report.jump, Some(JumpKind::Ground));
    assert!(!sim.state.pending_edges().jump_pressed);
}

#[test]
fn test_systems_deliver_events_and_flush_body() {
    let config = test_config();
    let mut app = App::new();
    app.add_message::<ControlEvent>();

    let mut time = Time::<()>::default();
    time.advance_by(Duration::from_secs_f32(DT));
    app.insert_resource(time);

    let player = app
        .world_mut()
        .spawn((
            Player,
            ControllerState::new(&config),
            config.clone(),
            GROUND,
            ComputedMass::new(2.0),
            LinearVelocity::ZERO,
            GravityScale(1.0),
        ))
        .id();

    app.world_mut().write_message(ControlEvent::JumpPressed);
    app.world_mut()
        .run_system_once(systems::apply_control_events)
        .unwrap();
    let state = app.world().get::<ControllerState>(player).unwrap();
    assert!(state.pending_edges().jump_pressed);

    app.world_mut()
        .run_system_once(systems::step_controllers)
        .unwrap();

    // Impulse divided by mass; no horizontal input means no force.
    let velocity = app.world().get::<LinearVelocity>(player).unwrap();
    assert_eq!(velocity.0, Vec2::new(0.0, config.jump_power / 2.0));
    let gravity = app.world().get::<GravityScale>(player).unwrap();
    assert_eq!(gravity.0, config.jump_gravity);
    assert!(app.world().get::<ControllerState>(player).unwrap().is_jumping);
}

// -----------------------------------------------------------------------------
// Invariants
// -----------------------------------------------------------------------------

fn contacts_strategy() -> impl Strategy<Value = Contacts> {
    (any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(grounded, near_ground, touching_wall)| Contacts {
            grounded,
            near_ground: near_ground || grounded,
            touching_wall,
        },
    )
}

fn event_strategy() -> impl Strategy<Value = ControlEvent> {
    prop_oneof![
        Just(ControlEvent::JumpPressed),
        Just(ControlEvent::JumpReleased),
        Just(ControlEvent::DashPressed),
        Just(ControlEvent::MoveCleared),
        (-1.0f32..=1.0, -1.0f32..=1.0).prop_map(|(x, y)| ControlEvent::Move(Vec2::new(x, y))),
    ]
}

proptest! {
    #[test]
    fn prop_controller_invariants_hold(
        steps in prop::collection::vec(
            (contacts_strategy(), prop::collection::vec(event_strategy(), 0..3)),
            1..200,
        )
    ) {
        let config = ControllerConfig {
            double_jump_max: 2,
            dash_max: 2,
            ..test_config()
        };
        let mut sim = Sim::new(config.clone());
        let mut presses = 0usize;
        let mut fired = 0usize;
        let mut dashes_since_refill = 0u8;

        for (contacts, events) in steps {
            for event in events {
                if event == ControlEvent::JumpPressed {
                    presses += 1;
                }
                sim.send(event);
            }

            let report = sim.tick(contacts);
            if report.jump.is_some() {
                fired += 1;
            }

            prop_assert!(sim.state.double_jumps_remaining <= config.double_jump_max);
            prop_assert!(sim.state.dashes_remaining <= config.dash_max);
            // A grounded step refills, then a dash in that same step spends one
            if contacts.grounded {
                dashes_since_refill = 0;
                let spent = u8::from(report.dash.is_some());
                prop_assert_eq!(sim.state.double_jumps_remaining, config.double_jump_max);
                prop_assert_eq!(sim.state.dashes_remaining, config.dash_max - spent);
            }
            if report.dash.is_some() {
                dashes_since_refill += 1;
            }
            prop_assert!(dashes_since_refill <= config.dash_max);
            prop_assert!(!(report.dash.is_some() && report.move_force.is_some()));
            prop_assert_eq!(report.move_force.is_none(), sim.state.is_dashing);
        }

        prop_assert!(fired <= presses);
    }
}
