//! Movement domain: controller tuning data.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Below this magnitude a target speed counts as "no input".
pub const SPEED_DEADZONE: f32 = 0.01;

/// Lower bound for the raw ground acceleration/deceleration rates.
pub const MIN_ACCEL_RATE: f32 = 0.01;

/// Per-character tuning record.
///
/// Owned by the character entity and handed to the controller each step.
/// `ground_accel_amount` and `ground_deccel_amount` are derived values; call
/// [`ControllerConfig::derive`] after editing the raw fields.
#[derive(Component, Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControllerConfig {
    // Lateral movement
    pub max_ground_speed: f32,
    /// How fast max ground speed is reached, in (0.01, max_ground_speed].
    pub ground_acceleration: f32,
    /// How fast the character comes to a stop, in (0.01, max_ground_speed].
    pub ground_decceleration: f32,
    #[serde(skip)]
    pub ground_accel_amount: f32,
    #[serde(skip)]
    pub ground_deccel_amount: f32,
    pub air_accel_modifier: f32,
    pub air_deccel_modifier: f32,
    pub conserve_momentum: bool,

    // Upwards movement
    pub jump_power: f32,
    pub jump_gravity: f32,
    pub fall_gravity_modifier: f32,
    pub max_fall_speed: f32,
    pub hang_gravity_modifier: f32,
    pub hang_abs_velocity: f32,
    pub jump_slowdown: f32,

    // Input buffering
    pub coyote_time: f32,
    pub jump_buffer_time: f32,

    // Wall sliding & wall jumps
    pub wall_sliding_speed: f32,
    pub wall_kick_off: f32,
    pub wall_jump_power: f32,
    pub wall_dash_power: f32,
    /// Air acceleration is scaled by this for `wall_accel_time` after a wall jump.
    pub wall_accel_modifier: f32,
    pub wall_accel_time: f32,
    /// Require an active wall slide (not just wall contact) to wall jump.
    pub wall_jump_requires_slide: bool,

    // Double jumping
    pub double_jump_power: f32,
    pub double_jump_max: u8,

    // Dashing
    pub dash_power: f32,
    pub dash_duration: f32,
    /// Gravity stays off this long after an airborne dash ends.
    pub dash_grace_time: f32,
    pub dash_cooldown: f32,
    pub dash_max: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            max_ground_speed: 320.0,
            ground_acceleration: 160.0,
            ground_decceleration: 220.0,
            ground_accel_amount: 0.0,
            ground_deccel_amount: 0.0,
            air_accel_modifier: 0.65,
            air_deccel_modifier: 0.5,
            conserve_momentum: true,
            jump_power: 620.0,
            jump_gravity: 1.6,
            fall_gravity_modifier: 1.5,
            max_fall_speed: 900.0,
            hang_gravity_modifier: 0.5,
            hang_abs_velocity: 60.0,
            jump_slowdown: 0.5,
            coyote_time: 0.125,
            jump_buffer_time: 0.125,
            wall_sliding_speed: 120.0,
            wall_kick_off: 360.0,
            wall_jump_power: 560.0,
            wall_dash_power: 420.0,
            wall_accel_modifier: 0.3,
            wall_accel_time: 0.25,
            wall_jump_requires_slide: false,
            double_jump_power: 520.0,
            double_jump_max: 1,
            dash_power: 900.0,
            dash_duration: 0.15625,
            dash_grace_time: 0.0625,
            dash_cooldown: 0.5,
            dash_max: 1,
        }
        .derive(1.0 / 64.0)
    }
}

impl ControllerConfig {
    /// Clamp the raw acceleration rates and recompute the per-step force
    /// multipliers for the given fixed timestep.
    ///
    /// Expects a validated config: `max_ground_speed` and `fixed_timestep`
    /// must be positive.
    pub fn derive(mut self, fixed_timestep: f32) -> Self {
        debug_assert!(self.max_ground_speed > 0.0);
        debug_assert!(fixed_timestep > 0.0);

        let upper = self.max_ground_speed.max(MIN_ACCEL_RATE);
        self.ground_acceleration = self.ground_acceleration.clamp(MIN_ACCEL_RATE, upper);
        self.ground_decceleration = self.ground_decceleration.clamp(MIN_ACCEL_RATE, upper);

        self.ground_accel_amount =
            (self.ground_acceleration / fixed_timestep) / self.max_ground_speed;
        self.ground_deccel_amount =
            (self.ground_decceleration / fixed_timestep) / self.max_ground_speed;
        self
    }

    /// Peak height of a standing jump for a body of the given mass under the
    /// given gravity, ignoring hang time.
    pub fn single_jump_height(&self, mass: f32, gravity: f32) -> f32 {
        let velocity = self.jump_power / mass;
        let effective_gravity = gravity * self.jump_gravity;
        velocity * velocity / (2.0 * effective_gravity)
    }
}

/// Which tuning profile the next spawned player uses.
#[derive(Resource, Debug, Clone, Default)]
pub struct SelectedProfile {
    pub profile_id: Option<String>,
}

impl SelectedProfile {
    pub const DEFAULT_ID: &'static str = "default";

    pub fn id(&self) -> &str {
        self.profile_id.as_deref().unwrap_or(Self::DEFAULT_ID)
    }
}
