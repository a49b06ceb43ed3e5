//! Validation of tuning values before they reach a controller.

use thiserror::Error;

use super::data::PlayerProfileDef;
use super::registry::ContentRegistry;

/// A single out-of-range value, with context about where it came from.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Profile '{profile_id}' field '{field}' = {value} must be {expected}")]
pub struct ValidationError {
    pub profile_id: String,
    pub field: &'static str,
    pub value: f32,
    pub expected: &'static str,
}

/// Push an error when `$value` fails `$ok`.
macro_rules! check_value {
    ($errors:expr, $profile:expr, $field:literal, $value:expr, $expected:literal, $ok:expr) => {{
        let value: f32 = $value;
        let ok: fn(f32) -> bool = $ok;
        if !value.is_finite() || !ok(value) {
            $errors.push(ValidationError {
                profile_id: $profile.id.clone(),
                field: $field,
                value,
                expected: $expected,
            });
        }
    }};
}

/// Validate every profile in the registry.
/// Returns a list of validation errors, empty if all values are usable.
pub fn validate_content(registry: &ContentRegistry) -> Vec<ValidationError> {
    let mut ids: Vec<&String> = registry.profiles.keys().collect();
    ids.sort_unstable();
    ids.into_iter()
        .flat_map(|id| validate_profile(&registry.profiles[id]))
        .collect()
}

pub fn validate_profile(profile: &PlayerProfileDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let c = &profile.controller;

    let positive = |v: f32| v > 0.0;
    let non_negative = |v: f32| v >= 0.0;
    let unit = |v: f32| (0.0..=1.0).contains(&v);

    // Lateral movement
    check_value!(errors, profile, "max_ground_speed", c.max_ground_speed, "> 0", positive);
    check_value!(errors, profile, "ground_acceleration", c.ground_acceleration, "> 0", positive);
    check_value!(errors, profile, "ground_decceleration", c.ground_decceleration, "> 0", positive);
    check_value!(errors, profile, "air_accel_modifier", c.air_accel_modifier, "in [0.01, 1]", |v| {
        (0.01..=1.0).contains(&v)
    });
    check_value!(errors, profile, "air_deccel_modifier", c.air_deccel_modifier, "in [0.01, 1]", |v| {
        (0.01..=1.0).contains(&v)
    });

    // Upwards movement
    check_value!(errors, profile, "jump_power", c.jump_power, ">= 0", non_negative);
    check_value!(errors, profile, "jump_gravity", c.jump_gravity, ">= 0", non_negative);
    check_value!(errors, profile, "fall_gravity_modifier", c.fall_gravity_modifier, ">= 0", non_negative);
    check_value!(errors, profile, "max_fall_speed", c.max_fall_speed, "> 0", positive);
    check_value!(errors, profile, "hang_gravity_modifier", c.hang_gravity_modifier, ">= 0", non_negative);
    check_value!(errors, profile, "hang_abs_velocity", c.hang_abs_velocity, ">= 0", non_negative);
    check_value!(errors, profile, "jump_slowdown", c.jump_slowdown, "in [0.1, 1]", |v| {
        (0.1..=1.0).contains(&v)
    });

    // Input buffering
    check_value!(errors, profile, "coyote_time", c.coyote_time, ">= 0", non_negative);
    check_value!(errors, profile, "jump_buffer_time", c.jump_buffer_time, ">= 0", non_negative);

    // Walls
    check_value!(errors, profile, "wall_sliding_speed", c.wall_sliding_speed, ">= 0", non_negative);
    check_value!(errors, profile, "wall_kick_off", c.wall_kick_off, ">= 0", non_negative);
    check_value!(errors, profile, "wall_jump_power", c.wall_jump_power, ">= 0", non_negative);
    check_value!(errors, profile, "wall_dash_power", c.wall_dash_power, ">= 0", non_negative);
    check_value!(errors, profile, "wall_accel_modifier", c.wall_accel_modifier, "in [0, 1]", unit);
    check_value!(errors, profile, "wall_accel_time", c.wall_accel_time, ">= 0", non_negative);

    // Double jump and dash
    check_value!(errors, profile, "double_jump_power", c.double_jump_power, ">= 0", non_negative);
    check_value!(errors, profile, "dash_power", c.dash_power, ">= 0", non_negative);
    check_value!(errors, profile, "dash_duration", c.dash_duration, ">= 0", non_negative);
    check_value!(errors, profile, "dash_grace_time", c.dash_grace_time, ">= 0", non_negative);
    check_value!(errors, profile, "dash_cooldown", c.dash_cooldown, ">= 0", non_negative);

    // Body and probes
    check_value!(errors, profile, "body.width", profile.body.width, "> 0", positive);
    check_value!(errors, profile, "body.height", profile.body.height, "> 0", positive);
    check_value!(errors, profile, "body.mass", profile.body.mass, "> 0", positive);
    check_value!(errors, profile, "probes.radius", profile.probes.radius, "> 0", positive);
    check_value!(errors, profile, "probes.ground", profile.probes.ground.len() as f32, "non-empty", positive);
    check_value!(errors, profile, "probes.wall", profile.probes.wall.len() as f32, "non-empty", positive);

    errors
}

/// The fixed timestep the accel/deccel amounts are derived for.
pub fn validate_timestep(fixed_timestep: f32) -> Result<(), ValidationError> {
    if fixed_timestep.is_finite() && fixed_timestep > 0.0 {
        Ok(())
    } else {
        Err(ValidationError {
            profile_id: "*".to_string(),
            field: "fixed_timestep",
            value: fixed_timestep,
            expected: "> 0",
        })
    }
}
