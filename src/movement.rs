//! Movement math for the physics stage.
//!
//! Pure functions of the config, the sampled state and the current
//! velocity. Mass is factored out: every value here is an acceleration, and
//! the systems scale by body mass before handing it to the backend.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Target speeds below this are treated as "input released".
pub const INPUT_EPSILON: f32 = 1e-4;

/// Pick the acceleration rate for the current support state and input.
///
/// Ground vs air, and accelerate (driving toward a non-zero target) vs
/// decelerate (letting go).
pub fn accel_rate(config: &ControllerConfig, grounded: bool, target_speed: f32) -> f32 {
    let driving = target_speed.abs() > INPUT_EPSILON;
    match (grounded, driving) {
        (true, true) => config.ground_acceleration,
        (true, false) => config.ground_deceleration,
        (false, true) => config.air_acceleration,
        (false, false) => config.air_deceleration,
    }
}

/// Horizontal acceleration that pulls `vx` toward `move_input × max_run_speed`.
pub fn horizontal_acceleration(
    config: &ControllerConfig,
    move_input: f32,
    vx: f32,
    grounded: bool,
) -> f32 {
    let target_speed = move_input * config.max_run_speed;
    let speed_diff = target_speed - vx;
    accel_rate(config, grounded, target_speed) * speed_diff
}

/// Gravity after fall and jump-cut shaping.
///
/// Falling gets the fall multiplier. Rising with the jump button released
/// gets the jump-cut multiplier. Anything else keeps the base gravity.
pub fn effective_gravity(config: &ControllerConfig, base: f32, vy: f32, jump_held: bool) -> f32 {
    if vy < 0.0 {
        base * config.fall_gravity_multiplier
    } else if vy > 0.0 && !jump_held {
        base * config.jump_cut_multiplier
    } else {
        base
    }
}

/// Extra vertical acceleration on top of what the engine already applies.
pub fn gravity_delta(config: &ControllerConfig, base: f32, vy: f32, jump_held: bool) -> f32 {
    effective_gravity(config, base, vy, jump_held) - base
}

/// Clamp a velocity to the run speed and fall speed caps.
pub fn clamp_velocity(config: &ControllerConfig, velocity: Vec2) -> Vec2 {
    Vec2::new(
        velocity.x.clamp(-config.max_run_speed, config.max_run_speed),
        velocity.y.max(config.max_fall_speed),
    )
}
