//! Controller configuration components.
//!
//! This module defines the tuning surface of the platformer controller
//! ([`ControllerConfig`]) and the central hub component that carries the
//! sensor results each stage reads ([`PlatformerController`]).

use bevy::prelude::*;

use crate::error::ConfigError;
use crate::intent::MovementIntent;
use crate::state::ControllerState;

/// Collision layers that count as ground when no explicit mask is set.
pub const ALL_GROUND_LAYERS: u32 = u32::MAX;

/// Core platformer controller component.
///
/// This is the **central hub** for per-character sensor results. Backend
/// sensor systems write here once per stage, and the input and physics
/// stages only read it. Adding this component also inserts the default
/// [`ControllerConfig`], [`ControllerState`] and [`MovementIntent`] if the
/// entity does not carry them yet.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use platformer_controller::prelude::*;
///
/// let controller = PlatformerController::new();
/// assert!(!controller.is_grounded());
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy)]
#[reflect(Component)]
#[require(ControllerConfig, ControllerState, MovementIntent)]
pub struct PlatformerController {
    /// Result of the last Grounded-Check.
    pub(crate) grounded: bool,

    /// Base gravity for this body (world gravity times the body's gravity
    /// scale). The physics engine already applies this every step; the
    /// controller only adds the shaped difference on top.
    pub gravity: Vec2,
}

impl Default for PlatformerController {
    fn default() -> Self {
        Self {
            grounded: false,
            gravity: Vec2::ZERO,
        }
    }
}

impl PlatformerController {
    /// Create a new controller. Sensors fill in ground and gravity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last Grounded-Check found ground under the feet.
    #[inline]
    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    /// Vertical component of the base gravity.
    #[inline]
    pub fn base_gravity(&self) -> f32 {
        self.gravity.y
    }
}

/// Tuning parameters for the platformer controller.
///
/// Speeds are in world units per second, accelerations in units per second
/// squared (body mass is factored out), times in seconds.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ControllerConfig {
    // === Horizontal Movement ===
    /// Max horizontal speed while running.
    pub max_run_speed: f32,

    /// How quickly the character reaches top speed on ground.
    pub ground_acceleration: f32,

    /// How quickly the character stops on ground when input is released.
    pub ground_deceleration: f32,

    /// Horizontal acceleration while airborne.
    pub air_acceleration: f32,

    /// Horizontal deceleration while airborne (let-go drift).
    pub air_deceleration: f32,

    // === Jump ===
    /// Vertical velocity set when a jump starts.
    pub jump_velocity: f32,

    /// Gravity multiplier while rising with the jump button released.
    pub jump_cut_multiplier: f32,

    /// Gravity multiplier while falling.
    pub fall_gravity_multiplier: f32,

    /// Downward velocity cap. Always <= 0.
    pub max_fall_speed: f32,

    /// Grace period after leaving ground during which a jump is still honored.
    pub coyote_time: f32,

    /// Grace period before landing during which a jump press is remembered.
    pub jump_buffer_time: f32,

    // === Ground Check ===
    /// Radius of the overlap circle at the feet.
    pub ground_check_radius: f32,

    /// Collision layer bitmask that counts as ground.
    pub ground_layers: u32,

    // === Presentation ===
    /// Face the direction of travel by flipping the sprite.
    pub flip_sprite_on_turn: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Horizontal movement
            max_run_speed: 8.0,
            ground_acceleration: 60.0,
            ground_deceleration: 70.0,
            air_acceleration: 40.0,
            air_deceleration: 30.0,

            // Jump
            jump_velocity: 14.0,
            jump_cut_multiplier: 2.2,
            fall_gravity_multiplier: 1.6,
            max_fall_speed: -22.0,
            coyote_time: 0.12,
            jump_buffer_time: 0.12,

            // Ground check
            ground_check_radius: 0.15,
            ground_layers: ALL_GROUND_LAYERS,

            flip_sprite_on_turn: true,
        }
    }
}

impl ControllerConfig {
    /// Create a config tuned for a responsive player character.
    pub fn player() -> Self {
        Self::default()
    }

    /// Peak height of a held jump under the given gravity magnitude.
    ///
    /// Uses `h = v² / (2g)`. Returns 0 for non-positive gravity.
    pub fn apex_height(&self, gravity: f32) -> f32 {
        let g = gravity.abs();
        if g <= f32::EPSILON {
            return 0.0;
        }
        self.jump_velocity * self.jump_velocity / (2.0 * g)
    }

    /// Check every invariant and return the first one that is violated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let magnitudes = [
            ("max_run_speed", self.max_run_speed),
            ("ground_acceleration", self.ground_acceleration),
            ("ground_deceleration", self.ground_deceleration),
            ("air_acceleration", self.air_acceleration),
            ("air_deceleration", self.air_deceleration),
            ("jump_velocity", self.jump_velocity),
            ("jump_cut_multiplier", self.jump_cut_multiplier),
            ("fall_gravity_multiplier", self.fall_gravity_multiplier),
            ("coyote_time", self.coyote_time),
            ("jump_buffer_time", self.jump_buffer_time),
            ("ground_check_radius", self.ground_check_radius),
        ];

        if let Some(&(field, value)) = magnitudes.iter().find(|(_, v)| *v < 0.0) {
            return Err(ConfigError::NegativeMagnitude { field, value });
        }

        if self.max_fall_speed > 0.0 {
            return Err(ConfigError::PositiveMaxFallSpeed(self.max_fall_speed));
        }

        Ok(())
    }

    /// Return a copy with every invariant enforced.
    ///
    /// Negative magnitudes become zero. A positive fall cap is mirrored
    /// downward, since a positive value is almost always a sign slip.
    pub fn sanitized(mut self) -> Self {
        self.max_run_speed = self.max_run_speed.max(0.0);
        self.ground_acceleration = self.ground_acceleration.max(0.0);
        self.ground_deceleration = self.ground_deceleration.max(0.0);
        self.air_acceleration = self.air_acceleration.max(0.0);
        self.air_deceleration = self.air_deceleration.max(0.0);
        self.jump_velocity = self.jump_velocity.max(0.0);
        self.jump_cut_multiplier = self.jump_cut_multiplier.max(0.0);
        self.fall_gravity_multiplier = self.fall_gravity_multiplier.max(0.0);
        self.coyote_time = self.coyote_time.max(0.0);
        self.jump_buffer_time = self.jump_buffer_time.max(0.0);
        self.ground_check_radius = self.ground_check_radius.max(0.0);
        self.max_fall_speed = -self.max_fall_speed.abs();
        self
    }

    // === Runtime setters ===

    /// Set the max run speed. Negative values are clamped to zero.
    pub fn set_max_run_speed(&mut self, speed: f32) {
        self.max_run_speed = non_negative("max_run_speed", speed);
    }

    /// Set the jump velocity. Negative values are clamped to zero.
    pub fn set_jump_velocity(&mut self, velocity: f32) {
        self.jump_velocity = non_negative("jump_velocity", velocity);
    }

    /// Set the ground and air acceleration pair.
    pub fn set_acceleration(&mut self, ground: f32, air: f32) {
        self.ground_acceleration = non_negative("ground_acceleration", ground);
        self.air_acceleration = non_negative("air_acceleration", air);
    }

    /// Set the ground and air deceleration pair.
    pub fn set_deceleration(&mut self, ground: f32, air: f32) {
        self.ground_deceleration = non_negative("ground_deceleration", ground);
        self.air_deceleration = non_negative("air_deceleration", air);
    }

    // === Builders ===

    /// Builder: set max run speed.
    pub fn with_max_run_speed(mut self, speed: f32) -> Self {
        self.set_max_run_speed(speed);
        self
    }

    /// Builder: set ground and air acceleration.
    pub fn with_acceleration(mut self, ground: f32, air: f32) -> Self {
        self.set_acceleration(ground, air);
        self
    }

    /// Builder: set ground and air deceleration.
    pub fn with_deceleration(mut self, ground: f32, air: f32) -> Self {
        self.set_deceleration(ground, air);
        self
    }

    /// Builder: set jump velocity.
    pub fn with_jump_velocity(mut self, velocity: f32) -> Self {
        self.set_jump_velocity(velocity);
        self
    }

    /// Builder: set the fall and jump-cut gravity multipliers.
    pub fn with_gravity_multipliers(mut self, fall: f32, jump_cut: f32) -> Self {
        self.fall_gravity_multiplier = fall;
        self.jump_cut_multiplier = jump_cut;
        self
    }

    /// Builder: set the downward speed cap.
    pub fn with_max_fall_speed(mut self, speed: f32) -> Self {
        self.max_fall_speed = speed;
        self
    }

    /// Builder: set coyote time.
    pub fn with_coyote_time(mut self, time: f32) -> Self {
        self.coyote_time = time;
        self
    }

    /// Builder: set jump buffer time.
    pub fn with_jump_buffer_time(mut self, time: f32) -> Self {
        self.jump_buffer_time = time;
        self
    }

    /// Builder: set ground check radius and layers.
    pub fn with_ground_check(mut self, radius: f32, layers: u32) -> Self {
        self.ground_check_radius = radius;
        self.ground_layers = layers;
        self
    }

    /// Builder: enable or disable sprite flipping.
    pub fn with_flip_sprite(mut self, enabled: bool) -> Self {
        self.flip_sprite_on_turn = enabled;
        self
    }
}

fn non_negative(field: &str, value: f32) -> f32 {
    if value < 0.0 {
        debug!("{field} set to {value}, clamping to 0");
    }
    value.max(0.0)
}
