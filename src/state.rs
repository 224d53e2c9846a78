//! Per-character controller state.
//!
//! [`ControllerState`] holds the sampled input, the coyote and jump-buffer
//! countdowns and the facing direction. The marker components
//! [`Grounded`] and [`Airborne`] mirror the last Grounded-Check so gameplay
//! code can filter queries on them.

use bevy::prelude::*;

/// Horizontal speed below which the facing direction is left unchanged.
pub const FACING_DEADZONE: f32 = 0.05;

/// Cosmetic facing direction.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// `+1.0` for right, `-1.0` for left.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Facing implied by a horizontal velocity, or `None` inside the deadzone.
    pub fn from_velocity(vx: f32) -> Option<Self> {
        if vx > FACING_DEADZONE {
            Some(Facing::Right)
        } else if vx < -FACING_DEADZONE {
            Some(Facing::Left)
        } else {
            None
        }
    }
}

/// Mutable controller state, owned by exactly one character.
///
/// Timers count down toward zero and are treated as expired at `<= 0`.
/// Decay is floored at zero; a timer only comes back when its trigger
/// recurs (a new press for the buffer, ground contact for coyote time).
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct ControllerState {
    /// Last sampled horizontal axis, in `[-1, 1]`.
    pub move_input: f32,
    /// True only on the frame the jump input went down.
    pub jump_pressed: bool,
    /// Current held state of the jump input.
    pub jump_held: bool,
    /// Seconds left in which a jump is still honored after leaving ground.
    pub coyote_timer: f32,
    /// Seconds left in which an early jump press is still remembered.
    pub jump_buffer_timer: f32,
    /// Cosmetic orientation.
    pub facing: Facing,
}

impl ControllerState {
    /// Store the input sample for this frame.
    pub fn sample_input(&mut self, axis: f32, pressed: bool, held: bool) {
        self.move_input = axis.clamp(-1.0, 1.0);
        self.jump_pressed = pressed;
        self.jump_held = held;
    }

    /// Re-arm the jump buffer on a fresh press, otherwise let it decay.
    pub fn tick_jump_buffer(&mut self, buffer_time: f32, dt: f32) {
        if self.jump_pressed {
            self.jump_buffer_timer = buffer_time;
        } else {
            self.jump_buffer_timer = (self.jump_buffer_timer - dt).max(0.0);
        }
    }

    /// Reset coyote time while grounded, otherwise let it decay.
    pub fn tick_coyote(&mut self, grounded: bool, coyote_time: f32, dt: f32) {
        if grounded {
            self.coyote_timer = coyote_time;
        } else {
            self.coyote_timer = (self.coyote_timer - dt).max(0.0);
        }
    }

    /// Whether a buffered press and a coyote window overlap right now.
    #[inline]
    pub fn can_jump(&self) -> bool {
        self.jump_buffer_timer > 0.0 && self.coyote_timer > 0.0
    }

    /// Spend both timers so one press yields exactly one jump.
    pub fn consume_jump(&mut self) {
        self.jump_buffer_timer = 0.0;
        self.coyote_timer = 0.0;
    }

    /// Turn toward the direction of travel, ignoring tiny velocities.
    pub fn face_towards(&mut self, vx: f32) {
        if let Some(facing) = Facing::from_velocity(vx) {
            self.facing = facing;
        }
    }
}

/// Marker component indicating the character is grounded.
///
/// Added when the Grounded-Check finds ground under the feet, removed when
/// the character becomes airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is airborne.
///
/// Mutually exclusive with [`Grounded`].
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;
