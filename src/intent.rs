//! Movement intent component.
//!
//! The intent is the polled input triple the controller samples once per
//! frame: horizontal axis, "jump pressed this frame" and "jump held". Any
//! input source can write it (keyboard, gamepad, AI, network replay).

use bevy::prelude::*;

/// Input sampled by the Input/Timer stage.
///
/// # Example
///
/// ```rust
/// use platformer_controller::prelude::*;
///
/// let mut intent = MovementIntent::new();
/// intent.set_axis(1.0);
///
/// // Level input: the rising edge is derived automatically
/// intent.set_jump_held(true);
/// assert!(intent.take_jump_pressed());
/// assert!(!intent.take_jump_pressed());
/// assert!(intent.jump_held);
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct MovementIntent {
    /// Horizontal axis (-1.0 = left, 1.0 = right).
    pub axis: f32,
    /// Pending rising edge of the jump input. Cleared when the controller
    /// samples it.
    pub jump_pressed: bool,
    /// Whether the jump input is currently held.
    pub jump_held: bool,
}

impl MovementIntent {
    /// Create a new empty movement intent.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the horizontal axis. Clamped to `[-1, 1]`.
    pub fn set_axis(&mut self, axis: f32) {
        self.axis = axis.clamp(-1.0, 1.0);
    }

    /// Forward the level state of the jump input.
    ///
    /// A transition from released to held records a pressed edge that stays
    /// pending until the controller samples it.
    pub fn set_jump_held(&mut self, held: bool) {
        if held && !self.jump_held {
            self.jump_pressed = true;
        }
        self.jump_held = held;
    }

    /// Record a press edge directly (for input sources that report edges).
    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
        self.jump_held = true;
    }

    /// Release the jump input.
    pub fn release_jump(&mut self) {
        self.jump_held = false;
    }

    /// Take the pending press edge, clearing it.
    pub fn take_jump_pressed(&mut self) -> bool {
        std::mem::take(&mut self.jump_pressed)
    }
}
