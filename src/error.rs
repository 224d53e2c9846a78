//! Configuration errors.
//!
//! The controller never fails a frame. These errors only surface when a
//! [`ControllerConfig`](crate::config::ControllerConfig) is validated, and
//! the caller decides whether to log and sanitize or to reject it.

use thiserror::Error;

/// A violated [`ControllerConfig`](crate::config::ControllerConfig) invariant.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// A speed, acceleration, multiplier or duration was negative.
    #[error("`{field}` must be non-negative, got {value}")]
    NegativeMagnitude {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f32,
    },

    /// The fall speed cap points upward.
    #[error("`max_fall_speed` is a downward cap and must be <= 0, got {0}")]
    PositiveMaxFallSpeed(f32),
}
