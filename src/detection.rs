//! Grounded-Check inputs.
//!
//! A character is grounded when a circle at its feet overlaps at least one
//! collider in the configured ground layers. The feet reference is the
//! [`GroundCheck`] component; without it the character is always airborne.

use bevy::prelude::*;

use crate::config::ControllerConfig;

/// Feet reference point for the Grounded-Check.
///
/// The offset is relative to the body's world position. For a box or
/// capsule collider this is usually `(0, -half_height)`.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq)]
#[reflect(Component)]
pub struct GroundCheck {
    /// Offset from the body position to the feet.
    pub offset: Vec2,
}

impl GroundCheck {
    /// Place the feet at the given offset from the body position.
    pub fn at(offset: Vec2) -> Self {
        Self { offset }
    }

    /// Place the feet straight below the body position.
    pub fn below(distance: f32) -> Self {
        Self {
            offset: Vec2::new(0.0, -distance),
        }
    }
}

/// A resolved overlap query, ready to hand to the physics backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundProbe {
    /// Circle center in world space.
    pub center: Vec2,
    /// Circle radius.
    pub radius: f32,
    /// Collision layer bitmask that counts as ground.
    pub layers: u32,
}

impl GroundProbe {
    /// Build the probe for a body at `position`.
    ///
    /// Returns `None` when the feet reference is unset, which the sensors
    /// treat as "not grounded".
    pub fn resolve(
        position: Vec2,
        ground_check: Option<&GroundCheck>,
        config: &ControllerConfig,
    ) -> Option<Self> {
        let check = ground_check?;
        Some(Self {
            center: position + check.offset,
            radius: config.ground_check_radius,
            layers: config.ground_layers,
        })
    }

    /// Whether an axis-aligned box (center, half extents) on `layers`
    /// overlaps this probe.
    ///
    /// Backends without a shape query of their own can use this directly.
    pub fn overlaps_box(&self, center: Vec2, half_extents: Vec2, layers: u32) -> bool {
        if self.layers & layers == 0 {
            return false;
        }
        let closest = self.center.clamp(center - half_extents, center + half_extents);
        closest.distance_squared(self.center) <= self.radius * self.radius
    }
}
