//! Physics backend abstraction.
//!
//! This module defines the trait that physics backends must implement
//! to work with the platformer controller. The controller never integrates
//! bodies or resolves collisions itself; it issues force and velocity
//! commands and asks the backend whether a circle at the feet overlaps
//! anything on the ground layers.

use bevy::ecs::system::{SystemParam, SystemParamItem};
use bevy::prelude::*;

use crate::detection::GroundProbe;

/// Trait for physics backend implementations.
///
/// Implement this trait to integrate a physics engine with the controller.
/// Body accessors take the [`World`] directly because the controller stages
/// run as exclusive systems. Spatial queries go through [`Self::Sensors`],
/// a system parameter the backend picks (for Rapier, the read-only
/// context), so the sensor system can run alongside other readers.
///
/// For an example implementation, see the `rapier` module's
/// `Rapier2dBackend`.
pub trait PlatformerPhysicsBackend: 'static + Send + Sync {
    /// System parameter giving read access to the engine's spatial data.
    type Sensors: SystemParam + 'static;

    /// Returns the plugin that sets up this backend.
    fn plugin() -> impl Plugin;

    /// Test whether a circle overlaps any collider on the probe's layers.
    ///
    /// # Arguments
    /// * `sensors` - The backend's spatial system parameter
    /// * `probe` - Circle center, radius and layer mask
    /// * `exclude_entity` - Entity to exclude from the test (the character)
    fn overlap_circle(
        sensors: &SystemParamItem<'_, '_, Self::Sensors>,
        probe: &GroundProbe,
        exclude_entity: Entity,
    ) -> bool;

    /// Gravity the engine applies to this body each step (world gravity
    /// times the body's gravity scale).
    fn base_gravity(sensors: &SystemParamItem<'_, '_, Self::Sensors>, entity: Entity) -> Vec2;

    /// Get the current linear velocity of an entity.
    fn get_velocity(world: &World, entity: Entity) -> Vec2;

    /// Overwrite the linear velocity of an entity.
    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2);

    /// Apply a force to an entity.
    ///
    /// Forces accumulate within the current physics step.
    fn apply_force(world: &mut World, entity: Entity, force: Vec2);

    /// Get the mass of an entity.
    ///
    /// Used to scale forces so that config parameters produce consistent
    /// acceleration regardless of actual body mass.
    fn get_mass(_world: &World, _entity: Entity) -> f32 {
        // Default implementation returns 1.0 (no scaling)
        1.0
    }
}
