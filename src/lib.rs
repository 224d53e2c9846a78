//! # `platformer_controller`
//!
//! A responsive 2D platformer character controller with physics backend
//! abstraction.
//!
//! This crate provides the "feel" layer that sits between input and a
//! physics engine:
//! - Acceleration-based running with separate ground/air accel and decel
//! - Coyote time: a jump is still honored shortly after leaving a ledge
//! - Jump buffering: a press shortly before landing jumps on landing
//! - Variable jump height: releasing jump early cuts the rise
//! - Asymmetric gravity: heavier fall than rise, capped fall speed
//! - A circle overlap at the feet as the single Grounded-Check
//! - Abstracts the physics backend (Rapier2D included)
//!
//! ## Architecture
//!
//! Two stages run at two cadences:
//! 1. **Input/Timer stage** (`Update`, once per frame): samples
//!    [`MovementIntent`](intent::MovementIntent), advances the coyote and
//!    jump-buffer countdowns and starts jumps
//! 2. **Physics stage** (`FixedUpdate`, once per step): applies run force and
//!    shaped gravity, then clamps the velocity to the configured caps
//!
//! ## Usage
//!
//! ```rust
//! use bevy::prelude::*;
//! use platformer_controller::prelude::*;
//!
//! // Components for a player character; the physics body comes from the backend
//! let controller = PlatformerController::new();
//! let config = ControllerConfig::player().with_jump_velocity(16.0);
//! let feet = GroundCheck::below(0.5);
//! ```

use bevy::prelude::*;

pub mod backend;
pub mod config;
pub mod controls;
pub mod detection;
pub mod error;
pub mod intent;
pub mod movement;
pub mod state;
pub mod systems;
pub mod zones;

#[cfg(feature = "rapier2d")]
pub mod rapier;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::backend::PlatformerPhysicsBackend;
    pub use crate::config::{ControllerConfig, PlatformerController};
    pub use crate::controls::{KeyboardControlsPlugin, PlayerControlled};
    pub use crate::detection::{GroundCheck, GroundProbe};
    pub use crate::error::ConfigError;
    pub use crate::intent::MovementIntent;
    pub use crate::state::{Airborne, ControllerState, Facing, Grounded};
    pub use crate::systems::{trigger_jump, Jumped};
    pub use crate::zones::{
        CharacterDied, LevelFinished, TrapActivated, TrapTrigger, TriggerZone, ZoneEntered,
    };
    pub use crate::{PlatformerControllerPlugin, PlatformerControllerSet};

    #[cfg(feature = "rapier2d")]
    pub use crate::rapier::{Rapier2dBackend, Rapier2dCharacterBundle};
}

/// System sets for the controller, chained in declaration order.
///
/// `Update` uses Preparation, Sensors, Input and Presentation; `FixedUpdate`
/// uses Preparation, Sensors and Movement. Backends hook their own systems
/// into these sets.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformerControllerSet {
    /// Backend housekeeping (clearing last step's forces).
    Preparation,
    /// Grounded-Check and gravity refresh.
    Sensors,
    /// Input/Timer stage.
    Input,
    /// Physics stage.
    Movement,
    /// Cosmetics and event dispatch.
    Presentation,
}

/// Main plugin for the platformer controller.
///
/// This plugin is generic over a physics backend `B` which provides the actual
/// physics operations (overlap tests, force application, etc.).
///
/// # Type Parameters
/// - `B`: The physics backend implementation (e.g., `Rapier2dBackend`)
///
/// # Examples
///
/// With Rapier2D backend:
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
///
/// App::new()
///     .add_plugins(DefaultPlugins)
///     .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
///     .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
///     .run();
/// ```
pub struct PlatformerControllerPlugin<B: backend::PlatformerPhysicsBackend> {
    _marker: std::marker::PhantomData<B>,
}

impl<B: backend::PlatformerPhysicsBackend> Default for PlatformerControllerPlugin<B> {
    fn default() -> Self {
        Self {
            _marker: std::marker::PhantomData,
        }
    }
}

impl<B: backend::PlatformerPhysicsBackend> Plugin for PlatformerControllerPlugin<B> {
    fn build(&self, app: &mut App) {
        use PlatformerControllerSet as Set;

        // Register core types
        app.register_type::<config::PlatformerController>();
        app.register_type::<config::ControllerConfig>();
        app.register_type::<detection::GroundCheck>();
        app.register_type::<intent::MovementIntent>();
        app.register_type::<state::ControllerState>();
        app.register_type::<state::Grounded>();
        app.register_type::<state::Airborne>();
        app.register_type::<zones::TriggerZone>();
        app.register_type::<zones::TrapTrigger>();

        app.add_event::<systems::Jumped>();
        app.add_event::<zones::ZoneEntered>();
        app.add_event::<zones::TrapActivated>();
        app.add_event::<zones::LevelFinished>();
        app.add_event::<zones::CharacterDied>();

        app.configure_sets(
            Update,
            (Set::Preparation, Set::Sensors, Set::Input, Set::Presentation).chain(),
        );
        app.configure_sets(
            FixedUpdate,
            (Set::Preparation, Set::Sensors, Set::Movement).chain(),
        );

        // Add the physics backend plugin
        app.add_plugins(B::plugin());

        // Validate new controllers before either stage sees them
        app.add_systems(PreUpdate, systems::initialize_controllers);

        // Input/Timer stage, once per rendered frame
        app.add_systems(
            Update,
            (
                systems::update_ground_sensor::<B>.in_set(Set::Sensors),
                (systems::update_jump_timers::<B>, systems::sync_state_markers)
                    .chain()
                    .in_set(Set::Input),
                (systems::apply_facing, zones::dispatch_zone_events).in_set(Set::Presentation),
            ),
        );

        // Physics stage, once per fixed step
        app.add_systems(
            FixedUpdate,
            (
                systems::update_ground_sensor::<B>.in_set(Set::Sensors),
                (
                    systems::apply_run_force::<B>,
                    systems::apply_gravity_shaping::<B>,
                    systems::clamp_velocity::<B>,
                )
                    .chain()
                    .in_set(Set::Movement),
            ),
        );
    }
}
