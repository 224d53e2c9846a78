//! Rapier2D physics backend implementation.
//!
//! This module provides the physics backend for Bevy Rapier2D.
//! Enable with the `rapier2d` feature.
//!
//! Controller forces go through Rapier's [`ExternalForce`], which persists
//! between steps. The backend records its own share in [`ControllerForce`]
//! and subtracts it again at the start of the next fixed step, so forces
//! the host applies to the same body survive untouched.

use bevy::ecs::system::SystemParamItem;
use bevy::prelude::*;
use bevy_rapier2d::geometry::Group;
use bevy_rapier2d::prelude::*;

use crate::backend::PlatformerPhysicsBackend;
use crate::config::PlatformerController;
use crate::detection::GroundProbe;
use crate::zones::{TriggerZone, ZoneEntered};
use crate::PlatformerControllerSet;

/// Rapier2D physics backend for the platformer controller.
///
/// Run Rapier in the fixed schedule
/// (`RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule()`) so
/// each controller step lines up with exactly one simulation step.
pub struct Rapier2dBackend;

impl PlatformerPhysicsBackend for Rapier2dBackend {
    type Sensors = (
        ReadRapierContext<'static, 'static>,
        Query<'static, 'static, &'static RapierConfiguration>,
        Query<'static, 'static, &'static GravityScale>,
    );

    fn plugin() -> impl Plugin {
        Rapier2dBackendPlugin
    }

    fn overlap_circle(
        sensors: &SystemParamItem<'_, '_, Self::Sensors>,
        probe: &GroundProbe,
        exclude_entity: Entity,
    ) -> bool {
        let (rapier_context, _, _) = sensors;
        let Ok(context) = rapier_context.single() else {
            return false;
        };

        let filter = QueryFilter::default()
            .exclude_rigid_body(exclude_entity)
            .exclude_sensors()
            .groups(CollisionGroups::new(
                Group::ALL,
                Group::from_bits_truncate(probe.layers),
            ));

        let mut hit = false;
        context.intersections_with_shape(
            probe.center,
            0.0,
            &Collider::ball(probe.radius),
            filter,
            |_| {
                hit = true;
                // One overlap is enough
                false
            },
        );
        hit
    }

    fn base_gravity(sensors: &SystemParamItem<'_, '_, Self::Sensors>, entity: Entity) -> Vec2 {
        let (_, q_config, q_scale) = sensors;
        let world_gravity = q_config
            .iter()
            .next()
            .map(|config| config.gravity)
            .unwrap_or(Vec2::ZERO);
        let scale = q_scale.get(entity).map(|s| s.0).unwrap_or(1.0);
        world_gravity * scale
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<Velocity>(entity)
            .map(|v| v.linvel)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel = velocity;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec2) {
        {
            let Ok(mut entity_mut) = world.get_entity_mut(entity) else {
                return;
            };
            let has_external_force = entity_mut
                .get_mut::<ExternalForce>()
                .map(|mut ext_force| ext_force.force += force)
                .is_some();
            if has_external_force {
                // Bodies built without the bundle get their tracker on first use
                let applied = entity_mut
                    .get::<ControllerForce>()
                    .map_or(Vec2::ZERO, |applied| applied.0);
                entity_mut.insert(ControllerForce(applied + force));
                return;
            }
        }

        // Fallback: integrate the force over one fixed step
        let dt = world
            .get_resource::<Time<Fixed>>()
            .map(|t| t.timestep().as_secs_f32())
            .unwrap_or(1.0 / 64.0);
        let mass = Self::get_mass(world, entity);
        if let Some(mut vel) = world.get_mut::<Velocity>(entity) {
            vel.linvel += force / mass * dt;
        }
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        // Rapier fills this in after the body's first step
        world
            .get::<ReadMassProperties>(entity)
            .map(|props| props.get().mass)
            .filter(|mass| *mass > 0.0 && mass.is_finite())
            .unwrap_or(1.0)
    }
}

/// Force the controller added to [`ExternalForce`] during the current step.
///
/// Inserted on first use when the body was not built from
/// [`Rapier2dCharacterBundle`].
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct ControllerForce(pub Vec2);

/// Plugin that sets up Rapier2D-specific systems for the platformer controller.
pub struct Rapier2dBackendPlugin;

impl Plugin for Rapier2dBackendPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            clear_controller_forces.in_set(PlatformerControllerSet::Preparation),
        );

        app.add_systems(
            Update,
            forward_zone_collisions.before(PlatformerControllerSet::Presentation),
        );
    }
}

/// Remove last step's controller forces from [`ExternalForce`].
///
/// Only the share recorded in [`ControllerForce`] is subtracted; external
/// forces from other systems are preserved.
pub fn clear_controller_forces(mut q: Query<(&mut ExternalForce, &mut ControllerForce)>) {
    for (mut ext_force, mut applied) in &mut q {
        ext_force.force -= applied.0;
        applied.0 = Vec2::ZERO;
    }
}

/// Translate Rapier collision starts between a controller and a
/// [`TriggerZone`] into [`ZoneEntered`] events.
pub fn forward_zone_collisions(
    mut collisions: EventReader<CollisionEvent>,
    q_actors: Query<(), With<PlatformerController>>,
    q_zones: Query<(), With<TriggerZone>>,
    mut entered: EventWriter<ZoneEntered>,
) {
    for event in collisions.read() {
        let CollisionEvent::Started(a, b, _) = *event else {
            continue;
        };

        let pair = if q_actors.contains(a) && q_zones.contains(b) {
            Some((a, b))
        } else if q_actors.contains(b) && q_zones.contains(a) {
            Some((b, a))
        } else {
            None
        };

        if let Some((actor, zone)) = pair {
            debug!("{actor:?} entered zone {zone:?}");
            entered.write(ZoneEntered { actor, zone });
        }
    }
}

/// Bundle for creating a character with Rapier2D physics.
///
/// Provides the rigid body and the components the backend reads and writes:
/// velocity, external force, mass properties and gravity scale. Collision
/// events are enabled so trigger zones are reported.
///
/// # Example
///
/// ```ignore
/// use bevy::prelude::*;
/// use bevy_rapier2d::prelude::*;
/// use platformer_controller::prelude::*;
///
/// fn spawn_player(mut commands: Commands) {
///     commands.spawn((
///         Transform::from_xyz(0.0, 2.0, 0.0),
///         PlatformerController::new(),
///         ControllerConfig::player(),
///         GroundCheck::below(0.5),
///         Rapier2dCharacterBundle::rotation_locked(),
///         Collider::capsule_y(0.25, 0.25),
///     ));
/// }
/// ```
///
/// # Defaults
///
/// - `rigid_body`: [`RigidBody::Dynamic`]
/// - `locked_axes`: empty, see [`Rapier2dCharacterBundle::rotation_locked()`]
/// - `gravity_scale`: 1.0, the controller shapes gravity on top of the engine's
/// - `ccd`: enabled, fast falls should not tunnel through thin platforms
/// - `friction`: zero, horizontal speed is owned by the controller
#[derive(Bundle)]
pub struct Rapier2dCharacterBundle {
    pub rigid_body: RigidBody,
    pub velocity: Velocity,
    pub external_force: ExternalForce,
    pub controller_force: ControllerForce,
    pub locked_axes: LockedAxes,
    pub gravity_scale: GravityScale,
    pub ccd: Ccd,
    pub friction: Friction,
    pub active_events: ActiveEvents,
    /// Rapier updates this based on the entity's collider.
    pub mass_properties: ReadMassProperties,
}

impl Default for Rapier2dCharacterBundle {
    fn default() -> Self {
        Self::new()
    }
}

impl Rapier2dCharacterBundle {
    /// Create a new character bundle with rotation enabled.
    pub fn new() -> Self {
        Self {
            rigid_body: RigidBody::Dynamic,
            velocity: Velocity::default(),
            external_force: ExternalForce::default(),
            controller_force: ControllerForce::default(),
            locked_axes: LockedAxes::empty(),
            gravity_scale: GravityScale(1.0),
            ccd: Ccd::enabled(),
            friction: Friction {
                coefficient: 0.0,
                combine_rule: CoefficientCombineRule::Min,
            },
            active_events: ActiveEvents::COLLISION_EVENTS,
            mass_properties: ReadMassProperties::default(),
        }
    }

    /// Create a character bundle with rotation locked.
    ///
    /// The usual choice for a platformer: the character always stays upright.
    pub fn rotation_locked() -> Self {
        Self {
            locked_axes: LockedAxes::ROTATION_LOCKED,
            ..Self::new()
        }
    }

    /// Set the rigid body type for the character.
    pub fn with_body(mut self, body: RigidBody) -> Self {
        self.rigid_body = body;
        self
    }

    /// Scale the engine's gravity for this body.
    ///
    /// The controller reads the scaled value back as its base gravity, so
    /// fall and jump-cut multipliers stay relative to it.
    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = GravityScale(scale);
        self
    }

    /// Set which axes should be locked for the rigid body.
    pub fn with_locked_axes(mut self, axes: LockedAxes) -> Self {
        self.locked_axes = axes;
        self
    }
}
