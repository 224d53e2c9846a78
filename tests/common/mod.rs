//! Shared test harness: a tiny kinematic physics backend.
//!
//! Bodies are integrated with explicit Euler and land on axis-aligned
//! platforms. Everything runs on a manual clock, so each `app.update()`
//! after the warm-up advances exactly one frame and one fixed step.

#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use bevy::ecs::system::SystemParamItem;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use platformer_controller::prelude::*;

pub const DT: f32 = 1.0 / 60.0;
pub const GRAVITY: f32 = -30.0;

/// Kinematic body driven by the test backend.
#[derive(Component, Debug, Clone, Copy)]
pub struct TestBody {
    pub velocity: Vec2,
    pub half_height: f32,
    pub gravity_scale: f32,
    pub mass: f32,
}

impl Default for TestBody {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            half_height: 0.5,
            gravity_scale: 1.0,
            mass: 1.0,
        }
    }
}

/// Static box the bodies can stand on.
#[derive(Component, Debug, Clone, Copy)]
pub struct TestPlatform {
    pub half_extents: Vec2,
    pub layers: u32,
}

#[derive(Resource, Debug, Clone, Copy)]
pub struct TestGravity(pub Vec2);

impl Default for TestGravity {
    fn default() -> Self {
        Self(Vec2::new(0.0, GRAVITY))
    }
}

/// Velocity of every body right after the Physics stage, before integration.
#[derive(Resource, Debug, Default)]
pub struct VelocityProbe(pub HashMap<Entity, Vec2>);

/// Counts of gameplay events seen so far.
#[derive(Resource, Debug, Default)]
pub struct EventCounts {
    pub jumps: usize,
    pub traps: usize,
    pub finishes: usize,
    pub deaths: usize,
}

pub struct KinematicBackend;

impl PlatformerPhysicsBackend for KinematicBackend {
    type Sensors = (
        Query<'static, 'static, (Entity, &'static TestPlatform, &'static GlobalTransform)>,
        Query<'static, 'static, &'static TestBody>,
        Res<'static, TestGravity>,
    );

    fn plugin() -> impl Plugin {
        KinematicPhysicsPlugin
    }

    fn overlap_circle(
        sensors: &SystemParamItem<'_, '_, Self::Sensors>,
        probe: &GroundProbe,
        exclude_entity: Entity,
    ) -> bool {
        let (q_platforms, _, _) = sensors;
        q_platforms
            .iter()
            .filter(|(entity, _, _)| *entity != exclude_entity)
            .any(|(_, platform, transform)| {
                probe.overlaps_box(
                    transform.translation().truncate(),
                    platform.half_extents,
                    platform.layers,
                )
            })
    }

    fn base_gravity(sensors: &SystemParamItem<'_, '_, Self::Sensors>, entity: Entity) -> Vec2 {
        let (_, q_bodies, gravity) = sensors;
        let scale = q_bodies.get(entity).map(|b| b.gravity_scale).unwrap_or(1.0);
        gravity.0 * scale
    }

    fn get_velocity(world: &World, entity: Entity) -> Vec2 {
        world
            .get::<TestBody>(entity)
            .map(|b| b.velocity)
            .unwrap_or(Vec2::ZERO)
    }

    fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            body.velocity = velocity;
        }
    }

    fn apply_force(world: &mut World, entity: Entity, force: Vec2) {
        let dt = world.resource::<Time<Fixed>>().timestep().as_secs_f32();
        if let Some(mut body) = world.get_mut::<TestBody>(entity) {
            let mass = body.mass;
            body.velocity += force / mass * dt;
        }
    }

    fn get_mass(world: &World, entity: Entity) -> f32 {
        world.get::<TestBody>(entity).map(|b| b.mass).unwrap_or(1.0)
    }
}

struct KinematicPhysicsPlugin;

impl Plugin for KinematicPhysicsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TestGravity>();
        app.init_resource::<VelocityProbe>();
        app.add_systems(
            FixedUpdate,
            (record_velocities, integrate_bodies)
                .chain()
                .after(PlatformerControllerSet::Movement),
        );
    }
}

fn record_velocities(mut probe: ResMut<VelocityProbe>, q_bodies: Query<(Entity, &TestBody)>) {
    for (entity, body) in &q_bodies {
        probe.0.insert(entity, body.velocity);
    }
}

fn integrate_bodies(
    time: Res<Time<Fixed>>,
    gravity: Res<TestGravity>,
    q_platforms: Query<(&TestPlatform, &GlobalTransform), Without<TestBody>>,
    mut q_bodies: Query<(&mut TestBody, &mut Transform, &mut GlobalTransform)>,
) {
    let dt = time.timestep().as_secs_f32();

    for (mut body, mut transform, mut global) in &mut q_bodies {
        let gravity_step = gravity.0 * body.gravity_scale * dt;
        body.velocity += gravity_step;

        let previous_bottom = transform.translation.y - body.half_height;
        let mut position = transform.translation.truncate() + body.velocity * dt;

        if body.velocity.y <= 0.0 {
            for (platform, platform_transform) in &q_platforms {
                let center = platform_transform.translation().truncate();
                let top = center.y + platform.half_extents.y;
                let within_x = (position.x - center.x).abs() <= platform.half_extents.x;
                let bottom = position.y - body.half_height;
                if within_x && previous_bottom >= top - 1e-3 && bottom < top {
                    position.y = top + body.half_height;
                    body.velocity.y = 0.0;
                }
            }
        }

        transform.translation = position.extend(transform.translation.z);
        *global = GlobalTransform::from(*transform);
    }
}

fn count_events(
    mut counts: ResMut<EventCounts>,
    mut jumps: EventReader<Jumped>,
    mut traps: EventReader<TrapActivated>,
    mut finishes: EventReader<LevelFinished>,
    mut deaths: EventReader<CharacterDied>,
) {
    counts.jumps += jumps.read().count();
    counts.traps += traps.read().count();
    counts.finishes += finishes.read().count();
    counts.deaths += deaths.read().count();
}

/// Create a minimal test app with the kinematic backend and a manual clock.
pub fn create_test_app() -> App {
    let mut app = App::new();

    app.add_plugins(MinimalPlugins);
    app.add_plugins(PlatformerControllerPlugin::<KinematicBackend>::default());
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(
        1.0 / 60.0,
    )));
    app.insert_resource(Time::<Fixed>::from_hz(60.0));
    app.init_resource::<EventCounts>();
    app.add_systems(PostUpdate, count_events);

    app.finish();
    app.cleanup();

    // First update has a zero delta; get it out of the way
    app.update();
    app
}

/// Spawn a static platform. Its top surface is at `center.y + half_extents.y`.
pub fn spawn_platform(app: &mut App, center: Vec2, half_extents: Vec2, layers: u32) -> Entity {
    let transform = Transform::from_translation(center.extend(0.0));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            TestPlatform {
                half_extents,
                layers,
            },
        ))
        .id()
}

/// Spawn the default ground: top surface at y = 0.5, spanning x in [-20, 20].
pub fn spawn_ground(app: &mut App) -> Entity {
    spawn_platform(app, Vec2::ZERO, Vec2::new(20.0, 0.5), u32::MAX)
}

/// Spawn a character with its feet at the body position minus half a unit.
pub fn spawn_character(app: &mut App, position: Vec2, config: ControllerConfig) -> Entity {
    let transform = Transform::from_translation(position.extend(0.0));
    app.world_mut()
        .spawn((
            transform,
            GlobalTransform::from(transform),
            PlatformerController::new(),
            config,
            GroundCheck::below(0.5),
            TestBody::default(),
        ))
        .id()
}

/// Position the character standing on the default ground.
pub const STANDING: Vec2 = Vec2::new(0.0, 1.0);

/// Move a body and set its velocity, bypassing the integrator.
pub fn teleport(app: &mut App, entity: Entity, position: Vec2, velocity: Vec2) {
    let transform = Transform::from_translation(position.extend(0.0));
    let mut entity_mut = app.world_mut().entity_mut(entity);
    if let Some(mut t) = entity_mut.get_mut::<Transform>() {
        *t = transform;
    }
    if let Some(mut g) = entity_mut.get_mut::<GlobalTransform>() {
        *g = GlobalTransform::from(transform);
    }
    if let Some(mut body) = entity_mut.get_mut::<TestBody>() {
        body.velocity = velocity;
    }
}

pub fn run_frames(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

pub fn velocity(app: &App, entity: Entity) -> Vec2 {
    KinematicBackend::get_velocity(app.world(), entity)
}

/// Velocity recorded right after the last Physics stage.
pub fn post_movement_velocity(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .resource::<VelocityProbe>()
        .0
        .get(&entity)
        .copied()
        .unwrap_or(Vec2::ZERO)
}

pub fn position(app: &App, entity: Entity) -> Vec2 {
    app.world()
        .get::<Transform>(entity)
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::ZERO)
}

pub fn is_grounded(app: &App, entity: Entity) -> bool {
    app.world()
        .get::<PlatformerController>(entity)
        .is_some_and(|c| c.is_grounded())
}

pub fn state(app: &App, entity: Entity) -> ControllerState {
    app.world()
        .get::<ControllerState>(entity)
        .copied()
        .unwrap_or_default()
}

pub fn with_intent(app: &mut App, entity: Entity, f: impl FnOnce(&mut MovementIntent)) {
    if let Some(mut intent) = app.world_mut().get_mut::<MovementIntent>(entity) {
        f(&mut intent);
    }
}

pub fn jump_count(app: &App) -> usize {
    app.world().resource::<EventCounts>().jumps
}
