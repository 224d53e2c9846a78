//! Core controller systems.
//!
//! The Input/Timer stage runs once per rendered frame in `Update`; the
//! physics stage runs once per fixed step in `FixedUpdate`. Both read the
//! ground result that [`update_ground_sensor`] stores on the
//! [`PlatformerController`]. Systems that touch bodies are generic over the
//! physics backend and run exclusively, like the backend accessors expect.

use bevy::ecs::system::StaticSystemParam;
use bevy::prelude::*;

use crate::backend::PlatformerPhysicsBackend;
use crate::config::{ControllerConfig, PlatformerController};
use crate::detection::{GroundCheck, GroundProbe};
use crate::intent::MovementIntent;
use crate::movement;
use crate::state::{Airborne, ControllerState, Facing, Grounded};

/// Sent whenever a character starts a jump.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jumped {
    pub entity: Entity,
}

/// Check newly added controllers for configuration problems.
///
/// A missing [`GroundCheck`] is not fatal: the character simply never
/// becomes grounded. An invalid config is logged and sanitized.
pub fn initialize_controllers(
    mut q_controllers: Query<
        (Entity, &mut ControllerConfig, Has<GroundCheck>),
        Added<PlatformerController>,
    >,
) {
    for (entity, mut config, has_ground_check) in &mut q_controllers {
        if !has_ground_check {
            warn!(
                "{entity:?}: PlatformerController has no GroundCheck, the character will always be airborne"
            );
        }

        if let Err(err) = config.validate() {
            warn!("{entity:?}: invalid ControllerConfig ({err}), sanitizing");
            *config = config.sanitized();
        }
    }
}

/// Run the Grounded-Check and refresh the base gravity for every controller.
pub fn update_ground_sensor<B: PlatformerPhysicsBackend>(
    sensors: StaticSystemParam<B::Sensors>,
    mut q_controllers: Query<(
        Entity,
        &GlobalTransform,
        &ControllerConfig,
        Option<&GroundCheck>,
        &mut PlatformerController,
    )>,
) {
    let sensors = sensors.into_inner();

    for (entity, transform, config, ground_check, mut controller) in &mut q_controllers {
        let position = transform.translation().truncate();

        let grounded = GroundProbe::resolve(position, ground_check, config)
            .is_some_and(|probe| B::overlap_circle(&sensors, &probe, entity));

        if grounded != controller.grounded {
            debug!("{entity:?}: grounded = {grounded}");
        }

        controller.grounded = grounded;
        controller.gravity = B::base_gravity(&sensors, entity);
    }
}

/// Input/Timer stage.
///
/// Samples the intent, advances the jump buffer and coyote countdowns,
/// starts a jump when both windows are open, and updates the facing.
pub fn update_jump_timers<B: PlatformerPhysicsBackend>(world: &mut World) {
    let dt = world
        .get_resource::<Time>()
        .map(|t| t.delta_secs())
        .unwrap_or(0.0);

    let entities: Vec<(Entity, ControllerConfig, ControllerState, f32, bool, bool, bool)> = world
        .query::<(
            Entity,
            &ControllerConfig,
            &ControllerState,
            &mut MovementIntent,
            &PlatformerController,
        )>()
        .iter_mut(world)
        .map(|(e, config, state, mut intent, controller)| {
            (
                e,
                *config,
                *state,
                intent.axis,
                intent.take_jump_pressed(),
                intent.jump_held,
                controller.is_grounded(),
            )
        })
        .collect();

    for (entity, config, mut state, axis, jump_pressed, jump_held, grounded) in entities {
        state.sample_input(axis, jump_pressed, jump_held);
        state.tick_jump_buffer(config.jump_buffer_time, dt);
        state.tick_coyote(grounded, config.coyote_time, dt);

        if state.can_jump() {
            launch::<B>(world, entity, &mut state, &config);
        }

        if config.flip_sprite_on_turn {
            state.face_towards(B::get_velocity(world, entity).x);
        }

        if let Some(mut stored) = world.get_mut::<ControllerState>(entity) {
            *stored = state;
        }
    }
}

/// Jump Trigger.
///
/// Overwrites the vertical velocity with `jump_velocity` and consumes both
/// timers. Unconditional once called; the Input/Timer stage decides when.
pub fn trigger_jump<B: PlatformerPhysicsBackend>(world: &mut World, entity: Entity) {
    let Some(config) = world.get::<ControllerConfig>(entity).copied() else {
        return;
    };
    let mut state = world
        .get::<ControllerState>(entity)
        .copied()
        .unwrap_or_default();

    launch::<B>(world, entity, &mut state, &config);

    if let Some(mut stored) = world.get_mut::<ControllerState>(entity) {
        *stored = state;
    }
}

fn launch<B: PlatformerPhysicsBackend>(
    world: &mut World,
    entity: Entity,
    state: &mut ControllerState,
    config: &ControllerConfig,
) {
    state.consume_jump();

    // Overwrite, not add: same height from any vertical speed
    let mut velocity = B::get_velocity(world, entity);
    velocity.y = config.jump_velocity;
    B::set_velocity(world, entity, velocity);

    debug!("{entity:?}: jump, vy = {}", config.jump_velocity);
    world.send_event(Jumped { entity });
}

/// Physics stage, horizontal: accelerate toward the target run speed.
pub fn apply_run_force<B: PlatformerPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig, f32, bool)> = world
        .query::<(
            Entity,
            &ControllerConfig,
            &ControllerState,
            &PlatformerController,
        )>()
        .iter(world)
        .map(|(e, config, state, controller)| {
            (e, *config, state.move_input, controller.is_grounded())
        })
        .collect();

    for (entity, config, move_input, grounded) in entities {
        let velocity = B::get_velocity(world, entity);
        let accel = movement::horizontal_acceleration(&config, move_input, velocity.x, grounded);
        let mass = B::get_mass(world, entity);
        B::apply_force(world, entity, Vec2::new(accel * mass, 0.0));
    }
}

/// Physics stage, vertical: add fall and jump-cut gravity on top of the
/// engine's baseline.
pub fn apply_gravity_shaping<B: PlatformerPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig, bool, f32)> = world
        .query::<(
            Entity,
            &ControllerConfig,
            &ControllerState,
            &PlatformerController,
        )>()
        .iter(world)
        .map(|(e, config, state, controller)| {
            (e, *config, state.jump_held, controller.base_gravity())
        })
        .collect();

    for (entity, config, jump_held, base) in entities {
        let vy = B::get_velocity(world, entity).y;
        let delta = movement::gravity_delta(&config, base, vy, jump_held);
        if delta == 0.0 {
            continue;
        }
        let mass = B::get_mass(world, entity);
        B::apply_force(world, entity, Vec2::new(0.0, delta * mass));
    }
}

/// Physics stage, final write: clamp to the run and fall caps.
///
/// This is an overwrite so the caps hold exactly regardless of how the
/// forces above were accumulated.
pub fn clamp_velocity<B: PlatformerPhysicsBackend>(world: &mut World) {
    let entities: Vec<(Entity, ControllerConfig)> = world
        .query_filtered::<(Entity, &ControllerConfig), With<PlatformerController>>()
        .iter(world)
        .map(|(e, config)| (e, *config))
        .collect();

    for (entity, config) in entities {
        let velocity = B::get_velocity(world, entity);
        B::set_velocity(world, entity, movement::clamp_velocity(&config, velocity));
    }
}

/// Sync state marker components with the last Grounded-Check.
pub fn sync_state_markers(
    mut commands: Commands,
    q_controllers: Query<(Entity, &PlatformerController, Has<Grounded>, Has<Airborne>)>,
) {
    for (entity, controller, has_grounded, has_airborne) in &q_controllers {
        if controller.is_grounded() {
            if !has_grounded {
                commands.entity(entity).insert(Grounded);
            }
            if has_airborne {
                commands.entity(entity).remove::<Airborne>();
            }
        } else {
            if !has_airborne {
                commands.entity(entity).insert(Airborne);
            }
            if has_grounded {
                commands.entity(entity).remove::<Grounded>();
            }
        }
    }
}

/// Mirror the facing direction onto the sprite.
pub fn apply_facing(
    mut q_sprites: Query<(&ControllerConfig, &ControllerState, &mut Sprite), Changed<ControllerState>>,
) {
    for (config, state, mut sprite) in &mut q_sprites {
        if !config.flip_sprite_on_turn {
            continue;
        }
        let flip = state.facing == Facing::Left;
        if sprite.flip_x != flip {
            sprite.flip_x = flip;
        }
    }
}
