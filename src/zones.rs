//! Trigger zones and the trap relay.
//!
//! Thin event glue around the controller: a character entering a
//! [`TriggerZone`] either finishes the level, springs a trap, or dies. The
//! physics backend (or the host) reports entries as [`ZoneEntered`] events;
//! [`dispatch_zone_events`] turns them into gameplay events.

use bevy::ecs::entity::EntityHashSet;
use bevy::prelude::*;

use crate::config::PlatformerController;

/// What happens when a character enters this zone.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq, Eq)]
#[reflect(Component)]
pub enum TriggerZone {
    /// Reaching this zone completes the level.
    Finish,
    /// Springs the [`TrapTrigger`] on the same entity.
    Trap,
    /// Kills the character.
    Hazard,
}

/// Single-shot trap latch.
///
/// The first activation forwards to the downstream animation target; every
/// later one is ignored, so repeated enter events cannot restart an
/// animation that is already playing.
#[derive(Component, Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[reflect(Component)]
pub struct TrapTrigger {
    /// Entity that plays the trap animation, if any.
    pub target: Option<Entity>,
    activated: bool,
}

impl TrapTrigger {
    /// Create a trap that forwards to `target` when sprung.
    pub fn new(target: Entity) -> Self {
        Self {
            target: Some(target),
            activated: false,
        }
    }

    /// Latch the trap. Returns `true` only on the first call.
    pub fn activate(&mut self) -> bool {
        if self.activated {
            return false;
        }
        self.activated = true;
        true
    }

    /// Whether the trap has already been sprung.
    pub fn is_activated(&self) -> bool {
        self.activated
    }
}

/// A character entered a trigger zone.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoneEntered {
    pub actor: Entity,
    pub zone: Entity,
}

/// A trap was sprung for the first time.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrapActivated {
    pub trap: Entity,
    /// Downstream animation target to play the "activate" clip on.
    pub target: Option<Entity>,
}

/// A character reached a finish zone.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelFinished {
    pub actor: Entity,
}

/// A character touched a hazard and was despawned.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct CharacterDied {
    pub actor: Entity,
    /// Where the character died, for spawning a death effect.
    pub position: Vec2,
}

/// Turn zone entries into gameplay events.
///
/// A character dies at most once per call, even when it touches several
/// hazards in the same frame; its despawn is only applied afterwards.
pub fn dispatch_zone_events(
    mut commands: Commands,
    mut entered: EventReader<ZoneEntered>,
    q_zones: Query<&TriggerZone>,
    mut q_traps: Query<&mut TrapTrigger>,
    q_actors: Query<&GlobalTransform, With<PlatformerController>>,
    mut finished: EventWriter<LevelFinished>,
    mut sprung: EventWriter<TrapActivated>,
    mut died: EventWriter<CharacterDied>,
) {
    let mut killed = EntityHashSet::default();

    for &ZoneEntered { actor, zone } in entered.read() {
        if killed.contains(&actor) {
            continue;
        }
        let Ok(kind) = q_zones.get(zone) else {
            continue;
        };
        let Ok(actor_transform) = q_actors.get(actor) else {
            continue;
        };

        match kind {
            TriggerZone::Finish => {
                info!("Level finished");
                finished.write(LevelFinished { actor });
            }
            TriggerZone::Trap => {
                let Ok(mut trap) = q_traps.get_mut(zone) else {
                    continue;
                };
                if trap.activate() {
                    info!("{zone:?}: trap activated");
                    sprung.write(TrapActivated {
                        trap: zone,
                        target: trap.target,
                    });
                }
            }
            TriggerZone::Hazard => {
                killed.insert(actor);
                info!("Game over");
                died.write(CharacterDied {
                    actor,
                    position: actor_transform.translation().truncate(),
                });
                commands.entity(actor).despawn();
            }
        }
    }
}
