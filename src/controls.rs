//! Keyboard controls.
//!
//! Optional plugin that writes [`MovementIntent`] from the keyboard for
//! entities marked [`PlayerControlled`].
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **Space**, **W** or **Up**: Jump (hold for a higher jump)

use bevy::prelude::*;

use crate::intent::MovementIntent;
use crate::PlatformerControllerSet;

/// Marker for entities driven by the keyboard.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct PlayerControlled;

/// Plugin that forwards keyboard state into [`MovementIntent`].
pub struct KeyboardControlsPlugin;

impl Plugin for KeyboardControlsPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PlayerControlled>();
        app.add_systems(
            Update,
            read_keyboard_input.before(PlatformerControllerSet::Sensors),
        );
    }
}

/// Handles keyboard input for movement and jumping.
///
/// The jump key is forwarded as a level; [`MovementIntent::set_jump_held`]
/// derives the press edge.
pub fn read_keyboard_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<&mut MovementIntent, With<PlayerControlled>>,
) {
    let mut axis = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        axis -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        axis += 1.0;
    }

    let jump_held = keyboard.any_pressed([KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp]);

    for mut intent in &mut query {
        intent.set_axis(axis);
        intent.set_jump_held(jump_held);
    }
}
