//! Platformer Example
//!
//! A small level built with Rapier2D:
//! - A floor with a gap
//! - Two floating platforms
//! - Spikes in the gap (hazard), a trap plate and a finish flag
//!
//! ## Controls
//! - **A/D** or **Left/Right**: Move horizontally
//! - **Space**, **W** or **Up**: Jump (hold for a higher jump)
//!
//! The camera follows the player. Touching the spikes respawns the player.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;
use platformer_controller::prelude::*;

// ==================== Constants ====================

const PLAYER_HALF_SIZE: Vec2 = Vec2::new(0.35, 0.5);
const WORLD_GRAVITY: f32 = -30.0;
const PIXELS_PER_UNIT: f32 = 40.0;

const SPAWN_POSITION: Vec2 = Vec2::new(-8.0, 2.0);

// ==================== Main ====================

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Platformer - Controller Example".into(),
                resolution: (1280.0, 720.0).into(),
                ..default()
            }),
            ..default()
        }))
        // Physics, stepped together with the controller's fixed stage
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default().in_fixed_schedule())
        .add_plugins(RapierDebugRenderPlugin::default())
        // Character controller
        .add_plugins(PlatformerControllerPlugin::<Rapier2dBackend>::default())
        .add_plugins(KeyboardControlsPlugin)
        .add_systems(Startup, (setup, configure_gravity))
        .add_systems(
            Update,
            (respawn_on_death, log_level_events, camera_follow)
                .after(PlatformerControllerSet::Presentation),
        )
        .run();
}

// ==================== Setup ====================

fn configure_gravity(mut q_config: Query<&mut RapierConfiguration>) {
    for mut config in &mut q_config {
        config.gravity = Vec2::new(0.0, WORLD_GRAVITY);
    }
}

fn setup(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::from(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
    ));

    // Floor, split by a gap with spikes in it
    spawn_block(&mut commands, Vec2::new(-7.0, -1.0), Vec2::new(6.0, 0.5));
    spawn_block(&mut commands, Vec2::new(9.0, -1.0), Vec2::new(6.0, 0.5));
    spawn_block(&mut commands, Vec2::new(1.0, -3.0), Vec2::new(2.0, 0.5));

    // Floating platforms
    spawn_block(&mut commands, Vec2::new(-3.0, 2.0), Vec2::new(1.5, 0.2));
    spawn_block(&mut commands, Vec2::new(4.0, 3.5), Vec2::new(1.5, 0.2));

    spawn_zone(
        &mut commands,
        TriggerZone::Hazard,
        Vec2::new(1.0, -2.2),
        Vec2::new(1.8, 0.3),
        Color::srgb(0.9, 0.2, 0.2),
    );

    let trap_target = commands
        .spawn((
            Name::new("Falling Block"),
            Sprite::from_color(Color::srgb(0.5, 0.5, 0.5), Vec2::splat(0.8)),
            Transform::from_xyz(8.0, 4.0, 0.0),
        ))
        .id();
    let trap = spawn_zone(
        &mut commands,
        TriggerZone::Trap,
        Vec2::new(8.0, -0.4),
        Vec2::new(0.5, 0.1),
        Color::srgb(0.9, 0.7, 0.2),
    );
    commands.entity(trap).insert(TrapTrigger::new(trap_target));

    spawn_zone(
        &mut commands,
        TriggerZone::Finish,
        Vec2::new(13.5, 0.5),
        Vec2::new(0.3, 1.0),
        Color::srgb(0.2, 0.9, 0.3),
    );

    spawn_player(&mut commands, SPAWN_POSITION);

    commands.spawn((
        Text::new("A/D: Move | Space: Jump (hold for height)"),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
    ));
}

fn spawn_block(commands: &mut Commands, center: Vec2, half_size: Vec2) {
    commands.spawn((
        Sprite::from_color(Color::srgb(0.3, 0.3, 0.4), half_size * 2.0),
        Transform::from_translation(center.extend(0.0)),
        RigidBody::Fixed,
        Collider::cuboid(half_size.x, half_size.y),
    ));
}

fn spawn_zone(
    commands: &mut Commands,
    zone: TriggerZone,
    center: Vec2,
    half_size: Vec2,
    color: Color,
) -> Entity {
    commands
        .spawn((
            zone,
            Sprite::from_color(color, half_size * 2.0),
            Transform::from_translation(center.extend(0.0)),
            Collider::cuboid(half_size.x, half_size.y),
            Sensor,
        ))
        .id()
}

fn spawn_player(commands: &mut Commands, position: Vec2) {
    commands.spawn((
        Name::new("Player"),
        PlayerControlled,
        Sprite::from_color(Color::srgb(0.3, 0.6, 1.0), PLAYER_HALF_SIZE * 2.0),
        Transform::from_translation(position.extend(1.0)),
        PlatformerController::new(),
        ControllerConfig::player(),
        GroundCheck::below(PLAYER_HALF_SIZE.y),
        Rapier2dCharacterBundle::rotation_locked(),
        Collider::cuboid(PLAYER_HALF_SIZE.x, PLAYER_HALF_SIZE.y),
    ));
}

// ==================== Gameplay ====================

fn respawn_on_death(mut commands: Commands, mut died: EventReader<CharacterDied>) {
    for event in died.read() {
        info!("Player died at {:?}, respawning", event.position);
        spawn_player(&mut commands, SPAWN_POSITION);
    }
}

fn log_level_events(
    mut finished: EventReader<LevelFinished>,
    mut sprung: EventReader<TrapActivated>,
    mut q_targets: Query<&mut Sprite>,
) {
    for _ in finished.read() {
        info!("You win!");
    }
    for event in sprung.read() {
        let Some(target) = event.target else {
            continue;
        };
        if let Ok(mut sprite) = q_targets.get_mut(target) {
            sprite.color = Color::srgb(0.9, 0.4, 0.1);
        }
    }
}

fn camera_follow(
    q_player: Query<&Transform, (With<PlayerControlled>, Without<Camera2d>)>,
    mut q_camera: Query<&mut Transform, With<Camera2d>>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    for mut camera in &mut q_camera {
        camera.translation.x = player.translation.x;
        camera.translation.y = player.translation.y.max(0.0);
    }
}
