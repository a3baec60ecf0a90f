use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_rapier2d::prelude::*;

use wynisbuff::config::{self, GameConfig};
use wynisbuff::graphics;
use wynisbuff::idle::IdlePlugin;
use wynisbuff::level;
use wynisbuff::movement::{self, MovementPlugin};

/// Configure Rapier physics: downward gravity from the loaded config.
fn setup_physics_config(
    game_config: Res<GameConfig>,
    mut config: Query<&mut RapierConfiguration>,
) {
    for mut cfg in config.iter_mut() {
        cfg.gravity = Vec2::new(0.0, -game_config.gravity);
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "WynIsBuff2".into(),
                resolution: WindowResolution::new(1280, 720),
                ..Default::default()
            }),
            ..Default::default()
        }))
        .insert_resource(ClearColor(graphics::CLEAR_COLOR))
        // Insert GameConfig with compiled defaults; load_game_config will
        // overwrite it from assets/game.toml (if present) in the Startup schedule.
        .insert_resource(GameConfig::default())
        // pixels_per_meter(1.0) keeps world units and Rapier units identical,
        // so velocities and gravity in GameConfig are plain u/s and u/s².
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::pixels_per_meter(1.0))
        .add_plugins((MovementPlugin, IdlePlugin))
        .add_systems(
            Startup,
            (
                // Load config first so every other startup system sees the final values.
                config::load_game_config,
                setup_physics_config.after(config::load_game_config),
                graphics::setup_camera,
                level::load_level_layout,
                level::spawn_level.after(level::load_level_layout),
                movement::spawn_player
                    .after(config::load_game_config)
                    .after(level::spawn_level),
            ),
        )
        .run();
}
