use bevy::prelude::*;

/// Background behind the level.
pub const CLEAR_COLOR: Color = Color::srgb(0.08, 0.07, 0.11);

/// Setup camera for 2D rendering
pub fn setup_camera(mut commands: Commands) {
    // Default Camera2d; `camera_follow_system` moves it with the player
    commands.spawn(Camera2d);
    eprintln!("[SETUP] Camera spawned");
}
