//! Player movement: ground contact, the triple jump, and horizontal control.
//!
//! ## Sub-module layout
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`ground`] | Pure AABB-proximity support test against `Surface`s and the `MainGround` plane |
//! | [`state`] | ECS components (`Player`, `PlayerVisual`, `PlayerMotion`) and the `MotionInput` resource |
//! | [`tracker`] | `PlayerMotion::step`: coyote time, landing, jump buffer, jump-state machine, air control |
//! | [`control`] | Bevy systems: keyboard input, the physics read/write tick, sprite feedback, camera |
//!
//! All public items are re-exported at this level so the rest of the crate can
//! use flat `crate::movement::*` imports.

pub mod control;
pub mod ground;
pub mod state;
pub mod tracker;

// ── Flat re-exports ───────────────────────────────────────────────────────────

pub use control::{
    camera_follow_system, jump_feedback_system, jump_tint, keyboard_to_motion_input_system,
    motion_input_clear_system, player_motion_system,
};
pub use ground::{detect_ground, BodySample, MainGround, Surface, SurfaceRect};
pub use state::{JumpState, MotionInput, Player, PlayerMotion, PlayerVisual};
pub use tracker::{MotionEvent, StepOutcome};

use crate::config::GameConfig;
use crate::events::{PlayerEvent, PlayerEventKind};
use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

/// Registers the movement pipeline and its message type.
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MotionInput>()
            .add_message::<PlayerEvent>()
            .add_systems(
                Update,
                (
                    motion_input_clear_system,
                    keyboard_to_motion_input_system,
                    player_motion_system,
                    jump_feedback_system,
                    camera_follow_system,
                )
                    .chain(),
            );
    }
}

// ── Player spawn ──────────────────────────────────────────────────────────────

/// Spawn the player body at the configured spawn point.
///
/// The body is a regular dynamic cuboid: gravity and contacts come from
/// Rapier, while [`player_motion_system`] overrides its linear velocity every
/// frame.  Rotation stays free so knocks can tilt it; the tracker rights it.
/// The sprite lives on a child so squash-and-stretch never rescales the collider.
pub fn spawn_player(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut events: MessageWriter<PlayerEvent>,
) {
    let half = Vec2::new(config.player_half_width, config.player_half_height);
    let spawn = Vec2::from(config.player_spawn);

    let entity = commands
        .spawn((
            Player,
            PlayerMotion::from_config(&config),
            // Physics
            RigidBody::Dynamic,
            Collider::cuboid(half.x, half.y),
            Velocity::zero(),
            Friction::coefficient(config.player_friction),
            Restitution::coefficient(0.0),
            Ccd::enabled(),
            // Transform / visibility
            Transform::from_translation(spawn.extend(1.0)),
            Visibility::default(),
        ))
        .with_children(|parent| {
            parent.spawn((
                PlayerVisual,
                Sprite::from_color(Color::WHITE, half * 2.0),
                Transform::default(),
            ));
        })
        .id();

    events.write(PlayerEvent {
        entity,
        kind: PlayerEventKind::Spawned,
        position: spawn,
        velocity: Vec2::ZERO,
        jump_number: 0,
    });

    println!("✓ Player spawned at ({:.0}, {:.0})", spawn.x, spawn.y);
}
