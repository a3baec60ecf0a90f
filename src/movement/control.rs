//! Player input, physics read/write and jump feedback systems.
//!
//! ## Pipeline (runs in order every `Update` frame)
//!
//! 1. [`motion_input_clear_system`] — resets `MotionInput`.
//! 2. [`keyboard_to_motion_input_system`] — A/D/←/→ held, Space/W/↑ just pressed.
//! 3. [`player_motion_system`] — samples the Rapier body, runs
//!    [`PlayerMotion::step`], writes `Velocity`, publishes [`PlayerEvent`]s.
//! 4. [`jump_feedback_system`] — tint and squash-and-stretch on the sprite child.
//!
//! Rapier integrates the written velocity in `PostUpdate`, so the next frame's
//! sample already reflects this frame's jump.

use bevy::prelude::*;
use bevy_rapier2d::prelude::*;

use super::ground::{BodySample, MainGround, Surface, SurfaceRect};
use super::state::{MotionInput, Player, PlayerMotion, PlayerVisual};
use crate::config::GameConfig;
use crate::events::{PlayerEvent, PlayerEventKind};

// ── Step 1: Clear ─────────────────────────────────────────────────────────────

/// Reset [`MotionInput`] at the start of every frame so edge-triggered jump
/// presses never leak into the next frame.
pub fn motion_input_clear_system(mut input: ResMut<MotionInput>) {
    *input = MotionInput::default();
}

// ── Step 2: Keyboard → Input ──────────────────────────────────────────────────

/// Translate keys into [`MotionInput`].
///
/// - **A / ←** → `direction = −1`
/// - **D / →** → `direction = +1` (both held cancel out)
/// - **Space / W / ↑** just pressed → `jump_pressed = true`
pub fn keyboard_to_motion_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut input: ResMut<MotionInput>,
) {
    let mut direction = 0.0;
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        direction -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        direction += 1.0;
    }
    input.direction = direction;

    if keys.any_just_pressed([KeyCode::Space, KeyCode::KeyW, KeyCode::ArrowUp]) {
        input.jump_pressed = true;
    }
}

// ── Step 3: Motion tick ───────────────────────────────────────────────────────

/// Run one movement tick for the player and write the result to Rapier.
///
/// Does nothing when the player entity is absent (level reload in progress);
/// the next frame simply tries again.
pub fn player_motion_system(
    mut q_player: Query<(Entity, &Transform, &mut Velocity, &mut PlayerMotion), With<Player>>,
    q_surfaces: Query<(&Transform, &Surface), Without<Player>>,
    main_ground: Option<Res<MainGround>>,
    input: Res<MotionInput>,
    time: Res<Time>,
    config: Res<GameConfig>,
    mut events: MessageWriter<PlayerEvent>,
) {
    let Ok((entity, transform, mut velocity, mut motion)) = q_player.single_mut() else {
        return;
    };

    let position = transform.translation.truncate();
    let sample = BodySample {
        position,
        velocity: velocity.linvel,
        rotation: transform.rotation.to_euler(EulerRot::ZYX).0,
        half_extents: Vec2::new(config.player_half_width, config.player_half_height),
    };

    let surfaces: Vec<SurfaceRect> = q_surfaces
        .iter()
        .map(|(t, surface)| SurfaceRect {
            center: t.translation.truncate(),
            half_extents: surface.half_extents,
        })
        .collect();

    let outcome = motion.step(
        &sample,
        &surfaces,
        main_ground.as_deref().copied(),
        *input,
        time.delta_secs(),
        &config,
    );

    velocity.linvel = outcome.linvel;
    if let Some(angvel) = outcome.angvel {
        velocity.angvel = angvel;
    }

    for event in outcome.events {
        if event.kind == PlayerEventKind::JumpStarted {
            debug!(
                "jump {} at ({:.0}, {:.0}) vy={:.0}",
                event.jump_number, position.x, position.y, event.velocity.y
            );
        }
        events.write(PlayerEvent {
            entity,
            kind: event.kind,
            position,
            velocity: event.velocity,
            jump_number: event.jump_number,
        });
    }
}

// ── Step 4: Feedback ──────────────────────────────────────────────────────────

/// Sprite tint for the given jump number: white on the ground, then green,
/// yellow and red for jumps 1–3.
pub fn jump_tint(jump_number: u32) -> Color {
    match jump_number {
        0 => Color::WHITE,
        1 => Color::srgb(0.35, 0.9, 0.4),
        2 => Color::srgb(0.95, 0.85, 0.25),
        _ => Color::srgb(0.95, 0.3, 0.25),
    }
}

/// Scale applied to the sprite on touchdown; relaxes back to 1.
const LANDING_SQUASH: Vec2 = Vec2::new(1.25, 0.75);
/// Fraction of the remaining squash removed per 60 Hz frame.
const SQUASH_RELAX: f32 = 0.2;

/// Recolour the player sprite per jump and squash it on landing.
///
/// Purely cosmetic; reads [`PlayerEvent`]s and never touches the body.
pub fn jump_feedback_system(
    mut events: MessageReader<PlayerEvent>,
    mut q_visual: Query<(&mut Sprite, &mut Transform), With<PlayerVisual>>,
    time: Res<Time>,
) {
    let Ok((mut sprite, mut transform)) = q_visual.single_mut() else {
        return;
    };

    for event in events.read() {
        match event.kind {
            PlayerEventKind::JumpStarted => {
                sprite.color = jump_tint(event.jump_number);
                transform.scale = Vec3::new(0.85, 1.2, 1.0);
            }
            PlayerEventKind::Landed => {
                sprite.color = jump_tint(0);
                transform.scale = LANDING_SQUASH.extend(1.0);
            }
            _ => {}
        }
    }

    let k = 1.0 - (1.0 - SQUASH_RELAX).powf(time.delta_secs() * 60.0);
    let current = transform.scale.truncate();
    transform.scale = (current + (Vec2::ONE - current) * k).extend(1.0);
}

/// Keep the camera centred on the player, never dipping below the floor line.
pub fn camera_follow_system(
    q_player: Query<&Transform, With<Player>>,
    mut q_camera: Query<&mut Transform, (With<Camera2d>, Without<Player>)>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    let Ok(mut camera) = q_camera.single_mut() else {
        return;
    };
    camera.translation.x = player.translation.x;
    camera.translation.y = player.translation.y.max(0.0);
}
