//! Player motion components and resources.
//!
//! Systems that mutate this state are in the sibling modules:
//! - [`super::tracker`] — the per-tick state update
//! - [`super::control`] — input, physics read/write, feedback

use bevy::prelude::*;

use crate::config::GameConfig;

// ── Components ─────────────────────────────────────────────────────────────────

/// Marker component for the player body entity.
#[derive(Component)]
pub struct Player;

/// Marker for the player's sprite child.  Cosmetic scaling is applied here so
/// the collider on the parent is never resized.
#[derive(Component)]
pub struct PlayerVisual;

/// Vertical-motion lifecycle of the player.
///
/// Derived every tick from ground contact and vertical velocity; input
/// handlers never assign it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JumpState {
    #[default]
    Grounded,
    Rising,
    Peak,
    Falling,
}

/// Per-player movement state, mutated once per tick by [`PlayerMotion::step`].
///
/// All timers are logical countdowns in seconds advanced by the frame delta,
/// never wall-clock timers.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerMotion {
    /// Effective support flag (raw detection or coyote time).
    pub grounded: bool,
    /// Raw detection result from the previous tick.
    pub was_raw_grounded: bool,
    pub jump_state: JumpState,
    pub jumps_used: u32,
    pub max_jumps: u32,
    /// Remaining coyote time; while > 0 the player counts as grounded.
    pub coyote_timer: f32,
    /// Remaining lifetime of a buffered jump press; 0 means no buffer.
    pub jump_buffer_timer: f32,
    /// Remaining landing recovery.
    pub landing_recovery_timer: f32,
    /// Last non-zero horizontal input direction (−1 or +1), 0 when idle.
    pub last_move_dir: i8,
    /// A righting spin was written last tick and has not been cancelled yet.
    pub righting: bool,
}

impl PlayerMotion {
    pub fn new(max_jumps: u32) -> Self {
        Self {
            grounded: false,
            was_raw_grounded: false,
            jump_state: JumpState::Grounded,
            jumps_used: 0,
            max_jumps,
            coyote_timer: 0.0,
            jump_buffer_timer: 0.0,
            landing_recovery_timer: 0.0,
            last_move_dir: 0,
            righting: false,
        }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(config.max_jumps)
    }

    #[inline]
    pub fn landing_recovery_active(&self) -> bool {
        self.landing_recovery_timer > 0.0
    }

    #[inline]
    pub fn jump_buffered(&self) -> bool {
        self.jump_buffer_timer > 0.0
    }

    #[inline]
    pub fn jumps_remaining(&self) -> u32 {
        self.max_jumps.saturating_sub(self.jumps_used)
    }

    /// Whether a jump pressed now would be honoured.
    #[inline]
    pub fn can_jump(&self) -> bool {
        self.jumps_remaining() > 0
    }
}

impl Default for PlayerMotion {
    fn default() -> Self {
        Self::new(crate::constants::MAX_JUMPS)
    }
}

// ── Input Abstraction ──────────────────────────────────────────────────────────

/// Aggregated movement input for the current frame.
///
/// Input systems write to this resource after it is cleared each frame;
/// [`super::control::player_motion_system`] reads it.  Tests populate it
/// directly to drive the player without a keyboard.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq)]
pub struct MotionInput {
    /// Held horizontal direction: −1.0 left, +1.0 right, 0.0 none.
    pub direction: f32,
    /// Jump was pressed this frame (edge-triggered).
    pub jump_pressed: bool,
}

impl MotionInput {
    /// Direction snapped to −1, 0 or +1.
    #[inline]
    pub fn direction_sign(&self) -> i8 {
        if self.direction > 0.0 {
            1
        } else if self.direction < 0.0 {
            -1
        } else {
            0
        }
    }
}
