//! Typed lifecycle messages published by the movement tracker and the idle
//! ledger.
//!
//! Publishers never depend on a subscriber existing.  Particles, audio, the
//! camera and the HUD all read these with a `MessageReader`; the set of kinds
//! is closed so a renamed event is a compile error rather than a silent miss.

use bevy::prelude::*;

use crate::idle::{BoostId, LaneId, OfflineReport};

/// What happened to the player this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerEventKind {
    /// Player entity was created.
    Spawned,
    /// A jump was executed (direct press or buffered).
    JumpStarted,
    /// Vertical speed entered the apex band.
    JumpPeaked,
    /// Vertical speed turned downward after the apex.
    JumpFalling,
    /// Support contact re-established after being airborne.
    Landed,
    /// A landing fast enough to warrant heavy feedback (screen shake, dust).
    LandImpact,
    /// Horizontal input started or changed direction.
    Moved,
}

/// Lifecycle message for the player.
///
/// `jump_number` is the 1-based jump the event belongs to, or `0` when the
/// event is not part of a jump (spawn, ground movement, landing).
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct PlayerEvent {
    pub entity: Entity,
    pub kind: PlayerEventKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub jump_number: u32,
}

/// Lifecycle message for the idle production ledger.
#[derive(Message, Debug, Clone, PartialEq)]
pub enum LedgerEvent {
    LaneForged { id: LaneId },
    LaneRefreshed { id: LaneId },
    BoostApplied { id: BoostId, multiplier: f64, lane: Option<LaneId> },
    BoostExpired { id: BoostId },
    OfflineProgress(OfflineReport),
}
