//! Game-specific error types.
//!
//! Nothing in the per-frame core is fatal.  Systems that lose their
//! dependencies (player despawned mid-frame, no physics body) simply return;
//! the fallible APIs here cover configuration, the idle ledger and save files,
//! where callers decide whether to log and carry on.

use std::fmt;

/// Top-level error enum for the game core.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A level layout entry named a platform kind the spawner does not know.
    UnknownPlatformKind {
        /// The kind string as written in the layout.
        kind: String,
    },

    /// A ledger operation referenced a lane id that does not exist (stale id
    /// after a reset or reload).
    LaneNotFound {
        /// The lane id that was requested.
        id: u64,
    },

    /// A boost was requested with a multiplier or duration that cannot apply.
    InvalidBoost {
        /// The rejected multiplier.
        multiplier: f64,
        /// The rejected duration in milliseconds.
        duration_ms: u64,
    },

    /// A save file could not be read or written.
    SnapshotIo {
        /// Path of the file involved.
        path: String,
        /// Underlying I/O failure.
        reason: String,
    },

    /// A save file was read but its contents are not a usable snapshot.
    SnapshotFormat {
        /// What was wrong with it.
        reason: String,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::UnknownPlatformKind { kind } => {
                write!(f, "unknown platform kind '{}'", kind)
            }
            GameError::LaneNotFound { id } => write!(f, "production lane {} not found", id),
            GameError::InvalidBoost {
                multiplier,
                duration_ms,
            } => write!(
                f,
                "invalid boost: multiplier {} for {} ms (need multiplier > 0 and duration > 0)",
                multiplier, duration_ms
            ),
            GameError::SnapshotIo { path, reason } => {
                write!(f, "save file '{}': {}", path, reason)
            }
            GameError::SnapshotFormat { reason } => write!(f, "malformed snapshot: {}", reason),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;
