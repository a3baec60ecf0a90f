//! Idle production: clones working production lanes while the player is away.
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`specialty`] | `Specialty`, `ResourceKind`, the output-mix table, `ResourceTotals` |
//! | [`lane`] | `ProductionLane` with lazy multiplicative decay, `Boost` |
//! | [`ledger`] | `IdleLedger`: forging, boosts, accrual, offline catch-up |
//! | [`snapshot`] | `LedgerSnapshot` and the `saves/idle_ledger.toml` file |
//! | [`systems`] | `IdlePlugin`: timers, autosave, debug keys |
//!
//! All ledger math takes explicit epoch-millisecond timestamps; only the
//! systems read the wall clock, through [`now_unix_ms`].

pub mod lane;
pub mod ledger;
pub mod snapshot;
pub mod specialty;
pub mod systems;

use std::time::{SystemTime, UNIX_EPOCH};

pub use lane::{Boost, BoostId, LaneId, ProductionLane};
pub use ledger::{IdleLedger, LedgerTuning, OfflineReport};
pub use snapshot::{load_ledger, save_ledger, LedgerSnapshot};
pub use specialty::{ResourceKind, ResourceTotals, Specialty};
pub use systems::IdlePlugin;

/// Wall-clock time in epoch milliseconds.  A clock before 1970 reads as 0.
pub fn now_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
