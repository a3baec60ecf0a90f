//! Ledger persistence.
//!
//! [`LedgerSnapshot`] is a plain id-keyed tree (map keys are the decimal lane
//! and boost ids) holding everything the decay math needs after a reload.
//! It is stored as TOML at `saves/idle_ledger.toml`; older files are migrated
//! on read by filling in keys that later versions added.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::lane::{Boost, BoostId, LaneId, ProductionLane, MS_PER_SEC};
use super::ledger::{IdleLedger, LedgerTuning, OfflineReport};
use super::specialty::{ResourceTotals, Specialty};
use crate::error::{GameError, GameResult};

pub const SNAPSHOT_VERSION: u32 = 2;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LaneSnapshot {
    pub base_rate: f64,
    pub current_rate: f64,
    pub stability: f64,
    pub specialty: Specialty,
    #[serde(default)]
    pub total_produced: ResourceTotals,
    pub created_at: u64,
    pub last_decay_update: u64,
    pub last_production: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoostSnapshot {
    pub multiplier: f64,
    pub start_time: u64,
    pub end_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LedgerSnapshot {
    pub version: u32,
    /// Epoch milliseconds of the last accrual before the snapshot was taken.
    pub last_update_time: u64,
    pub next_lane_id: u64,
    pub next_boost_id: u64,
    #[serde(default)]
    pub totals: ResourceTotals,
    #[serde(default)]
    pub lanes: BTreeMap<String, LaneSnapshot>,
    #[serde(default)]
    pub boosts: BTreeMap<String, BoostSnapshot>,
}

fn parse_id(key: &str) -> GameResult<u64> {
    key.parse::<u64>().map_err(|_| GameError::SnapshotFormat {
        reason: format!("'{key}' is not a valid id"),
    })
}

impl IdleLedger {
    /// Capture the ledger as it stands.
    ///
    /// Each lane keeps its own `last_decay_update`, so the stored rates need
    /// no decay pass; settle production with [`IdleLedger::produce`] first if
    /// the snapshot should include it.
    pub fn snapshot(&self) -> LedgerSnapshot {
        let lanes = self
            .lanes()
            .map(|lane| {
                (
                    lane.id.0.to_string(),
                    LaneSnapshot {
                        base_rate: lane.base_rate,
                        current_rate: lane.current_rate,
                        stability: lane.stability,
                        specialty: lane.specialty,
                        total_produced: lane.total_produced,
                        created_at: lane.created_at,
                        last_decay_update: lane.last_decay_update,
                        last_production: lane.last_production,
                    },
                )
            })
            .collect();

        let boosts = self
            .boosts()
            .map(|boost| {
                (
                    boost.id.0.to_string(),
                    BoostSnapshot {
                        multiplier: boost.multiplier,
                        start_time: boost.start_time,
                        end_time: boost.end_time,
                        lane: boost.lane.map(|l| l.0),
                    },
                )
            })
            .collect();

        let (next_lane_id, next_boost_id) = self.next_ids();
        LedgerSnapshot {
            version: SNAPSHOT_VERSION,
            last_update_time: self.last_update_time(),
            next_lane_id,
            next_boost_id,
            totals: *self.totals(),
            lanes,
            boosts,
        }
    }

    /// Rebuild a ledger from `snapshot`.
    ///
    /// When the snapshot is older than `tuning.offline_trigger_secs`, offline
    /// catch-up runs once from its `last_update_time` to `now` and the report
    /// is returned.  The restored ledger's `last_update_time` is then `now`,
    /// so snapshotting and restoring again does not credit the same time twice.
    /// Boosts that could never apply are skipped with a warning.
    pub fn restore(
        snapshot: &LedgerSnapshot,
        tuning: LedgerTuning,
        now: u64,
    ) -> GameResult<(IdleLedger, Option<OfflineReport>)> {
        let mut lanes = BTreeMap::new();
        for (key, saved) in &snapshot.lanes {
            let id = LaneId(parse_id(key)?);
            if !(saved.base_rate.is_finite() && saved.current_rate.is_finite()) {
                return Err(GameError::SnapshotFormat {
                    reason: format!("{id} has a non-finite rate"),
                });
            }
            let mut lane = ProductionLane::new(
                id,
                saved.base_rate,
                saved.stability,
                saved.specialty,
                saved.created_at,
            );
            lane.current_rate = saved
                .current_rate
                .clamp(lane.floor_rate(&tuning), lane.base_rate);
            lane.total_produced = saved.total_produced;
            lane.last_decay_update = saved.last_decay_update;
            lane.last_production = saved.last_production;
            lanes.insert(id, lane);
        }

        let mut boosts = BTreeMap::new();
        for (key, saved) in &snapshot.boosts {
            let id = BoostId(parse_id(key)?);
            let lane = saved.lane.map(LaneId);
            if !(saved.multiplier.is_finite() && saved.multiplier > 0.0)
                || saved.end_time < saved.start_time
            {
                warn!(
                    "Dropping {id}: multiplier {} over {}..{} cannot apply",
                    saved.multiplier, saved.start_time, saved.end_time
                );
                continue;
            }
            if let Some(target) = lane {
                if !lanes.contains_key(&target) {
                    warn!("Dropping {id}: targets missing {target}");
                    continue;
                }
            }
            boosts.insert(
                id,
                Boost {
                    id,
                    multiplier: saved.multiplier,
                    start_time: saved.start_time,
                    end_time: saved.end_time,
                    lane,
                },
            );
        }

        let mut ledger = IdleLedger::from_parts(
            tuning,
            lanes,
            boosts,
            (snapshot.next_lane_id, snapshot.next_boost_id),
            snapshot.totals,
            snapshot.last_update_time,
        );

        let away_secs = now.saturating_sub(snapshot.last_update_time) as f64 / MS_PER_SEC;
        let report = if away_secs > tuning.offline_trigger_secs {
            let report = ledger.offline_catch_up(snapshot.last_update_time, now);
            // Lanes are settled to `now`; boosts that ended while away are spent.
            ledger.sweep_expired_boosts(now);
            Some(report)
        } else {
            None
        };

        Ok((ledger, report))
    }
}

// ── File persistence ─────────────────────────────────────────────────────────

pub fn default_ledger_path() -> PathBuf {
    PathBuf::from("saves").join("idle_ledger.toml")
}

/// Write `snapshot` to `path`, creating parent directories as needed.
pub fn save_ledger(path: &Path, snapshot: &LedgerSnapshot) -> GameResult<()> {
    let io_err = |reason: String| GameError::SnapshotIo {
        path: path.display().to_string(),
        reason,
    };

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|err| io_err(format!("failed to create dir: {err}")))?;
    }
    let serialized = toml::to_string_pretty(snapshot).map_err(|err| GameError::SnapshotFormat {
        reason: format!("failed to serialize: {err}"),
    })?;
    fs::write(path, serialized).map_err(|err| io_err(err.to_string()))
}

/// Read a snapshot from `path`.  `Ok(None)` when the file does not exist.
pub fn load_ledger(path: &Path) -> GameResult<Option<LedgerSnapshot>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).map_err(|err| GameError::SnapshotIo {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse_snapshot_with_migration(&contents).map(Some)
}

pub fn parse_snapshot_with_migration(contents: &str) -> GameResult<LedgerSnapshot> {
    let mut value: toml::Value = toml::from_str(contents).map_err(|err| GameError::SnapshotFormat {
        reason: format!("failed to parse TOML: {err}"),
    })?;

    migrate_snapshot_value(&mut value)?;

    value
        .try_into::<LedgerSnapshot>()
        .map_err(|err| GameError::SnapshotFormat {
            reason: format!("failed to decode migrated snapshot: {err}"),
        })
}

/// Version 1 files had no id counters; they are derived from the stored keys
/// on restore, so zero is a safe fill.
fn migrate_snapshot_value(value: &mut toml::Value) -> GameResult<()> {
    let format_err = |reason: &str| GameError::SnapshotFormat {
        reason: reason.to_string(),
    };
    let table = value
        .as_table_mut()
        .ok_or_else(|| format_err("snapshot root must be a TOML table"))?;

    if !table.contains_key("version") {
        table.insert("version".to_string(), toml::Value::Integer(1));
    }

    let version = table
        .get("version")
        .and_then(toml::Value::as_integer)
        .ok_or_else(|| format_err("snapshot version is missing or invalid"))?;

    if version == 1 {
        for key in ["next_lane_id", "next_boost_id"] {
            if !table.contains_key(key) {
                table.insert(key.to_string(), toml::Value::Integer(0));
            }
        }
        table.insert(
            "version".to_string(),
            toml::Value::Integer(SNAPSHOT_VERSION as i64),
        );
    } else if version != SNAPSHOT_VERSION as i64 {
        return Err(GameError::SnapshotFormat {
            reason: format!(
                "unsupported snapshot version {} (expected {})",
                version, SNAPSHOT_VERSION
            ),
        });
    }

    if !table.contains_key("last_update_time") {
        return Err(format_err("snapshot has no last_update_time"));
    }

    Ok(())
}
