//! Bevy wiring for the idle ledger.
//!
//! Startup restores `saves/idle_ledger.toml` (running offline catch-up when it
//! is stale).  Every `Update` frame [`idle_tick_system`] counts down three
//! intervals: production accrual, the expired-boost sweep and the autosave.
//! Ledger events queued by any of these are forwarded as [`LedgerEvent`]
//! messages at the end of the frame.

use std::path::PathBuf;

use bevy::prelude::*;
use rand::Rng;

use super::ledger::IdleLedger;
use super::now_unix_ms;
use super::snapshot::{default_ledger_path, load_ledger, save_ledger};
use super::specialty::Specialty;
use crate::config::{load_game_config, GameConfig};
use crate::events::LedgerEvent;

/// Where the ledger is loaded from and autosaved to.
#[derive(Resource, Debug, Clone)]
pub struct IdleSavePath(pub PathBuf);

impl Default for IdleSavePath {
    fn default() -> Self {
        Self(default_ledger_path())
    }
}

/// Countdowns (s) until the next production tick, boost sweep and autosave.
/// The autosave countdown is primed at load so the restored state is not
/// written straight back.
#[derive(Resource, Debug, Clone, Default)]
pub struct IdleSchedule {
    pub production_secs: f32,
    pub sweep_secs: f32,
    pub autosave_secs: f32,
}

pub struct IdlePlugin;

impl Plugin for IdlePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<IdleLedger>()
            .init_resource::<IdleSchedule>()
            .init_resource::<IdleSavePath>()
            .add_message::<LedgerEvent>()
            .add_systems(Startup, load_idle_ledger_system.after(load_game_config))
            .add_systems(
                Update,
                (
                    idle_debug_keys_system,
                    idle_tick_system,
                    forward_ledger_events_system,
                )
                    .chain(),
            )
            .add_systems(Last, save_idle_ledger_on_exit_system);
    }
}

/// Restore the ledger from disk.  A missing or unreadable file starts a fresh
/// ledger; a corrupt file is left in place for inspection.
pub fn load_idle_ledger_system(
    config: Res<GameConfig>,
    path: Res<IdleSavePath>,
    mut schedule: ResMut<IdleSchedule>,
    mut ledger: ResMut<IdleLedger>,
) {
    let now = now_unix_ms();
    let tuning = config.ledger_tuning();
    schedule.autosave_secs = config.autosave_secs;

    let restored = match load_ledger(&path.0) {
        Ok(Some(snapshot)) => match IdleLedger::restore(&snapshot, tuning, now) {
            Ok(restored) => Some(restored),
            Err(e) => {
                warn!("Idle ledger not restored: {e}");
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            warn!("Idle ledger not loaded: {e}");
            None
        }
    };

    match restored {
        Some((restored, report)) => {
            println!(
                "✓ Idle ledger restored: {} lanes from {}",
                restored.lane_count(),
                path.0.display()
            );
            if report.is_none() {
                debug!("Idle ledger is recent; no offline catch-up");
            }
            *ledger = restored;
        }
        None => {
            *ledger = IdleLedger::new(tuning, now);
            println!("ℹ Starting a fresh idle ledger");
        }
    }
}

/// Advance the production, sweep and autosave countdowns by one frame.
pub fn idle_tick_system(
    time: Res<Time>,
    config: Res<GameConfig>,
    path: Res<IdleSavePath>,
    mut schedule: ResMut<IdleSchedule>,
    mut ledger: ResMut<IdleLedger>,
) {
    let dt = time.delta_secs();
    let now = now_unix_ms();

    schedule.production_secs -= dt;
    if schedule.production_secs <= 0.0 {
        schedule.production_secs = config.production_tick_secs.max(0.1);
        ledger.produce(now);
    }

    schedule.sweep_secs -= dt;
    if schedule.sweep_secs <= 0.0 {
        schedule.sweep_secs = config.boost_sweep_secs.max(0.1);
        let removed = ledger.sweep_expired_boosts(now);
        if removed > 0 {
            debug!("Swept {removed} expired boosts");
        }
    }

    schedule.autosave_secs -= dt;
    if schedule.autosave_secs <= 0.0 {
        schedule.autosave_secs = config.autosave_secs.max(1.0);
        persist(&mut ledger, &path, now);
    }
}

fn persist(ledger: &mut IdleLedger, path: &IdleSavePath, now: u64) {
    ledger.produce(now);
    let snapshot = ledger.snapshot();
    match save_ledger(&path.0, &snapshot) {
        Ok(()) => debug!("Idle ledger saved to {}", path.0.display()),
        Err(e) => warn!("Idle ledger autosave failed: {e}"),
    }
}

/// Publish everything the ledger queued this frame.
pub fn forward_ledger_events_system(
    mut ledger: ResMut<IdleLedger>,
    mut writer: MessageWriter<LedgerEvent>,
) {
    for event in ledger.drain_events() {
        match &event {
            LedgerEvent::OfflineProgress(report) => info!(
                "Offline progress: {:.1} h credited{} across {} lanes, {:.0} resources",
                report.applied_ms as f64 / 3_600_000.0,
                if report.was_limited { " (capped)" } else { "" },
                report.lane_count,
                report.produced.sum()
            ),
            LedgerEvent::LaneForged { id } => info!("Forged {id}"),
            LedgerEvent::BoostApplied {
                id,
                multiplier,
                lane,
            } => match lane {
                Some(lane) => info!("{id}: ×{multiplier} on {lane}"),
                None => info!("{id}: ×{multiplier} on all lanes"),
            },
            other => debug!("{other:?}"),
        }
        writer.write(event);
    }
}

/// Developer shortcuts.
///
/// - **F** forges a lane with a random specialty and base rate
/// - **B** applies the configured global debug boost (×2 for one minute by default)
/// - **R** refreshes every lane to its base rate
pub fn idle_debug_keys_system(
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut ledger: ResMut<IdleLedger>,
) {
    let now = now_unix_ms();

    if keys.just_pressed(KeyCode::KeyF) {
        let mut rng = rand::thread_rng();
        let specialty = Specialty::ALL[rng.gen_range(0..Specialty::ALL.len())];
        let (lo, hi) = (config.forge_base_rate_min, config.forge_base_rate_max);
        let base_rate = if hi > lo { rng.gen_range(lo..hi) } else { lo };
        let stability = rng.gen_range(0.0..1.0);
        let id = ledger.forge_lane(base_rate, stability, specialty, now);
        debug!(
            "{id}: {} at {base_rate:.2}/s, stability {stability:.2}",
            specialty.label()
        );
    }

    if keys.just_pressed(KeyCode::KeyB) {
        let duration_ms = (config.debug_boost_secs.max(0.0) * 1_000.0) as u64;
        if let Err(e) = ledger.apply_boost(config.debug_boost_multiplier, duration_ms, None, now) {
            warn!("Boost rejected: {e}");
        }
    }

    if keys.just_pressed(KeyCode::KeyR) {
        let ids: Vec<_> = ledger.lanes().map(|lane| lane.id).collect();
        for id in ids {
            if let Err(e) = ledger.refresh_lane(id, now) {
                debug!("Refresh skipped: {e}");
            }
        }
    }
}

/// Final save when the app is shutting down.
pub fn save_idle_ledger_on_exit_system(
    mut exits: MessageReader<AppExit>,
    path: Res<IdleSavePath>,
    mut ledger: ResMut<IdleLedger>,
) {
    if exits.read().next().is_some() {
        persist(&mut ledger, &path, now_unix_ms());
    }
}
