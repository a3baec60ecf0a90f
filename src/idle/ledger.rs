//! The idle production ledger: lanes, boosts, accrual and offline catch-up.
//!
//! [`IdleLedger`] is a plain owned service stored as a Bevy resource.  Every
//! operation takes an explicit `now` (epoch milliseconds) so the math is
//! deterministic under test; the systems in [`super::systems`] pass the wall
//! clock.
//!
//! Lookups by a stale id return [`GameError::LaneNotFound`]; callers in the
//! game loop log those at `debug!` and carry on.

use std::collections::BTreeMap;

use bevy::prelude::*;

use super::lane::{Boost, BoostId, LaneId, ProductionLane, MS_PER_HOUR, MS_PER_SEC};
use super::specialty::{ResourceTotals, Specialty};
use crate::constants::{
    DECAY_FLOOR, DECAY_RATE_PER_HOUR, OFFLINE_CAP_HOURS, OFFLINE_TRIGGER_SECS,
    STABILITY_DECAY_DAMPING,
};
use crate::error::{GameError, GameResult};
use crate::events::LedgerEvent;

/// Decay and offline parameters; see [`crate::constants`] for the meaning of
/// each field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerTuning {
    pub decay_rate_per_hour: f64,
    pub stability_decay_damping: f64,
    pub decay_floor: f64,
    pub offline_cap_hours: f64,
    pub offline_trigger_secs: f64,
}

impl Default for LedgerTuning {
    fn default() -> Self {
        Self {
            decay_rate_per_hour: DECAY_RATE_PER_HOUR,
            stability_decay_damping: STABILITY_DECAY_DAMPING,
            decay_floor: DECAY_FLOOR,
            offline_cap_hours: OFFLINE_CAP_HOURS,
            offline_trigger_secs: OFFLINE_TRIGGER_SECS,
        }
    }
}

impl LedgerTuning {
    #[inline]
    pub fn offline_cap_ms(&self) -> u64 {
        (self.offline_cap_hours.max(0.0) * MS_PER_HOUR) as u64
    }
}

/// Outcome of an offline catch-up.
#[derive(Debug, Clone, PartialEq)]
pub struct OfflineReport {
    /// Real time since the last save.
    pub elapsed_ms: u64,
    /// Time actually credited after the cap.
    pub applied_ms: u64,
    pub was_limited: bool,
    pub produced: ResourceTotals,
    pub lane_count: usize,
}

#[derive(Resource, Debug, Clone)]
pub struct IdleLedger {
    tuning: LedgerTuning,
    lanes: BTreeMap<LaneId, ProductionLane>,
    boosts: BTreeMap<BoostId, Boost>,
    next_lane_id: u64,
    next_boost_id: u64,
    totals: ResourceTotals,
    last_update_time: u64,
    pending: Vec<LedgerEvent>,
}

impl Default for IdleLedger {
    fn default() -> Self {
        Self::new(LedgerTuning::default(), 0)
    }
}

const SECS_PER_HOUR: f64 = MS_PER_HOUR / MS_PER_SEC;

/// Product of every live boost that targets `lane`.
fn boost_multiplier(boosts: &BTreeMap<BoostId, Boost>, lane: LaneId, now: u64) -> f64 {
    boosts
        .values()
        .filter(|b| b.is_live(now) && b.applies_to(lane))
        .map(|b| b.multiplier)
        .product()
}

/// Product of every boost targeting `lane` that is live for all of `[start, end]`.
fn window_multiplier(
    boosts: &BTreeMap<BoostId, Boost>,
    lane: LaneId,
    start: u64,
    end: u64,
) -> f64 {
    boosts
        .values()
        .filter(|b| b.applies_to(lane) && b.start_time <= start && end <= b.end_time)
        .map(|b| b.multiplier)
        .product()
}

impl IdleLedger {
    pub fn new(tuning: LedgerTuning, now: u64) -> Self {
        Self {
            tuning,
            lanes: BTreeMap::new(),
            boosts: BTreeMap::new(),
            next_lane_id: 1,
            next_boost_id: 1,
            totals: ResourceTotals::default(),
            last_update_time: now,
            pending: Vec::new(),
        }
    }

    /// Rebuild a ledger from already-validated parts (used by snapshot restore).
    pub(crate) fn from_parts(
        tuning: LedgerTuning,
        lanes: BTreeMap<LaneId, ProductionLane>,
        boosts: BTreeMap<BoostId, Boost>,
        next_ids: (u64, u64),
        totals: ResourceTotals,
        last_update_time: u64,
    ) -> Self {
        let next_lane_id = lanes
            .keys()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(next_ids.0);
        let next_boost_id = boosts
            .keys()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(1)
            .max(next_ids.1);
        Self {
            tuning,
            lanes,
            boosts,
            next_lane_id,
            next_boost_id,
            totals,
            last_update_time,
            pending: Vec::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn tuning(&self) -> &LedgerTuning {
        &self.tuning
    }

    pub fn lane(&self, id: LaneId) -> Option<&ProductionLane> {
        self.lanes.get(&id)
    }

    pub fn lanes(&self) -> impl Iterator<Item = &ProductionLane> {
        self.lanes.values()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn boosts(&self) -> impl Iterator<Item = &Boost> {
        self.boosts.values()
    }

    /// Lifetime production across all lanes.
    pub fn totals(&self) -> &ResourceTotals {
        &self.totals
    }

    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    pub(crate) fn next_ids(&self) -> (u64, u64) {
        (self.next_lane_id, self.next_boost_id)
    }

    /// Take every event raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<LedgerEvent> {
        std::mem::take(&mut self.pending)
    }

    // ── Lanes ─────────────────────────────────────────────────────────────────

    /// Create a new production lane at full base rate.
    pub fn forge_lane(
        &mut self,
        base_rate: f64,
        stability: f64,
        specialty: Specialty,
        now: u64,
    ) -> LaneId {
        let id = LaneId(self.next_lane_id);
        self.next_lane_id += 1;
        self.lanes.insert(
            id,
            ProductionLane::new(id, base_rate, stability, specialty, now),
        );
        self.pending.push(LedgerEvent::LaneForged { id });
        id
    }

    fn lane_mut(&mut self, id: LaneId) -> GameResult<&mut ProductionLane> {
        self.lanes
            .get_mut(&id)
            .ok_or(GameError::LaneNotFound { id: id.0 })
    }

    /// Decayed rate of a lane at `now`, without boosts.
    ///
    /// Read-only: stored decay state only advances as production is settled.
    pub fn current_rate(&self, id: LaneId, now: u64) -> GameResult<f64> {
        let lane = self
            .lanes
            .get(&id)
            .ok_or(GameError::LaneNotFound { id: id.0 })?;
        let hours = now.saturating_sub(lane.last_decay_update) as f64 / MS_PER_HOUR;
        Ok(lane.decayed_rate(hours, &self.tuning))
    }

    /// Decayed rate times every live boost that applies to the lane.
    ///
    /// Expired boosts are removed as a side effect, leaving the same state a
    /// [`Self::sweep_expired_boosts`] at `now` would (production included).
    pub fn effective_rate(&mut self, id: LaneId, now: u64) -> GameResult<f64> {
        let current = self.current_rate(id, now)?;
        self.sweep_expired_boosts(now);
        Ok(current * boost_multiplier(&self.boosts, id, now))
    }

    /// Restore a lane to its base rate.  Production up to `now` is settled at
    /// the decayed rate first.
    pub fn refresh_lane(&mut self, id: LaneId, now: u64) -> GameResult<()> {
        self.lane_mut(id)?;
        self.accrue(now);
        self.lane_mut(id)?.refresh(now);
        self.pending.push(LedgerEvent::LaneRefreshed { id });
        Ok(())
    }

    // ── Boosts ────────────────────────────────────────────────────────────────

    /// Add a boost lasting `duration_ms` from `now`.
    ///
    /// Boosts never merge; overlapping ones multiply during rate computation.
    /// Production up to `now` is settled first so the boost never reaches back.
    pub fn apply_boost(
        &mut self,
        multiplier: f64,
        duration_ms: u64,
        lane: Option<LaneId>,
        now: u64,
    ) -> GameResult<BoostId> {
        if !(multiplier.is_finite() && multiplier > 0.0) || duration_ms == 0 {
            return Err(GameError::InvalidBoost {
                multiplier,
                duration_ms,
            });
        }
        if let Some(target) = lane {
            if !self.lanes.contains_key(&target) {
                return Err(GameError::LaneNotFound { id: target.0 });
            }
        }
        self.accrue(now);

        let id = BoostId(self.next_boost_id);
        self.next_boost_id += 1;
        self.boosts.insert(
            id,
            Boost {
                id,
                multiplier,
                start_time: now,
                end_time: now.saturating_add(duration_ms),
                lane,
            },
        );
        self.pending.push(LedgerEvent::BoostApplied {
            id,
            multiplier,
            lane,
        });
        Ok(id)
    }

    /// Drop every boost whose end time has passed.  Returns how many were removed.
    ///
    /// Production is settled up to `now` before anything is dropped, so an
    /// expired boost is still credited for the time it was live.
    pub fn sweep_expired_boosts(&mut self, now: u64) -> usize {
        self.accrue(now);
        self.remove_expired_boosts(now)
    }

    fn remove_expired_boosts(&mut self, now: u64) -> usize {
        let expired: Vec<BoostId> = self
            .boosts
            .values()
            .filter(|b| b.is_expired(now))
            .map(|b| b.id)
            .collect();
        for id in &expired {
            self.boosts.remove(id);
            self.pending.push(LedgerEvent::BoostExpired { id: *id });
        }
        expired.len()
    }

    // ── Production ────────────────────────────────────────────────────────────

    /// Accrue production for every lane since its last production time, then
    /// drop expired boosts.  Returns what this call produced.
    pub fn produce(&mut self, now: u64) -> ResourceTotals {
        let produced = self.accrue(now);
        self.remove_expired_boosts(now);
        produced
    }

    /// Credit every lane from its last production time to `now`.
    ///
    /// Each interval is split at the start and end of every boost inside it,
    /// so a boost only multiplies the time it was live, and each piece is
    /// integrated along the decay curve.
    fn accrue(&mut self, now: u64) -> ResourceTotals {
        let tuning = self.tuning;
        let mut produced = ResourceTotals::default();
        for lane in self.lanes.values_mut() {
            let (id, from) = (lane.id, lane.last_production);
            if now <= from {
                continue;
            }

            let mut edges: Vec<u64> = self
                .boosts
                .values()
                .filter(|b| b.applies_to(id))
                .flat_map(|b| [b.start_time, b.end_time])
                .filter(|t| *t > from && *t < now)
                .collect();
            edges.push(now);
            edges.sort_unstable();
            edges.dedup();

            let mut units = 0.0;
            let mut start = from;
            for end in edges {
                lane.apply_decay(start, &tuning);
                let hours = (end - start) as f64 / MS_PER_HOUR;
                let multiplier = window_multiplier(&self.boosts, id, start, end);
                units += lane.decay_integral(hours, &tuning) * SECS_PER_HOUR * multiplier;
                lane.apply_decay(end, &tuning);
                start = end;
            }

            let output = ResourceTotals::from_production(units, lane.specialty);
            lane.total_produced.add(&output);
            lane.last_production = now;
            produced.add(&output);
        }

        self.totals.add(&produced);
        self.last_update_time = self.last_update_time.max(now);
        produced
    }

    /// Credit time spent away since `last_save`, capped at `offline_cap_hours`.
    ///
    /// Each lane decays over the capped interval only, and is credited at the
    /// average of its rate before and after that decay.  This is a linear
    /// stand-in for integrating the exponential curve and slightly overstates
    /// production while the lane is above its floor.
    ///
    /// A `now` at or before `last_save` credits nothing and leaves the lanes
    /// untouched.
    pub fn offline_catch_up(&mut self, last_save: u64, now: u64) -> OfflineReport {
        if now <= last_save {
            return OfflineReport {
                elapsed_ms: 0,
                applied_ms: 0,
                was_limited: false,
                produced: ResourceTotals::default(),
                lane_count: self.lanes.len(),
            };
        }

        let elapsed_ms = now - last_save;
        let cap_ms = self.tuning.offline_cap_ms();
        let applied_ms = elapsed_ms.min(cap_ms);
        let hours = applied_ms as f64 / MS_PER_HOUR;
        let secs = applied_ms as f64 / MS_PER_SEC;

        let tuning = self.tuning;
        let mut produced = ResourceTotals::default();
        for lane in self.lanes.values_mut() {
            lane.apply_decay(last_save, &tuning);
            let before = lane.current_rate;
            let after = lane.decayed_rate(hours, &tuning);
            let average = (before + after) * 0.5;

            let output = ResourceTotals::from_production(average * secs, lane.specialty);
            lane.total_produced.add(&output);
            lane.current_rate = after;
            lane.last_decay_update = now;
            lane.last_production = now;
            produced.add(&output);
        }

        self.totals.add(&produced);
        self.last_update_time = now;

        let report = OfflineReport {
            elapsed_ms,
            applied_ms,
            was_limited: elapsed_ms > cap_ms,
            produced,
            lane_count: self.lanes.len(),
        };
        self.pending
            .push(LedgerEvent::OfflineProgress(report.clone()));
        report
    }
}
