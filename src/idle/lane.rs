//! Production lanes and boosts.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::specialty::{ResourceTotals, Specialty};
use super::LedgerTuning;

pub(crate) const MS_PER_HOUR: f64 = 3_600_000.0;
pub(crate) const MS_PER_SEC: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(pub u64);

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lane#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BoostId(pub u64);

impl fmt::Display for BoostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boost#{}", self.0)
    }
}

/// One independent resource-generation source.
///
/// `current_rate` stays within `[base_rate × decay_floor, base_rate]`; decay is
/// applied lazily from `last_decay_update` whenever the lane is read through
/// the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductionLane {
    pub id: LaneId,
    /// Undecayed production (units/s).
    pub base_rate: f64,
    pub current_rate: f64,
    /// 0.0–1.0; higher values slow decay.
    pub stability: f64,
    pub specialty: Specialty,
    pub total_produced: ResourceTotals,
    /// Epoch milliseconds.
    pub created_at: u64,
    pub last_decay_update: u64,
    pub last_production: u64,
}

impl ProductionLane {
    pub fn new(id: LaneId, base_rate: f64, stability: f64, specialty: Specialty, now: u64) -> Self {
        let base_rate = base_rate.max(0.0);
        Self {
            id,
            base_rate,
            current_rate: base_rate,
            stability: stability.clamp(0.0, 1.0),
            specialty,
            total_produced: ResourceTotals::default(),
            created_at: now,
            last_decay_update: now,
            last_production: now,
        }
    }

    /// Hourly decay after stability damping.
    #[inline]
    pub fn effective_decay_rate(&self, tuning: &LedgerTuning) -> f64 {
        tuning.decay_rate_per_hour * (1.0 - self.stability * tuning.stability_decay_damping)
    }

    /// Multiplicative decay over `hours`.
    #[inline]
    pub fn decay_factor(&self, hours: f64, tuning: &LedgerTuning) -> f64 {
        (1.0 - self.effective_decay_rate(tuning))
            .clamp(0.0, 1.0)
            .powf(hours.max(0.0))
    }

    #[inline]
    pub fn floor_rate(&self, tuning: &LedgerTuning) -> f64 {
        self.base_rate * tuning.decay_floor
    }

    /// The rate after decaying `current_rate` for `hours`, clamped at the floor.
    pub fn decayed_rate(&self, hours: f64, tuning: &LedgerTuning) -> f64 {
        (self.current_rate * self.decay_factor(hours, tuning)).max(self.floor_rate(tuning))
    }

    /// Rate-hours produced while decaying from `current_rate` for `hours`.
    ///
    /// Exact for the floor-clamped curve: `r·qᵗ` until it meets the floor,
    /// then flat.
    pub fn decay_integral(&self, hours: f64, tuning: &LedgerTuning) -> f64 {
        let hours = hours.max(0.0);
        let floor = self.floor_rate(tuning);
        let start = self.current_rate;
        let q = (1.0 - self.effective_decay_rate(tuning)).clamp(0.0, 1.0);

        if start <= floor || q <= 0.0 {
            return floor * hours;
        }
        if q >= 1.0 {
            return start * hours;
        }

        let ln_q = q.ln();
        let to_floor = (floor / start).ln() / ln_q;
        let decaying = hours.min(to_floor);
        start * (q.powf(decaying) - 1.0) / ln_q + floor * (hours - decaying)
    }

    /// Bring `current_rate` up to `now`.
    ///
    /// Decay factors multiply, and the floor clamp commutes with a monotone
    /// decay, so any split of the same interval yields the same rate.
    /// Timestamps earlier than the last update are ignored.
    pub fn apply_decay(&mut self, now: u64, tuning: &LedgerTuning) {
        if now <= self.last_decay_update {
            return;
        }
        let hours = (now - self.last_decay_update) as f64 / MS_PER_HOUR;
        self.current_rate = self.decayed_rate(hours, tuning);
        self.last_decay_update = now;
    }

    /// Restore the full base rate and restart the decay clock.
    pub fn refresh(&mut self, now: u64) {
        self.current_rate = self.base_rate;
        self.last_decay_update = now;
    }
}

/// A temporary multiplicative boost.  `lane == None` applies to every lane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub id: BoostId,
    pub multiplier: f64,
    pub start_time: u64,
    pub end_time: u64,
    pub lane: Option<LaneId>,
}

impl Boost {
    #[inline]
    pub fn is_expired(&self, now: u64) -> bool {
        self.end_time < now
    }

    #[inline]
    pub fn is_live(&self, now: u64) -> bool {
        self.start_time <= now && !self.is_expired(now)
    }

    #[inline]
    pub fn applies_to(&self, lane: LaneId) -> bool {
        self.lane.is_none_or(|target| target == lane)
    }
}
