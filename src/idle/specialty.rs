//! Clone specialties, resource kinds and the fixed output-mix table.

use serde::{Deserialize, Serialize};

/// Resources a production lane can yield.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Energy,
    Combo,
    Endurance,
    Discovery,
    Strength,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 5] = [
        ResourceKind::Energy,
        ResourceKind::Combo,
        ResourceKind::Endurance,
        ResourceKind::Discovery,
        ResourceKind::Strength,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Per-lane output profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Speedster,
    Comboist,
    Survivor,
    Explorer,
    Warrior,
    #[default]
    Balanced,
}

impl Specialty {
    pub const ALL: [Specialty; 6] = [
        Specialty::Speedster,
        Specialty::Comboist,
        Specialty::Survivor,
        Specialty::Explorer,
        Specialty::Warrior,
        Specialty::Balanced,
    ];

    /// Output multipliers per resource, in [`ResourceKind::ALL`] order.
    ///
    /// | Specialty | Energy | Combo | Endurance | Discovery | Strength |
    /// |-----------|--------|-------|-----------|-----------|----------|
    /// | speedster | 1.5    | 0.5   | 0.5       | 0.8       | 0.5      |
    /// | comboist  | 0.5    | 1.5   | 0.5       | 0.5       | 0.8      |
    /// | survivor  | 0.5    | 0.5   | 1.5       | 0.5       | 0.8      |
    /// | explorer  | 0.8    | 0.5   | 0.5       | 1.5       | 0.5      |
    /// | warrior   | 0.5    | 0.8   | 0.5       | 0.5       | 1.5      |
    /// | balanced  | 1.0    | 1.0   | 1.0       | 1.0       | 1.0      |
    pub fn mix(self) -> [f64; 5] {
        match self {
            Specialty::Speedster => [1.5, 0.5, 0.5, 0.8, 0.5],
            Specialty::Comboist => [0.5, 1.5, 0.5, 0.5, 0.8],
            Specialty::Survivor => [0.5, 0.5, 1.5, 0.5, 0.8],
            Specialty::Explorer => [0.8, 0.5, 0.5, 1.5, 0.5],
            Specialty::Warrior => [0.5, 0.8, 0.5, 0.5, 1.5],
            Specialty::Balanced => [1.0; 5],
        }
    }

    #[inline]
    pub fn ratio(self, kind: ResourceKind) -> f64 {
        self.mix()[kind.index()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Specialty::Speedster => "speedster",
            Specialty::Comboist => "comboist",
            Specialty::Survivor => "survivor",
            Specialty::Explorer => "explorer",
            Specialty::Warrior => "warrior",
            Specialty::Balanced => "balanced",
        }
    }
}

/// Accumulated amount of each resource.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceTotals {
    pub energy: f64,
    pub combo: f64,
    pub endurance: f64,
    pub discovery: f64,
    pub strength: f64,
}

impl ResourceTotals {
    /// Output of `base_units` of raw production split by `specialty`'s mix.
    pub fn from_production(base_units: f64, specialty: Specialty) -> Self {
        let mut totals = Self::default();
        for kind in ResourceKind::ALL {
            *totals.get_mut(kind) = base_units * specialty.ratio(kind);
        }
        totals
    }

    pub fn get(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Energy => self.energy,
            ResourceKind::Combo => self.combo,
            ResourceKind::Endurance => self.endurance,
            ResourceKind::Discovery => self.discovery,
            ResourceKind::Strength => self.strength,
        }
    }

    pub fn get_mut(&mut self, kind: ResourceKind) -> &mut f64 {
        match kind {
            ResourceKind::Energy => &mut self.energy,
            ResourceKind::Combo => &mut self.combo,
            ResourceKind::Endurance => &mut self.endurance,
            ResourceKind::Discovery => &mut self.discovery,
            ResourceKind::Strength => &mut self.strength,
        }
    }

    pub fn add(&mut self, other: &ResourceTotals) {
        for kind in ResourceKind::ALL {
            *self.get_mut(kind) += other.get(kind);
        }
    }

    pub fn sum(&self) -> f64 {
        ResourceKind::ALL.iter().map(|k| self.get(*k)).sum()
    }
}
