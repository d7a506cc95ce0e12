//! The twelve-tier service plan model.
//!
//! Upstream exports and per-representative price lists both address the same
//! fixed set of twelve plans: six metered ("limited volume") plans and six
//! unlimited plans, each sold in 1–6 month durations. Rather than twelve ad hoc
//! named fields, tiers are modeled as a fixed-size ordered array with indexed
//! accessors so that validation and pricing can iterate uniformly.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Number of pricing tiers. Tiers 1–6 are metered plans, 7–12 unlimited plans.
pub const TIER_COUNT: usize = 12;

/// Tier grouping. Presentation-only: the arithmetic is identical for both.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TierKind {
    Metered,
    Unlimited,
}

/// One of the twelve fixed service tiers (zero-based index, always < 12).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tier(u8);

impl Tier {
    /// Construct from a zero-based index.
    pub fn from_index(index: usize) -> DomainResult<Self> {
        if index >= TIER_COUNT {
            return Err(DomainError::validation(format!(
                "tier index out of range: {index}"
            )));
        }
        Ok(Self(index as u8))
    }

    /// Iterate all twelve tiers in order.
    pub fn all() -> impl Iterator<Item = Tier> {
        (0..TIER_COUNT as u8).map(Tier)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// One-based tier number (1–12), as used in stored price lists.
    pub fn number(&self) -> u8 {
        self.0 + 1
    }

    pub fn kind(&self) -> TierKind {
        if self.index() < TIER_COUNT / 2 {
            TierKind::Metered
        } else {
            TierKind::Unlimited
        }
    }

    /// Plan duration in months (1–6 within each group).
    pub fn duration_months(&self) -> u8 {
        (self.0 % (TIER_COUNT as u8 / 2)) + 1
    }

    /// Human-readable plan label for invoice line descriptions.
    pub fn label(&self) -> String {
        let group = match self.kind() {
            TierKind::Metered => "Metered",
            TierKind::Unlimited => "Unlimited",
        };
        format!("{} {}-month", group, self.duration_months())
    }
}

/// Usage volumes per tier for one representative, in plan units.
///
/// Volumes are non-negative and finite; the constructor clamps anything else
/// to zero, matching the permissive coercion applied at the ingest boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TierVolumes([f64; TIER_COUNT]);

impl TierVolumes {
    pub fn new(volumes: [f64; TIER_COUNT]) -> Self {
        let mut clamped = volumes;
        for v in &mut clamped {
            if !v.is_finite() || *v < 0.0 {
                *v = 0.0;
            }
        }
        Self(clamped)
    }

    pub fn zero() -> Self {
        Self([0.0; TIER_COUNT])
    }

    pub fn get(&self, tier: Tier) -> f64 {
        self.0[tier.index()]
    }

    pub fn set(&mut self, tier: Tier, volume: f64) {
        self.0[tier.index()] = if volume.is_finite() && volume > 0.0 {
            volume
        } else {
            0.0
        };
    }

    /// Iterate `(tier, volume)` pairs in tier order.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, f64)> + '_ {
        Tier::all().map(|t| (t, self.get(t)))
    }

    /// True when no tier carries any usage.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|v| *v == 0.0)
    }
}

impl Default for TierVolumes {
    fn default() -> Self {
        Self::zero()
    }
}

/// Per-representative unit prices, one per tier, in whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceTable([i64; TIER_COUNT]);

impl PriceTable {
    pub fn new(prices: [i64; TIER_COUNT]) -> Self {
        Self(prices)
    }

    pub fn zero() -> Self {
        Self([0; TIER_COUNT])
    }

    /// Default onboarding price list applied when a representative is
    /// auto-created during ingestion.
    pub fn default_pricing() -> Self {
        Self([
            50_000, 90_000, 120_000, 150_000, 180_000, 200_000, // metered 1–6 months
            100_000, 180_000, 250_000, 320_000, 380_000, 450_000, // unlimited 1–6 months
        ])
    }

    pub fn get(&self, tier: Tier) -> i64 {
        self.0[tier.index()]
    }

    pub fn set(&mut self, tier: Tier, unit_price: i64) {
        self.0[tier.index()] = unit_price;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tier, i64)> + '_ {
        Tier::all().map(|t| (t, self.get(t)))
    }
}
