//! Quality tier multipliers.

use crate::item::QualityTier;

/// Multiplier applied to raw derived stats, indexed by [`QualityTier`].
///
/// The table must be strictly increasing; [`crate::EngineConfig::validate`]
/// rejects anything else.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct QualityMultipliers(pub [f64; 5]);

impl QualityMultipliers {
    pub const DEFAULT: Self = Self([1.0, 1.5, 2.0, 2.5, 3.0]);

    pub fn for_tier(&self, tier: QualityTier) -> f64 {
        self.0[tier.index()]
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.0.iter().all(|m| m.is_finite() && *m > 0.0)
            && self.0.windows(2).all(|pair| pair[0] < pair[1])
    }
}

impl Default for QualityMultipliers {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_tiers() {
        let table = QualityMultipliers::default();
        assert_eq!(table.for_tier(QualityTier::Common), 1.0);
        assert_eq!(table.for_tier(QualityTier::Legendary), 3.0);
        assert!(table.is_strictly_increasing());
    }

    #[test]
    fn flat_table_is_rejected() {
        assert!(!QualityMultipliers([1.0, 1.0, 2.0, 2.5, 3.0]).is_strictly_increasing());
    }
}
