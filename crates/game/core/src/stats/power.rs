//! Combat power - a single scalar for sorting and recommendation.
//!
//! Combat power is read-only output: nothing in the pipeline consumes it.

use super::derived::{DerivedAttribute, DerivedStats};

/// Weight of each derived stat in the combat power sum.
pub const COMBAT_POWER_WEIGHTS: [(DerivedAttribute, f64); 10] = [
    (DerivedAttribute::Hp, 0.1),
    (DerivedAttribute::Mp, 0.05),
    (DerivedAttribute::PhysicalAttack, 1.0),
    (DerivedAttribute::MagicalAttack, 1.0),
    (DerivedAttribute::PhysicalDefense, 0.8),
    (DerivedAttribute::MagicalDefense, 0.8),
    (DerivedAttribute::Speed, 0.5),
    (DerivedAttribute::CritRate, 2.0),
    (DerivedAttribute::CritDamage, 0.5),
    (DerivedAttribute::DodgeRate, 2.0),
];

/// Weighted sum of final derived stats, rounded to the nearest integer.
pub fn combat_power(stats: &DerivedStats) -> u64 {
    let score: f64 = COMBAT_POWER_WEIGHTS
        .iter()
        .map(|(attr, weight)| stats.get(*attr) * weight)
        .sum();
    if score.is_finite() && score > 0.0 {
        score.round() as u64
    } else {
        0
    }
}
