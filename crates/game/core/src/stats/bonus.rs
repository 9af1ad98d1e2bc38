//! Bonus application shared by every stat layer.
//!
//! Equipment bonuses come in two shapes:
//! - **Flat**: each rounded to the nearest integer, then summed
//! - **Percent**: summed, then applied against the layer's base value and
//!   rounded to four decimals
//!
//! Both parts are added to the base in one step, so the isolated delta a
//! stack contributes is always recoverable (see [`BonusStack::delta`]).

use crate::item::{BonusKind, ItemEffect};

/// Number of decimal places kept by fractional stat values.
pub const STAT_PRECISION: i32 = 4;

const PRECISION_SCALE: f64 = 10_000.0;

/// Rounds a value to [`STAT_PRECISION`] decimal places.
///
/// Every fractional value produced by the pipeline passes through here so the
/// output is reproducible bit for bit.
#[inline]
pub fn round_stat(value: f64) -> f64 {
    let rounded = (value * PRECISION_SCALE).round() / PRECISION_SCALE;
    // Normalise negative zero so equal stats compare and hash identically.
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// A single bonus that can be applied to a stat value.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Bonus {
    /// Flat additive bonus.
    Flat(f64),

    /// Percentage of the base value (20.0 = +20%).
    Percent(f64),
}

impl Bonus {
    pub fn flat(value: f64) -> Self {
        Bonus::Flat(value)
    }

    pub fn percent(percent: f64) -> Self {
        Bonus::Percent(percent)
    }
}

impl From<&ItemEffect> for Bonus {
    fn from(effect: &ItemEffect) -> Self {
        match effect.kind {
            BonusKind::Flat => Bonus::Flat(effect.value),
            BonusKind::Percent => Bonus::Percent(effect.value),
        }
    }
}

/// A collection of bonuses applied together to one stat.
///
/// # Example
/// ```
/// # use summon_core::stats::bonus::{Bonus, BonusStack};
/// let mut stack = BonusStack::new();
/// stack.add(Bonus::flat(4.6));     // rounds to +5
/// stack.add(Bonus::percent(10.0)); // +10% of base
///
/// assert_eq!(stack.delta(50.0), 10.0);
/// assert_eq!(stack.apply(50.0), 60.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BonusStack {
    bonuses: Vec<Bonus>,
}

impl BonusStack {
    pub fn new() -> Self {
        Self {
            bonuses: Vec::new(),
        }
    }

    /// Add a bonus to the stack
    pub fn add(&mut self, bonus: Bonus) {
        self.bonuses.push(bonus);
    }

    /// Add multiple bonuses at once
    pub fn extend(&mut self, bonuses: impl IntoIterator<Item = Bonus>) {
        self.bonuses.extend(bonuses);
    }

    /// Sum of flat bonuses, each rounded to the nearest integer first.
    pub fn flat_total(&self) -> f64 {
        self.bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Flat(v) => Some(v.round()),
                Bonus::Percent(_) => None,
            })
            .sum()
    }

    /// Sum of percent bonuses.
    pub fn percent_total(&self) -> f64 {
        self.bonuses
            .iter()
            .filter_map(|b| match b {
                Bonus::Percent(p) => Some(*p),
                Bonus::Flat(_) => None,
            })
            .sum()
    }

    /// The amount this stack adds on top of `base`.
    ///
    /// # Formula
    /// ```text
    /// delta = Σ round(flat) + round4(base × percent_sum / 100)
    /// ```
    pub fn delta(&self, base: f64) -> f64 {
        if self.bonuses.is_empty() {
            return 0.0;
        }
        let percent_part = round_stat(base * self.percent_total() / 100.0);
        round_stat(self.flat_total() + percent_part)
    }

    /// Apply all bonuses to a base value.
    pub fn apply(&self, base: f64) -> f64 {
        round_stat(base + self.delta(base))
    }

    pub fn is_empty(&self) -> bool {
        self.bonuses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bonuses.len()
    }
}

/// Trait for stat layers that follow the Base -> Bonuses -> Final pattern.
///
/// ```text
/// Layer 1: CoreLayer       pre-equipment core + CoreBonuses    -> CoreEffective
/// Layer 2: derived table   CoreEffective × quality multiplier  -> DerivedStats
/// Layer 3: EquipmentLayer  DerivedStats + DerivedBonuses       -> EquippedStats
/// ```
///
/// # Example
///
/// ```
/// # use summon_core::stats::*;
/// # use summon_core::stats::bonus::*;
/// let mut base = CoreEffective::default();
/// base.strength = 12.0;
///
/// let mut bonuses = CoreBonuses::default();
/// bonuses.get_mut(CoreAttribute::Strength).add(Bonus::flat(3.0));
///
/// let core = CoreLayer::compute(&base, &bonuses);
/// assert_eq!(core.strength, 15.0);
/// assert_eq!(CoreLayer::from_base(&base).strength, 12.0);
/// ```
pub trait StatLayer {
    /// The base/input type for this layer
    type Base;

    /// The bonuses type for this layer
    type Bonuses;

    /// The final/output type for this layer
    type Final;

    /// Compute the final values from base and bonuses
    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final;

    /// Create an empty bonus holder
    fn empty_bonuses() -> Self::Bonuses;

    /// Compute with no bonuses (convenience method)
    fn from_base(base: &Self::Base) -> Self::Final {
        Self::compute(base, &Self::empty_bonuses())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_bonuses_round_each_before_summing() {
        let stack = BonusStack::new().with(Bonus::flat(2.4)).with(Bonus::flat(0.3));
        assert_eq!(stack.flat_total(), 2.0);
        assert_eq!(stack.apply(10.0), 12.0);

        let small = BonusStack::new().with(Bonus::flat(0.4)).with(Bonus::flat(0.4));
        assert_eq!(small.delta(50.0), 0.0);
    }

    #[test]
    fn percent_bonuses_keep_four_decimals() {
        let stack = BonusStack::new().with(Bonus::percent(7.0));
        // 33.3333 × 7% = 2.333331 -> 2.3333
        assert_eq!(stack.delta(33.3333), 2.3333);
    }

    #[test]
    fn percent_applies_to_base_not_flat() {
        let stack = BonusStack::new()
            .with(Bonus::flat(10.0))
            .with(Bonus::percent(50.0));
        assert_eq!(stack.apply(100.0), 160.0);
    }

    #[test]
    fn empty_stack_is_identity() {
        assert_eq!(BonusStack::new().apply(42.1234), 42.1234);
        assert_eq!(BonusStack::new().delta(42.0), 0.0);
    }

    #[test]
    fn round_stat_normalises_negative_zero() {
        assert!(round_stat(-0.00001).is_sign_positive());
    }

    impl BonusStack {
        fn with(mut self, bonus: Bonus) -> Self {
            self.add(bonus);
            self
        }
    }
}
