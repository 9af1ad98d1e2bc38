//! Core attributes - Layer 1 of the stat pipeline.
//!
//! Base rolls and allocated points are the only persistent inputs; everything
//! else is derived from them together with level growth and equipment.
//!
//! CoreEffective = base + allocated + growth × (level − 1) + equipment

use super::bonus::{BonusStack, StatLayer, round_stat};

/// The five core attributes of a creature.
///
/// - **Constitution**: health and physical resilience
/// - **Strength**: physical attack
/// - **Agility**: speed and evasion
/// - **Intelligence**: mana and magical attack
/// - **Luck**: critical strikes
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CoreAttribute {
    Constitution,
    Strength,
    Agility,
    Intelligence,
    Luck,
}

impl CoreAttribute {
    pub const ALL: [Self; 5] = [
        Self::Constitution,
        Self::Strength,
        Self::Agility,
        Self::Intelligence,
        Self::Luck,
    ];
}

/// One value per core attribute.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeSet<T> {
    pub constitution: T,
    pub strength: T,
    pub agility: T,
    pub intelligence: T,
    pub luck: T,
}

impl<T> AttributeSet<T> {
    pub const fn new(constitution: T, strength: T, agility: T, intelligence: T, luck: T) -> Self {
        Self {
            constitution,
            strength,
            agility,
            intelligence,
            luck,
        }
    }

    pub fn get(&self, attr: CoreAttribute) -> &T {
        match attr {
            CoreAttribute::Constitution => &self.constitution,
            CoreAttribute::Strength => &self.strength,
            CoreAttribute::Agility => &self.agility,
            CoreAttribute::Intelligence => &self.intelligence,
            CoreAttribute::Luck => &self.luck,
        }
    }

    pub fn get_mut(&mut self, attr: CoreAttribute) -> &mut T {
        match attr {
            CoreAttribute::Constitution => &mut self.constitution,
            CoreAttribute::Strength => &mut self.strength,
            CoreAttribute::Agility => &mut self.agility,
            CoreAttribute::Intelligence => &mut self.intelligence,
            CoreAttribute::Luck => &mut self.luck,
        }
    }

    /// Builds a set by evaluating `f` for every attribute.
    pub fn from_fn(mut f: impl FnMut(CoreAttribute) -> T) -> Self {
        Self {
            constitution: f(CoreAttribute::Constitution),
            strength: f(CoreAttribute::Strength),
            agility: f(CoreAttribute::Agility),
            intelligence: f(CoreAttribute::Intelligence),
            luck: f(CoreAttribute::Luck),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoreAttribute, &T)> {
        CoreAttribute::ALL.into_iter().map(move |attr| (attr, self.get(attr)))
    }
}

/// Base rolls, fixed at creation.
pub type BaseAttributes = AttributeSet<u32>;

/// Player-assigned points per attribute.
pub type AllocatedPoints = AttributeSet<u32>;

/// Per-level growth from the creature's template.
pub type GrowthRates = AttributeSet<f64>;

/// Core attributes after growth and equipment. Never stored.
pub type CoreEffective = AttributeSet<f64>;

impl AllocatedPoints {
    pub fn total(&self) -> u32 {
        self.iter().map(|(_, v)| *v).sum()
    }
}

/// Pre-equipment core value: `base + allocated + growth × (level − 1)`.
pub fn unequipped_core(
    base: &BaseAttributes,
    allocated: &AllocatedPoints,
    growth: &GrowthRates,
    level: u32,
) -> CoreEffective {
    let levels_grown = f64::from(level.saturating_sub(1));
    CoreEffective::from_fn(|attr| {
        let raw = f64::from(*base.get(attr))
            + f64::from(*allocated.get(attr))
            + growth.get(attr) * levels_grown;
        round_stat(raw)
    })
}

/// Equipment bonuses that target core attributes.
pub type CoreBonuses = AttributeSet<BonusStack>;

/// Layer 1: pre-equipment core values + core bonuses.
pub struct CoreLayer;

impl StatLayer for CoreLayer {
    type Base = CoreEffective;
    type Bonuses = CoreBonuses;
    type Final = CoreEffective;

    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final {
        CoreEffective::from_fn(|attr| bonuses.get(attr).apply(*base.get(attr)))
    }

    fn empty_bonuses() -> Self::Bonuses {
        CoreBonuses::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::bonus::Bonus;

    #[test]
    fn unequipped_core_adds_growth_per_level() {
        let base = BaseAttributes::new(10, 12, 8, 6, 4);
        let allocated = AllocatedPoints::new(0, 3, 0, 0, 0);
        let growth = GrowthRates::new(1.5, 2.0, 0.25, 0.0, 0.1);

        let core = unequipped_core(&base, &allocated, &growth, 5);
        assert_eq!(core.constitution, 16.0);
        assert_eq!(core.strength, 23.0);
        assert_eq!(core.agility, 9.0);
        assert_eq!(core.intelligence, 6.0);
        assert_eq!(core.luck, 4.4);
    }

    #[test]
    fn level_one_has_no_growth() {
        let base = BaseAttributes::new(10, 10, 10, 10, 10);
        let growth = GrowthRates::new(3.0, 3.0, 3.0, 3.0, 3.0);
        let core = unequipped_core(&base, &AllocatedPoints::default(), &growth, 1);
        assert_eq!(core, CoreEffective::new(10.0, 10.0, 10.0, 10.0, 10.0));
    }

    #[test]
    fn core_layer_applies_bonuses_per_attribute() {
        let base = CoreEffective::new(10.0, 20.0, 30.0, 40.0, 50.0);
        let mut bonuses = CoreBonuses::default();
        bonuses.get_mut(CoreAttribute::Luck).add(Bonus::percent(10.0));

        let core = CoreLayer::compute(&base, &bonuses);
        assert_eq!(core.luck, 55.0);
        assert_eq!(core.strength, 20.0);
    }

    #[test]
    fn allocated_total_sums_all_attributes() {
        assert_eq!(AllocatedPoints::new(1, 2, 3, 4, 5).total(), 15);
    }
}
