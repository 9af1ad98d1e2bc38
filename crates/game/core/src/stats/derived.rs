//! Derived attributes - Layers 2 and 3 of the stat pipeline.
//!
//! Combat stats are computed from [`CoreEffective`] through a fixed weight
//! table, scaled by the quality multiplier, and finally adjusted by equipment
//! effects that target a derived stat directly.

use super::bonus::{BonusStack, StatLayer, round_stat};
use super::core::{CoreAttribute, CoreEffective};

/// Combat statistics derived from core attributes.
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
pub enum DerivedAttribute {
    Hp,
    Mp,
    PhysicalAttack,
    MagicalAttack,
    PhysicalDefense,
    MagicalDefense,
    Speed,
    CritRate,
    CritDamage,
    DodgeRate,
}

impl DerivedAttribute {
    pub const ALL: [Self; 10] = [
        Self::Hp,
        Self::Mp,
        Self::PhysicalAttack,
        Self::MagicalAttack,
        Self::PhysicalDefense,
        Self::MagicalDefense,
        Self::Speed,
        Self::CritRate,
        Self::CritDamage,
        Self::DodgeRate,
    ];
}

/// One row of the derivation table: `constant + Σ weight × core`.
#[derive(Clone, Copy, Debug)]
pub struct DerivationRule {
    pub target: DerivedAttribute,
    pub constant: f64,
    pub weights: &'static [(CoreAttribute, f64)],
}

impl DerivationRule {
    fn evaluate(&self, core: &CoreEffective) -> f64 {
        let weighted: f64 = self
            .weights
            .iter()
            .map(|(attr, weight)| core.get(*attr) * weight)
            .sum();
        round_stat(self.constant + weighted)
    }
}

/// Fixed mapping from core attributes to derived stats.
pub const DERIVATION_TABLE: [DerivationRule; 10] = {
    use CoreAttribute::*;
    use DerivedAttribute as D;
    [
        DerivationRule {
            target: D::Hp,
            constant: 0.0,
            weights: &[(Constitution, 25.0), (Strength, 5.0)],
        },
        DerivationRule {
            target: D::Mp,
            constant: 0.0,
            weights: &[(Intelligence, 20.0), (Constitution, 5.0)],
        },
        DerivationRule {
            target: D::PhysicalAttack,
            constant: 0.0,
            weights: &[(Strength, 3.0), (Agility, 1.0)],
        },
        DerivationRule {
            target: D::MagicalAttack,
            constant: 0.0,
            weights: &[(Intelligence, 3.0), (Luck, 1.0)],
        },
        DerivationRule {
            target: D::PhysicalDefense,
            constant: 0.0,
            weights: &[(Constitution, 2.0), (Strength, 1.0)],
        },
        DerivationRule {
            target: D::MagicalDefense,
            constant: 0.0,
            weights: &[(Intelligence, 2.0), (Constitution, 1.0)],
        },
        DerivationRule {
            target: D::Speed,
            constant: 0.0,
            weights: &[(Agility, 2.0), (Luck, 0.5)],
        },
        DerivationRule {
            target: D::CritRate,
            constant: 0.0,
            weights: &[(Luck, 0.1), (Agility, 0.05)],
        },
        DerivationRule {
            target: D::CritDamage,
            constant: 150.0,
            weights: &[(Luck, 0.5)],
        },
        DerivationRule {
            target: D::DodgeRate,
            constant: 0.0,
            weights: &[(Agility, 0.1), (Luck, 0.05)],
        },
    ]
};

/// Derived combat statistics.
///
/// Rates (`crit_rate`, `dodge_rate`) and `crit_damage` are percentages.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedStats {
    pub hp: f64,
    pub mp: f64,
    pub physical_attack: f64,
    pub magical_attack: f64,
    pub physical_defense: f64,
    pub magical_defense: f64,
    pub speed: f64,
    pub crit_rate: f64,
    pub crit_damage: f64,
    pub dodge_rate: f64,
}

impl DerivedStats {
    pub fn get(&self, attr: DerivedAttribute) -> f64 {
        match attr {
            DerivedAttribute::Hp => self.hp,
            DerivedAttribute::Mp => self.mp,
            DerivedAttribute::PhysicalAttack => self.physical_attack,
            DerivedAttribute::MagicalAttack => self.magical_attack,
            DerivedAttribute::PhysicalDefense => self.physical_defense,
            DerivedAttribute::MagicalDefense => self.magical_defense,
            DerivedAttribute::Speed => self.speed,
            DerivedAttribute::CritRate => self.crit_rate,
            DerivedAttribute::CritDamage => self.crit_damage,
            DerivedAttribute::DodgeRate => self.dodge_rate,
        }
    }

    pub fn set(&mut self, attr: DerivedAttribute, value: f64) {
        let slot = match attr {
            DerivedAttribute::Hp => &mut self.hp,
            DerivedAttribute::Mp => &mut self.mp,
            DerivedAttribute::PhysicalAttack => &mut self.physical_attack,
            DerivedAttribute::MagicalAttack => &mut self.magical_attack,
            DerivedAttribute::PhysicalDefense => &mut self.physical_defense,
            DerivedAttribute::MagicalDefense => &mut self.magical_defense,
            DerivedAttribute::Speed => &mut self.speed,
            DerivedAttribute::CritRate => &mut self.crit_rate,
            DerivedAttribute::CritDamage => &mut self.crit_damage,
            DerivedAttribute::DodgeRate => &mut self.dodge_rate,
        };
        *slot = value;
    }

    fn from_fn(mut f: impl FnMut(DerivedAttribute) -> f64) -> Self {
        let mut stats = Self::default();
        for attr in DerivedAttribute::ALL {
            stats.set(attr, f(attr));
        }
        stats
    }

    /// Raw derived stats from the derivation table (before quality).
    pub fn from_core(core: &CoreEffective) -> Self {
        let mut stats = Self::default();
        for rule in &DERIVATION_TABLE {
            stats.set(rule.target, rule.evaluate(core));
        }
        stats
    }

    /// Multiplies every stat by the quality multiplier.
    pub fn scaled(&self, multiplier: f64) -> Self {
        Self::from_fn(|attr| round_stat(self.get(attr) * multiplier))
    }

    pub fn is_zero(&self) -> bool {
        DerivedAttribute::ALL.iter().all(|attr| self.get(*attr) == 0.0)
    }
}

/// Equipment bonuses that target derived stats directly.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DerivedBonuses {
    pub hp: BonusStack,
    pub mp: BonusStack,
    pub physical_attack: BonusStack,
    pub magical_attack: BonusStack,
    pub physical_defense: BonusStack,
    pub magical_defense: BonusStack,
    pub speed: BonusStack,
    pub crit_rate: BonusStack,
    pub crit_damage: BonusStack,
    pub dodge_rate: BonusStack,
}

impl DerivedBonuses {
    pub fn get(&self, attr: DerivedAttribute) -> &BonusStack {
        match attr {
            DerivedAttribute::Hp => &self.hp,
            DerivedAttribute::Mp => &self.mp,
            DerivedAttribute::PhysicalAttack => &self.physical_attack,
            DerivedAttribute::MagicalAttack => &self.magical_attack,
            DerivedAttribute::PhysicalDefense => &self.physical_defense,
            DerivedAttribute::MagicalDefense => &self.magical_defense,
            DerivedAttribute::Speed => &self.speed,
            DerivedAttribute::CritRate => &self.crit_rate,
            DerivedAttribute::CritDamage => &self.crit_damage,
            DerivedAttribute::DodgeRate => &self.dodge_rate,
        }
    }

    pub fn get_mut(&mut self, attr: DerivedAttribute) -> &mut BonusStack {
        match attr {
            DerivedAttribute::Hp => &mut self.hp,
            DerivedAttribute::Mp => &mut self.mp,
            DerivedAttribute::PhysicalAttack => &mut self.physical_attack,
            DerivedAttribute::MagicalAttack => &mut self.magical_attack,
            DerivedAttribute::PhysicalDefense => &mut self.physical_defense,
            DerivedAttribute::MagicalDefense => &mut self.magical_defense,
            DerivedAttribute::Speed => &mut self.speed,
            DerivedAttribute::CritRate => &mut self.crit_rate,
            DerivedAttribute::CritDamage => &mut self.crit_damage,
            DerivedAttribute::DodgeRate => &mut self.dodge_rate,
        }
    }
}

/// Output of the equipment layer: final stats plus the isolated delta.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EquippedStats {
    pub derived: DerivedStats,
    pub contribution: DerivedStats,
}

/// Layer 3: quality-scaled derived stats + direct equipment bonuses.
pub struct EquipmentLayer;

impl StatLayer for EquipmentLayer {
    type Base = DerivedStats;
    type Bonuses = DerivedBonuses;
    type Final = EquippedStats;

    fn compute(base: &Self::Base, bonuses: &Self::Bonuses) -> Self::Final {
        let contribution = DerivedStats::from_fn(|attr| bonuses.get(attr).delta(base.get(attr)));
        let derived =
            DerivedStats::from_fn(|attr| round_stat(base.get(attr) + contribution.get(attr)));
        EquippedStats {
            derived,
            contribution,
        }
    }

    fn empty_bonuses() -> Self::Bonuses {
        DerivedBonuses::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::bonus::Bonus;

    fn flat_core(value: f64) -> CoreEffective {
        CoreEffective::new(value, value, value, value, value)
    }

    #[test]
    fn table_covers_every_derived_attribute_once() {
        for attr in DerivedAttribute::ALL {
            let rows = DERIVATION_TABLE.iter().filter(|r| r.target == attr).count();
            assert_eq!(rows, 1, "{attr} must have exactly one rule");
        }
    }

    #[test]
    fn raw_stats_follow_weights() {
        let core = CoreEffective::new(10.0, 12.0, 8.0, 6.0, 4.0);
        let stats = DerivedStats::from_core(&core);

        assert_eq!(stats.hp, 10.0 * 25.0 + 12.0 * 5.0);
        assert_eq!(stats.physical_attack, 12.0 * 3.0 + 8.0);
        assert_eq!(stats.crit_damage, 152.0);
        assert_eq!(stats.crit_rate, 0.8);
    }

    #[test]
    fn quality_scaling_multiplies_every_stat() {
        let raw = DerivedStats::from_core(&flat_core(10.0));
        let scaled = raw.scaled(1.5);
        for attr in DerivedAttribute::ALL {
            assert_eq!(scaled.get(attr), round_stat(raw.get(attr) * 1.5));
        }
    }

    #[test]
    fn equipment_layer_reports_isolated_contribution() {
        let mut base = DerivedStats::default();
        base.physical_attack = 50.0;
        base.hp = 200.0;

        let mut bonuses = DerivedBonuses::default();
        bonuses.physical_attack.add(Bonus::flat(10.0));
        bonuses.hp.add(Bonus::percent(12.5));

        let out = EquipmentLayer::compute(&base, &bonuses);
        assert_eq!(out.derived.physical_attack, 60.0);
        assert_eq!(out.derived.hp, 225.0);
        assert_eq!(out.contribution.physical_attack, 10.0);
        assert_eq!(out.contribution.hp, 25.0);
        assert_eq!(out.contribution.speed, 0.0);
    }

    #[test]
    fn no_bonuses_leaves_zero_contribution() {
        let base = DerivedStats::from_core(&flat_core(7.0));
        let out = EquipmentLayer::from_base(&base);
        assert_eq!(out.derived, base);
        assert!(out.contribution.is_zero());
    }
}
