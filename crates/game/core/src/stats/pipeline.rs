//! The stat derivation pipeline.
//!
//! A pure function from a creature's persistent fields plus a complete
//! snapshot of its equipped items to its derived attributes. It never reads
//! global state; callers gather the equipment snapshot through the relation
//! index and item store and pass it in.
//!
//! ```text
//! base + allocated + growth        (pre-equipment core)
//!      ↓  + core equipment bonuses
//! CoreEffective                    (Layer 1)
//!      ↓  derivation table × quality multiplier
//! DerivedStats (scaled)            (Layer 2)
//!      ↓  + derived equipment bonuses
//! DerivedStats (final) + contribution  (Layer 3)
//!      ↓
//! combat power
//! ```

use super::bonus::{Bonus, StatLayer};
use super::core::{
    AllocatedPoints, BaseAttributes, CoreBonuses, CoreEffective, CoreLayer, GrowthRates,
    unequipped_core,
};
use super::derived::{DerivedBonuses, DerivedStats, EquipmentLayer};
use super::power::combat_power;
use super::quality::QualityMultipliers;
use crate::item::{Item, QualityTier, StatKey};

/// Everything the pipeline needs, borrowed from the caller.
#[derive(Clone, Copy, Debug)]
pub struct StatInputs<'a> {
    pub base: &'a BaseAttributes,
    pub allocated: &'a AllocatedPoints,
    pub growth: &'a GrowthRates,
    pub level: u32,
    pub quality: QualityTier,
    /// Complete snapshot of currently equipped items.
    pub equipped: &'a [Item],
}

/// Pipeline output.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatsOutcome {
    /// Core attributes after growth and equipment.
    pub core: CoreEffective,
    /// Final derived attributes.
    pub derived: DerivedStats,
    /// The part of `derived` owed to direct equipment bonuses.
    pub equipment_contribution: DerivedStats,
    pub combat_power: u64,
}

/// Equipment bonuses split by the layer they feed.
#[derive(Clone, Debug, Default)]
pub struct EquipmentBonuses {
    pub core: CoreBonuses,
    pub derived: DerivedBonuses,
}

impl EquipmentBonuses {
    /// Collects the effects of every equipped item.
    ///
    /// Items without a slot are ignored; they cannot be equipped.
    pub fn collect(items: &[Item]) -> Self {
        let mut bonuses = Self::default();
        for item in items.iter().filter(|item| item.is_equipment()) {
            for effect in &item.effects {
                let bonus = Bonus::from(effect);
                match effect.stat {
                    StatKey::Core(attr) => bonuses.core.get_mut(attr).add(bonus),
                    StatKey::Derived(attr) => bonuses.derived.get_mut(attr).add(bonus),
                }
            }
        }
        bonuses
    }
}

/// Runs the full pipeline.
///
/// Same inputs always produce bit-identical output.
pub fn derive_stats(inputs: &StatInputs<'_>, multipliers: &QualityMultipliers) -> StatsOutcome {
    let bonuses = EquipmentBonuses::collect(inputs.equipped);

    // Layer 1
    let unequipped = unequipped_core(inputs.base, inputs.allocated, inputs.growth, inputs.level);
    let core = CoreLayer::compute(&unequipped, &bonuses.core);

    // Layer 2
    let scaled = DerivedStats::from_core(&core).scaled(multipliers.for_tier(inputs.quality));

    // Layer 3
    let equipped = EquipmentLayer::compute(&scaled, &bonuses.derived);

    StatsOutcome {
        core,
        derived: equipped.derived,
        equipment_contribution: equipped.contribution,
        combat_power: combat_power(&equipped.derived),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ItemId;
    use crate::item::{ItemEffect, SlotType};
    use crate::stats::{CoreAttribute, DerivedAttribute};

    fn inputs<'a>(
        base: &'a BaseAttributes,
        allocated: &'a AllocatedPoints,
        growth: &'a GrowthRates,
        equipped: &'a [Item],
    ) -> StatInputs<'a> {
        StatInputs {
            base,
            allocated,
            growth,
            level: 1,
            quality: QualityTier::Common,
            equipped,
        }
    }

    #[test]
    fn weapon_flat_bonus_adds_after_quality() {
        // strength 15, agility 5 -> physical attack 50
        let base = BaseAttributes::new(10, 15, 5, 10, 10);
        let allocated = AllocatedPoints::default();
        let growth = GrowthRates::default();
        let sword = Item::equipment(ItemId(1), "Sword", SlotType::Weapon).with_effect(
            ItemEffect::flat(StatKey::Derived(DerivedAttribute::PhysicalAttack), 10.0),
        );

        let bare = derive_stats(
            &inputs(&base, &allocated, &growth, &[]),
            &QualityMultipliers::default(),
        );
        assert_eq!(bare.derived.physical_attack, 50.0);

        let armed = derive_stats(
            &inputs(&base, &allocated, &growth, std::slice::from_ref(&sword)),
            &QualityMultipliers::default(),
        );
        assert_eq!(armed.derived.physical_attack, 60.0);
        assert_eq!(armed.equipment_contribution.physical_attack, 10.0);
        assert!(armed.combat_power > bare.combat_power);
    }

    #[test]
    fn fractional_flat_bonuses_round_per_item() {
        let base = BaseAttributes::new(10, 15, 5, 10, 10);
        let allocated = AllocatedPoints::default();
        let growth = GrowthRates::default();
        let charm = |id| {
            Item::equipment(ItemId(id), "Charm", SlotType::Accessory).with_effect(
                ItemEffect::flat(StatKey::Derived(DerivedAttribute::PhysicalAttack), 0.4),
            )
        };
        let equipped = [charm(1), charm(2)];

        let out = derive_stats(
            &inputs(&base, &allocated, &growth, &equipped),
            &QualityMultipliers::default(),
        );
        assert_eq!(out.derived.physical_attack, 50.0);
        assert_eq!(out.equipment_contribution.physical_attack, 0.0);

        let charms = [
            charm(1),
            Item::equipment(ItemId(3), "Band", SlotType::Rune).with_effect(ItemEffect::flat(
                StatKey::Derived(DerivedAttribute::PhysicalAttack),
                1.6,
            )),
        ];
        let out = derive_stats(
            &inputs(&base, &allocated, &growth, &charms),
            &QualityMultipliers::default(),
        );
        // 0.4 -> 0, 1.6 -> 2
        assert_eq!(out.equipment_contribution.physical_attack, 2.0);
    }

    #[test]
    fn core_bonus_flows_through_table_and_quality() {
        let base = BaseAttributes::new(10, 10, 10, 10, 10);
        let allocated = AllocatedPoints::default();
        let growth = GrowthRates::default();
        let ring = Item::equipment(ItemId(2), "Ring", SlotType::Accessory)
            .with_effect(ItemEffect::flat(StatKey::Core(CoreAttribute::Strength), 2.0));
        let equipped = [ring];
        let mut input = inputs(&base, &allocated, &growth, &equipped);
        input.quality = QualityTier::Rare;

        let out = derive_stats(&input, &QualityMultipliers::default());
        assert_eq!(out.core.strength, 12.0);
        // (12 × 3 + 10) × 2.0
        assert_eq!(out.derived.physical_attack, 92.0);
        // core bonuses are not part of the direct contribution
        assert!(out.equipment_contribution.is_zero());
    }

    #[test]
    fn percent_bonus_uses_post_quality_base() {
        let base = BaseAttributes::new(10, 10, 10, 10, 10);
        let allocated = AllocatedPoints::default();
        let growth = GrowthRates::default();
        let relic = Item::equipment(ItemId(3), "Relic", SlotType::Relic)
            .with_effect(ItemEffect::percent(StatKey::Derived(DerivedAttribute::Hp), 10.0));
        let equipped = [relic];
        let mut input = inputs(&base, &allocated, &growth, &equipped);
        input.quality = QualityTier::Uncommon;

        let out = derive_stats(&input, &QualityMultipliers::default());
        // raw hp 300, × 1.5 = 450, +10% = 495
        assert_eq!(out.derived.hp, 495.0);
        assert_eq!(out.equipment_contribution.hp, 45.0);
    }

    #[test]
    fn non_equipment_items_are_ignored() {
        let base = BaseAttributes::new(10, 10, 10, 10, 10);
        let allocated = AllocatedPoints::default();
        let growth = GrowthRates::default();
        let ore = Item::material(ItemId(4), "Ore")
            .with_effect(ItemEffect::flat(StatKey::Derived(DerivedAttribute::Hp), 999.0));

        let with_ore = derive_stats(
            &inputs(&base, &allocated, &growth, std::slice::from_ref(&ore)),
            &QualityMultipliers::default(),
        );
        let without = derive_stats(
            &inputs(&base, &allocated, &growth, &[]),
            &QualityMultipliers::default(),
        );
        assert_eq!(with_ore, without);
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let base = BaseAttributes::new(13, 7, 11, 9, 17);
        let allocated = AllocatedPoints::new(1, 0, 3, 0, 2);
        let growth = GrowthRates::new(1.3, 0.7, 1.1, 0.9, 0.33);
        let gear = [
            Item::equipment(ItemId(5), "Rune", SlotType::Rune)
                .with_effect(ItemEffect::percent(StatKey::Derived(DerivedAttribute::CritRate), 7.5))
                .with_effect(ItemEffect::percent(StatKey::Core(CoreAttribute::Luck), 3.3)),
        ];
        let mut input = inputs(&base, &allocated, &growth, &gear);
        input.level = 37;
        input.quality = QualityTier::Epic;

        let first = derive_stats(&input, &QualityMultipliers::default());
        for _ in 0..10 {
            let again = derive_stats(&input, &QualityMultipliers::default());
            for attr in DerivedAttribute::ALL {
                assert_eq!(first.derived.get(attr).to_bits(), again.derived.get(attr).to_bits());
            }
            assert_eq!(first.combat_power, again.combat_power);
        }
    }
}
