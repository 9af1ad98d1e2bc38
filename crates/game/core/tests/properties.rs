//! Property-based tests for relation and progression invariants.
//!
//! Random operation sequences run through the equipment service; after every
//! step both relation maps must agree, no item may be equipped twice, no slot
//! may hold two items, and every creature's stat cache must equal a fresh
//! pipeline evaluation.

mod common;

use std::collections::BTreeSet;

use proptest::prelude::*;

use common::{IMP, Templates, gear, service_with, weapon};
use summon_core::{
    AllocatedPoints, BaseAttributes, CoreAttribute, CreatureId, EngineConfig, GrowthRates, Item,
    ItemEffect, ItemId, LoadoutEntry, QualityMultipliers, QualityTier, Relation, RelationIndex,
    RelationSnapshot, SlotType, StatInputs, StatKey, Tick, derive_stats,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

const SLOTS: [SlotType; 3] = [SlotType::Weapon, SlotType::Armor, SlotType::Rune];
const CREATURES: usize = 3;

#[derive(Clone, Debug)]
enum Op {
    Equip(u32, usize),
    Confirm(u32, usize),
    Unequip(u32, usize),
    UnequipSlot(usize, usize),
    Swap(usize, usize, usize),
    RemoveAll(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (1u32..=8, 0..CREATURES).prop_map(|(i, c)| Op::Equip(i, c)),
        (1u32..=8, 0..CREATURES).prop_map(|(i, c)| Op::Confirm(i, c)),
        (1u32..=8, 0..CREATURES).prop_map(|(i, c)| Op::Unequip(i, c)),
        (0..CREATURES, 0..SLOTS.len()).prop_map(|(c, s)| Op::UnequipSlot(c, s)),
        (0..CREATURES, 0..CREATURES, 0..SLOTS.len()).prop_map(|(a, b, s)| Op::Swap(a, b, s)),
        (0..CREATURES).prop_map(Op::RemoveAll),
    ]
}

fn stock() -> Vec<Item> {
    (1..=8)
        .map(|id| match id % 3 {
            0 => weapon(id, f64::from(id)),
            1 => gear(id, SlotType::Armor).with_effect(ItemEffect::percent(
                StatKey::Core(CoreAttribute::Constitution),
                f64::from(id) * 2.5,
            )),
            _ => gear(id, SlotType::Rune),
        })
        .collect()
}

fn arb_relation() -> impl Strategy<Value = Relation> {
    (1u32..=6, 1u32..=3, 0..SLOTS.len(), 0u64..5).prop_map(|(item, creature, slot, tick)| {
        Relation::new(ItemId(item), CreatureId(creature), SLOTS[slot], Tick(tick))
    })
}

fn arb_loadout() -> impl Strategy<Value = LoadoutEntry> {
    (1u32..=6, 1u32..=3, 0..SLOTS.len()).prop_map(|(item, creature, slot)| LoadoutEntry {
        creature: CreatureId(creature),
        slot: SLOTS[slot],
        item: ItemId(item),
    })
}

fn arb_base() -> impl Strategy<Value = BaseAttributes> {
    (1u32..40, 1u32..40, 1u32..40, 1u32..40, 1u32..40)
        .prop_map(|(c, s, a, i, l)| BaseAttributes::new(c, s, a, i, l))
}

fn arb_quality() -> impl Strategy<Value = QualityTier> {
    (0usize..5).prop_map(|i| QualityTier::ALL[i])
}

// ---------------------------------------------------------------------------
// Property: relation invariants hold after any operation sequence
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn relation_invariants_hold(ops in prop::collection::vec(arb_op(), 1..40)) {
        let (mut service, ids) = service_with(stock(), CREATURES);

        for op in ops {
            let _ = match op {
                Op::Equip(item, c) => service.equip_item(ItemId(item), ids[c]).map(|_| ()),
                Op::Confirm(item, c) => service.confirm_equip(ItemId(item), ids[c]).map(|_| ()),
                Op::Unequip(item, c) => service.unequip_item(ItemId(item), ids[c]).map(|_| ()),
                Op::UnequipSlot(c, s) => service.unequip_from_slot(ids[c], SLOTS[s]).map(|_| ()),
                Op::Swap(a, b, s) => service.swap_equipment(ids[a], ids[b], SLOTS[s]).map(|_| ()),
                Op::RemoveAll(c) => service.remove_all_equipment_for_creature(ids[c]).map(|_| ()),
            };

            prop_assert!(service.index().check_consistency().is_consistent);

            let mut seen = BTreeSet::new();
            for &creature in &ids {
                for item in service.creature_equipment(creature).values() {
                    prop_assert!(seen.insert(*item), "item {} equipped twice", item);
                }
            }

            let mut occupied = BTreeSet::new();
            for relation in service.index().relations() {
                prop_assert!(occupied.insert((relation.creature, relation.slot)));
            }

            for &creature in &ids {
                let cached = service.creature(creature).unwrap();
                let mut equipped: Vec<Item> = service
                    .creature_equipment(creature)
                    .values()
                    .filter_map(|item| service.storage().items.get(item).cloned())
                    .collect();
                equipped.sort_by_key(|item| item.id);
                let fresh = derive_stats(
                    &StatInputs { equipped: &equipped, ..cached.stat_inputs() },
                    &service.config().quality_multipliers,
                );
                prop_assert_eq!(cached.stats(), &fresh);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Property: repair converges in one pass
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn repair_is_idempotent(
        relations in prop::collection::vec(arb_relation(), 0..10),
        loadouts in prop::collection::vec(arb_loadout(), 0..10),
    ) {
        let mut index = RelationIndex::new();
        index.import_relations(RelationSnapshot { relations, loadouts });

        let first = index.repair_consistency();
        prop_assert!(first.after.is_consistent);
        let once = index.export_relations();

        let second = index.repair_consistency();
        prop_assert!(second.is_noop());
        prop_assert_eq!(index.export_relations(), once);
    }
}

// ---------------------------------------------------------------------------
// Property: points are conserved by allocation and reset
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn points_are_conserved(
        levels in 1u32..20,
        steps in prop::collection::vec((0usize..5, 0u32..8, any::<bool>()), 1..20),
    ) {
        let (mut service, ids) = service_with(Vec::new(), 1);
        let c1 = ids[0];
        let experience = service.config().experience.total_between(1, levels);
        service.level_up(c1, experience).unwrap();
        let budget = service.config().points_for_level(service.creature(c1).unwrap().level());

        for (attr, amount, reset) in steps {
            if reset {
                service.reset_allocated_points(c1).unwrap();
            } else {
                let _ = service.allocate_points(c1, CoreAttribute::ALL[attr], amount);
            }
            let creature = service.creature(c1).unwrap();
            prop_assert_eq!(creature.allocated().total() + creature.potential_points(), budget);
        }
    }
}

// ---------------------------------------------------------------------------
// Property: batched leveling equals sequential leveling
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn batched_leveling_matches_sequential(
        start in 1u32..30,
        gained in 1u32..6,
        base in arb_base(),
        quality in arb_quality(),
    ) {
        let (mut service, _) = service_with(Vec::new(), 0);
        let batched = service.create_creature(&Templates, IMP, quality, base).unwrap();
        let stepped = service.create_creature(&Templates, IMP, quality, base).unwrap();
        let curve = service.config().experience;

        for id in [batched, stepped] {
            service.level_up(id, curve.total_between(1, start)).unwrap();
        }
        service.level_up(batched, curve.total_between(start, start + gained)).unwrap();
        for level in start + 1..=start + gained {
            service.level_up(stepped, curve.threshold_for_level(level)).unwrap();
        }

        let a = service.creature(batched).unwrap();
        let b = service.creature(stepped).unwrap();
        prop_assert_eq!(a.level(), b.level());
        prop_assert_eq!(a.potential_points(), b.potential_points());
        prop_assert_eq!(a.experience(), b.experience());
        prop_assert_eq!(a.stats(), b.stats());
    }
}

// ---------------------------------------------------------------------------
// Property: the pipeline is a pure function
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn pipeline_is_bit_identical(
        base in arb_base(),
        allocated in (0u32..20, 0u32..20, 0u32..20, 0u32..20, 0u32..20),
        level in 1u32..100,
        quality in arb_quality(),
        bonus in -50.0f64..50.0,
    ) {
        let allocated = AllocatedPoints::new(allocated.0, allocated.1, allocated.2, allocated.3, allocated.4);
        let growth = GrowthRates::new(1.25, 0.75, 0.5, 1.0, 0.3);
        let items = vec![
            weapon(1, bonus),
            gear(2, SlotType::Armor)
                .with_effect(ItemEffect::percent(StatKey::Core(CoreAttribute::Strength), bonus)),
        ];
        let inputs = StatInputs {
            base: &base,
            allocated: &allocated,
            growth: &growth,
            level,
            quality,
            equipped: &items,
        };
        let multipliers = EngineConfig::default().quality_multipliers;

        let first = derive_stats(&inputs, &multipliers);
        let second = derive_stats(&inputs, &QualityMultipliers::DEFAULT);

        prop_assert_eq!(first.combat_power, second.combat_power);
        for attr in summon_core::DerivedAttribute::ALL {
            prop_assert_eq!(first.derived.get(attr).to_bits(), second.derived.get(attr).to_bits());
        }
    }
}
