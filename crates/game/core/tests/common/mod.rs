#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};

use summon_core::{
    AttributeRange, AttributeSet, BaseAttributes, CreatureId, CreatureTemplate, DerivedAttribute,
    EngineConfig, EquipmentService, GrowthRates, Item, ItemEffect, ItemId, ItemOracle,
    ItemStorage, QualityTier, SlotType, StatKey, TemplateId, TemplateOracle,
};

pub const IMP: TemplateId = TemplateId(1);

/// Item store that tracks which items sit in storage.
#[derive(Debug, Default)]
pub struct Bag {
    pub items: BTreeMap<ItemId, Item>,
    pub stored: BTreeSet<ItemId>,
    pub returned: Vec<ItemId>,
}

impl Bag {
    pub fn stock(&mut self, item: Item) {
        self.stored.insert(item.id);
        self.items.insert(item.id, item);
    }
}

impl ItemOracle for Bag {
    fn item(&self, id: ItemId) -> Option<Item> {
        self.items.get(&id).cloned()
    }
}

impl ItemStorage for Bag {
    fn return_to_storage(&mut self, item: &Item) -> bool {
        self.returned.push(item.id);
        self.stored.insert(item.id)
    }

    fn withdraw(&mut self, item: &Item) {
        self.stored.remove(&item.id);
    }
}

pub struct Templates;

impl TemplateOracle for Templates {
    fn template(&self, id: TemplateId) -> Option<CreatureTemplate> {
        (id == IMP).then(|| {
            CreatureTemplate::new(
                IMP,
                "Imp",
                AttributeSet::from_fn(|_| AttributeRange::new(1, 40)),
                GrowthRates::new(1.0, 0.5, 0.5, 1.0, 0.25),
            )
        })
    }
}

pub fn weapon(id: u32, physical_attack: f64) -> Item {
    Item::equipment(ItemId(id), format!("Weapon {id}"), SlotType::Weapon).with_effect(
        ItemEffect::flat(StatKey::Derived(DerivedAttribute::PhysicalAttack), physical_attack),
    )
}

pub fn gear(id: u32, slot: SlotType) -> Item {
    Item::equipment(ItemId(id), format!("Gear {id}"), slot)
}

/// Base rolls giving a physical attack of exactly 50 at level 1, Common.
pub fn fifty_attack() -> BaseAttributes {
    BaseAttributes::new(10, 15, 5, 10, 10)
}

/// A service stocked with the given items and `creatures` fresh imps.
pub fn service_with(items: Vec<Item>, creatures: usize) -> (EquipmentService<Bag>, Vec<CreatureId>) {
    let mut bag = Bag::default();
    for item in items {
        bag.stock(item);
    }
    let mut service = EquipmentService::new(EngineConfig::default(), bag).unwrap();
    let ids = (0..creatures)
        .map(|_| {
            service
                .create_creature(&Templates, IMP, QualityTier::Common, fifty_attack())
                .unwrap()
        })
        .collect();
    (service, ids)
}
