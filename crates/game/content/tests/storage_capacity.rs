//! A bounded item catalog behind the equipment service.

use summon_content::{ItemCatalog, TemplateCatalog};
use summon_core::{
    AttributeRange, AttributeSet, BaseAttributes, CreatureId, CreatureTemplate, EngineConfig,
    EquipError, EquipmentService, GrowthRates, Item, ItemId, QualityTier, SlotType, TemplateId,
};

const IMP: TemplateId = TemplateId(1);

fn templates() -> TemplateCatalog {
    TemplateCatalog::from_templates([CreatureTemplate::new(
        IMP,
        "Imp",
        AttributeSet::from_fn(|_| AttributeRange::new(1, 40)),
        GrowthRates::new(1.0, 0.5, 0.5, 1.0, 0.25),
    )])
}

/// Weapons 1 and 2, armor 3; storage holds one item at most.
fn bounded_service() -> (EquipmentService<ItemCatalog>, TemplateCatalog) {
    let catalog = ItemCatalog::from_items([
        Item::equipment(ItemId(1), "Axe", SlotType::Weapon),
        Item::equipment(ItemId(2), "Spear", SlotType::Weapon),
        Item::equipment(ItemId(3), "Mail", SlotType::Armor),
    ])
    .with_capacity(1);
    let service = EquipmentService::new(EngineConfig::default(), catalog).unwrap();
    (service, templates())
}

fn create(service: &mut EquipmentService<ItemCatalog>, templates: &TemplateCatalog) -> CreatureId {
    service
        .create_creature(
            templates,
            IMP,
            QualityTier::Common,
            BaseAttributes::new(10, 10, 10, 10, 10),
        )
        .unwrap()
}

#[test]
fn full_storage_fails_unequips_without_changes() {
    let (mut service, templates) = bounded_service();
    let creature = create(&mut service, &templates);
    service.equip_item(ItemId(1), creature).unwrap();
    service.equip_item(ItemId(3), creature).unwrap();
    assert!(service.storage().in_storage(ItemId(2)));
    let stats = *service.creature(creature).unwrap().derived();

    let refused = EquipError::StorageRefused {
        creature,
        items: vec![ItemId(3)],
    };
    assert_eq!(service.unequip_item(ItemId(3), creature), Err(refused.clone()));
    assert_eq!(
        service.unequip_from_slot(creature, SlotType::Armor),
        Err(refused)
    );
    assert!(matches!(
        service.remove_all_equipment_for_creature(creature),
        Err(EquipError::StorageRefused { .. })
    ));

    assert!(service.is_item_equipped(ItemId(3)));
    assert_eq!(service.creature_equipment(creature).len(), 2);
    assert_eq!(service.creature(creature).unwrap().derived(), &stats);
    assert_eq!(service.storage().stored_count(), 1);
}

#[test]
fn unequip_succeeds_once_storage_has_room() {
    let (mut service, templates) = bounded_service();
    let creature = create(&mut service, &templates);
    service.equip_item(ItemId(3), creature).unwrap();
    service.equip_item(ItemId(1), creature).unwrap();
    service.equip_item(ItemId(2), creature).unwrap();

    // Spear went in, axe came back: storage holds the axe.
    assert!(service.storage().in_storage(ItemId(1)));
    assert!(service.unequip_item(ItemId(3), creature).is_err());

    let other = create(&mut service, &templates);
    service.equip_item(ItemId(1), other).unwrap();
    let relation = service.unequip_item(ItemId(3), creature).unwrap();
    assert_eq!(relation.item, ItemId(3));
    assert!(service.storage().in_storage(ItemId(3)));
}

#[test]
fn refused_returns_are_reported() {
    let (mut service, templates) = bounded_service();
    let first = create(&mut service, &templates);
    let second = create(&mut service, &templates);
    service.equip_item(ItemId(1), first).unwrap();
    service.equip_item(ItemId(2), second).unwrap();
    // storage: mail only, now full

    let outcome = service.confirm_equip(ItemId(2), first).unwrap();
    assert_eq!(outcome.displaced.map(|r| r.item), Some(ItemId(1)));
    assert_eq!(outcome.unstored, Some(ItemId(1)));
    assert!(!service.is_item_equipped(ItemId(1)));
    assert!(!service.storage().in_storage(ItemId(1)));

    let removed = service.remove_creature(first).unwrap();
    assert_eq!(removed.released, vec![ItemId(2)]);
    assert_eq!(removed.unstored, vec![ItemId(2)]);
    assert!(service.creature(first).is_none());
}
