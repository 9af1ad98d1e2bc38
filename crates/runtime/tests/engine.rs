//! Runtime behaviour through the async handle.

use std::sync::Arc;
use std::time::Duration;

use summon_content::{ItemCatalog, TemplateCatalog};
use summon_core::{
    AttributeRange, AttributeSet, BaseAttributes, CreatureId, CreatureTemplate, DerivedAttribute,
    EngineConfig, EngineEvent, EquipmentService, ErrorSeverity, EngineError, Item, ItemEffect,
    ItemId, QualityTier, RelationSnapshot, SlotType, StatKey, TemplateId,
};
use summon_runtime::{
    FileRelationRepository, InMemoryRelationRepository, PersistenceConfig, RelationRepository,
    Runtime, RuntimeConfig, RuntimeError, Topic,
};

const IMP: TemplateId = TemplateId(1);

fn sword(id: u32, attack: f64) -> Item {
    Item::equipment(ItemId(id), format!("Sword {id}"), SlotType::Weapon).with_effect(
        ItemEffect::flat(StatKey::Derived(DerivedAttribute::PhysicalAttack), attack),
    )
}

fn templates() -> TemplateCatalog {
    TemplateCatalog::from_templates([CreatureTemplate::new(
        IMP,
        "Imp",
        AttributeSet::from_fn(|_| AttributeRange::new(1, 40)),
        AttributeSet::from_fn(|_| 0.5),
    )])
}

fn base() -> BaseAttributes {
    BaseAttributes::new(10, 15, 5, 10, 10)
}

fn service() -> EquipmentService<ItemCatalog> {
    let items = ItemCatalog::from_items([sword(1, 10.0), sword(2, 20.0)]);
    EquipmentService::new(EngineConfig::default(), items).unwrap()
}

#[tokio::test]
async fn commands_round_trip_through_the_handle() {
    let runtime = Runtime::builder(service(), templates()).build().await.unwrap();
    let handle = runtime.handle();

    let c1 = handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap();
    let c2 = handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap();
    handle.equip_item(ItemId(1), c1).await.unwrap();

    let conflict = handle.equip_item(ItemId(1), c2).await.unwrap_err();
    assert_eq!(conflict.severity(), ErrorSeverity::Recoverable);
    assert!(matches!(conflict, RuntimeError::Equip(_)));

    handle.confirm_equip(ItemId(1), c2).await.unwrap();
    assert!(handle.creature_equipment(c1).await.unwrap().is_empty());
    assert_eq!(
        handle.item_relation(ItemId(1)).await.unwrap().map(|r| r.creature),
        Some(c2)
    );
    assert_eq!(handle.creatures_by_power().await.unwrap(), vec![c2, c1]);
    assert!(handle.validate_consistency().await.unwrap().is_consistent);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn subscribers_receive_topic_events() {
    let runtime = Runtime::builder(service(), templates()).build().await.unwrap();
    let handle = runtime.handle();
    let mut equipment = handle.subscribe(Topic::Equipment);
    let mut stats = handle.subscribe(Topic::Stats);

    let c1 = handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap();
    handle.equip_item(ItemId(2), c1).await.unwrap();

    assert_eq!(
        equipment.recv().await.unwrap(),
        EngineEvent::ItemEquipped {
            item: ItemId(2),
            creature: c1,
            slot: SlotType::Weapon,
        }
    );
    // Created, then EquipmentChanged.
    assert!(matches!(stats.recv().await.unwrap(), EngineEvent::StatsRecomputed { .. }));
    assert!(matches!(stats.recv().await.unwrap(), EngineEvent::StatsRecomputed { .. }));

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn concurrent_clients_never_double_equip() {
    let runtime = Runtime::builder(service(), templates()).build().await.unwrap();
    let handle = runtime.handle();
    let mut creatures = Vec::new();
    for _ in 0..4 {
        creatures.push(handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap());
    }

    let tasks: Vec<_> = creatures
        .iter()
        .map(|&creature| {
            let handle = handle.clone();
            tokio::spawn(async move { handle.confirm_equip(ItemId(1), creature).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let snapshot = handle.export_relations().await.unwrap();
    assert_eq!(snapshot.relations.len(), 1);
    assert!(handle.validate_consistency().await.unwrap().is_consistent);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn shutdown_saves_and_build_restores() {
    let repository = Arc::new(InMemoryRelationRepository::new());

    let runtime = Runtime::builder(service(), templates())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let c1 = handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap();
    handle.equip_item(ItemId(2), c1).await.unwrap();
    drop(handle);
    runtime.shutdown().await.unwrap();

    let saved = repository.load().unwrap().unwrap();
    assert_eq!(saved.relations.len(), 1);

    // A fresh service with the same creature picks the relation back up.
    let mut restored = service();
    let id = restored
        .create_creature(&templates(), IMP, QualityTier::Common, base())
        .unwrap();
    assert_eq!(id, c1);
    let runtime = Runtime::builder(restored, templates())
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    assert_eq!(
        handle.item_relation(ItemId(2)).await.unwrap().map(|r| r.creature),
        Some(c1)
    );
    let creature = handle.creature(c1).await.unwrap().unwrap();
    assert_eq!(creature.equipment_contribution().physical_attack, 20.0);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn background_persistence_debounces_changes() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(FileRelationRepository::in_dir(dir.path()).unwrap());
    let config = RuntimeConfig::default()
        .with_persistence(PersistenceConfig::new(Duration::from_millis(20)));

    let runtime = Runtime::builder(service(), templates())
        .config(config)
        .repository(repository.clone())
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let c1 = handle.create_creature(IMP, QualityTier::Common, base()).await.unwrap();
    handle.equip_item(ItemId(1), c1).await.unwrap();
    handle.equip_item(ItemId(2), c1).await.unwrap();

    let mut saved = None;
    for _ in 0..50 {
        tokio::time::sleep(Duration::from_millis(20)).await;
        saved = repository.load().unwrap();
        if saved.as_ref().is_some_and(|s| s.relations.len() == 1 && s.relations[0].item == ItemId(2)) {
            break;
        }
    }
    let saved = saved.unwrap();
    assert_eq!(saved.relations[0].item, ItemId(2));
    assert_eq!(saved.relations[0].creature, c1);

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn corrupted_snapshots_are_repaired_on_restore() {
    let mut snapshot = {
        let mut seeded = service();
        let c1 = seeded
            .create_creature(&templates(), IMP, QualityTier::Common, base())
            .unwrap();
        seeded.equip_item(ItemId(1), c1).unwrap();
        seeded.export_relations()
    };
    snapshot.loadouts.clear();
    let repository = Arc::new(InMemoryRelationRepository::with_snapshot(snapshot));

    let mut restored = service();
    restored
        .create_creature(&templates(), IMP, QualityTier::Common, base())
        .unwrap();
    let runtime = Runtime::builder(restored, templates())
        .repository(repository)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();

    assert!(handle.validate_consistency().await.unwrap().is_consistent);
    assert_eq!(
        handle.creature_equipment(CreatureId(1)).await.unwrap().get(&SlotType::Weapon),
        Some(&ItemId(1))
    );

    drop(handle);
    runtime.shutdown().await.unwrap();
}

#[tokio::test]
async fn cloned_handles_share_one_worker() {
    let runtime = Runtime::builder(service(), templates())
        .restore_on_build(false)
        .build()
        .await
        .unwrap();
    let handle = runtime.handle();
    let clone = handle.clone();

    let c1 = handle.create_creature(IMP, QualityTier::Rare, base()).await.unwrap();
    drop(handle);

    assert!(clone.creature(c1).await.unwrap().is_some());
    let snapshot: RelationSnapshot = clone.export_relations().await.unwrap();
    assert!(snapshot.is_empty());

    drop(clone);
    runtime.shutdown().await.unwrap();
}
