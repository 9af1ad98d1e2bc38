//! The equipment service: the single entry point for equipment changes.
//!
//! The service sequences relation index updates, item storage hand-offs, and
//! creature recomputes, then delivers the resulting events to observers before
//! returning. It performs no locking. Hosts with real parallelism serialize
//! access to it (see `summon-runtime`'s engine worker), because a multi-step
//! sequence observed mid-flight is a genuinely inconsistent state.
mod outcome;

pub use outcome::{DropReason, ImportReport, RemovedCreature};

use std::collections::{BTreeMap, BTreeSet};

use crate::config::{ConfigError, EngineConfig};
use crate::creature::{Creature, CreatureRegistry, LevelUpOutcome, RegistryError};
use crate::env::{CreatureOracle, ItemOracle, ItemStorage, RngOracle, TemplateOracle};
use crate::events::{EngineEvent, EngineObserver};
use crate::ids::{CreatureId, ItemId, SkillId, TemplateId};
use crate::item::{Item, QualityTier, SlotType};
use crate::relation::{
    ConsistencyReport, EquipError, EquipOutcome, Relation, RelationIndex, RelationSnapshot,
    RepairAction, RepairReport, SwapOutcome,
};
use crate::stats::{BaseAttributes, CoreAttribute};

/// Orchestrates the relation index, the creature registry, and item storage.
pub struct EquipmentService<S> {
    index: RelationIndex,
    registry: CreatureRegistry,
    storage: S,
    observers: Vec<Box<dyn EngineObserver + Send>>,
}

impl<S: ItemStorage> EquipmentService<S> {
    /// Creates a service with an empty index and registry.
    pub fn new(config: EngineConfig, storage: S) -> Result<Self, ConfigError> {
        Ok(Self {
            index: RelationIndex::new(),
            registry: CreatureRegistry::new(config)?,
            storage,
            observers: Vec::new(),
        })
    }

    /// Registers an observer for every subsequent event.
    pub fn subscribe(&mut self, observer: impl EngineObserver + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &EngineConfig {
        self.registry.config()
    }

    pub fn index(&self) -> &RelationIndex {
        &self.index
    }

    pub fn registry(&self) -> &CreatureRegistry {
        &self.registry
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Mutable storage access for stocking items. Do not use it to move
    /// equipped items; go through the service instead.
    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn creature(&self, id: CreatureId) -> Option<&Creature> {
        self.registry.creature(id)
    }

    pub fn creature_equipment(&self, id: CreatureId) -> BTreeMap<SlotType, ItemId> {
        self.index.creature_equipment(id)
    }

    pub fn item_relation(&self, item: ItemId) -> Option<Relation> {
        self.index.item_relation(item)
    }

    pub fn is_item_equipped(&self, item: ItemId) -> bool {
        self.index.is_item_equipped(item)
    }

    // ========================================================================
    // Equipment
    // ========================================================================

    /// Equips `item` on `creature`.
    ///
    /// The creature's own slot occupant is displaced automatically and returned
    /// to storage. An item worn by a different creature is not moved; the call
    /// fails with [`EquipError::CrossCreatureConflict`] and the caller may
    /// follow up with [`Self::confirm_equip`].
    pub fn equip_item(&mut self, item: ItemId, creature: CreatureId) -> Result<EquipOutcome, EquipError> {
        self.equip_inner(item, creature, None, false)
    }

    /// Equips `item` on `creature`, taking it from another creature if needed.
    pub fn confirm_equip(&mut self, item: ItemId, creature: CreatureId) -> Result<EquipOutcome, EquipError> {
        self.equip_inner(item, creature, None, true)
    }

    /// [`Self::equip_item`] addressed at a specific slot.
    ///
    /// Fails with [`EquipError::SlotTypeMismatch`] when the item does not fit
    /// `slot`.
    pub fn equip_item_to_slot(
        &mut self,
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    ) -> Result<EquipOutcome, EquipError> {
        self.equip_inner(item, creature, Some(slot), false)
    }

    fn equip_inner(
        &mut self,
        item: ItemId,
        creature: CreatureId,
        expected_slot: Option<SlotType>,
        confirmed: bool,
    ) -> Result<EquipOutcome, EquipError> {
        let record = self.storage.item(item).ok_or(EquipError::ItemNotFound(item))?;
        let slot = record.slot.ok_or(EquipError::ItemNotEquipment(item))?;
        if !self.registry.exists(creature) {
            return Err(EquipError::CreatureNotFound(creature));
        }
        if let Some(expected) = expected_slot
            && expected != slot
        {
            return Err(EquipError::SlotTypeMismatch {
                item,
                expected,
                actual: slot,
            });
        }
        if !confirmed
            && let Some(owner) = self.index.owner(item)
            && owner != creature
        {
            tracing::debug!(target: "summon::service", %item, %owner, target = %creature, "cross-creature conflict");
            return Err(EquipError::CrossCreatureConflict {
                item,
                owner,
                target: creature,
                slot,
            });
        }

        let mut outcome = self.index.equip(&self.storage, item, creature)?;
        if !outcome.already_equipped {
            if outcome.moved_from.is_none() {
                self.storage.withdraw(&record);
            }
            if let Some(displaced) = outcome.displaced
                && !self.release_to_storage(displaced.item)
            {
                outcome.unstored = Some(displaced.item);
            }
            for affected in outcome.affected_creatures() {
                self.refresh_loadout(affected);
            }
        }

        self.dispatch();
        Ok(outcome)
    }

    /// Unequips `item` from `creature` and returns it to storage.
    ///
    /// Fails with [`EquipError::NoPriorRelation`] if the item is not equipped
    /// on that creature, and with [`EquipError::StorageRefused`] if storage
    /// cannot take it back. Nothing changes on failure.
    pub fn unequip_item(
        &mut self,
        item: ItemId,
        creature: CreatureId,
    ) -> Result<Relation, EquipError> {
        let relation = self
            .index
            .item_relation(item)
            .filter(|relation| relation.creature == creature)
            .ok_or(EquipError::NoPriorRelation {
                creature,
                item: Some(item),
                slot: None,
            })?;
        self.ensure_storable(creature, &[item])?;
        self.index.unequip(item, creature);
        self.release_to_storage(item);
        self.refresh_loadout(creature);
        self.dispatch();
        Ok(relation)
    }

    /// Unequips whatever `creature` wears in `slot`.
    pub fn unequip_from_slot(
        &mut self,
        creature: CreatureId,
        slot: SlotType,
    ) -> Result<Relation, EquipError> {
        let missing = EquipError::NoPriorRelation {
            creature,
            item: None,
            slot: Some(slot),
        };
        let item = self
            .index
            .equipped_item(creature, slot)
            .ok_or_else(|| missing.clone())?;
        self.ensure_storable(creature, &[item])?;
        let relation = self.index.unequip_slot(creature, slot).ok_or(missing)?;
        self.release_to_storage(relation.item);
        self.refresh_loadout(creature);
        self.dispatch();
        Ok(relation)
    }

    /// Exchanges the items two creatures wear in `slot`.
    pub fn swap_equipment(
        &mut self,
        first: CreatureId,
        second: CreatureId,
        slot: SlotType,
    ) -> Result<SwapOutcome, EquipError> {
        for creature in [first, second] {
            if !self.registry.exists(creature) {
                return Err(EquipError::CreatureNotFound(creature));
            }
        }
        let outcome = self.index.swap(first, second, slot)?;
        if first != second {
            self.refresh_loadout(first);
            self.refresh_loadout(second);
        }
        self.dispatch();
        Ok(outcome)
    }

    /// Unequips everything `creature` wears and returns it to storage.
    ///
    /// All or nothing: fails with [`EquipError::StorageRefused`] when storage
    /// cannot take every item back.
    pub fn remove_all_equipment_for_creature(
        &mut self,
        creature: CreatureId,
    ) -> Result<Vec<ItemId>, EquipError> {
        if !self.registry.exists(creature) {
            return Err(EquipError::CreatureNotFound(creature));
        }
        let worn: Vec<ItemId> = self.index.creature_equipment(creature).into_values().collect();
        self.ensure_storable(creature, &worn)?;
        let released = self.index.remove_all_for_creature(creature);
        for item in &released {
            self.release_to_storage(*item);
        }
        self.refresh_loadout(creature);
        self.dispatch();
        Ok(released)
    }

    // ========================================================================
    // Creatures
    // ========================================================================

    pub fn create_creature<T>(
        &mut self,
        templates: &T,
        template: TemplateId,
        quality: QualityTier,
        base: BaseAttributes,
    ) -> Result<CreatureId, RegistryError>
    where
        T: TemplateOracle + ?Sized,
    {
        let id = self.registry.create(templates, template, quality, base)?;
        self.dispatch();
        Ok(id)
    }

    pub fn spawn_creature<T, R>(
        &mut self,
        templates: &T,
        template: TemplateId,
        quality: QualityTier,
        rng: &R,
        world_seed: u64,
    ) -> Result<CreatureId, RegistryError>
    where
        T: TemplateOracle + ?Sized,
        R: RngOracle + ?Sized,
    {
        let id = self
            .registry
            .spawn(templates, template, quality, rng, world_seed)?;
        self.dispatch();
        Ok(id)
    }

    /// Releases every relation of `creature`, then removes it.
    ///
    /// Removal never fails on a full store; items storage refused are listed
    /// in [`RemovedCreature::unstored`].
    pub fn remove_creature(
        &mut self,
        creature: CreatureId,
    ) -> Result<RemovedCreature, RegistryError> {
        if !self.registry.exists(creature) {
            return Err(RegistryError::CreatureNotFound(creature));
        }
        let released = self.index.remove_all_for_creature(creature);
        let unstored: Vec<ItemId> = released
            .iter()
            .copied()
            .filter(|item| !self.release_to_storage(*item))
            .collect();
        self.registry.apply_loadout(creature, Vec::new())?;
        let removed = self.registry.remove(creature)?;

        tracing::info!(
            target: "summon::service",
            %creature,
            released = released.len(),
            unstored = unstored.len(),
            "creature removed"
        );
        self.dispatch();
        Ok(RemovedCreature {
            creature: removed,
            released,
            unstored,
        })
    }

    pub fn level_up(&mut self, creature: CreatureId, experience: u64) -> Result<LevelUpOutcome, RegistryError> {
        let outcome = self.registry.level_up(creature, experience)?;
        self.dispatch();
        Ok(outcome)
    }

    pub fn allocate_points(
        &mut self,
        creature: CreatureId,
        attribute: CoreAttribute,
        amount: u32,
    ) -> Result<(), RegistryError> {
        self.registry.allocate_points(creature, attribute, amount)?;
        self.dispatch();
        Ok(())
    }

    pub fn allocate_points_by_name(
        &mut self,
        creature: CreatureId,
        attribute: &str,
        amount: u32,
    ) -> Result<(), RegistryError> {
        self.registry
            .allocate_points_by_name(creature, attribute, amount)?;
        self.dispatch();
        Ok(())
    }

    pub fn reset_allocated_points(&mut self, creature: CreatureId) -> Result<u32, RegistryError> {
        let returned = self.registry.reset_allocated_points(creature)?;
        self.dispatch();
        Ok(returned)
    }

    pub fn learn_skill(
        &mut self,
        creature: CreatureId,
        skill: SkillId,
        replace_index: Option<usize>,
    ) -> Result<Option<SkillId>, RegistryError> {
        self.registry.learn_skill(creature, skill, replace_index)
    }

    pub fn forget_skill(&mut self, creature: CreatureId, skill: SkillId) -> Result<usize, RegistryError> {
        self.registry.forget_skill(creature, skill)
    }

    // ========================================================================
    // Consistency and persistence
    // ========================================================================

    pub fn validate_consistency(&mut self) -> ConsistencyReport {
        let report = self.index.validate_consistency();
        self.dispatch();
        report
    }

    /// Repairs the relation index (forward map wins), returns released items
    /// to storage, and refreshes every creature the repair touched.
    pub fn repair_consistency(&mut self) -> RepairReport {
        let report = self.index.repair_consistency();
        self.settle_repair(&report);
        self.dispatch();
        report
    }

    fn settle_repair(&mut self, report: &RepairReport) {
        for relation in &report.released {
            self.release_to_storage(relation.item);
        }
        let affected: BTreeSet<CreatureId> = report
            .actions
            .iter()
            .map(|action| match action {
                RepairAction::ReleasedConflictingRelation { relation, .. } => relation.creature,
                RepairAction::RemovedReverseEntry { creature, .. }
                | RepairAction::RestoredReverseEntry { creature, .. } => *creature,
            })
            .collect();
        for creature in affected {
            self.refresh_loadout(creature);
        }
    }

    pub fn export_relations(&self) -> RelationSnapshot {
        self.index.export_relations()
    }

    /// Replaces all relations with `snapshot`.
    ///
    /// Relations naming an unknown item, a non-equipment item, a slot the item
    /// does not fit, or an unknown creature are dropped. The rest is loaded
    /// as-is, validated, and repaired if the maps disagree. Items leaving or
    /// entering the equipped set are handed to or taken from storage, and
    /// every creature's loadout is refreshed.
    pub fn import_relations(&mut self, mut snapshot: RelationSnapshot) -> ImportReport {
        let previously_equipped: BTreeSet<ItemId> = self.index.relations().map(|r| r.item).collect();

        let mut dropped = Vec::new();
        snapshot.relations.retain(|relation| {
            match self.import_verdict(relation.item, relation.creature, relation.slot) {
                Some(reason) => {
                    dropped.push((*relation, reason));
                    false
                }
                None => true,
            }
        });
        let loadouts_before = snapshot.loadouts.len();
        snapshot
            .loadouts
            .retain(|entry| self.import_verdict(entry.item, entry.creature, entry.slot).is_none());
        let dropped_loadouts = loadouts_before - snapshot.loadouts.len();

        if !dropped.is_empty() || dropped_loadouts > 0 {
            tracing::warn!(
                target: "summon::service",
                relations = dropped.len(),
                loadouts = dropped_loadouts,
                "dropped unusable relations from snapshot"
            );
        }

        let imported = snapshot.relations.len();
        self.index.import_relations(snapshot);

        let validation = self.index.validate_consistency();
        let repair = (!validation.is_consistent).then(|| self.index.repair_consistency());

        let now_equipped: BTreeSet<ItemId> = self.index.relations().map(|r| r.item).collect();
        for item in previously_equipped.difference(&now_equipped) {
            self.release_to_storage(*item);
        }
        for item in now_equipped.difference(&previously_equipped) {
            if let Some(record) = self.storage.item(*item) {
                self.storage.withdraw(&record);
            }
        }
        for creature in self.registry.ids() {
            self.refresh_loadout(creature);
        }

        tracing::info!(
            target: "summon::service",
            imported,
            dropped = dropped.len(),
            repaired = repair.is_some(),
            "relations imported"
        );
        self.dispatch();

        ImportReport {
            imported,
            dropped,
            dropped_loadouts,
            validation,
            repair,
        }
    }

    fn import_verdict(
        &self,
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    ) -> Option<DropReason> {
        let Some(record) = self.storage.item(item) else {
            return Some(DropReason::UnknownItem);
        };
        let Some(item_slot) = record.slot else {
            return Some(DropReason::NotEquipment);
        };
        if slot != item_slot {
            return Some(DropReason::SlotMismatch);
        }
        if !self.registry.exists(creature) {
            return Some(DropReason::UnknownCreature);
        }
        None
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Fails unless storage can take back every item in `items`.
    fn ensure_storable(&self, creature: CreatureId, items: &[ItemId]) -> Result<(), EquipError> {
        let records: Vec<Item> = items.iter().filter_map(|item| self.storage.item(*item)).collect();
        if records.len() == items.len() && self.storage.can_store(&records) {
            return Ok(());
        }
        tracing::debug!(target: "summon::service", %creature, count = items.len(), "storage refused unequip");
        Err(EquipError::StorageRefused {
            creature,
            items: items.to_vec(),
        })
    }

    /// Hands `item` back to storage. Returns false if storage refused it.
    fn release_to_storage(&mut self, item: ItemId) -> bool {
        let Some(record) = self.storage.item(item) else {
            tracing::warn!(target: "summon::service", %item, "released item unknown to storage");
            return false;
        };
        let accepted = self.storage.return_to_storage(&record);
        if !accepted {
            tracing::warn!(target: "summon::service", %item, "storage refused returned item");
        }
        accepted
    }

    /// Pushes the creature's current equipment snapshot into the registry.
    fn refresh_loadout(&mut self, creature: CreatureId) {
        let items: Vec<Item> = self
            .index
            .creature_equipment(creature)
            .values()
            .filter_map(|item| self.storage.item(*item))
            .collect();
        if let Err(err) = self.registry.apply_loadout(creature, items) {
            tracing::debug!(target: "summon::service", %creature, %err, "loadout refresh skipped");
        }
    }

    /// Delivers queued index events, then registry events, to every observer.
    fn dispatch(&mut self) {
        let mut events: Vec<EngineEvent> = self.index.drain_events();
        events.extend(self.registry.drain_events());
        if events.is_empty() {
            return;
        }
        tracing::trace!(target: "summon::service", count = events.len(), "dispatching events");
        for event in &events {
            for observer in &mut self.observers {
                observer.notify(event);
            }
        }
    }
}
