//! Cloneable façade for issuing commands to the engine worker.
//!
//! [`EngineHandle`] hides channel plumbing and offers async helpers mirroring
//! the equipment service, plus topic subscriptions on the event bus.
use std::collections::{BTreeMap, HashMap};

use tokio::sync::{broadcast, mpsc, oneshot};

use summon_core::{
    BaseAttributes, ConsistencyReport, CoreAttribute, Creature, CreatureId, EngineEvent,
    EquipOutcome, ImportReport, ItemId, LevelUpOutcome, QualityTier, Relation, RelationSnapshot,
    RemovedCreature, RepairReport, SkillId, SlotType, SwapOutcome, TemplateId,
};

use super::errors::{Result, RuntimeError};
use crate::events::{EventBus, Topic};
use crate::workers::{Command, EquipMode};

/// Client-facing handle to interact with the engine
#[derive(Clone)]
pub struct EngineHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl EngineHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    // ===== equipment =====

    /// Equip an item into its own slot type.
    ///
    /// Fails with a recoverable cross-creature conflict when another creature
    /// wears the item; retry with [`Self::confirm_equip`] to move it.
    pub async fn equip_item(&self, item: ItemId, creature: CreatureId) -> Result<EquipOutcome> {
        self.equip(item, creature, EquipMode::Auto).await
    }

    pub async fn confirm_equip(&self, item: ItemId, creature: CreatureId) -> Result<EquipOutcome> {
        self.equip(item, creature, EquipMode::Confirmed).await
    }

    pub async fn equip_item_to_slot(
        &self,
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    ) -> Result<EquipOutcome> {
        self.equip(item, creature, EquipMode::Slot(slot)).await
    }

    async fn equip(&self, item: ItemId, creature: CreatureId, mode: EquipMode) -> Result<EquipOutcome> {
        self.request(|reply| Command::Equip {
            item,
            creature,
            mode,
            reply,
        })
        .await?
    }

    pub async fn unequip_item(&self, item: ItemId, creature: CreatureId) -> Result<Relation> {
        self.request(|reply| Command::Unequip {
            item,
            creature,
            reply,
        })
        .await?
    }

    pub async fn unequip_from_slot(&self, creature: CreatureId, slot: SlotType) -> Result<Relation> {
        self.request(|reply| Command::UnequipSlot {
            creature,
            slot,
            reply,
        })
        .await?
    }

    pub async fn swap_equipment(
        &self,
        first: CreatureId,
        second: CreatureId,
        slot: SlotType,
    ) -> Result<SwapOutcome> {
        self.request(|reply| Command::Swap {
            first,
            second,
            slot,
            reply,
        })
        .await?
    }

    pub async fn remove_all_equipment_for_creature(&self, creature: CreatureId) -> Result<Vec<ItemId>> {
        self.request(|reply| Command::RemoveAllEquipment { creature, reply })
            .await?
    }

    // ===== creatures =====

    pub async fn create_creature(
        &self,
        template: TemplateId,
        quality: QualityTier,
        base: BaseAttributes,
    ) -> Result<CreatureId> {
        self.request(|reply| Command::CreateCreature {
            template,
            quality,
            base,
            reply,
        })
        .await?
    }

    /// Create a creature with base attributes rolled from its template.
    pub async fn spawn_creature(
        &self,
        template: TemplateId,
        quality: QualityTier,
        world_seed: u64,
    ) -> Result<CreatureId> {
        self.request(|reply| Command::SpawnCreature {
            template,
            quality,
            world_seed,
            reply,
        })
        .await?
    }

    pub async fn remove_creature(&self, creature: CreatureId) -> Result<RemovedCreature> {
        self.request(|reply| Command::RemoveCreature { creature, reply })
            .await?
    }

    pub async fn level_up(&self, creature: CreatureId, experience: u64) -> Result<LevelUpOutcome> {
        self.request(|reply| Command::LevelUp {
            creature,
            experience,
            reply,
        })
        .await?
    }

    pub async fn allocate_points(
        &self,
        creature: CreatureId,
        attribute: CoreAttribute,
        amount: u32,
    ) -> Result<()> {
        self.request(|reply| Command::AllocatePoints {
            creature,
            attribute,
            amount,
            reply,
        })
        .await?
    }

    pub async fn reset_allocated_points(&self, creature: CreatureId) -> Result<u32> {
        self.request(|reply| Command::ResetPoints { creature, reply })
            .await?
    }

    pub async fn learn_skill(
        &self,
        creature: CreatureId,
        skill: SkillId,
        replace_index: Option<usize>,
    ) -> Result<Option<SkillId>> {
        self.request(|reply| Command::LearnSkill {
            creature,
            skill,
            replace_index,
            reply,
        })
        .await?
    }

    pub async fn forget_skill(&self, creature: CreatureId, skill: SkillId) -> Result<usize> {
        self.request(|reply| Command::ForgetSkill {
            creature,
            skill,
            reply,
        })
        .await?
    }

    // ===== consistency and persistence =====

    pub async fn validate_consistency(&self) -> Result<ConsistencyReport> {
        self.request(|reply| Command::ValidateConsistency { reply })
            .await
    }

    pub async fn repair_consistency(&self) -> Result<RepairReport> {
        self.request(|reply| Command::RepairConsistency { reply })
            .await
    }

    pub async fn export_relations(&self) -> Result<RelationSnapshot> {
        self.request(|reply| Command::ExportRelations { reply })
            .await
    }

    pub async fn import_relations(&self, snapshot: RelationSnapshot) -> Result<ImportReport> {
        self.request(|reply| Command::ImportRelations { snapshot, reply })
            .await
    }

    // ===== queries =====

    /// Clone of a live creature, `None` if unknown or removed.
    pub async fn creature(&self, creature: CreatureId) -> Result<Option<Creature>> {
        self.request(|reply| Command::QueryCreature { creature, reply })
            .await
    }

    pub async fn creature_equipment(&self, creature: CreatureId) -> Result<BTreeMap<SlotType, ItemId>> {
        self.request(|reply| Command::QueryEquipment { creature, reply })
            .await
    }

    pub async fn item_relation(&self, item: ItemId) -> Result<Option<Relation>> {
        self.request(|reply| Command::QueryItem { item, reply })
            .await
    }

    /// Live creature ids by descending combat power.
    pub async fn creatures_by_power(&self) -> Result<Vec<CreatureId>> {
        self.request(|reply| Command::QueryRanking { reply })
            .await
    }

    // ===== events =====

    /// Subscribe to events from a specific topic
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use summon_runtime::Topic;
    ///
    /// let mut stats_rx = handle.subscribe(Topic::Stats);
    /// while let Ok(event) = stats_rx.recv().await {
    ///     // React to recomputed stats
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<EngineEvent> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<EngineEvent>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
