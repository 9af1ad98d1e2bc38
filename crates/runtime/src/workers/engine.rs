//! Engine worker that owns the authoritative [`EquipmentService`].
//!
//! Receives commands from [`crate::EngineHandle`] one at a time, runs them
//! against the service, and replies over a oneshot channel. Because every
//! mutation funnels through this single task, no two commands ever touch the
//! relation index or the registry concurrently.

use std::collections::BTreeMap;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use summon_core::{
    BaseAttributes, ConsistencyReport, CoreAttribute, Creature, CreatureId, EquipOutcome,
    EquipmentService, ImportReport, ItemId, ItemStorage, LevelUpOutcome, PcgRng, QualityTier,
    Relation, RelationSnapshot, RemovedCreature, RepairReport, SkillId, SlotType, SwapOutcome,
    TemplateId, TemplateOracle,
};

use crate::api::Result;

type Reply<T> = oneshot::Sender<Result<T>>;

/// How an equip request treats slot checks and cross-creature moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquipMode {
    /// Plain equip; a cross-creature move fails until confirmed.
    Auto,
    /// The caller confirmed moving the item away from its current owner.
    Confirmed,
    /// Equip into an explicit slot, which must match the item's slot type.
    Slot(SlotType),
}

/// Commands that can be sent to the engine worker
pub enum Command {
    Equip {
        item: ItemId,
        creature: CreatureId,
        mode: EquipMode,
        reply: Reply<EquipOutcome>,
    },
    Unequip {
        item: ItemId,
        creature: CreatureId,
        reply: Reply<Relation>,
    },
    UnequipSlot {
        creature: CreatureId,
        slot: SlotType,
        reply: Reply<Relation>,
    },
    Swap {
        first: CreatureId,
        second: CreatureId,
        slot: SlotType,
        reply: Reply<SwapOutcome>,
    },
    RemoveAllEquipment {
        creature: CreatureId,
        reply: Reply<Vec<ItemId>>,
    },
    CreateCreature {
        template: TemplateId,
        quality: QualityTier,
        base: BaseAttributes,
        reply: Reply<CreatureId>,
    },
    SpawnCreature {
        template: TemplateId,
        quality: QualityTier,
        world_seed: u64,
        reply: Reply<CreatureId>,
    },
    RemoveCreature {
        creature: CreatureId,
        reply: Reply<RemovedCreature>,
    },
    LevelUp {
        creature: CreatureId,
        experience: u64,
        reply: Reply<LevelUpOutcome>,
    },
    AllocatePoints {
        creature: CreatureId,
        attribute: CoreAttribute,
        amount: u32,
        reply: Reply<()>,
    },
    ResetPoints {
        creature: CreatureId,
        reply: Reply<u32>,
    },
    LearnSkill {
        creature: CreatureId,
        skill: SkillId,
        replace_index: Option<usize>,
        reply: Reply<Option<SkillId>>,
    },
    ForgetSkill {
        creature: CreatureId,
        skill: SkillId,
        reply: Reply<usize>,
    },
    ValidateConsistency {
        reply: oneshot::Sender<ConsistencyReport>,
    },
    RepairConsistency {
        reply: oneshot::Sender<RepairReport>,
    },
    ExportRelations {
        reply: oneshot::Sender<RelationSnapshot>,
    },
    ImportRelations {
        snapshot: RelationSnapshot,
        reply: oneshot::Sender<ImportReport>,
    },
    QueryCreature {
        creature: CreatureId,
        reply: oneshot::Sender<Option<Creature>>,
    },
    QueryEquipment {
        creature: CreatureId,
        reply: oneshot::Sender<BTreeMap<SlotType, ItemId>>,
    },
    QueryItem {
        item: ItemId,
        reply: oneshot::Sender<Option<Relation>>,
    },
    QueryRanking {
        reply: oneshot::Sender<Vec<CreatureId>>,
    },
}

impl Command {
    /// Short name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Equip { .. } => "equip",
            Command::Unequip { .. } => "unequip",
            Command::UnequipSlot { .. } => "unequip_slot",
            Command::Swap { .. } => "swap",
            Command::RemoveAllEquipment { .. } => "remove_all_equipment",
            Command::CreateCreature { .. } => "create_creature",
            Command::SpawnCreature { .. } => "spawn_creature",
            Command::RemoveCreature { .. } => "remove_creature",
            Command::LevelUp { .. } => "level_up",
            Command::AllocatePoints { .. } => "allocate_points",
            Command::ResetPoints { .. } => "reset_points",
            Command::LearnSkill { .. } => "learn_skill",
            Command::ForgetSkill { .. } => "forget_skill",
            Command::ValidateConsistency { .. } => "validate_consistency",
            Command::RepairConsistency { .. } => "repair_consistency",
            Command::ExportRelations { .. } => "export_relations",
            Command::ImportRelations { .. } => "import_relations",
            Command::QueryCreature { .. } => "query_creature",
            Command::QueryEquipment { .. } => "query_equipment",
            Command::QueryItem { .. } => "query_item",
            Command::QueryRanking { .. } => "query_ranking",
        }
    }

    /// Returns true if the command may change the relation index.
    pub fn touches_relations(&self) -> bool {
        matches!(
            self,
            Command::Equip { .. }
                | Command::Unequip { .. }
                | Command::UnequipSlot { .. }
                | Command::Swap { .. }
                | Command::RemoveAllEquipment { .. }
                | Command::RemoveCreature { .. }
                | Command::RepairConsistency { .. }
                | Command::ImportRelations { .. }
        )
    }
}

/// Background task that processes engine commands.
pub struct EngineWorker<S, T> {
    service: EquipmentService<S>,
    templates: T,
    command_rx: mpsc::Receiver<Command>,
    /// Signals the persistence worker that relations may have changed.
    changes: Option<mpsc::Sender<()>>,
}

impl<S, T> EngineWorker<S, T>
where
    S: ItemStorage,
    T: TemplateOracle,
{
    pub fn new(
        service: EquipmentService<S>,
        templates: T,
        command_rx: mpsc::Receiver<Command>,
        changes: Option<mpsc::Sender<()>>,
    ) -> Self {
        tracing::info!(
            target: "runtime::worker",
            creatures = service.registry().len(),
            relations = service.index().len(),
            "engine worker initialized"
        );

        Self {
            service,
            templates,
            command_rx,
            changes,
        }
    }

    /// Main worker loop. Ends once every command sender is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd);
        }
        debug!(target: "runtime::worker", "command channel closed, engine worker stopping");
    }

    fn handle_command(&mut self, cmd: Command) {
        let name = cmd.as_str();
        let touches_relations = cmd.touches_relations();
        debug!(target: "runtime::worker", command = name, "handling command");

        let delivered = match cmd {
            Command::Equip {
                item,
                creature,
                mode,
                reply,
            } => {
                let result = match mode {
                    EquipMode::Auto => self.service.equip_item(item, creature),
                    EquipMode::Confirmed => self.service.confirm_equip(item, creature),
                    EquipMode::Slot(slot) => self.service.equip_item_to_slot(item, creature, slot),
                };
                reply.send(result.map_err(Into::into)).is_ok()
            }
            Command::Unequip {
                item,
                creature,
                reply,
            } => reply
                .send(self.service.unequip_item(item, creature).map_err(Into::into))
                .is_ok(),
            Command::UnequipSlot {
                creature,
                slot,
                reply,
            } => reply
                .send(self.service.unequip_from_slot(creature, slot).map_err(Into::into))
                .is_ok(),
            Command::Swap {
                first,
                second,
                slot,
                reply,
            } => reply
                .send(self.service.swap_equipment(first, second, slot).map_err(Into::into))
                .is_ok(),
            Command::RemoveAllEquipment { creature, reply } => reply
                .send(
                    self.service
                        .remove_all_equipment_for_creature(creature)
                        .map_err(Into::into),
                )
                .is_ok(),
            Command::CreateCreature {
                template,
                quality,
                base,
                reply,
            } => reply
                .send(
                    self.service
                        .create_creature(&self.templates, template, quality, base)
                        .map_err(Into::into),
                )
                .is_ok(),
            Command::SpawnCreature {
                template,
                quality,
                world_seed,
                reply,
            } => reply
                .send(
                    self.service
                        .spawn_creature(&self.templates, template, quality, &PcgRng, world_seed)
                        .map_err(Into::into),
                )
                .is_ok(),
            Command::RemoveCreature { creature, reply } => reply
                .send(self.service.remove_creature(creature).map_err(Into::into))
                .is_ok(),
            Command::LevelUp {
                creature,
                experience,
                reply,
            } => reply
                .send(self.service.level_up(creature, experience).map_err(Into::into))
                .is_ok(),
            Command::AllocatePoints {
                creature,
                attribute,
                amount,
                reply,
            } => reply
                .send(
                    self.service
                        .allocate_points(creature, attribute, amount)
                        .map_err(Into::into),
                )
                .is_ok(),
            Command::ResetPoints { creature, reply } => reply
                .send(self.service.reset_allocated_points(creature).map_err(Into::into))
                .is_ok(),
            Command::LearnSkill {
                creature,
                skill,
                replace_index,
                reply,
            } => reply
                .send(
                    self.service
                        .learn_skill(creature, skill, replace_index)
                        .map_err(Into::into),
                )
                .is_ok(),
            Command::ForgetSkill {
                creature,
                skill,
                reply,
            } => reply
                .send(self.service.forget_skill(creature, skill).map_err(Into::into))
                .is_ok(),
            Command::ValidateConsistency { reply } => {
                reply.send(self.service.validate_consistency()).is_ok()
            }
            Command::RepairConsistency { reply } => {
                reply.send(self.service.repair_consistency()).is_ok()
            }
            Command::ExportRelations { reply } => {
                reply.send(self.service.export_relations()).is_ok()
            }
            Command::ImportRelations { snapshot, reply } => {
                reply.send(self.service.import_relations(snapshot)).is_ok()
            }
            Command::QueryCreature { creature, reply } => {
                reply.send(self.service.creature(creature).cloned()).is_ok()
            }
            Command::QueryEquipment { creature, reply } => {
                reply.send(self.service.creature_equipment(creature)).is_ok()
            }
            Command::QueryItem { item, reply } => {
                reply.send(self.service.item_relation(item)).is_ok()
            }
            Command::QueryRanking { reply } => {
                reply.send(self.service.registry().creatures_by_power()).is_ok()
            }
        };

        if !delivered {
            debug!(target: "runtime::worker", command = name, "reply channel closed (caller dropped)");
        }
        if touches_relations {
            self.signal_change();
        }
    }

    fn signal_change(&self) {
        // A full channel already holds a pending signal.
        if let Some(changes) = &self.changes {
            let _ = changes.try_send(());
        }
    }
}
