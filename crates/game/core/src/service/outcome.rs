use crate::creature::Creature;
use crate::ids::ItemId;
use crate::relation::{ConsistencyReport, Relation, RepairReport};

/// A creature taken out of the registry together with the items it wore.
#[derive(Clone, Debug, PartialEq)]
pub struct RemovedCreature {
    pub creature: Creature,
    /// Items the creature wore, ascending by id.
    pub released: Vec<ItemId>,
    /// Subset of `released` that item storage refused to take back.
    pub unstored: Vec<ItemId>,
}

/// Why an imported relation was discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DropReason {
    UnknownItem,
    NotEquipment,
    /// The relation's slot differs from the item's slot type.
    SlotMismatch,
    UnknownCreature,
}

/// Outcome of [`super::EquipmentService::import_relations`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImportReport {
    /// Forward relations loaded into the index.
    pub imported: usize,
    /// Forward relations discarded before loading.
    pub dropped: Vec<(Relation, DropReason)>,
    /// Reverse entries discarded before loading.
    pub dropped_loadouts: usize,
    /// Consistency of the loaded maps, before any repair.
    pub validation: ConsistencyReport,
    /// Present when the loaded maps disagreed and were repaired.
    pub repair: Option<RepairReport>,
}

impl ImportReport {
    pub fn was_repaired(&self) -> bool {
        self.repair.is_some()
    }
}
