//! The relation index: which item occupies which slot on which creature.
//!
//! The index keeps two denormalized maps describing the same facts:
//!
//! - forward: `item → (creature, slot, equipped_at)`
//! - reverse: `creature → {slot → item}`
//!
//! Both maps are only ever mutated together, through the index's private
//! attach/detach helpers. When they disagree anyway (for example after a save
//! written mid-sequence), [`RelationIndex::validate_consistency`] reports it
//! and [`RelationIndex::repair_consistency`] restores agreement, treating the
//! forward map as ground truth.
mod error;
mod index;
mod report;
mod snapshot;

pub use error::EquipError;
pub use index::{EquipOutcome, RelationIndex, SwapOutcome};
pub use report::{ConsistencyIssue, ConsistencyReport, RepairAction, RepairReport};
pub use snapshot::{LoadoutEntry, RelationSnapshot};

use crate::ids::{CreatureId, ItemId, Tick};
use crate::item::SlotType;

/// One equipped item: `item` occupies `slot` on `creature`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Relation {
    pub item: ItemId,
    pub creature: CreatureId,
    pub slot: SlotType,
    pub equipped_at: Tick,
}

impl Relation {
    pub fn new(item: ItemId, creature: CreatureId, slot: SlotType, equipped_at: Tick) -> Self {
        Self {
            item,
            creature,
            slot,
            equipped_at,
        }
    }

    /// True if this relation places its item at `(creature, slot)`.
    pub fn occupies(&self, creature: CreatureId, slot: SlotType) -> bool {
        self.creature == creature && self.slot == slot
    }
}
