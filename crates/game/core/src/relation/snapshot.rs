use crate::ids::{CreatureId, ItemId};
use crate::item::SlotType;

use super::Relation;

/// One reverse-map entry: `creature`'s `slot` holds `item`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadoutEntry {
    pub creature: CreatureId,
    pub slot: SlotType,
    pub item: ItemId,
}

/// Serializable copy of both relation maps.
///
/// Both maps are exported so that a save written while they disagreed still
/// reads back as inconsistent instead of being silently healed on load. A
/// snapshot with no `loadouts` (hand-written or from an older tool) imports
/// as "reverse map missing" and is rebuilt by repair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelationSnapshot {
    pub relations: Vec<Relation>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub loadouts: Vec<LoadoutEntry>,
}

impl RelationSnapshot {
    /// Builds a snapshot whose reverse entries agree with `relations`.
    pub fn from_relations(relations: Vec<Relation>) -> Self {
        let loadouts = relations
            .iter()
            .map(|relation| LoadoutEntry {
                creature: relation.creature,
                slot: relation.slot,
                item: relation.item,
            })
            .collect();
        Self {
            relations,
            loadouts,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty() && self.loadouts.is_empty()
    }
}
