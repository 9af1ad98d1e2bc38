//! Consistency and repair reports.

use core::fmt;

use crate::ids::{CreatureId, ItemId};
use crate::item::SlotType;

use super::Relation;
use super::error::EquipError;

/// A single disagreement between the forward and reverse maps, or a
/// uniqueness violation.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ConsistencyIssue {
    /// Forward says `item` is at `(creature, slot)`; reverse has nothing there.
    MissingReverseEntry {
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
    },
    /// Forward says `item` is at `(creature, slot)`; reverse holds `found`.
    ReverseEntryMismatch {
        item: ItemId,
        creature: CreatureId,
        slot: SlotType,
        found: ItemId,
    },
    /// Reverse holds `item` at `(creature, slot)`; forward has no relation.
    MissingForwardEntry {
        creature: CreatureId,
        slot: SlotType,
        item: ItemId,
    },
    /// Reverse holds `item` at `(creature, slot)`; forward places it elsewhere.
    ForwardEntryMismatch {
        creature: CreatureId,
        slot: SlotType,
        item: ItemId,
        forward_creature: CreatureId,
        forward_slot: SlotType,
    },
    /// The same item occupies several reverse entries.
    DuplicateItem {
        item: ItemId,
        locations: Vec<(CreatureId, SlotType)>,
    },
    /// Several forward relations claim the same slot.
    SlotConflict {
        creature: CreatureId,
        slot: SlotType,
        items: Vec<ItemId>,
    },
}

impl ConsistencyIssue {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsistencyIssue::MissingReverseEntry { .. } => "missing_reverse_entry",
            ConsistencyIssue::ReverseEntryMismatch { .. } => "reverse_entry_mismatch",
            ConsistencyIssue::MissingForwardEntry { .. } => "missing_forward_entry",
            ConsistencyIssue::ForwardEntryMismatch { .. } => "forward_entry_mismatch",
            ConsistencyIssue::DuplicateItem { .. } => "duplicate_item",
            ConsistencyIssue::SlotConflict { .. } => "slot_conflict",
        }
    }
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::MissingReverseEntry {
                item,
                creature,
                slot,
            } => write!(f, "{item} -> {creature}/{slot} has no reverse entry"),
            ConsistencyIssue::ReverseEntryMismatch {
                item,
                creature,
                slot,
                found,
            } => write!(f, "{item} -> {creature}/{slot} but reverse holds {found}"),
            ConsistencyIssue::MissingForwardEntry {
                creature,
                slot,
                item,
            } => write!(f, "{creature}/{slot} -> {item} has no forward entry"),
            ConsistencyIssue::ForwardEntryMismatch {
                creature,
                slot,
                item,
                forward_creature,
                forward_slot,
            } => write!(
                f,
                "{creature}/{slot} -> {item} but forward places it at {forward_creature}/{forward_slot}"
            ),
            ConsistencyIssue::DuplicateItem { item, locations } => {
                write!(f, "{item} occupies {} reverse entries", locations.len())
            }
            ConsistencyIssue::SlotConflict {
                creature,
                slot,
                items,
            } => write!(f, "{creature}/{slot} claimed by {} items", items.len()),
        }
    }
}

/// Result of scanning the index for invariant violations.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConsistencyReport {
    pub is_consistent: bool,
    pub issues: Vec<ConsistencyIssue>,
    /// Number of forward relations at scan time.
    pub relation_count: usize,
}

impl ConsistencyReport {
    pub fn from_issues(issues: Vec<ConsistencyIssue>, relation_count: usize) -> Self {
        Self {
            is_consistent: issues.is_empty(),
            issues,
            relation_count,
        }
    }

    /// Converts an inconsistent report into [`EquipError::InconsistentState`].
    pub fn into_result(self) -> Result<(), EquipError> {
        if self.is_consistent {
            Ok(())
        } else {
            Err(EquipError::InconsistentState {
                issues: self.issues,
            })
        }
    }
}

/// One corrective step taken by a repair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum RepairAction {
    /// A forward relation lost a slot conflict and was dropped.
    ReleasedConflictingRelation { relation: Relation, kept: ItemId },
    /// A reverse entry without forward backing was removed.
    RemovedReverseEntry {
        creature: CreatureId,
        slot: SlotType,
        item: ItemId,
    },
    /// A reverse entry was rebuilt from the forward map.
    RestoredReverseEntry {
        creature: CreatureId,
        slot: SlotType,
        item: ItemId,
    },
}

/// Outcome of [`super::RelationIndex::repair_consistency`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RepairReport {
    pub before: ConsistencyReport,
    pub after: ConsistencyReport,
    pub actions: Vec<RepairAction>,
    /// Relations dropped to settle slot conflicts. Their items are no longer
    /// equipped and belong back in storage.
    pub released: Vec<Relation>,
}

impl RepairReport {
    /// True if the index was already consistent and nothing changed.
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}
