//! Equipment errors.

use crate::error::{EngineError, ErrorSeverity};
use crate::ids::{CreatureId, ItemId};
use crate::item::SlotType;

use super::report::ConsistencyIssue;

/// Failure of an equip, unequip, or swap request.
///
/// None of these are fatal. "The item is already there" is not an error at
/// all; it is reported through [`super::EquipOutcome::already_equipped`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipError {
    #[error("{0} not found")]
    ItemNotFound(ItemId),

    #[error("{0} is not equipment")]
    ItemNotEquipment(ItemId),

    #[error("{0} not found")]
    CreatureNotFound(CreatureId),

    /// The item's slot type differs from the slot being addressed.
    #[error("{item} fits the {actual} slot, not {expected}")]
    SlotTypeMismatch {
        item: ItemId,
        expected: SlotType,
        actual: SlotType,
    },

    /// The item is worn by another creature. Not a hard failure: the caller
    /// may confirm the move with `confirm_equip`.
    #[error("{item} is equipped on {owner}; moving it to {target} requires confirmation")]
    CrossCreatureConflict {
        item: ItemId,
        owner: CreatureId,
        target: CreatureId,
        slot: SlotType,
    },

    /// Nothing was equipped where the caller expected something.
    #[error("{creature} has no matching equipped item")]
    NoPriorRelation {
        creature: CreatureId,
        item: Option<ItemId>,
        slot: Option<SlotType>,
    },

    /// Item storage cannot take back the items an unequip would release.
    #[error("storage cannot accept {} item(s) released from {creature}", .items.len())]
    StorageRefused {
        creature: CreatureId,
        items: Vec<ItemId>,
    },

    #[error("relation index is inconsistent: {} issue(s)", .issues.len())]
    InconsistentState { issues: Vec<ConsistencyIssue> },
}

impl EquipError {
    /// True if the request can proceed once the caller confirms it.
    pub fn requires_confirmation(&self) -> bool {
        matches!(self, EquipError::CrossCreatureConflict { .. })
    }
}

impl EngineError for EquipError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            EquipError::CrossCreatureConflict { .. }
            | EquipError::NoPriorRelation { .. }
            | EquipError::StorageRefused { .. } => ErrorSeverity::Recoverable,
            EquipError::ItemNotFound(_)
            | EquipError::ItemNotEquipment(_)
            | EquipError::CreatureNotFound(_)
            | EquipError::SlotTypeMismatch { .. } => ErrorSeverity::Validation,
            EquipError::InconsistentState { .. } => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            EquipError::ItemNotFound(_) => "EQUIP_ITEM_NOT_FOUND",
            EquipError::ItemNotEquipment(_) => "EQUIP_ITEM_NOT_EQUIPMENT",
            EquipError::CreatureNotFound(_) => "EQUIP_CREATURE_NOT_FOUND",
            EquipError::SlotTypeMismatch { .. } => "EQUIP_SLOT_TYPE_MISMATCH",
            EquipError::CrossCreatureConflict { .. } => "EQUIP_CROSS_CREATURE_CONFLICT",
            EquipError::NoPriorRelation { .. } => "EQUIP_NO_PRIOR_RELATION",
            EquipError::StorageRefused { .. } => "EQUIP_STORAGE_REFUSED",
            EquipError::InconsistentState { .. } => "EQUIP_INCONSISTENT_STATE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_need_confirmation() {
        let conflict = EquipError::CrossCreatureConflict {
            item: ItemId(1),
            owner: CreatureId(1),
            target: CreatureId(2),
            slot: SlotType::Weapon,
        };
        assert!(conflict.requires_confirmation());
        assert!(conflict.severity().is_recoverable());
        assert_eq!(conflict.error_code(), "EQUIP_CROSS_CREATURE_CONFLICT");

        assert!(!EquipError::ItemNotFound(ItemId(1)).requires_confirmation());
    }

    #[test]
    fn storage_refusal_is_recoverable() {
        let err = EquipError::StorageRefused {
            creature: CreatureId(1),
            items: vec![ItemId(2)],
        };
        assert!(err.severity().is_recoverable());
        assert!(!err.requires_confirmation());
        assert_eq!(err.error_code(), "EQUIP_STORAGE_REFUSED");
    }

    #[test]
    fn inconsistent_state_counts_issues() {
        let err = EquipError::InconsistentState {
            issues: vec![ConsistencyIssue::MissingReverseEntry {
                item: ItemId(1),
                creature: CreatureId(1),
                slot: SlotType::Rune,
            }],
        };
        assert_eq!(err.to_string(), "relation index is inconsistent: 1 issue(s)");
        assert!(err.severity().is_internal());
    }
}
