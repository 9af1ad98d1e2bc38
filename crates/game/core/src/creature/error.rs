//! Creature registry errors.

use crate::error::{EngineError, ErrorSeverity};
use crate::ids::{CreatureId, SkillId, TemplateId};
use crate::stats::CoreAttribute;

/// Failure of a creature lifecycle, allocation, or skill operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RegistryError {
    /// Unknown id, or a creature that is no longer active.
    #[error("{0} not found")]
    CreatureNotFound(CreatureId),

    #[error("{0} not found")]
    TemplateNotFound(TemplateId),

    #[error("{attribute} = {value} is outside {template}'s range {min}..={max}")]
    BaseOutOfRange {
        template: TemplateId,
        attribute: CoreAttribute,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("{creature} has {available} potential points, {requested} requested")]
    InsufficientPotential {
        creature: CreatureId,
        requested: u32,
        available: u32,
    },

    #[error("unknown core attribute: {0}")]
    UnknownAttribute(String),

    #[error("{creature} already knows {skill}")]
    SkillAlreadyLearned { creature: CreatureId, skill: SkillId },

    #[error("{creature} has no free skill slot (max {max})")]
    SkillSlotsFull { creature: CreatureId, max: usize },

    #[error("{creature} has no skill slot {index} (learned {learned})")]
    InvalidSkillSlot {
        creature: CreatureId,
        index: usize,
        learned: usize,
    },

    #[error("{creature} does not know {skill}")]
    SkillNotLearned { creature: CreatureId, skill: SkillId },

    /// Release the creature's equipment before removing it.
    #[error("{creature} still wears {items} item(s)")]
    CreatureStillEquipped { creature: CreatureId, items: usize },

    #[error("creature id space exhausted")]
    IdOverflow,
}

impl EngineError for RegistryError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RegistryError::CreatureStillEquipped { .. } => ErrorSeverity::Recoverable,
            RegistryError::IdOverflow => ErrorSeverity::Fatal,
            _ => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RegistryError::CreatureNotFound(_) => "REGISTRY_CREATURE_NOT_FOUND",
            RegistryError::TemplateNotFound(_) => "REGISTRY_TEMPLATE_NOT_FOUND",
            RegistryError::BaseOutOfRange { .. } => "REGISTRY_BASE_OUT_OF_RANGE",
            RegistryError::InsufficientPotential { .. } => "REGISTRY_INSUFFICIENT_POTENTIAL",
            RegistryError::UnknownAttribute(_) => "REGISTRY_UNKNOWN_ATTRIBUTE",
            RegistryError::SkillAlreadyLearned { .. } => "REGISTRY_SKILL_ALREADY_LEARNED",
            RegistryError::SkillSlotsFull { .. } => "REGISTRY_SKILL_SLOTS_FULL",
            RegistryError::InvalidSkillSlot { .. } => "REGISTRY_INVALID_SKILL_SLOT",
            RegistryError::SkillNotLearned { .. } => "REGISTRY_SKILL_NOT_LEARNED",
            RegistryError::CreatureStillEquipped { .. } => "REGISTRY_CREATURE_STILL_EQUIPPED",
            RegistryError::IdOverflow => "REGISTRY_ID_OVERFLOW",
        }
    }
}
