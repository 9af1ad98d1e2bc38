//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, repositories, and the engine so
//! clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use summon_core::{ConfigError, EngineError, EquipError, ErrorSeverity, RegistryError};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("engine worker command channel closed")]
    CommandChannelClosed,

    #[error("engine worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("runtime worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Equip(#[from] EquipError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl RuntimeError {
    /// The engine error behind this failure, if any.
    pub fn engine_error(&self) -> Option<&dyn EngineError> {
        match self {
            RuntimeError::Equip(err) => Some(err as &dyn EngineError),
            RuntimeError::Registry(err) => Some(err as &dyn EngineError),
            RuntimeError::Config(err) => Some(err as &dyn EngineError),
            _ => None,
        }
    }
}

impl EngineError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Equip(err) => err.severity(),
            RuntimeError::Registry(err) => err.severity(),
            RuntimeError::Config(err) => err.severity(),
            RuntimeError::Repository(RepositoryError::ChecksumMismatch { .. })
            | RuntimeError::Repository(RepositoryError::UnsupportedVersion(_)) => {
                ErrorSeverity::Internal
            }
            RuntimeError::Repository(_) => ErrorSeverity::Recoverable,
            RuntimeError::CommandChannelClosed
            | RuntimeError::ReplyChannelClosed(_)
            | RuntimeError::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            RuntimeError::Equip(err) => err.error_code(),
            RuntimeError::Registry(err) => err.error_code(),
            RuntimeError::Config(err) => err.error_code(),
            RuntimeError::Repository(_) => "RUNTIME_REPOSITORY",
            RuntimeError::CommandChannelClosed => "RUNTIME_COMMAND_CHANNEL_CLOSED",
            RuntimeError::ReplyChannelClosed(_) => "RUNTIME_REPLY_CHANNEL_CLOSED",
            RuntimeError::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use summon_core::{CreatureId, ItemId, SlotType};

    use super::*;

    #[test]
    fn engine_errors_keep_their_classification() {
        let err = RuntimeError::from(EquipError::CrossCreatureConflict {
            item: ItemId(1),
            owner: CreatureId(1),
            target: CreatureId(2),
            slot: SlotType::Weapon,
        });
        assert_eq!(err.severity(), ErrorSeverity::Recoverable);
        assert_eq!(err.error_code(), "EQUIP_CROSS_CREATURE_CONFLICT");
        assert!(err.engine_error().is_some());
    }

    #[test]
    fn closed_channels_are_fatal() {
        assert_eq!(
            RuntimeError::CommandChannelClosed.severity(),
            ErrorSeverity::Fatal
        );
    }
}
