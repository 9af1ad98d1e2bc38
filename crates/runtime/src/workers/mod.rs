//! Worker tasks that back the runtime orchestration.
//!
//! The engine worker executes every command against the equipment service,
//! while the persistence worker saves relation snapshots in the background.

mod engine;
mod persistence;

pub use engine::{Command, EngineWorker, EquipMode};
pub use persistence::{PersistenceConfig, PersistenceWorker};
pub(crate) use persistence::{load_snapshot, save_snapshot};
