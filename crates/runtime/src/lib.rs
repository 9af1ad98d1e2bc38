//! Async runtime hosting the summon engine.
//!
//! This crate wires the synchronous equipment service into a single-writer
//! worker task, a topic-based event bus, and relation snapshot persistence.
//! Hosts embed [`Runtime`] and talk to the engine through [`EngineHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides the topic-based event bus
//! - [`workers`] holds the engine and persistence tasks
//! - [`repository`] stores relation snapshots
pub mod api;
pub mod events;
pub mod repository;
pub mod runtime;
pub mod telemetry;
pub mod workers;

pub use api::{EngineHandle, Result, RuntimeError};
pub use events::{BusObserver, EventBus, Topic};
pub use repository::{
    FileRelationRepository, InMemoryRelationRepository, RelationRepository, RepositoryError,
};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
pub use telemetry::init_tracing;
pub use workers::{Command, EngineWorker, EquipMode, PersistenceConfig, PersistenceWorker};
