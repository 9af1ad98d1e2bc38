//! High-level runtime orchestrator.
//!
//! The runtime owns background workers, wires up command/event channels, and
//! exposes a builder-based API for hosts to stand up the engine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use summon_content::{ItemCatalog, LoadedContent, TemplateCatalog};
use summon_core::{EquipmentService, ItemStorage, TemplateOracle};

use crate::api::{EngineHandle, Result, RuntimeError};
use crate::events::EventBus;
use crate::repository::RelationRepository;
use crate::workers::{
    Command, EngineWorker, PersistenceConfig, PersistenceWorker, load_snapshot, save_snapshot,
};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of the engine worker's command queue.
    pub channel_capacity: usize,
    /// Capacity of each event bus topic.
    pub event_capacity: usize,
    /// Background persistence; `None` disables it.
    pub persistence: Option<PersistenceConfig>,
}

impl RuntimeConfig {
    pub const DEFAULT_CHANNEL_CAPACITY: usize = 32;
    pub const DEFAULT_EVENT_CAPACITY: usize = 100;

    pub fn with_persistence(mut self, persistence: PersistenceConfig) -> Self {
        self.persistence = Some(persistence);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel_capacity: Self::DEFAULT_CHANNEL_CAPACITY,
            event_capacity: Self::DEFAULT_EVENT_CAPACITY,
            persistence: None,
        }
    }
}

/// Main runtime that hosts the engine worker.
///
/// [`EngineHandle`] provides a cloneable façade for clients.
pub struct Runtime {
    handle: EngineHandle,
    repository: Option<Arc<dyn RelationRepository>>,
    engine_worker_handle: JoinHandle<()>,
    persistence_worker_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Create a runtime builder around an equipment service and its templates.
    pub fn builder<S, T>(service: EquipmentService<S>, templates: T) -> RuntimeBuilder<S, T> {
        RuntimeBuilder::new(service, templates)
    }

    /// Create a runtime builder from loaded content files.
    pub fn from_content(
        content: LoadedContent,
    ) -> Result<RuntimeBuilder<ItemCatalog, TemplateCatalog>> {
        let service = EquipmentService::new(content.config, content.items)?;
        Ok(RuntimeBuilder::new(service, content.templates))
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Save the current relation snapshot right away.
    ///
    /// Does nothing when no repository is configured.
    pub async fn flush(&self) -> Result<()> {
        let Some(repository) = &self.repository else {
            return Ok(());
        };
        let snapshot = self.handle.export_relations().await?;
        save_snapshot(Arc::clone(repository), snapshot).await
    }

    /// Shutdown the runtime gracefully
    ///
    /// Saves a final snapshot when a repository is configured, then waits for
    /// the workers to finish. Clones of the handle held elsewhere keep the
    /// engine worker running, so drop them first.
    pub async fn shutdown(self) -> Result<()> {
        self.flush().await?;
        drop(self.handle);

        self.engine_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        if let Some(persistence) = self.persistence_worker_handle {
            persistence.await.map_err(RuntimeError::WorkerJoin)?;
        }

        tracing::info!(target: "runtime", "runtime shut down");
        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder<S, T> {
    service: EquipmentService<S>,
    templates: T,
    config: RuntimeConfig,
    repository: Option<Arc<dyn RelationRepository>>,
    restore: bool,
}

impl<S, T> RuntimeBuilder<S, T> {
    fn new(service: EquipmentService<S>, templates: T) -> Self {
        Self {
            service,
            templates,
            config: RuntimeConfig::default(),
            repository: None,
            restore: true,
        }
    }

    /// Set the runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Attach a relation repository.
    ///
    /// Enables snapshot saving on [`Runtime::flush`] and shutdown; background
    /// saves additionally need [`RuntimeConfig::persistence`].
    pub fn repository(mut self, repository: Arc<dyn RelationRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    /// Whether to import the stored snapshot on build (default: true).
    pub fn restore_on_build(mut self, restore: bool) -> Self {
        self.restore = restore;
        self
    }
}

impl<S, T> RuntimeBuilder<S, T>
where
    S: ItemStorage + Send + 'static,
    T: TemplateOracle + Send + 'static,
{
    /// Build the runtime and spawn its workers.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn build(self) -> Result<Runtime> {
        let RuntimeBuilder {
            mut service,
            templates,
            config,
            repository,
            restore,
        } = self;

        let event_bus = EventBus::with_capacity(config.event_capacity);
        service.subscribe(event_bus.observer());

        if restore
            && let Some(repository) = &repository
            && let Some(snapshot) = load_snapshot(Arc::clone(repository)).await?
        {
            let report = service.import_relations(snapshot);
            tracing::info!(
                target: "runtime",
                imported = report.imported,
                dropped = report.dropped.len(),
                repaired = report.was_repaired(),
                "restored relation snapshot"
            );
        }

        let (command_tx, command_rx) = mpsc::channel::<Command>(config.channel_capacity);

        let (persistence_worker_handle, changes_tx) =
            match (config.persistence, repository.as_ref()) {
                (Some(persistence), Some(repository)) => {
                    let (changes_tx, changes_rx) = mpsc::channel(1);
                    let worker = PersistenceWorker::new(
                        persistence,
                        Arc::clone(repository),
                        changes_rx,
                        command_tx.downgrade(),
                    );
                    (Some(tokio::spawn(worker.run())), Some(changes_tx))
                }
                (Some(_), None) => {
                    tracing::warn!(target: "runtime", "persistence configured without a repository");
                    (None, None)
                }
                (None, _) => (None, None),
            };

        let engine_worker = EngineWorker::new(service, templates, command_rx, changes_tx);
        let engine_worker_handle = tokio::spawn(engine_worker.run());

        Ok(Runtime {
            handle: EngineHandle::new(command_tx, event_bus),
            repository,
            engine_worker_handle,
            persistence_worker_handle,
        })
    }
}
