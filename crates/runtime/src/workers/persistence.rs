//! Persistence worker that saves relation snapshots in the background.
//!
//! The engine worker signals after every command that may touch relations.
//! This worker waits until the signals have been quiet for the configured
//! debounce window, then asks the engine worker for a snapshot through the
//! regular command channel and hands it to the repository. Taking the
//! snapshot as a command guarantees it reflects a state between commands.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use summon_core::RelationSnapshot;

use crate::api::{Result, RuntimeError};
use crate::repository::RelationRepository;
use crate::workers::engine::Command;

/// Configuration for the persistence worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Quiet period after the last change before a snapshot is saved.
    pub debounce: Duration,
}

impl PersistenceConfig {
    pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

    pub fn new(debounce: Duration) -> Self {
        Self { debounce }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEBOUNCE)
    }
}

/// Background worker that debounces relation changes into repository saves.
pub struct PersistenceWorker {
    config: PersistenceConfig,
    repository: Arc<dyn RelationRepository>,
    changes: mpsc::Receiver<()>,
    // Weak so that persistence never keeps the engine worker alive.
    commands: mpsc::WeakSender<Command>,
}

impl PersistenceWorker {
    pub fn new(
        config: PersistenceConfig,
        repository: Arc<dyn RelationRepository>,
        changes: mpsc::Receiver<()>,
        commands: mpsc::WeakSender<Command>,
    ) -> Self {
        Self {
            config,
            repository,
            changes,
            commands,
        }
    }

    /// Main worker loop. Ends when the engine worker stops signalling.
    pub async fn run(mut self) {
        while self.changes.recv().await.is_some() {
            let closed = self.settle().await;

            if let Err(err) = self.flush().await {
                warn!(target: "runtime::persistence", error = %err, "failed to save relation snapshot");
            }
            if closed {
                break;
            }
        }
        debug!(target: "runtime::persistence", "change channel closed, persistence worker stopping");
    }

    /// Absorbs change signals until none arrives within the debounce window.
    ///
    /// Returns true if the change channel closed while waiting.
    async fn settle(&mut self) -> bool {
        loop {
            match timeout(self.config.debounce, self.changes.recv()).await {
                Ok(Some(())) => continue,
                Ok(None) => return true,
                Err(_) => return false,
            }
        }
    }

    async fn flush(&self) -> Result<()> {
        let Some(commands) = self.commands.upgrade() else {
            debug!(target: "runtime::persistence", "engine worker gone, skipping save");
            return Ok(());
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        commands
            .send(Command::ExportRelations { reply: reply_tx })
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;
        drop(commands);
        let snapshot = reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)?;

        save_snapshot(Arc::clone(&self.repository), snapshot).await
    }
}

/// Saves a snapshot on the blocking pool.
pub(crate) async fn save_snapshot(
    repository: Arc<dyn RelationRepository>,
    snapshot: RelationSnapshot,
) -> Result<()> {
    let relations = snapshot.relations.len();
    tokio::task::spawn_blocking(move || repository.save(&snapshot))
        .await
        .map_err(RuntimeError::WorkerJoin)??;
    info!(target: "runtime::persistence", relations, "relation snapshot saved");
    Ok(())
}

/// Loads the stored snapshot on the blocking pool.
pub(crate) async fn load_snapshot(
    repository: Arc<dyn RelationRepository>,
) -> Result<Option<RelationSnapshot>> {
    let snapshot = tokio::task::spawn_blocking(move || repository.load())
        .await
        .map_err(RuntimeError::WorkerJoin)??;
    Ok(snapshot)
}
