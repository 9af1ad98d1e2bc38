//! In-memory RelationRepository implementation for tests and local runs.

use std::sync::RwLock;

use summon_core::RelationSnapshot;

use crate::repository::{RelationRepository, RepositoryError, Result};

/// In-memory implementation of [`RelationRepository`].
#[derive(Default)]
pub struct InMemoryRelationRepository {
    snapshot: RwLock<Option<RelationSnapshot>>,
    saves: RwLock<u64>,
}

impl InMemoryRelationRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a snapshot already stored.
    pub fn with_snapshot(snapshot: RelationSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(Some(snapshot)),
            saves: RwLock::new(0),
        }
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> u64 {
        self.saves.read().map(|count| *count).unwrap_or(0)
    }
}

impl RelationRepository for InMemoryRelationRepository {
    fn save(&self, snapshot: &RelationSnapshot) -> Result<()> {
        let mut stored = self
            .snapshot
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        *stored = Some(snapshot.clone());
        let mut saves = self.saves.write().map_err(|_| RepositoryError::LockPoisoned)?;
        *saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<RelationSnapshot>> {
        let stored = self
            .snapshot
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(stored.clone())
    }
}
