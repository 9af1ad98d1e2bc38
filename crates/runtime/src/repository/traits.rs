use summon_core::RelationSnapshot;

use super::Result;

/// Storage for relation snapshots.
///
/// Implementations keep only the latest snapshot; `save` replaces whatever
/// was stored before.
pub trait RelationRepository: Send + Sync {
    /// Persist a snapshot, replacing the previous one.
    fn save(&self, snapshot: &RelationSnapshot) -> Result<()>;

    /// Load the latest snapshot, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<RelationSnapshot>>;
}
