//! File-based RelationRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use summon_core::RelationSnapshot;

use crate::repository::{RelationRepository, RepositoryError, Result};

const FORMAT_VERSION: u32 = 1;

/// On-disk envelope: the snapshot plus a SHA-256 of its JSON encoding.
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    checksum: String,
    snapshot: serde_json::Value,
}

/// File-based implementation of [`RelationRepository`].
///
/// The snapshot is stored as pretty-printed JSON in a single file. Writes go
/// to a temporary sibling first and are renamed over the target, so readers
/// see either the old or the new snapshot. A checksum over the snapshot body
/// catches truncated or hand-edited files on load.
pub struct FileRelationRepository {
    path: PathBuf,
}

impl FileRelationRepository {
    /// Create a repository storing its snapshot at `path`.
    ///
    /// Parent directories are created if missing.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Create a repository using `relations.json` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::new(dir.as_ref().join("relations.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn checksum(body: &serde_json::Value) -> Result<String> {
        let bytes = serde_json::to_vec(body)?;
        Ok(hex::encode(Sha256::digest(&bytes)))
    }
}

impl RelationRepository for FileRelationRepository {
    fn save(&self, snapshot: &RelationSnapshot) -> Result<()> {
        let body = serde_json::to_value(snapshot)?;
        let file = SnapshotFile {
            version: FORMAT_VERSION,
            checksum: Self::checksum(&body)?,
            snapshot: body,
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(
            target: "runtime::repository",
            path = %self.path.display(),
            relations = snapshot.relations.len(),
            "saved relation snapshot"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<RelationSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(&self.path)?;
        let file: SnapshotFile = serde_json::from_slice(&bytes)?;
        if file.version != FORMAT_VERSION {
            return Err(RepositoryError::UnsupportedVersion(file.version));
        }

        let actual = Self::checksum(&file.snapshot)?;
        if actual != file.checksum {
            return Err(RepositoryError::ChecksumMismatch {
                expected: file.checksum,
                actual,
            });
        }

        let snapshot: RelationSnapshot = serde_json::from_value(file.snapshot)?;
        tracing::debug!(
            target: "runtime::repository",
            path = %self.path.display(),
            relations = snapshot.relations.len(),
            "loaded relation snapshot"
        );
        Ok(Some(snapshot))
    }
}
