//! Relation snapshot repositories.
//!
//! The engine itself performs no I/O; these repositories give hosts a place
//! to keep the exported relation snapshot between sessions.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileRelationRepository;
pub use memory::InMemoryRelationRepository;
pub use traits::RelationRepository;
