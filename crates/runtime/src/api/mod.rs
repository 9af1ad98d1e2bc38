//! Public API surface of the runtime: the engine handle and its errors.

mod errors;
mod handle;

pub use errors::{RepositoryError, Result, RuntimeError};
pub use handle::EngineHandle;
