//! Content loaders for reading engine data from files.
//!
//! Engine configuration is TOML; item and template catalogs are RON. Every
//! loader also exposes a `parse` entry point taking the file contents, so
//! callers holding data in memory skip the filesystem.

pub mod config;
pub mod factory;
pub mod item;
pub mod template;

pub use config::ConfigLoader;
pub use factory::{ContentFactory, LoadedContent};
pub use item::{ItemCatalogFile, ItemLoader};
pub use template::{TemplateCatalogFile, TemplateLoader};

use std::path::Path;

use anyhow::Context;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file {}", path.display()))
}
