//! Content factory for building collaborators from data files.

use std::path::{Path, PathBuf};

use summon_core::EngineConfig;

use crate::catalog::{ItemCatalog, TemplateCatalog};
use crate::loaders::{ConfigLoader, ItemLoader, LoadResult, TemplateLoader};

/// Everything a host needs to stand up an equipment service.
#[derive(Clone, Debug)]
pub struct LoadedContent {
    pub config: EngineConfig,
    pub items: ItemCatalog,
    pub templates: TemplateCatalog,
}

/// Content factory that loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml     (optional, defaults when absent)
/// ├── items.ron
/// └── templates.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `config.toml`, or defaults if the file is missing.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            tracing::debug!(target: "summon::content", path = %path.display(), "no config file, using defaults");
            return Ok(EngineConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the item catalog from `items.ron`.
    pub fn load_items(&self) -> LoadResult<ItemCatalog> {
        ItemLoader::load(&self.data_dir.join("items.ron"))
    }

    /// Load creature templates from `templates.ron`.
    pub fn load_templates(&self) -> LoadResult<TemplateCatalog> {
        TemplateLoader::load(&self.data_dir.join("templates.ron"))
    }

    /// Load config, items and templates together.
    pub fn load_all(&self) -> LoadResult<LoadedContent> {
        Ok(LoadedContent {
            config: self.load_config()?,
            items: self.load_items()?,
            templates: self.load_templates()?,
        })
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }

    #[test]
    fn missing_config_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.load_config().unwrap(), EngineConfig::default());
    }

    #[test]
    fn missing_catalog_reports_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentFactory::new(dir.path()).load_items().unwrap_err();
        assert!(err.to_string().contains("items.ron"));
    }
}
