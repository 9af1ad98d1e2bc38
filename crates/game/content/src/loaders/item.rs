//! Item catalog loader.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use summon_core::Item;

use crate::catalog::ItemCatalog;
use crate::loaders::{LoadResult, read_file};

/// Item catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalogFile {
    pub items: Vec<Item>,
}

/// Loader for item catalogs from RON files.
pub struct ItemLoader;

impl ItemLoader {
    /// Load an item catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<ItemCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid item catalog {}", path.display()))
    }

    /// Parse an item catalog from RON text.
    ///
    /// Rejects duplicate ids and effects with non-finite values.
    pub fn parse(content: &str) -> LoadResult<ItemCatalog> {
        let file: ItemCatalogFile =
            ron::from_str(content).context("Failed to parse item catalog RON")?;

        let mut seen = BTreeSet::new();
        for item in &file.items {
            if !seen.insert(item.id) {
                bail!("duplicate item id {}", item.id);
            }
            if let Some(effect) = item.effects.iter().find(|e| !e.value.is_finite()) {
                bail!("{} ({}) has a non-finite {} effect", item.id, item.name, effect.stat);
            }
        }

        tracing::debug!(target: "summon::content", items = file.items.len(), "loaded item catalog");
        Ok(ItemCatalog::from_items(file.items))
    }
}
