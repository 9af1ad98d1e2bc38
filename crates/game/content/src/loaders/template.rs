//! Creature template loader.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use summon_core::CreatureTemplate;

use crate::catalog::TemplateCatalog;
use crate::loaders::{LoadResult, read_file};

/// Template catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCatalogFile {
    pub templates: Vec<CreatureTemplate>,
}

/// Loader for creature templates from RON files.
pub struct TemplateLoader;

impl TemplateLoader {
    /// Load creature templates from a RON file.
    pub fn load(path: &Path) -> LoadResult<TemplateCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .with_context(|| format!("Invalid template catalog {}", path.display()))
    }

    /// Parse creature templates from RON text.
    ///
    /// Rejects duplicate ids, inverted roll ranges and negative growth.
    pub fn parse(content: &str) -> LoadResult<TemplateCatalog> {
        let file: TemplateCatalogFile =
            ron::from_str(content).context("Failed to parse template catalog RON")?;

        let mut seen = BTreeSet::new();
        for template in &file.templates {
            if !seen.insert(template.id) {
                bail!("duplicate template id {}", template.id);
            }
            for (attr, range) in template.base_ranges.iter() {
                if range.min > range.max {
                    bail!(
                        "{} ({}) has an inverted {} range {}..={}",
                        template.id,
                        template.name,
                        attr,
                        range.min,
                        range.max
                    );
                }
            }
            if let Some((attr, rate)) = template
                .growth
                .iter()
                .find(|(_, rate)| !rate.is_finite() || **rate < 0.0)
            {
                bail!("{} ({}) has invalid {} growth {}", template.id, template.name, attr, rate);
            }
        }

        tracing::debug!(
            target: "summon::content",
            templates = file.templates.len(),
            "loaded template catalog"
        );
        Ok(TemplateCatalog::from_templates(file.templates))
    }
}
