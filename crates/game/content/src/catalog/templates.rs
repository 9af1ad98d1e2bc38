use std::collections::BTreeMap;

use summon_core::{CreatureTemplate, TemplateId, TemplateOracle};

/// In-memory creature template catalog.
#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
    templates: BTreeMap<TemplateId, CreatureTemplate>,
}

impl TemplateCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_templates(templates: impl IntoIterator<Item = CreatureTemplate>) -> Self {
        Self {
            templates: templates.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn insert(&mut self, template: CreatureTemplate) -> Option<CreatureTemplate> {
        self.templates.insert(template.id, template)
    }

    pub fn get(&self, id: TemplateId) -> Option<&CreatureTemplate> {
        self.templates.get(&id)
    }

    /// Finds a template by its display name (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Option<&CreatureTemplate> {
        self.templates
            .values()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreatureTemplate> {
        self.templates.values()
    }
}

impl TemplateOracle for TemplateCatalog {
    fn template(&self, id: TemplateId) -> Option<CreatureTemplate> {
        self.templates.get(&id).cloned()
    }
}
