//! In-memory template store.

use crate::error::{ComposeError, Result};
use crate::model::Template;
use crate::store::TemplateStore;
use std::collections::HashMap;

/// Templates held in a map keyed by id.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    templates: HashMap<String, Template>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given templates.
    ///
    /// Later templates replace earlier ones with the same id.
    pub fn with_templates(templates: impl IntoIterator<Item = Template>) -> Self {
        let mut store = Self::new();
        for template in templates {
            store.insert(template);
        }
        store
    }

    /// Add or replace a template, returning the one it replaced.
    pub fn insert(&mut self, template: Template) -> Option<Template> {
        self.templates.insert(template.id.clone(), template)
    }

    /// Check if a template exists.
    pub fn has(&self, id: &str) -> bool {
        self.templates.contains_key(id)
    }

    /// All template ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.templates.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl TemplateStore for MemoryStore {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| ComposeError::NotFound { id: id.to_string() })
    }
}
