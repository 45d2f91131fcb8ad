//! Template loading from a directory of YAML or JSON files.

use crate::error::{ComposeError, Result};
use crate::model::Template;
use crate::store::TemplateStore;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Store backed by template files under a directory.
///
/// Every `*.yml`, `*.yaml` and `*.json` file below the root (recursively)
/// holds one template. Files are read once, when the store is opened.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    templates: HashMap<String, (Template, PathBuf)>,
}

impl DirectoryStore {
    /// Load all templates under `root`.
    ///
    /// A missing directory yields an empty store.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut templates = HashMap::new();

        if root.exists() {
            Self::load_recursive(&root, &mut templates)?;
        }

        tracing::debug!(
            "Loaded {} templates from {}",
            templates.len(),
            root.display()
        );

        Ok(Self { root, templates })
    }

    fn load_recursive(
        dir: &Path,
        templates: &mut HashMap<String, (Template, PathBuf)>,
    ) -> Result<()> {
        if !dir.is_dir() {
            return Ok(());
        }

        let mut entries = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort();

        for path in entries {
            if path.is_dir() {
                Self::load_recursive(&path, templates)?;
                continue;
            }

            let Some(format) = FileFormat::from_path(&path) else {
                continue;
            };

            let template = Self::load_file(&path, format)?;
            if let Some((_, existing)) = templates.get(&template.id) {
                return Err(ComposeError::invalid(
                    &template.id,
                    format!(
                        "duplicate template id in {} and {}",
                        existing.display(),
                        path.display()
                    ),
                ));
            }
            templates.insert(template.id.clone(), (template, path));
        }

        Ok(())
    }

    fn load_file(path: &Path, format: FileFormat) -> Result<Template> {
        let content = fs::read_to_string(path)?;
        let parse_error = |message: String| ComposeError::ParseError {
            path: path.to_path_buf(),
            message,
        };

        let value: serde_json::Value = match format {
            FileFormat::Yaml => {
                serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string()))?
            }
            FileFormat::Json => {
                serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?
            }
        };

        Template::from_value(value).map_err(|e| match e {
            ComposeError::ValidationError { message, .. } => parse_error(message),
            other => other,
        })
    }

    /// Directory the store was opened on.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File a template was loaded from.
    pub fn path_of(&self, id: &str) -> Option<&Path> {
        self.templates.get(id).map(|(_, p)| p.as_path())
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

impl TemplateStore for DirectoryStore {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        self.templates
            .get(id)
            .map(|(t, _)| t.clone())
            .ok_or_else(|| ComposeError::NotFound { id: id.to_string() })
    }
}

#[derive(Debug, Clone, Copy)]
enum FileFormat {
    Yaml,
    Json,
}

impl FileFormat {
    fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yml" | "yaml" => Some(FileFormat::Yaml),
            "json" => Some(FileFormat::Json),
            _ => None,
        }
    }
}
