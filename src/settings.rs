//! Engine settings.
//!
//! Settings can be built in code or loaded from a YAML file. Every field
//! has a default, so a settings file only needs the keys it changes.
//!
//! ```yaml
//! max_inheritance_depth: 5
//! content_placeholder: "{{body}}"
//! ```

use crate::error::{ComposeError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Tunables for the composition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Longest parent chain the inheritance resolver will walk
    #[serde(default = "default_max_inheritance_depth")]
    pub max_inheritance_depth: usize,

    /// Marker in parent markup that receives child markup
    #[serde(default = "default_content_placeholder")]
    pub content_placeholder: String,

    /// Alt text used when a logo has none
    #[serde(default = "default_logo_alt")]
    pub default_logo_alt: String,

    /// Request timeout for remote stores, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_inheritance_depth: default_max_inheritance_depth(),
            content_placeholder: default_content_placeholder(),
            default_logo_alt: default_logo_alt(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_max_inheritance_depth() -> usize {
    10
}

fn default_content_placeholder() -> String {
    "{{content}}".to_string()
}

fn default_logo_alt() -> String {
    "Logo".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from a YAML file and validate them.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content).map_err(|e| match e {
            ComposeError::ParseError { message, .. } => ComposeError::ParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// Parse settings from YAML text.
    pub fn parse(content: &str) -> Result<Self> {
        // An empty file parses to null; treat it as all defaults
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Settings =
            serde_yaml::from_str(content).map_err(|e| ComposeError::ParseError {
                path: "<settings>".into(),
                message: e.to_string(),
            })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_inheritance_depth == 0 {
            return Err(ComposeError::invalid(
                "<settings>",
                "max_inheritance_depth must be at least 1",
            ));
        }
        if self.content_placeholder.is_empty() {
            return Err(ComposeError::invalid(
                "<settings>",
                "content_placeholder cannot be empty",
            ));
        }
        Ok(())
    }

    /// Remote store timeout.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}
