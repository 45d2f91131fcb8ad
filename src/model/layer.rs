//! Template layers and resolved output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::template::Template;

/// What a layer contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Base,
    Theme,
    Content,
    Behavior,
}

/// A prioritized partial template fragment.
///
/// # Example
///
/// ```
/// use doc_composer::model::{Layer, LayerKind};
/// use serde_json::json;
///
/// let layer = Layer::new(LayerKind::Theme, 10, json!({ "name": "Dark" }), "themes/dark");
/// assert_eq!(layer.priority, 10);
/// assert_eq!(layer.source, "themes/dark");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(rename = "type")]
    pub kind: LayerKind,

    /// Lower priorities are applied first and overwritten by higher ones
    pub priority: i32,

    /// Partial template as a JSON object
    pub content: serde_json::Value,

    /// Where this layer came from
    pub source: String,
}

impl Layer {
    pub fn new(
        kind: LayerKind,
        priority: i32,
        content: serde_json::Value,
        source: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            priority,
            content,
            source: source.into(),
        }
    }
}

/// A template produced by layer resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTemplate {
    #[serde(flatten)]
    pub template: Template,

    /// Always true for values produced by the layer resolver
    pub resolved: bool,

    pub resolved_at: DateTime<Utc>,

    /// Layer sources in application order (lowest priority first)
    pub sources: Vec<String>,

    /// The merged layer object as-is, including keys the template model
    /// does not define
    #[serde(default)]
    pub merged: serde_json::Value,
}

impl ResolvedTemplate {
    /// Drop the resolution annotations.
    pub fn into_template(self) -> Template {
        self.template
    }
}
