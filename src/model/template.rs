//! Template schema definitions.
//!
//! These structs map to the serialized template format shared with the
//! template store and the rendering collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::branding::ClientBranding;
use crate::error::{ComposeError, Result};

/// A versioned document template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    /// Opaque identifier (unique within a store)
    pub id: String,

    /// Human-readable name
    #[serde(default)]
    pub name: String,

    /// Template version string
    #[serde(default = "default_version")]
    pub version: String,

    /// Document kind (quote, proposal, ...)
    #[serde(rename = "type", default)]
    pub kind: TemplateKind,

    /// Structured schema: variables, sections, layout, styling
    #[serde(default)]
    pub schema: TemplateSchema,

    /// Markup, style text, script and assets
    #[serde(default)]
    pub content: TemplateContent,

    /// Descriptive fields and timestamps
    #[serde(default)]
    pub metadata: TemplateMetadata,

    /// Branding applied to (or carried by) this template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branding: Option<ClientBranding>,

    /// Parent linkage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inheritance: Option<Inheritance>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Template {
    /// Create an empty template with the given id and name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            version: default_version(),
            kind: TemplateKind::default(),
            schema: TemplateSchema::default(),
            content: TemplateContent::default(),
            metadata: TemplateMetadata::default(),
            branding: None,
            inheritance: None,
        }
    }

    /// Id of the declared parent, if any.
    pub fn parent_id(&self) -> Option<&str> {
        self.inheritance.as_ref().map(|i| i.parent_id.as_str())
    }

    /// Build a template from a loosely-typed JSON value.
    ///
    /// The merge strategy is checked before the typed conversion so an
    /// unrecognized value surfaces as [`ComposeError::UnknownStrategy`]
    /// rather than a generic parse failure.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let id = value
            .get("id")
            .and_then(|v| v.as_str())
            .unwrap_or("<unnamed>")
            .to_string();

        if let Some(raw) = value
            .get("inheritance")
            .and_then(|i| i.get("merge_strategy"))
        {
            let text = raw.as_str().ok_or_else(|| {
                ComposeError::invalid(&id, "inheritance.merge_strategy must be a string")
            })?;
            text.parse::<MergeStrategy>()
                .map_err(|e| ComposeError::unknown_strategy(e, &id))?;
        }

        serde_json::from_value(value).map_err(|e| ComposeError::invalid(id, e.to_string()))
    }
}

/// Kind of document a template produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateKind {
    Quote,
    Proposal,
    Invoice,
    Report,
    Contract,
    #[default]
    Custom,
}

/// Structured part of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSchema {
    /// Variable declarations, unique by name
    pub variables: Vec<VariableDecl>,

    /// Section declarations, unique by id
    pub sections: Vec<SectionDecl>,

    /// Page layout
    pub layout: LayoutDescriptor,

    /// Structured styling tokens
    pub styling: StylingDescriptor,
}

/// A variable a document author fills in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDecl {
    pub name: String,

    #[serde(rename = "type", default)]
    pub kind: VariableKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
}

impl VariableDecl {
    /// Create an optional text variable.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: VariableKind::default(),
            label: None,
            required: false,
            default: None,
        }
    }
}

/// Value type of a variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Text,
    Number,
    Currency,
    Date,
    Boolean,
    List,
    Image,
}

/// A named region of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionDecl {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub repeatable: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SectionDecl {
    /// Create a section with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            required: false,
            repeatable: false,
            description: None,
        }
    }
}

/// Page layout. Every field is optional so layouts can be overlaid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutDescriptor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Orientation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub margins: Option<Margins>,

    /// Section ids in display order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sections: Vec<String>,
}

impl LayoutDescriptor {
    /// Shallow overlay: fields present in `other` replace ours.
    ///
    /// A list field counts as present when it is non-empty.
    pub fn overlay(&self, other: &LayoutDescriptor) -> LayoutDescriptor {
        LayoutDescriptor {
            page_size: other.page_size.clone().or_else(|| self.page_size.clone()),
            orientation: other.orientation.or(self.orientation),
            columns: other.columns.or(self.columns),
            margins: other.margins.clone().or_else(|| self.margins.clone()),
            sections: if other.sections.is_empty() {
                self.sections.clone()
            } else {
                other.sections.clone()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page margins in points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

/// Structured styling tokens consumed by the renderer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingDescriptor {
    /// Font stack, first entry preferred
    pub fonts: Vec<FontSpec>,

    /// Named colors (primary, secondary, accent, ...)
    pub colors: BTreeMap<String, String>,

    /// Spacing scale keyed by token name
    pub spacing: BTreeMap<String, f64>,

    /// Raw custom style text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
}

/// One entry of a font stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FontSpec {
    /// A font entry with only a family name.
    pub fn family(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            size: None,
            line_height: None,
            url: None,
        }
    }
}

/// Textual content of a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateContent {
    /// Markup text
    pub html: String,

    /// Style text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,

    /// Script text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,

    /// Referenced assets, unique by id
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<Asset>,
}

/// A file referenced by template content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,

    #[serde(rename = "type", default)]
    pub kind: AssetKind,

    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Asset {
    /// Create an image asset.
    pub fn image(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: AssetKind::Image,
            url: url.into(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    #[default]
    Image,
    Font,
    Icon,
    Document,
}

/// Descriptive fields. Every field is optional so metadata can be overlaid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl TemplateMetadata {
    /// Shallow overlay: fields present in `other` replace ours.
    pub fn overlay(&self, other: &TemplateMetadata) -> TemplateMetadata {
        TemplateMetadata {
            description: other
                .description
                .clone()
                .or_else(|| self.description.clone()),
            author: other.author.clone().or_else(|| self.author.clone()),
            category: other.category.clone().or_else(|| self.category.clone()),
            tags: if other.tags.is_empty() {
                self.tags.clone()
            } else {
                other.tags.clone()
            },
            created_at: other.created_at.or(self.created_at),
            updated_at: other.updated_at.or(self.updated_at),
        }
    }
}

/// Parent linkage of a template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inheritance {
    /// Id of the parent template
    pub parent_id: String,

    /// Names of the fields the child declares as overridden (informational)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overrides: Vec<String>,

    /// How the child combines with its resolved parent
    pub merge_strategy: MergeStrategy,
}

impl Inheritance {
    pub fn new(parent_id: impl Into<String>, merge_strategy: MergeStrategy) -> Self {
        Self {
            parent_id: parent_id.into(),
            overrides: Vec::new(),
            merge_strategy,
        }
    }
}

/// Policy for combining a child template with its resolved parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum MergeStrategy {
    /// Keyed dedup merge; parent entries win on collision
    Merge,
    /// Child supersedes parent entirely
    Replace,
    /// Concatenate everything, no dedup
    Extend,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Merge => "merge",
            MergeStrategy::Replace => "replace",
            MergeStrategy::Extend => "extend",
        }
    }
}

impl fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the known merge strategies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown merge strategy '{0}' (expected merge, replace or extend)")]
pub struct ParseStrategyError(pub String);

impl FromStr for MergeStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "merge" => Ok(MergeStrategy::Merge),
            "replace" => Ok(MergeStrategy::Replace),
            "extend" => Ok(MergeStrategy::Extend),
            other => Err(ParseStrategyError(other.to_string())),
        }
    }
}

impl TryFrom<String> for MergeStrategy {
    type Error = ParseStrategyError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl ComposeError {
    /// Attach a template id to a strategy parse failure.
    pub fn unknown_strategy(err: ParseStrategyError, template: impl Into<String>) -> Self {
        ComposeError::UnknownStrategy {
            value: err.0,
            template: template.into(),
        }
    }
}
