//! Derive a new template from a stored base plus ad-hoc overrides.
//!
//! # Merge Rules
//!
//! | Field              | Policy                                            |
//! |--------------------|---------------------------------------------------|
//! | `content.*`        | each `Some` override replaces the base field      |
//! | `schema.styling.*` | each `Some` override replaces the base field      |
//! | `branding`         | base branding overlaid field-by-field             |
//! | `metadata`         | [`TemplateMetadata::overlay`]                     |
//! | `name`             | replaced when given                               |
//! | `id`               | always freshly generated                          |
//!
//! Everything else is copied from the base unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use super::id::generate_id;
use crate::error::{ComposeError, Result};
use crate::model::{
    Asset, BrandAssets, ClientBranding, ColorPalette, ComponentOverride, FontSpec, Template,
    TemplateMetadata, Typography,
};
use crate::store::TemplateStore;

/// Overrides applied by [`compose_from_base`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateOverrides {
    /// New template name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub content: ContentOverrides,

    pub styling: StylingOverrides,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branding: Option<BrandingOverrides>,

    pub metadata: TemplateMetadata,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub js: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<Vec<Asset>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StylingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fonts: Option<Vec<FontSpec>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<BTreeMap<String, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandingOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<ColorPalette>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assets: Option<BrandAssets>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<BTreeMap<String, ComponentOverride>>,
}

impl BrandingOverrides {
    fn apply(&self, base: &ClientBranding) -> ClientBranding {
        ClientBranding {
            name: self.name.clone().unwrap_or_else(|| base.name.clone()),
            colors: self.colors.clone().unwrap_or_else(|| base.colors.clone()),
            typography: self.typography.clone().or_else(|| base.typography.clone()),
            spacing: self.spacing.clone().unwrap_or_else(|| base.spacing.clone()),
            assets: self.assets.clone().unwrap_or_else(|| base.assets.clone()),
            custom_css: self.custom_css.clone().or_else(|| base.custom_css.clone()),
            components: self
                .components
                .clone()
                .unwrap_or_else(|| base.components.clone()),
        }
    }
}

/// Fetch `base_id` from the store and derive a new template from it.
///
/// # Errors
///
/// - [`ComposeError::NotFound`] if the base does not exist
/// - [`ComposeError::ValidationError`] if the overrides are malformed
pub fn compose_from_base<S>(
    store: &S,
    base_id: &str,
    overrides: &TemplateOverrides,
) -> Result<Template>
where
    S: TemplateStore + ?Sized,
{
    let base = store.get_by_id(base_id)?;
    apply_overrides(&base, overrides, Utc::now())
}

/// Derive a new template from `base` without touching the store.
pub fn apply_overrides(
    base: &Template,
    overrides: &TemplateOverrides,
    now: DateTime<Utc>,
) -> Result<Template> {
    let mut derived = base.clone();

    derived.id = generate_id(&base.id, now);
    if let Some(name) = &overrides.name {
        derived.name = name.clone();
    }

    let content = &overrides.content;
    if let Some(html) = &content.html {
        derived.content.html = html.clone();
    }
    if let Some(css) = &content.css {
        derived.content.css = Some(css.clone());
    }
    if let Some(js) = &content.js {
        derived.content.js = Some(js.clone());
    }
    if let Some(assets) = &content.assets {
        check_unique_assets(&base.id, assets)?;
        derived.content.assets = assets.clone();
    }

    let styling = &overrides.styling;
    let target = &mut derived.schema.styling;
    if let Some(fonts) = &styling.fonts {
        target.fonts = fonts.clone();
    }
    if let Some(colors) = &styling.colors {
        target.colors = colors.clone();
    }
    if let Some(spacing) = &styling.spacing {
        target.spacing = spacing.clone();
    }
    if let Some(custom_css) = &styling.custom_css {
        target.custom_css = Some(custom_css.clone());
    }

    if let Some(branding) = &overrides.branding {
        let merged = branding.apply(&base.branding.clone().unwrap_or_default());
        if merged.name.trim().is_empty() {
            return Err(ComposeError::invalid(
                &base.id,
                "branding override produces a branding without a name",
            ));
        }
        derived.branding = Some(merged);
    }

    let stamped = TemplateMetadata {
        created_at: Some(now),
        updated_at: Some(now),
        ..Default::default()
    };
    derived.metadata = base.metadata.overlay(&stamped).overlay(&overrides.metadata);

    tracing::debug!("Composed {} from base {}", derived.id, base.id);
    Ok(derived)
}

fn check_unique_assets(template: &str, assets: &[Asset]) -> Result<()> {
    let mut seen = HashSet::new();
    for asset in assets {
        if !seen.insert(asset.id.as_str()) {
            return Err(ComposeError::invalid(
                template,
                format!("asset override lists '{}' more than once", asset.id),
            ));
        }
    }
    Ok(())
}
