//! Client branding definitions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Style properties keyed by CSS property name.
pub type StyleProperties = BTreeMap<String, String>;

/// Client-specific visual tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientBranding {
    /// Brand name substituted into markup
    pub name: String,

    /// Color palette
    pub colors: ColorPalette,

    /// Typography, if the client declares one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,

    /// Spacing scale keyed by token (values are CSS lengths such as `8px`)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub spacing: BTreeMap<String, String>,

    /// Logo and other brand assets
    pub assets: BrandAssets,

    /// Raw style text appended after substitution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<String>,

    /// Per-component style overrides keyed by component name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub components: BTreeMap<String, ComponentOverride>,
}

impl ClientBranding {
    /// Branding with a name and the three main palette colors.
    pub fn new(
        name: impl Into<String>,
        primary: impl Into<String>,
        secondary: impl Into<String>,
        accent: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            colors: ColorPalette {
                primary: primary.into(),
                secondary: secondary.into(),
                accent: accent.into(),
                neutral: BTreeMap::new(),
            },
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorPalette {
    pub primary: String,
    pub secondary: String,
    pub accent: String,

    /// Neutral ramp keyed by shade (50, 100, ..., 900)
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub neutral: BTreeMap<u16, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    pub font_family: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading_font_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,

    /// Stylesheet or font file URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrandAssets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<LogoAsset>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogoAsset {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// Style overrides for one component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentOverride {
    /// Properties of the base rule
    pub base: StyleProperties,

    /// Properties per named variant
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variants: BTreeMap<String, StyleProperties>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn neutral_ramp_parses_numeric_keys() {
        let branding: ClientBranding = serde_json::from_value(json!({
            "name": "Acme",
            "colors": {
                "primary": "#112233",
                "neutral": { "100": "#f5f5f5", "900": "#111111" }
            }
        }))
        .unwrap();

        assert_eq!(branding.colors.neutral.get(&100).map(String::as_str), Some("#f5f5f5"));
        assert_eq!(branding.colors.neutral.len(), 2);
    }

    #[test]
    fn yaml_branding_with_components() {
        let yaml = r##"
name: Acme
colors:
  primary: "#0044cc"
  secondary: "#222222"
  accent: "#ff9900"
components:
  button:
    base:
      border-radius: 4px
    variants:
      primary:
        background: "#0044cc"
"##;
        let branding: ClientBranding = serde_yaml::from_str(yaml).unwrap();
        let button = &branding.components["button"];
        assert_eq!(button.base["border-radius"], "4px");
        assert_eq!(button.variants["primary"]["background"], "#0044cc");
    }

    #[test]
    fn missing_sections_default() {
        let branding: ClientBranding = serde_json::from_value(json!({ "name": "Bare" })).unwrap();
        assert!(branding.typography.is_none());
        assert!(branding.assets.logo.is_none());
        assert!(branding.spacing.is_empty());
    }
}
