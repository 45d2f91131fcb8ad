//! Client branding application.
//!
//! # Tokens
//!
//! Style text:
//! - `var(--primary-color)`, `var(--secondary-color)`, `var(--accent-color)`
//! - `var(--neutral-{shade})` for each neutral ramp entry
//! - `var(--font-family)`, `var(--heading-font-family)`
//! - `var(--spacing-{token})` for each spacing entry
//!
//! Markup: `{{logo_url}}`, `{{logo_alt}}`, `{{brand_name}}`.
//!
//! # Re-application
//!
//! Style text owned by branding (custom CSS and component rules) lives in a
//! block delimited by [`BRAND_BLOCK_START`] and [`BRAND_BLOCK_END`]. Each
//! application strips the existing block and appends a fresh one, so applying
//! the same branding twice yields the same template. Substituted tokens are
//! consumed by the first application.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::error::{ComposeError, Result};
use crate::model::{ClientBranding, ComponentOverride, FontSpec, StyleProperties, Template};
use crate::settings::Settings;

/// Opens the branding-owned region of style text.
pub const BRAND_BLOCK_START: &str = "/* brand:start */";

/// Closes the branding-owned region of style text.
pub const BRAND_BLOCK_END: &str = "/* brand:end */";

// One adjacent newline goes with the block: the one before it, or the one
// after it when the block opens the text.
static BRAND_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?s)\n/\* brand:start \*/.*?/\* brand:end \*/",
        r"|^/\* brand:start \*/.*?/\* brand:end \*/\n?",
    ))
    .unwrap()
});

static SPACING_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap());

static CSS_IDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[A-Za-z_][A-Za-z0-9_-]*$").unwrap());

/// Applies client branding to templates.
///
/// # Example
///
/// ```
/// use doc_composer::compose::BrandingApplier;
/// use doc_composer::model::{ClientBranding, Template};
///
/// let mut template = Template::new("quote", "Quote");
/// template.content.html = "<h1>{{brand_name}}</h1>".into();
/// template.content.css = Some("h1 { color: var(--primary-color); }".into());
///
/// let branding = ClientBranding::new("Acme", "#0044cc", "#222222", "#ff9900");
/// let branded = BrandingApplier::new().apply(&template, &branding).unwrap();
///
/// assert_eq!(branded.content.html, "<h1>Acme</h1>");
/// assert_eq!(branded.content.css.as_deref(), Some("h1 { color: #0044cc; }"));
/// ```
#[derive(Debug, Clone)]
pub struct BrandingApplier {
    default_logo_alt: String,
}

impl BrandingApplier {
    /// Create an applier with default settings.
    pub fn new() -> Self {
        Self::with_settings(&Settings::default())
    }

    /// Create an applier using the default logo alt text from settings.
    pub fn with_settings(settings: &Settings) -> Self {
        Self {
            default_logo_alt: settings.default_logo_alt.clone(),
        }
    }

    /// Return a branded copy of `template`.
    ///
    /// Spacing values without a leading number are substituted into style
    /// text but leave the structured spacing scale untouched.
    ///
    /// # Errors
    ///
    /// [`ComposeError::ValidationError`] if a component or variant name is
    /// not a CSS identifier.
    pub fn apply(&self, template: &Template, branding: &ClientBranding) -> Result<Template> {
        let mut branded = template.clone();

        branded.content.css = self.brand_style_text(template, branding)?;
        branded.content.html = self.brand_markup(&template.content.html, branding);

        let styling = &mut branded.schema.styling;
        let palette = &branding.colors;
        for (key, value) in [
            ("primary", &palette.primary),
            ("secondary", &palette.secondary),
            ("accent", &palette.accent),
        ] {
            if !value.is_empty() {
                styling.colors.insert(key.to_string(), value.clone());
            }
        }

        if let Some(typography) = &branding.typography {
            let font = FontSpec {
                family: typography.font_family.clone(),
                size: typography.base_size.clone(),
                line_height: typography.line_height.clone(),
                url: typography.font_url.clone(),
            };
            if styling.fonts.first() != Some(&font) {
                styling.fonts.insert(0, font);
            }
        }

        for (token, value) in &branding.spacing {
            // Non-numeric lengths (auto, var(...)) only reach style text
            match parse_spacing(value) {
                Some(number) => {
                    styling.spacing.insert(token.clone(), number);
                }
                None => tracing::debug!(
                    "Spacing token {} = '{}' is not numeric, leaving structured scale as is",
                    token,
                    value
                ),
            }
        }

        branded.branding = Some(branding.clone());
        tracing::debug!("Applied branding '{}' to {}", branding.name, template.id);
        Ok(branded)
    }

    fn brand_style_text(
        &self,
        template: &Template,
        branding: &ClientBranding,
    ) -> Result<Option<String>> {
        let original = template.content.css.as_deref();
        let mut css = substitute_style_tokens(&strip_brand_block(original.unwrap_or("")), branding);

        let mut block = Vec::new();
        if let Some(custom) = branding.custom_css.as_deref().filter(|c| !c.trim().is_empty()) {
            block.push(custom.trim_end().to_string());
        }
        if !branding.components.is_empty() {
            block.push(render_component_rules(&template.id, &branding.components)?);
        }

        if !block.is_empty() {
            if !css.is_empty() {
                css.push('\n');
            }
            css.push_str(BRAND_BLOCK_START);
            css.push('\n');
            css.push_str(&block.join("\n"));
            css.push('\n');
            css.push_str(BRAND_BLOCK_END);
        }

        if css.is_empty() && original.is_none() {
            Ok(None)
        } else {
            Ok(Some(css))
        }
    }

    fn brand_markup(&self, html: &str, branding: &ClientBranding) -> String {
        let (url, alt) = match &branding.assets.logo {
            Some(logo) => (
                logo.url.as_str(),
                logo.alt.as_deref().unwrap_or(&self.default_logo_alt),
            ),
            None => ("", self.default_logo_alt.as_str()),
        };

        html.replace("{{logo_url}}", url)
            .replace("{{logo_alt}}", alt)
            .replace("{{brand_name}}", &branding.name)
    }
}

impl Default for BrandingApplier {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply branding with default settings.
pub fn apply_branding(template: &Template, branding: &ClientBranding) -> Result<Template> {
    BrandingApplier::new().apply(template, branding)
}

/// Append component rule blocks to a template's style text.
///
/// Unlike [`apply_branding`], the rules are appended outside the brand
/// block, so calling this twice appends them twice.
pub fn apply_component_overrides(
    template: &Template,
    overrides: &BTreeMap<String, ComponentOverride>,
) -> Result<Template> {
    let mut result = template.clone();
    if overrides.is_empty() {
        return Ok(result);
    }

    let rules = render_component_rules(&template.id, overrides)?;
    result.content.css = match template.content.css.as_deref() {
        Some(css) if !css.is_empty() => Some(format!("{}\n{}", css, rules)),
        _ => Some(rules),
    };
    Ok(result)
}

/// Render the base rule and one rule per variant for every component.
fn render_component_rules(
    template: &str,
    overrides: &BTreeMap<String, ComponentOverride>,
) -> Result<String> {
    let mut rules = Vec::new();

    for (component, style) in overrides {
        check_ident(template, "component", component)?;
        rules.push(render_rule(&format!(".{}", component), &style.base));

        for (variant, properties) in &style.variants {
            check_ident(template, "variant", variant)?;
            rules.push(render_rule(&format!(".{}--{}", component, variant), properties));
        }
    }

    Ok(rules.join("\n"))
}

fn render_rule(selector: &str, properties: &StyleProperties) -> String {
    let mut rule = format!("{} {{\n", selector);
    for (property, value) in properties {
        rule.push_str(&format!("  {}: {};\n", property, value));
    }
    rule.push('}');
    rule
}

fn check_ident(template: &str, what: &str, name: &str) -> Result<()> {
    if CSS_IDENT.is_match(name) {
        Ok(())
    } else {
        Err(ComposeError::invalid(
            template,
            format!("{} name '{}' is not a valid CSS identifier", what, name),
        ))
    }
}

/// Replace brand tokens in style text. Empty palette values are skipped.
fn substitute_style_tokens(css: &str, branding: &ClientBranding) -> String {
    let mut replacements: Vec<(String, &str)> = vec![
        ("var(--primary-color)".into(), branding.colors.primary.as_str()),
        ("var(--secondary-color)".into(), branding.colors.secondary.as_str()),
        ("var(--accent-color)".into(), branding.colors.accent.as_str()),
    ];

    for (shade, value) in &branding.colors.neutral {
        replacements.push((format!("var(--neutral-{})", shade), value.as_str()));
    }

    if let Some(typography) = &branding.typography {
        replacements.push(("var(--font-family)".into(), typography.font_family.as_str()));
        if let Some(heading) = &typography.heading_font_family {
            replacements.push(("var(--heading-font-family)".into(), heading.as_str()));
        }
    }

    for (token, value) in &branding.spacing {
        replacements.push((format!("var(--spacing-{})", token), value.as_str()));
    }

    replacements
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .fold(css.to_string(), |acc, (token, value)| acc.replace(&token, value))
}

fn strip_brand_block(css: &str) -> String {
    BRAND_BLOCK.replace_all(css, "").into_owned()
}

fn parse_spacing(value: &str) -> Option<f64> {
    SPACING_VALUE
        .captures(value)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
