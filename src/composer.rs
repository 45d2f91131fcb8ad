//! Store-backed facade over the composition engine.
//!
//! [`Composer`] owns a [`TemplateStore`] and [`Settings`] and exposes every
//! engine operation, plus [`Composer::render_artifact`] which runs the full
//! inheritance → branding pipeline and returns what the renderer consumes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::compose::{self, BrandingApplier, InheritanceResolver, TemplateOverrides};
use crate::error::Result;
use crate::model::{
    ClientBranding, ComponentOverride, Layer, ResolvedTemplate, Template, TemplateSchema,
};
use crate::settings::Settings;
use crate::store::TemplateStore;

/// Output handed to the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Id of the template the artifact was built from
    pub template_id: String,
    pub html: String,
    pub css: String,
    pub js: String,
    pub schema: TemplateSchema,
}

impl Artifact {
    fn from_template(template: Template) -> Self {
        Self {
            template_id: template.id,
            html: template.content.html,
            css: template.content.css.unwrap_or_default(),
            js: template.content.js.unwrap_or_default(),
            schema: template.schema,
        }
    }
}

/// Composition engine bound to a template store.
///
/// `Composer` holds no mutable state; it can be shared between threads
/// whenever the store can.
///
/// # Example
///
/// ```
/// use doc_composer::Composer;
/// use doc_composer::model::{ClientBranding, Inheritance, MergeStrategy, Template};
/// use doc_composer::store::MemoryStore;
///
/// let mut base = Template::new("base", "Base");
/// base.content.html = "<header>{{brand_name}}</header>{{content}}".into();
/// let mut quote = Template::new("quote", "Quote");
/// quote.content.html = "<p>Total</p>".into();
/// quote.inheritance = Some(Inheritance::new("base", MergeStrategy::Merge));
///
/// let composer = Composer::new(MemoryStore::with_templates([base, quote]));
/// let branding = ClientBranding::new("Acme", "#0044cc", "#222222", "#ff9900");
/// let artifact = composer.render_by_id("quote", Some(&branding)).unwrap();
///
/// assert_eq!(artifact.html, "<header>Acme</header><p>Total</p>");
/// ```
#[derive(Debug, Clone)]
pub struct Composer<S> {
    store: S,
    settings: Settings,
}

impl<S: TemplateStore> Composer<S> {
    /// Create a composer with default settings.
    pub fn new(store: S) -> Self {
        Self {
            store,
            settings: Settings::default(),
        }
    }

    /// Create a composer with custom settings.
    pub fn with_settings(store: S, settings: Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { store, settings })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Derive a new template from a stored base.
    pub fn compose_from_base(
        &self,
        base_id: &str,
        overrides: &TemplateOverrides,
    ) -> Result<Template> {
        compose::compose_from_base(&self.store, base_id, overrides)
    }

    /// Resolve the inheritance chain of `template`.
    pub fn resolve_inheritance(&self, template: &Template) -> Result<Template> {
        InheritanceResolver::with_settings(&self.store, &self.settings).resolve(template)
    }

    /// Fetch a template and resolve its inheritance chain.
    pub fn resolve_by_id(&self, id: &str) -> Result<Template> {
        let template = self.store.get_by_id(id)?;
        self.resolve_inheritance(&template)
    }

    /// Merge layers by priority.
    pub fn resolve_conflicts(&self, layers: &[Layer]) -> Result<ResolvedTemplate> {
        compose::resolve_conflicts(layers)
    }

    /// Apply client branding.
    pub fn apply_branding(
        &self,
        template: &Template,
        branding: &ClientBranding,
    ) -> Result<Template> {
        BrandingApplier::with_settings(&self.settings).apply(template, branding)
    }

    /// Append component style rules.
    pub fn apply_component_overrides(
        &self,
        template: &Template,
        overrides: &BTreeMap<String, ComponentOverride>,
    ) -> Result<Template> {
        compose::apply_component_overrides(template, overrides)
    }

    /// Resolve, brand, and package an unresolved template for rendering.
    ///
    /// Uses `branding` if given, otherwise the branding the resolved template
    /// carries. A template with neither is rendered unbranded.
    ///
    /// A resolved template keeps its parent linkage, so resolving it again
    /// would merge the parent twice. Pass the output of
    /// [`resolve_inheritance`](Self::resolve_inheritance) or
    /// [`resolve_by_id`](Self::resolve_by_id) to
    /// [`render_resolved`](Self::render_resolved) instead.
    pub fn render_artifact(
        &self,
        template: &Template,
        branding: Option<&ClientBranding>,
    ) -> Result<Artifact> {
        let resolved = self.resolve_inheritance(template)?;
        self.render_resolved(&resolved, branding)
    }

    /// Brand and package a template whose inheritance is already resolved.
    pub fn render_resolved(
        &self,
        resolved: &Template,
        branding: Option<&ClientBranding>,
    ) -> Result<Artifact> {
        let finished = match branding.or(resolved.branding.as_ref()) {
            Some(branding) => self.apply_branding(resolved, branding)?,
            None => resolved.clone(),
        };

        Ok(Artifact::from_template(finished))
    }

    /// [`render_artifact`](Self::render_artifact) for a stored template.
    pub fn render_by_id(&self, id: &str, branding: Option<&ClientBranding>) -> Result<Artifact> {
        let template = self.store.get_by_id(id)?;
        self.render_artifact(&template, branding)
    }

    /// Resolve layers, then the resulting template's inheritance, then brand it.
    pub fn render_layers(
        &self,
        layers: &[Layer],
        branding: Option<&ClientBranding>,
    ) -> Result<Artifact> {
        let resolved = self.resolve_conflicts(layers)?;
        self.render_artifact(&resolved.template, branding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ComposeError;
    use crate::model::{Inheritance, LayerKind, MergeStrategy};
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn store() -> MemoryStore {
        let mut base = Template::new("base", "Base");
        base.content.html = "<img src=\"{{logo_url}}\">{{content}}".into();
        base.content.css = Some("body { color: var(--primary-color); }".into());
        base.branding = Some(ClientBranding::new("House", "#000000", "#111111", "#222222"));

        let mut quote = Template::new("quote", "Quote");
        quote.content.html = "<p>quote</p>".into();
        quote.inheritance = Some(Inheritance::new("base", MergeStrategy::Merge));

        MemoryStore::with_templates([base, quote])
    }

    #[test]
    fn rejects_invalid_settings() {
        let settings = Settings {
            max_inheritance_depth: 0,
            ..Default::default()
        };
        assert!(Composer::with_settings(store(), settings).is_err());
    }

    #[test]
    fn render_uses_inherited_branding_when_none_given() {
        let composer = Composer::new(store());

        let artifact = composer.render_by_id("quote", None).unwrap();

        assert_eq!(artifact.css, "body { color: #000000; }");
        assert_eq!(artifact.html, "<img src=\"\"><p>quote</p>");
        assert_eq!(artifact.template_id, "quote");
    }

    #[test]
    fn explicit_branding_wins() {
        let composer = Composer::new(store());
        let branding = ClientBranding::new("Acme", "#0044cc", "#222222", "#ff9900");

        let artifact = composer.render_by_id("quote", Some(&branding)).unwrap();

        assert_eq!(artifact.css, "body { color: #0044cc; }");
        assert_eq!(artifact.schema.styling.colors["primary"], "#0044cc");
    }

    #[test]
    fn resolved_template_renders_without_second_merge() {
        let composer = Composer::new(store());
        let resolved = composer.resolve_by_id("quote").unwrap();

        let artifact = composer.render_resolved(&resolved, None).unwrap();

        assert_eq!(artifact.html, "<img src=\"\"><p>quote</p>");
        assert_eq!(artifact, composer.render_by_id("quote", None).unwrap());
    }

    #[test]
    fn unbranded_template_renders_as_is() {
        let store = MemoryStore::with_templates([Template::new("plain", "Plain")]);
        let composer = Composer::new(store);

        let artifact = composer.render_by_id("plain", None).unwrap();

        assert_eq!(artifact.html, "");
        assert_eq!(artifact.css, "");
        assert_eq!(artifact.js, "");
    }

    #[test]
    fn render_layers_resolves_inheritance_of_result() {
        let composer = Composer::new(store());
        let layers = vec![
            Layer::new(
                LayerKind::Base,
                0,
                json!({ "id": "layered", "content": { "html": "<p>a</p>" } }),
                "base",
            ),
            Layer::new(
                LayerKind::Behavior,
                1,
                json!({ "inheritance": { "parent_id": "base", "merge_strategy": "merge" } }),
                "link",
            ),
        ];

        let artifact = composer.render_layers(&layers, None).unwrap();

        assert_eq!(artifact.html, "<img src=\"\"><p>a</p>");
    }

    #[test]
    fn configured_depth_is_used() {
        let settings = Settings {
            max_inheritance_depth: 1,
            ..Default::default()
        };
        let mut s = store();
        let mut leaf = Template::new("leaf", "Leaf");
        leaf.inheritance = Some(Inheritance::new("quote", MergeStrategy::Merge));
        s.insert(leaf);
        let composer = Composer::with_settings(s, settings).unwrap();

        let err = composer.resolve_by_id("leaf").unwrap_err();
        assert!(matches!(err, ComposeError::DepthExceeded { .. }));
    }

    #[test]
    fn concurrent_resolution_converges() {
        let composer = Arc::new(Composer::new(store()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let composer = Arc::clone(&composer);
                thread::spawn(move || composer.resolve_by_id("quote").unwrap())
            })
            .collect();

        let results: Vec<Template> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    }
}
