//! Template inheritance resolution.
//!
//! A template that declares `inheritance.parent_id` is merged onto its
//! parent, after the parent's own chain has been resolved. The declared
//! [`MergeStrategy`] decides how each field combines.
//!
//! # Strategy Table
//!
//! | Field                  | merge                       | extend                 |
//! |------------------------|-----------------------------|------------------------|
//! | variables / sections   | parent + new child keys     | parent ++ child        |
//! | layout                 | child fields over parent    | same, sections ++      |
//! | fonts                  | parent ++ child             | parent ++ child        |
//! | colors / spacing       | child entries over parent   | child entries over parent |
//! | custom style text      | parent ++ child             | parent ++ child        |
//! | markup                 | child into `{{content}}`    | parent ++ child        |
//! | style text             | parent ++ child             | parent ++ child        |
//! | script                 | child, else parent          | child, else parent     |
//! | assets                 | parent + new child ids      | parent ++ child        |
//! | branding               | child, else parent          | child, else parent     |
//! | identity / metadata    | child over parent           | child over parent      |
//!
//! `replace` returns the child as-is; only its parent linkage records
//! where it came from.

use super::merger::{append_unique_by, concat, concat_markup, concat_text};
use crate::error::{ComposeError, Result};
use crate::model::{
    MergeStrategy, StylingDescriptor, Template, TemplateContent, TemplateSchema,
};
use crate::settings::Settings;
use crate::store::TemplateStore;

/// Resolves template inheritance chains against a store.
///
/// # Example
///
/// ```
/// use doc_composer::compose::InheritanceResolver;
/// use doc_composer::model::{Inheritance, MergeStrategy, Template};
/// use doc_composer::store::MemoryStore;
///
/// let mut parent = Template::new("base", "Base");
/// parent.content.html = "<main>{{content}}</main>".into();
/// let store = MemoryStore::with_templates([parent]);
///
/// let mut child = Template::new("child", "Child");
/// child.content.html = "<p>Hello</p>".into();
/// child.inheritance = Some(Inheritance::new("base", MergeStrategy::Merge));
///
/// let resolved = InheritanceResolver::new(&store).resolve(&child).unwrap();
/// assert_eq!(resolved.content.html, "<main><p>Hello</p></main>");
/// ```
pub struct InheritanceResolver<'a, S: ?Sized> {
    store: &'a S,
    max_depth: usize,
    placeholder: String,
}

impl<'a, S: TemplateStore + ?Sized> InheritanceResolver<'a, S> {
    /// Create a resolver with default settings.
    pub fn new(store: &'a S) -> Self {
        Self::with_settings(store, &Settings::default())
    }

    /// Create a resolver using the depth limit and placeholder from settings.
    pub fn with_settings(store: &'a S, settings: &Settings) -> Self {
        Self {
            store,
            max_depth: settings.max_inheritance_depth,
            placeholder: settings.content_placeholder.clone(),
        }
    }

    /// Resolve the full parent chain of `template`.
    ///
    /// A template without a parent is returned unchanged.
    ///
    /// # Errors
    ///
    /// - [`ComposeError::NotFound`] if a parent is missing
    /// - [`ComposeError::CycleDetected`] if the chain revisits an id
    /// - [`ComposeError::DepthExceeded`] if the chain is too long
    pub fn resolve(&self, template: &Template) -> Result<Template> {
        let mut visited = vec![template.id.clone()];
        self.resolve_with_visited(template, &mut visited)
    }

    fn resolve_with_visited(
        &self,
        template: &Template,
        visited: &mut Vec<String>,
    ) -> Result<Template> {
        // If no parent, return template as-is
        let inheritance = match &template.inheritance {
            Some(i) => i,
            None => return Ok(template.clone()),
        };
        let parent_id = &inheritance.parent_id;

        if visited.iter().any(|id| id == parent_id) {
            return Err(ComposeError::cycle(visited, parent_id));
        }
        if visited.len() > self.max_depth {
            return Err(ComposeError::DepthExceeded {
                id: template.id.clone(),
                max: self.max_depth,
            });
        }

        tracing::debug!("Resolving parent {} of {}", parent_id, template.id);
        let parent = self.store.get_by_id(parent_id)?;
        visited.push(parent_id.clone());

        // Parent's own chain first, so we always merge onto a resolved ancestor
        let resolved_parent = self.resolve_with_visited(&parent, visited)?;

        tracing::debug!(
            "Applying {} strategy: {} onto {}",
            inheritance.merge_strategy,
            template.id,
            parent_id
        );
        Ok(merge_with_parent(
            &resolved_parent,
            template,
            inheritance.merge_strategy,
            &self.placeholder,
        ))
    }

    /// Get the maximum chain depth.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Resolve inheritance with default settings.
pub fn resolve_inheritance<S>(store: &S, template: &Template) -> Result<Template>
where
    S: TemplateStore + ?Sized,
{
    InheritanceResolver::new(store).resolve(template)
}

/// Combine a child with its already-resolved parent.
pub fn merge_with_parent(
    parent: &Template,
    child: &Template,
    strategy: MergeStrategy,
    placeholder: &str,
) -> Template {
    match strategy {
        MergeStrategy::Merge => merge_strategy(parent, child, placeholder),
        MergeStrategy::Replace => child.clone(),
        MergeStrategy::Extend => extend_strategy(parent, child),
    }
}

fn merge_strategy(parent: &Template, child: &Template, placeholder: &str) -> Template {
    let (p, c) = (&parent.schema, &child.schema);

    let schema = TemplateSchema {
        variables: append_unique_by(&p.variables, &c.variables, |v| v.name.clone()),
        sections: append_unique_by(&p.sections, &c.sections, |s| s.id.clone()),
        layout: p.layout.overlay(&c.layout),
        styling: merge_styling(&p.styling, &c.styling),
    };

    let content = TemplateContent {
        html: merge_markup(&parent.content.html, &child.content.html, placeholder),
        css: concat_text(parent.content.css.as_deref(), child.content.css.as_deref()),
        js: child.content.js.clone().or_else(|| parent.content.js.clone()),
        assets: append_unique_by(&parent.content.assets, &child.content.assets, |a| {
            a.id.clone()
        }),
    };

    combine(parent, child, schema, content)
}

fn extend_strategy(parent: &Template, child: &Template) -> Template {
    let (p, c) = (&parent.schema, &child.schema);

    let mut layout = p.layout.overlay(&c.layout);
    layout.sections = concat(&p.layout.sections, &c.layout.sections);

    let schema = TemplateSchema {
        variables: concat(&p.variables, &c.variables),
        sections: concat(&p.sections, &c.sections),
        layout,
        styling: merge_styling(&p.styling, &c.styling),
    };

    let content = TemplateContent {
        html: concat_markup(&parent.content.html, &child.content.html),
        css: concat_text(parent.content.css.as_deref(), child.content.css.as_deref()),
        js: child.content.js.clone().or_else(|| parent.content.js.clone()),
        assets: concat(&parent.content.assets, &child.content.assets),
    };

    combine(parent, child, schema, content)
}

/// Fields both merge and extend treat the same way.
fn combine(
    parent: &Template,
    child: &Template,
    schema: TemplateSchema,
    content: TemplateContent,
) -> Template {
    Template {
        id: child.id.clone(),
        name: child.name.clone(),
        version: child.version.clone(),
        kind: child.kind,
        schema,
        content,
        metadata: parent.metadata.overlay(&child.metadata),
        branding: child.branding.clone().or_else(|| parent.branding.clone()),
        inheritance: child.inheritance.clone(),
    }
}

fn merge_styling(parent: &StylingDescriptor, child: &StylingDescriptor) -> StylingDescriptor {
    let mut colors = parent.colors.clone();
    colors.extend(child.colors.iter().map(|(k, v)| (k.clone(), v.clone())));

    let mut spacing = parent.spacing.clone();
    spacing.extend(child.spacing.iter().map(|(k, v)| (k.clone(), *v)));

    StylingDescriptor {
        fonts: concat(&parent.fonts, &child.fonts),
        colors,
        spacing,
        custom_css: concat_text(parent.custom_css.as_deref(), child.custom_css.as_deref()),
    }
}

/// Put child markup into the parent's placeholder, or after the parent.
fn merge_markup(parent: &str, child: &str, placeholder: &str) -> String {
    if parent.contains(placeholder) {
        parent.replacen(placeholder, child, 1)
    } else {
        tracing::debug!("Parent markup has no {} placeholder, appending child", placeholder);
        concat_markup(parent, child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Asset, ClientBranding, FontSpec, Inheritance, SectionDecl, VariableDecl,
    };
    use crate::store::MemoryStore;

    fn child_of(id: &str, parent: &str, strategy: MergeStrategy) -> Template {
        let mut t = Template::new(id, id);
        t.inheritance = Some(Inheritance::new(parent, strategy));
        t
    }

    #[test]
    fn template_without_parent_is_identity() {
        let store = MemoryStore::new();
        let mut t = Template::new("solo", "Solo");
        t.content.html = "<p>solo</p>".into();
        t.schema.variables.push(VariableDecl::new("client"));

        let resolved = resolve_inheritance(&store, &t).unwrap();

        assert_eq!(resolved, t);
    }

    #[test]
    fn missing_parent_is_not_found() {
        let store = MemoryStore::new();
        let child = child_of("child", "ghost", MergeStrategy::Merge);

        let err = resolve_inheritance(&store, &child).unwrap_err();
        assert!(matches!(err, ComposeError::NotFound { id } if id == "ghost"));
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let store = MemoryStore::new();
        let child = child_of("loop", "loop", MergeStrategy::Merge);

        let err = resolve_inheritance(&store, &child).unwrap_err();
        assert_eq!(err.to_string(), "Inheritance cycle detected: loop → loop");
    }

    #[test]
    fn ancestor_cycle_names_full_chain() {
        let store = MemoryStore::with_templates([
            child_of("b", "c", MergeStrategy::Merge),
            child_of("c", "b", MergeStrategy::Merge),
        ]);
        let leaf = child_of("a", "b", MergeStrategy::Merge);

        let err = resolve_inheritance(&store, &leaf).unwrap_err();
        match err {
            ComposeError::CycleDetected { chain } => assert_eq!(chain, "a → b → c → b"),
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn deep_chain_resolves_in_order() {
        let mut root = Template::new("t0", "root");
        root.content.html = "0".into();
        let mut templates = vec![root];
        for i in 1..6 {
            let mut t = child_of(&format!("t{i}"), &format!("t{}", i - 1), MergeStrategy::Extend);
            t.content.html = i.to_string();
            templates.push(t);
        }
        let leaf = templates.pop().unwrap();
        let store = MemoryStore::with_templates(templates);

        let resolved = resolve_inheritance(&store, &leaf).unwrap();

        assert_eq!(resolved.content.html, "0\n1\n2\n3\n4\n5");
        assert_eq!(resolved.id, "t5");
    }

    #[test]
    fn chain_longer_than_limit_fails() {
        let settings = Settings {
            max_inheritance_depth: 2,
            ..Default::default()
        };
        let store = MemoryStore::with_templates([
            Template::new("t0", "root"),
            child_of("t1", "t0", MergeStrategy::Merge),
            child_of("t2", "t1", MergeStrategy::Merge),
        ]);
        let resolver = InheritanceResolver::with_settings(&store, &settings);

        assert!(resolver.resolve(&child_of("t2b", "t1", MergeStrategy::Merge)).is_ok());
        let err = resolver
            .resolve(&child_of("t3", "t2", MergeStrategy::Merge))
            .unwrap_err();
        assert!(matches!(err, ComposeError::DepthExceeded { max: 2, .. }));
    }

    #[test]
    fn merge_dedups_sections_keeping_parent() {
        let mut parent = Template::new("p", "P");
        parent.schema.sections = vec![SectionDecl::new("s1", "Parent intro")];
        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.schema.sections = vec![
            SectionDecl::new("s1", "Child intro"),
            SectionDecl::new("s2", "Pricing"),
        ];

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");

        assert_eq!(merged.schema.sections.len(), 2);
        assert_eq!(merged.schema.sections[0].title, "Parent intro");
        assert_eq!(merged.schema.sections[1].id, "s2");
    }

    #[test]
    fn merge_dedups_variables_and_assets() {
        let mut parent = Template::new("p", "P");
        parent.schema.variables = vec![VariableDecl::new("client")];
        parent.content.assets = vec![Asset::image("logo", "parent.png")];
        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.schema.variables = vec![VariableDecl::new("client"), VariableDecl::new("total")];
        child.content.assets = vec![
            Asset::image("logo", "child.png"),
            Asset::image("seal", "seal.png"),
        ];

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");

        let names: Vec<_> = merged.schema.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["client", "total"]);
        assert_eq!(merged.content.assets.len(), 2);
        assert_eq!(merged.content.assets[0].url, "parent.png");
    }

    #[test]
    fn merge_substitutes_placeholder_or_appends() {
        let mut parent = Template::new("p", "P");
        parent.content.html = "<header/>{{content}}<footer/>".into();
        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.content.html = "<p>body</p>".into();

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");
        assert_eq!(merged.content.html, "<header/><p>body</p><footer/>");

        parent.content.html = "<header/>".into();
        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");
        assert_eq!(merged.content.html, "<header/>\n<p>body</p>");
    }

    #[test]
    fn merge_styling_and_text_policies() {
        let mut parent = Template::new("p", "P");
        parent.schema.styling.fonts = vec![FontSpec::family("Inter")];
        parent.schema.styling.colors.insert("primary".into(), "#000".into());
        parent.schema.styling.colors.insert("muted".into(), "#999".into());
        parent.schema.styling.custom_css = Some(".a{}".into());
        parent.content.css = Some("body{}".into());
        parent.content.js = Some("parent();".into());
        parent.schema.layout.page_size = Some("A4".into());
        parent.schema.layout.columns = Some(2);

        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.schema.styling.fonts = vec![FontSpec::family("Inter")];
        child.schema.styling.colors.insert("primary".into(), "#f00".into());
        child.schema.styling.custom_css = Some(".b{}".into());
        child.content.css = Some("h1{}".into());
        child.schema.layout.columns = Some(1);

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");
        let styling = &merged.schema.styling;

        assert_eq!(styling.fonts.len(), 2);
        assert_eq!(styling.colors["primary"], "#f00");
        assert_eq!(styling.colors["muted"], "#999");
        assert_eq!(styling.custom_css.as_deref(), Some(".a{}\n.b{}"));
        assert_eq!(merged.content.css.as_deref(), Some("body{}\nh1{}"));
        assert_eq!(merged.content.js.as_deref(), Some("parent();"));
        assert_eq!(merged.schema.layout.page_size.as_deref(), Some("A4"));
        assert_eq!(merged.schema.layout.columns, Some(1));
    }

    #[test]
    fn branding_child_wins_else_parent() {
        let mut parent = Template::new("p", "P");
        parent.branding = Some(ClientBranding::new("Parent", "#1", "#2", "#3"));
        let mut child = child_of("c", "p", MergeStrategy::Merge);

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");
        assert_eq!(merged.branding.as_ref().unwrap().name, "Parent");

        child.branding = Some(ClientBranding::new("Child", "#4", "#5", "#6"));
        let merged = merge_with_parent(&parent, &child, MergeStrategy::Merge, "{{content}}");
        assert_eq!(merged.branding.unwrap().name, "Child");
    }

    #[test]
    fn replace_returns_child_with_linkage() {
        let mut parent = Template::new("p", "P");
        parent.content.html = "<parent/>".into();
        parent.schema.variables.push(VariableDecl::new("client"));
        let mut child = child_of("c", "p", MergeStrategy::Replace);
        child.content.html = "<child/>".into();

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Replace, "{{content}}");

        assert_eq!(merged, child);
        assert_eq!(merged.parent_id(), Some("p"));
        assert!(merged.schema.variables.is_empty());
    }

    #[test]
    fn extend_concatenates_without_dedup() {
        let mut parent = Template::new("p", "P");
        parent.schema.variables = vec![VariableDecl::new("v1")];
        parent.schema.sections = vec![SectionDecl::new("s1", "One")];
        parent.schema.layout.sections = vec!["s1".into()];
        parent.content.html = "<a/>{{content}}".into();
        parent.content.assets = vec![Asset::image("logo", "p.png")];
        parent.metadata.author = Some("parent".into());
        parent.metadata.category = Some("sales".into());

        let mut child = child_of("c", "p", MergeStrategy::Extend);
        child.version = "2.0.0".into();
        child.schema.variables = vec![VariableDecl::new("v2"), VariableDecl::new("v1")];
        child.schema.sections = vec![SectionDecl::new("s1", "Again")];
        child.schema.layout.sections = vec!["s1".into()];
        child.content.html = "<b/>".into();
        child.content.assets = vec![Asset::image("logo", "c.png")];
        child.metadata.author = Some("child".into());

        let merged = merge_with_parent(&parent, &child, MergeStrategy::Extend, "{{content}}");

        let names: Vec<_> = merged.schema.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["v1", "v2", "v1"]);
        assert_eq!(merged.schema.sections.len(), 2);
        assert_eq!(merged.schema.layout.sections, vec!["s1", "s1"]);
        assert_eq!(merged.content.html, "<a/>{{content}}\n<b/>");
        assert_eq!(merged.content.assets.len(), 2);
        assert_eq!(merged.id, "c");
        assert_eq!(merged.version, "2.0.0");
        assert_eq!(merged.metadata.author.as_deref(), Some("child"));
        assert_eq!(merged.metadata.category.as_deref(), Some("sales"));
    }

    #[test]
    fn resolution_does_not_modify_inputs() {
        let mut parent = Template::new("p", "P");
        parent.content.html = "{{content}}".into();
        let store = MemoryStore::with_templates([parent.clone()]);
        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.content.html = "<x/>".into();
        let child_before = child.clone();

        let _ = resolve_inheritance(&store, &child).unwrap();

        assert_eq!(child, child_before);
        assert_eq!(store.get_by_id("p").unwrap(), parent);
    }

    #[test]
    fn resolution_is_deterministic() {
        let mut parent = Template::new("p", "P");
        parent.schema.sections = vec![SectionDecl::new("s1", "One")];
        let store = MemoryStore::with_templates([parent]);
        let mut child = child_of("c", "p", MergeStrategy::Merge);
        child.schema.sections = vec![SectionDecl::new("s2", "Two")];

        let first = resolve_inheritance(&store, &child).unwrap();
        let second = resolve_inheritance(&store, &child).unwrap();

        assert_eq!(first, second);
    }
}
