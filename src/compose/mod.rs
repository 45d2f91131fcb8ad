//! The composition engine.
//!
//! - Base composition in [`base`]
//! - Inheritance resolution in [`inheritance`]
//! - Branding application in [`branding`]
//! - Layer resolution in [`layers`]
//! - Shared merge primitives in [`merger`]
//!
//! Every operation borrows its inputs and returns a new value.
//!
//! # Example
//!
//! ```
//! use doc_composer::compose::{apply_branding, resolve_inheritance};
//! use doc_composer::model::{ClientBranding, Inheritance, MergeStrategy, Template};
//! use doc_composer::store::MemoryStore;
//!
//! let mut base = Template::new("base", "Base");
//! base.content.html = "<h1>{{brand_name}}</h1>{{content}}".into();
//! let store = MemoryStore::with_templates([base]);
//!
//! let mut quote = Template::new("quote", "Quote");
//! quote.content.html = "<table></table>".into();
//! quote.inheritance = Some(Inheritance::new("base", MergeStrategy::Merge));
//!
//! let resolved = resolve_inheritance(&store, &quote).unwrap();
//! let branding = ClientBranding::new("Acme", "#0044cc", "#222222", "#ff9900");
//! let branded = apply_branding(&resolved, &branding).unwrap();
//!
//! assert_eq!(branded.content.html, "<h1>Acme</h1><table></table>");
//! ```

pub mod base;
pub mod branding;
pub mod id;
pub mod inheritance;
pub mod layers;
pub mod merger;

pub use base::{
    apply_overrides, compose_from_base, BrandingOverrides, ContentOverrides, StylingOverrides,
    TemplateOverrides,
};
pub use branding::{
    apply_branding, apply_component_overrides, BrandingApplier, BRAND_BLOCK_END,
    BRAND_BLOCK_START,
};
pub use id::{generate_id, is_generated_id};
pub use inheritance::{merge_with_parent, resolve_inheritance, InheritanceResolver};
pub use layers::{merge_layers, resolve_conflicts, resolve_conflicts_at, LayerStack};
pub use merger::deep_merge;
