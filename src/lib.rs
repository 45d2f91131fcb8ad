//! Doc Composer - document template composition.
//!
//! Builds concrete document templates (quotes, proposals, invoices, reports,
//! contracts) from reusable bases, resolves parent chains, applies client
//! branding, and merges priority-ordered layers into one template.
//!
//! # Modules
//!
//! - [`compose`] - The composition engine
//! - [`composer`] - Store-backed facade and render artifacts
//! - [`error`] - Error types and result aliases
//! - [`model`] - Template, branding, and layer data model
//! - [`settings`] - Engine tunables
//! - [`store`] - Template lookup by id
//!
//! # Example
//!
//! ```
//! use doc_composer::compose::resolve_conflicts;
//! use doc_composer::model::{Layer, LayerKind};
//! use serde_json::json;
//!
//! let layers = vec![
//!     Layer::new(LayerKind::Base, 0, json!({ "id": "quote", "name": "Quote" }), "base"),
//!     Layer::new(LayerKind::Theme, 10, json!({ "name": "Quote (dark)" }), "theme"),
//! ];
//!
//! let resolved = resolve_conflicts(&layers).unwrap();
//! assert_eq!(resolved.template.name, "Quote (dark)");
//! assert_eq!(resolved.sources, vec!["base", "theme"]);
//! ```
//!
//! For directory-backed stores, see the integration tests.

pub mod compose;
pub mod composer;
pub mod error;
pub mod model;
pub mod settings;
pub mod store;

pub use composer::{Artifact, Composer};
pub use error::{ComposeError, Result};
pub use settings::Settings;
