//! Read-only template lookup.
//!
//! The engine reads templates through the [`TemplateStore`] trait and never
//! writes back. Three implementations are bundled:
//! - [`MemoryStore`] - templates held in a map
//! - [`DirectoryStore`] - YAML/JSON files under a directory
//! - [`HttpStore`] - JSON documents served over HTTP
//!
//! # Example
//!
//! ```
//! use doc_composer::model::Template;
//! use doc_composer::store::{MemoryStore, TemplateStore};
//!
//! let mut store = MemoryStore::new();
//! store.insert(Template::new("quote-base", "Quote"));
//!
//! assert_eq!(store.get_by_id("quote-base").unwrap().name, "Quote");
//! assert!(store.get_by_id("missing").is_err());
//! ```

pub mod directory;
pub mod http;
pub mod memory;

pub use directory::DirectoryStore;
pub use http::{AuthHeader, HttpStore};
pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::Template;
use std::sync::Arc;

/// Lookup of templates by id.
///
/// Implementations return [`ComposeError::NotFound`](crate::ComposeError::NotFound)
/// for unknown ids. Lookups may block; timeouts and retries are the
/// implementation's concern.
pub trait TemplateStore: Send + Sync {
    /// Fetch a template by id.
    fn get_by_id(&self, id: &str) -> Result<Template>;
}

impl<S: TemplateStore + ?Sized> TemplateStore for &S {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        (**self).get_by_id(id)
    }
}

impl<S: TemplateStore + ?Sized> TemplateStore for Arc<S> {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        (**self).get_by_id(id)
    }
}

impl<S: TemplateStore + ?Sized> TemplateStore for Box<S> {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        (**self).get_by_id(id)
    }
}
