//! Error types for template composition.
//!
//! This module defines [`ComposeError`], the error type returned by every
//! engine operation, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Use `ComposeError` for failures callers are expected to match on
//! - Use `anyhow::Error` (via `ComposeError::Other`) for unexpected errors
//! - Every message names the template it concerns
//! - The engine never retries; retrying belongs to the store boundary

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for composition operations.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// A base or parent template could not be found in the store.
    #[error("Template not found: {id}")]
    NotFound { id: String },

    /// The inheritance chain revisits a template id.
    #[error("Inheritance cycle detected: {chain}")]
    CycleDetected { chain: String },

    /// A merge strategy outside merge/replace/extend was supplied.
    #[error(
        "Unknown merge strategy '{value}' in template '{template}' \
         (expected merge, replace or extend)"
    )]
    UnknownStrategy { value: String, template: String },

    /// An override, layer, or branding input is malformed.
    #[error("Invalid input for template '{template}': {message}")]
    ValidationError { template: String, message: String },

    /// The inheritance chain is deeper than the configured maximum.
    #[error("Inheritance depth for '{id}' exceeds maximum of {max}")]
    DepthExceeded { id: String, max: usize },

    /// A template or settings file could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    /// A remote store request failed.
    #[error("Failed to fetch template '{id}': {message}")]
    Fetch { id: String, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ComposeError {
    /// Build a cycle error from the visited chain and the id that closed it.
    pub fn cycle(visited: &[String], repeated: &str) -> Self {
        let mut chain: Vec<&str> = visited.iter().map(String::as_str).collect();
        chain.push(repeated);
        Self::CycleDetected {
            chain: chain.join(" → "),
        }
    }

    /// Shorthand for a validation failure on a template.
    pub fn invalid(template: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            template: template.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for composition operations.
pub type Result<T> = std::result::Result<T, ComposeError>;
