//! Template fetching over HTTP.
//!
//! Templates are served as JSON documents at `{base_url}/{id}`.

use crate::error::{ComposeError, Result};
use crate::model::Template;
use crate::settings::Settings;
use crate::store::TemplateStore;
use anyhow::Context;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

/// Store that fetches each template from a remote service.
///
/// There is no caching: every lookup is a request.
///
/// # Example
///
/// ```no_run
/// use doc_composer::store::{AuthHeader, HttpStore, TemplateStore};
/// use std::time::Duration;
///
/// let url = "https://templates.example.com/v1/templates";
/// let store = HttpStore::new(url, Duration::from_secs(10))
///     .unwrap()
///     .with_auth(AuthHeader::bearer("token"));
///
/// let template = store.get_by_id("quote-base").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct HttpStore {
    base_url: String,
    timeout: Duration,
    client: Client,
    auth: Option<AuthHeader>,
}

impl HttpStore {
    /// Create a store rooted at `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("doc-composer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            client,
            auth: None,
        })
    }

    /// Create a store using the fetch timeout from settings.
    pub fn with_settings(base_url: impl Into<String>, settings: &Settings) -> Result<Self> {
        Self::new(base_url, settings.fetch_timeout())
    }

    /// Send an authentication header with every request.
    pub fn with_auth(mut self, auth: AuthHeader) -> Self {
        self.auth = Some(auth);
        self
    }

    /// URL a template id is fetched from.
    pub fn url_for(&self, id: &str) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Get the request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn check_id(id: &str) -> Result<()> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && id != "."
            && id != "..";
        if valid {
            Ok(())
        } else {
            Err(ComposeError::invalid(
                id,
                "template id may only contain letters, digits, '-', '_' and '.'",
            ))
        }
    }
}

impl TemplateStore for HttpStore {
    fn get_by_id(&self, id: &str) -> Result<Template> {
        Self::check_id(id)?;
        let url = self.url_for(id);
        tracing::debug!("Fetching template {} from {}", id, url);

        let mut request = self.client.get(&url);
        if let Some(auth) = &self.auth {
            request = request.header(&auth.header_name, &auth.header_value);
        }

        let response = request.send().map_err(|e| ComposeError::Fetch {
            id: id.to_string(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ComposeError::NotFound { id: id.to_string() });
        }
        if !status.is_success() {
            return Err(ComposeError::Fetch {
                id: id.to_string(),
                message: format!("HTTP {} from {}", status, url),
            });
        }

        let value: serde_json::Value = response.json().map_err(|e| ComposeError::Fetch {
            id: id.to_string(),
            message: format!("invalid JSON from {}: {}", url, e),
        })?;

        let template = Template::from_value(value)?;
        if template.id != id {
            tracing::warn!(
                "Template fetched as '{}' declares id '{}'",
                id,
                template.id
            );
        }
        Ok(template)
    }
}

/// Authentication header for remote fetching.
#[derive(Debug, Clone)]
pub struct AuthHeader {
    /// Header name (e.g., "Authorization").
    pub header_name: String,
    /// Header value (e.g., "Bearer token123").
    pub header_value: String,
}

impl AuthHeader {
    /// Create a Bearer token auth header.
    pub fn bearer(token: &str) -> Self {
        Self {
            header_name: "Authorization".to_string(),
            header_value: format!("Bearer {}", token),
        }
    }

    /// Create a custom header auth.
    pub fn custom(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            header_name: name.into(),
            header_value: value.into(),
        }
    }
}
