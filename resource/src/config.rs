//! Resource configuration.
//!
//! Shared settings (API host, auth headers) live in a base configuration that
//! each resource configuration extends explicitly:
//!
//! ```
//! use composable_rest_resource::ResourceConfig;
//!
//! let api = ResourceConfig::default()
//!     .with_base_url("https://api.example.com")
//!     .with_header("Authorization", "Bearer token");
//!
//! let widgets = ResourceConfig::new("widgets").extend(&api);
//! assert_eq!(widgets.collection_url(), "https://api.example.com/widgets");
//! assert_eq!(widgets.headers().get("Authorization").map(String::as_str), Some("Bearer token"));
//! ```

use crate::error::{ResourceError, Result};
use crate::record::DEFAULT_ID_FIELD;
use std::collections::BTreeMap;

/// Environment variable read by [`ResourceConfig::from_env`].
pub const BASE_URL_ENV: &str = "REST_BASE_URL";

/// Configuration of one REST resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceConfig {
    name: String,
    base_url: Option<String>,
    path: Option<String>,
    id_field: Option<String>,
    headers: BTreeMap<String, String>,
}

impl ResourceConfig {
    /// Configuration for the resource `name`, all other settings defaulted.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Like [`ResourceConfig::new`], with the base URL taken from `REST_BASE_URL` when set.
    pub fn from_env(name: impl Into<String>) -> Self {
        let config = Self::new(name);
        match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.trim().is_empty() => config.with_base_url(base_url),
            _ => config,
        }
    }

    /// Set the URL prefix (scheme and host, optionally a path prefix).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the collection path (default: `/{name}`).
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the identity field (default: `_id`).
    #[must_use]
    pub fn with_id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = Some(id_field.into());
        self
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Layer this configuration over `base`.
    ///
    /// Settings made on `self` win; unset ones are inherited from `base`.
    /// Headers are merged, with `self` overriding equal names.
    #[must_use]
    pub fn extend(mut self, base: &Self) -> Self {
        if self.name.is_empty() {
            self.name.clone_from(&base.name);
        }
        if self.base_url.is_none() {
            self.base_url.clone_from(&base.base_url);
        }
        if self.path.is_none() {
            self.path.clone_from(&base.path);
        }
        if self.id_field.is_none() {
            self.id_field.clone_from(&base.id_field);
        }
        for (name, value) in &base.headers {
            self.headers
                .entry(name.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Check the configuration can back a resource.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`] when the name or identity field is empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ResourceError::Configuration(
                "resource name is required".to_string(),
            ));
        }
        if self.id_field().trim().is_empty() {
            return Err(ResourceError::Configuration(format!(
                "resource `{}` has an empty identity field",
                self.name
            )));
        }
        Ok(())
    }

    /// Resource name, also the state slot key.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity field name.
    #[must_use]
    pub fn id_field(&self) -> &str {
        self.id_field.as_deref().unwrap_or(DEFAULT_ID_FIELD)
    }

    /// Headers sent with every request.
    #[must_use]
    pub const fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Collection path.
    #[must_use]
    pub fn path(&self) -> String {
        match &self.path {
            Some(path) => path.clone(),
            None => format!("/{}", self.name),
        }
    }

    /// URL of the collection (`{base_url}{path}`).
    #[must_use]
    pub fn collection_url(&self) -> String {
        let base = self.base_url.as_deref().unwrap_or("").trim_end_matches('/');
        let path = self.path();
        if path.is_empty() || path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// URL of one record (`{collection_url}/{id}`, id percent-encoded).
    #[must_use]
    pub fn item_url(&self, id: &serde_json::Value) -> String {
        let id = match id {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        format!(
            "{}/{}",
            self.collection_url().trim_end_matches('/'),
            encode_component(&id)
        )
    }

    /// URL of a custom endpoint below the collection.
    #[must_use]
    pub fn nested_url(&self, path: &str) -> String {
        let collection = self.collection_url();
        let collection = collection.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            collection.to_string()
        } else {
            format!("{collection}/{path}")
        }
    }
}

/// Percent-encode one URL component, spaces as `%20`.
pub(crate) fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
