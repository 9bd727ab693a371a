//! The transport seam between the resource reducer and the network.
//!
//! The reducer only ever sees these plain-data types. Executing the request
//! is the job of a [`Transport`] implementation injected per resource:
//! [`HttpTransport`](crate::http::HttpTransport) in production, a scripted
//! mock in tests.

use crate::record::Params;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;

/// HTTP method of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// `GET`, params go to the query string.
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH` (custom operations only)
    Patch,
    /// `DELETE`
    Delete,
}

impl Method {
    /// Upper-case method name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request as handed to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL, without the query string.
    pub url: String,
    /// Query parameters (GET) or JSON body fields (other methods).
    pub params: Params,
}

impl TransportRequest {
    /// Create a request.
    pub fn new(method: Method, url: impl Into<String>, params: Params) -> Self {
        Self {
            method,
            url: url.into(),
            params,
        }
    }
}

/// A received HTTP response with its body already read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase.
    pub status_text: String,
    /// Raw body text.
    pub body: String,
}

impl TransportResponse {
    /// Create a response from its parts.
    pub fn new(status: u16, status_text: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: body.into(),
        }
    }

    /// Response whose reason phrase is the canonical one for `status`.
    pub fn with_body(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, canonical_reason(status), body)
    }

    /// Response carrying a JSON body.
    #[must_use]
    pub fn from_json(status: u16, body: &serde_json::Value) -> Self {
        Self::with_body(status, body.to_string())
    }

    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// The body as text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.body
    }

    /// The body parsed as JSON.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Canonical reason phrase for a status code, or an empty string.
#[must_use]
pub fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Failure before any response was received.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Network-level failure (connection refused, timeout, reset).
    #[error("{0}")]
    Network(String),

    /// The request could not be built, usually because of a malformed URL.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Sends requests on behalf of a resource.
///
/// Implementations resolve to `Err` only when no response was received;
/// non-success statuses are ordinary responses.
pub trait Transport: Send + Sync {
    /// Send one request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the request could not be sent or no
    /// response arrived.
    fn send(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
