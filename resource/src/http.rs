//! Default [`Transport`] backed by `reqwest`.

use crate::config::{ResourceConfig, encode_component};
use crate::record::Params;
use crate::transport::{Method, Transport, TransportError, TransportRequest, TransportResponse};
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;

/// Content type sent with every request.
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A request fully built, before it is handed to the HTTP client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// HTTP method.
    pub method: Method,
    /// Final URL, query string included for GET.
    pub url: String,
    /// Headers in send order.
    pub headers: Vec<(String, String)>,
    /// JSON body for non-GET requests.
    pub body: Option<String>,
}

/// HTTP transport sending JSON requests with `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
    headers: BTreeMap<String, String>,
}

impl HttpTransport {
    /// Transport with a fresh client and no default headers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport reusing an existing client (connection pool, TLS settings).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            headers: BTreeMap::new(),
        }
    }

    /// Transport carrying the configured default headers.
    #[must_use]
    pub fn from_config(config: &ResourceConfig) -> Self {
        Self {
            client: Client::new(),
            headers: config.headers().clone(),
        }
    }

    /// Add a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Build the request without sending it.
    ///
    /// GET params become the query string; every other method sends them
    /// as a JSON object body.
    #[must_use]
    pub fn prepare(&self, request: &TransportRequest) -> PreparedRequest {
        let mut headers = vec![("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string())];
        headers.extend(
            self.headers
                .iter()
                .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
                .map(|(name, value)| (name.clone(), value.clone())),
        );

        let (url, body) = match request.method {
            Method::Get => (with_query(&request.url, &request.params), None),
            _ => (
                request.url.clone(),
                Some(Value::Object(request.params.clone()).to_string()),
            ),
        };

        PreparedRequest {
            method: request.method,
            url,
            headers,
            body,
        }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let prepared = self.prepare(&request);
        tracing::debug!(method = %prepared.method, url = %prepared.url, "Sending request");

        let mut builder = self
            .client
            .request(to_reqwest_method(prepared.method), &prepared.url);
        for (name, value) in &prepared.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = prepared.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_builder() {
                TransportError::InvalidRequest(e.to_string())
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        Ok(TransportResponse::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            body,
        ))
    }
}

const fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn with_query(url: &str, params: &Params) -> String {
    if params.is_empty() {
        return url.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| {
            format!("{}={}", encode_component(key), encode_component(&query_value(value)))
        })
        .collect::<Vec<_>>()
        .join("&");
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

fn query_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        Value::Array(items) => items
            .iter()
            .map(query_value)
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}
