//! Per-operation request status tracking.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Built-in operation names used as request table keys.
pub mod operation {
    /// List fetch (`GET {url}`).
    pub const FETCH: &str = "fetch";
    /// Single record fetch (`GET {url}/{id}`).
    pub const FETCH_BY_ID: &str = "fetchById";
    /// Record creation (`POST {url}`).
    pub const CREATE: &str = "create";
    /// Record update (`PUT {url}/{id}`).
    pub const UPDATE: &str = "update";
    /// Record deletion (`DELETE {url}/{id}`).
    pub const DELETE: &str = "delete";
}

/// Lifecycle stage of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Sent, no response yet.
    Pending,
    /// Completed with a success status.
    Succeeded,
    /// Transport failure or non-success status.
    Failed,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Human-readable failure attached to a failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    /// Failure message.
    pub message: String,
}

impl RequestError {
    /// Create an error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Last known state of one operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestState {
    /// Lifecycle stage.
    pub status: RequestStatus,
    /// HTTP status code, when a response was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Parsed response payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Failure description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RequestError>,
}

impl RequestState {
    /// A request that has been sent.
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            status: RequestStatus::Pending,
            status_code: None,
            data: None,
            error: None,
        }
    }

    /// A request that completed successfully.
    #[must_use]
    pub const fn succeeded(status_code: u16, data: Option<Value>) -> Self {
        Self {
            status: RequestStatus::Succeeded,
            status_code: Some(status_code),
            data,
            error: None,
        }
    }

    /// A request that failed, with or without a response.
    pub fn failed(status_code: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status: RequestStatus::Failed,
            status_code,
            data: None,
            error: Some(RequestError::new(message)),
        }
    }

    /// Whether the request reached a terminal status.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self.status, RequestStatus::Pending)
    }
}
