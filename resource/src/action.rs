//! Actions understood by the resource reducer.
//!
//! Three groups share one enum:
//!
//! - **Commands** start a request: `Fetch`, `FetchById`, `Create`, `Update`,
//!   `Delete` and `Custom`.
//! - **Settled** is fed back by the transport effect when a request completes.
//! - **Transitions** mutate the state directly: `Read`, `Created`, `Updated`,
//!   `Deleted`, `UpdateRequest`, `ClearRequest` and `Clear`.

use crate::error::{ResourceError, Result};
use crate::record::{Params, Record};
use crate::request::RequestState;
use crate::status::RequestFailure;
use crate::transport::{Method, TransportError, TransportResponse};
use serde_json::Value;
use std::sync::Arc;

/// Follow-up actions for a successful custom request.
pub type SuccessHandler = Arc<dyn Fn(&str, &TransportResponse) -> Vec<ResourceAction> + Send + Sync>;

/// Follow-up actions for a failed custom request.
pub type FailureHandler = Arc<dyn Fn(&str, &RequestFailure) -> Vec<ResourceAction> + Send + Sync>;

/// What a `Deleted` transition removes.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteTarget {
    /// The record with this identity value.
    Id(Value),
    /// Every record.
    All,
}

/// How a settled response is interpreted.
#[derive(Debug, Clone)]
pub enum RequestKind {
    /// Body is a list of records, applied with `Read`.
    Fetch,
    /// Body is one record, applied with `Read`.
    FetchById,
    /// Body is one record, applied with `Created`.
    Create,
    /// Body is one record, applied with `Updated`.
    Update,
    /// Body is ignored; the record is removed with `Deleted`.
    Delete {
        /// Identity of the deleted record.
        id: Value,
    },
    /// Outcome is passed to the request's handlers.
    Custom(CustomHandlers),
}

/// Optional handlers of a custom request.
///
/// A missing handler falls back to recording the terminal request state.
#[derive(Clone, Default)]
pub struct CustomHandlers {
    /// Called on a success status.
    pub on_success: Option<SuccessHandler>,
    /// Called on a transport failure or non-success status.
    pub on_failure: Option<FailureHandler>,
}

impl std::fmt::Debug for CustomHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomHandlers")
            .field("on_success", &self.on_success.is_some())
            .field("on_failure", &self.on_failure.is_some())
            .finish()
    }
}

/// A request outside the five built-in operations.
///
/// ```
/// use composable_rest_resource::{CustomRequest, Method, ResourceAction, RequestState};
///
/// let archive = CustomRequest::new("archive", Method::Post, "/7/archive").on_success(
///     |operation, response| {
///         vec![ResourceAction::UpdateRequest {
///             operation: operation.to_string(),
///             request: RequestState::succeeded(response.status, None),
///         }]
///     },
/// );
/// assert_eq!(archive.operation(), "archive");
/// ```
#[derive(Debug, Clone)]
pub struct CustomRequest {
    operation: String,
    method: Method,
    path: String,
    params: Params,
    handlers: CustomHandlers,
}

impl CustomRequest {
    /// Custom request `operation` sent to `path`, relative to the resource URL.
    pub fn new(operation: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            method,
            path: path.into(),
            params: Params::new(),
            handlers: CustomHandlers::default(),
        }
    }

    /// Set the query (GET) or body (other methods) params.
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Replace the default success handling.
    #[must_use]
    pub fn on_success<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &TransportResponse) -> Vec<ResourceAction> + Send + Sync + 'static,
    {
        self.handlers.on_success = Some(Arc::new(handler));
        self
    }

    /// Replace the default failure handling.
    #[must_use]
    pub fn on_failure<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &RequestFailure) -> Vec<ResourceAction> + Send + Sync + 'static,
    {
        self.handlers.on_failure = Some(Arc::new(handler));
        self
    }

    /// Operation name used as the request table key.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Path relative to the resource URL.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request params.
    #[must_use]
    pub const fn params(&self) -> &Params {
        &self.params
    }

    pub(crate) fn into_parts(self) -> (String, Method, String, Params, CustomHandlers) {
        (self.operation, self.method, self.path, self.params, self.handlers)
    }
}

/// Everything the resource reducer reacts to.
#[derive(Debug, Clone)]
pub enum ResourceAction {
    // Commands
    /// `GET {url}` and read the returned list.
    Fetch {
        /// Query params.
        params: Params,
    },
    /// `GET {url}/{id}` and read the returned record.
    FetchById {
        /// Identity value.
        id: Value,
        /// Query params.
        params: Params,
    },
    /// `POST {url}` with the record as body.
    Create {
        /// New record.
        record: Record,
    },
    /// `PUT {url}/{id}` with the record as body, id taken from the record.
    Update {
        /// Changed record, identity field included.
        record: Record,
    },
    /// `DELETE {url}/{id}`.
    Delete {
        /// Identity value.
        id: Value,
    },
    /// Any other request.
    Custom(CustomRequest),

    // Feedback
    /// A request completed, with or without a response.
    Settled {
        /// Operation name.
        operation: String,
        /// How to interpret the outcome.
        kind: RequestKind,
        /// Response, or the failure that prevented one.
        outcome: std::result::Result<TransportResponse, TransportError>,
    },

    // Transitions
    /// Merge records from a list fetch and mark the resource loaded.
    Read {
        /// Incoming records.
        records: Vec<Record>,
    },
    /// Merge created records.
    Created {
        /// Incoming records.
        records: Vec<Record>,
    },
    /// Merge updated records.
    Updated {
        /// Incoming records.
        records: Vec<Record>,
    },
    /// Remove one record or all of them.
    Deleted(DeleteTarget),
    /// Overwrite the state of one operation.
    UpdateRequest {
        /// Operation name.
        operation: String,
        /// New state.
        request: RequestState,
    },
    /// Forget the state of one operation.
    ClearRequest {
        /// Operation name.
        operation: String,
    },
    /// Reset to the initial state.
    Clear,
}

impl ResourceAction {
    /// Fetch the whole collection.
    #[must_use]
    pub fn fetch() -> Self {
        Self::Fetch {
            params: Params::new(),
        }
    }

    /// Fetch the collection filtered by query params.
    #[must_use]
    pub const fn fetch_with(params: Params) -> Self {
        Self::Fetch { params }
    }

    /// Fetch one record.
    pub fn fetch_by_id(id: impl Into<Value>) -> Self {
        Self::FetchById {
            id: id.into(),
            params: Params::new(),
        }
    }

    /// Create a record.
    #[must_use]
    pub const fn create(record: Record) -> Self {
        Self::Create { record }
    }

    /// Update a record.
    #[must_use]
    pub const fn update(record: Record) -> Self {
        Self::Update { record }
    }

    /// Delete a record.
    pub fn delete(id: impl Into<Value>) -> Self {
        Self::Delete { id: id.into() }
    }

    /// Forget the state of `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] when `operation` is empty.
    pub fn clear_request(operation: impl Into<String>) -> Result<Self> {
        let operation = operation.into();
        if operation.is_empty() {
            return Err(ResourceError::missing_operation("clear_request"));
        }
        Ok(Self::ClearRequest { operation })
    }

    /// Record the state of `operation`.
    pub fn update_request(operation: impl Into<String>, request: RequestState) -> Self {
        Self::UpdateRequest {
            operation: operation.into(),
            request,
        }
    }

    /// Operation name when this action settles a request.
    #[must_use]
    pub fn settled_operation(&self) -> Option<&str> {
        match self {
            Self::Settled { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_request_requires_operation() {
        assert!(matches!(
            ResourceAction::clear_request(""),
            Err(ResourceError::InvalidArgument(_))
        ));
        assert!(matches!(
            ResourceAction::clear_request("fetch"),
            Ok(ResourceAction::ClearRequest { operation }) if operation == "fetch"
        ));
    }

    #[test]
    fn test_handlers_debug_hides_closures() {
        let request = CustomRequest::new("ping", Method::Get, "/ping")
            .on_failure(|_, _| Vec::new());

        let debug = format!("{request:?}");
        assert!(debug.contains("on_success: false"));
        assert!(debug.contains("on_failure: true"));
    }
}
