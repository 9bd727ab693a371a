//! Read-only views over a [`ResourceState`].

use crate::error::{ResourceError, Result};
use crate::record::{self, Record};
use crate::request::{RequestError, RequestState, RequestStatus};
use crate::state::ResourceState;
use serde_json::Value;

/// Selectors bound to one resource's identity field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selectors {
    id_field: String,
}

impl Selectors {
    /// Selectors resolving identities through `id_field`.
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
        }
    }

    /// Whether a successful read has happened since the last clear.
    #[must_use]
    pub const fn is_loaded(&self, state: &ResourceState) -> bool {
        state.is_loaded
    }

    /// All records, in order.
    #[must_use]
    pub fn get_all<'s>(&self, state: &'s ResourceState) -> &'s [Record] {
        state.records.as_slice()
    }

    /// The record with identity `id`.
    #[must_use]
    pub fn get<'s>(&self, state: &'s ResourceState, id: &Value) -> Option<&'s Record> {
        state.records.find(&self.id_field, id)
    }

    /// Records whose fields loosely equal every condition.
    ///
    /// Empty conditions match every record.
    #[must_use]
    pub fn filter<'s>(&self, state: &'s ResourceState, conditions: &Record) -> Vec<&'s Record> {
        state
            .records
            .iter()
            .filter(|candidate| matches(candidate, conditions))
            .collect()
    }

    /// First record matching every condition.
    #[must_use]
    pub fn find_by<'s>(&self, state: &'s ResourceState, conditions: &Record) -> Option<&'s Record> {
        state
            .records
            .iter()
            .find(|candidate| matches(candidate, conditions))
    }

    /// Full state of an operation.
    #[must_use]
    pub fn request<'s>(&self, state: &'s ResourceState, operation: &str) -> Option<&'s RequestState> {
        state.requests.get(operation)
    }

    /// Status of an operation, absent if never started or cleared.
    #[must_use]
    pub fn request_status(&self, state: &ResourceState, operation: &str) -> Option<RequestStatus> {
        self.request(state, operation).map(|request| request.status)
    }

    /// Error of an operation's last failure.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::InvalidArgument`] when `operation` is empty.
    pub fn request_error<'s>(
        &self,
        state: &'s ResourceState,
        operation: &str,
    ) -> Result<Option<&'s RequestError>> {
        if operation.is_empty() {
            return Err(ResourceError::missing_operation("request_error"));
        }
        Ok(self
            .request(state, operation)
            .and_then(|request| request.error.as_ref()))
    }
}

fn matches(candidate: &Record, conditions: &Record) -> bool {
    conditions
        .iter()
        .all(|(field, expected)| record::loose_eq(candidate.get(field), expected))
}
