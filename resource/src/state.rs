//! Aggregate state of one resource, owned by the host store.

use crate::collection::Collection;
use crate::request::RequestState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the host keeps for one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState {
    /// Set by the first successful read; reset only by `Clear`.
    pub is_loaded: bool,
    /// Ordered records.
    pub records: Collection,
    /// Last known state per operation name.
    pub requests: BTreeMap<String, RequestState>,
}

impl ResourceState {
    /// Empty initial state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the initial defaults.
    pub fn reset(&mut self) {
        self.is_loaded = false;
        self.records.clear();
        self.requests.clear();
    }
}
