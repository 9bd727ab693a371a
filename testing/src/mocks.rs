//! Scripted transport for resource tests
//!
//! [`MockTransport`] answers requests from a queue of scripted replies and
//! records every request it receives, so tests can assert on both the state
//! the reducer produced and the requests it sent.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use composable_rest_resource::{Transport, TransportError, TransportRequest, TransportResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug)]
struct Scripted {
    reply: Result<TransportResponse, TransportError>,
    delay: Option<Duration>,
}

#[derive(Debug, Default)]
struct MockState {
    replies: VecDeque<Scripted>,
    requests: Vec<TransportRequest>,
}

/// In-memory transport answering from a reply queue.
///
/// Replies are consumed in order, one per request. A request arriving when
/// the queue is empty fails with a network error.
///
/// # Example
///
/// ```
/// use composable_rest_testing::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new()
///     .with_json(200, json!([{"_id": 1}]))
///     .with_status(404);
/// assert_eq!(transport.pending_replies(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// Transport with no scripted replies
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a JSON reply
    #[must_use]
    pub fn with_json(self, status: u16, body: Value) -> Self {
        self.push_json(status, body);
        self
    }

    /// Queue a plain-text reply
    #[must_use]
    pub fn with_text(self, status: u16, body: &str) -> Self {
        self.push_reply(Ok(TransportResponse::with_body(status, body)), None);
        self
    }

    /// Queue an empty-body reply
    #[must_use]
    pub fn with_status(self, status: u16) -> Self {
        self.with_text(status, "")
    }

    /// Queue a transport failure
    #[must_use]
    pub fn with_failure(self, error: TransportError) -> Self {
        self.push_reply(Err(error), None);
        self
    }

    /// Queue a JSON reply delivered after `delay`
    #[must_use]
    pub fn with_delayed_json(self, delay: Duration, status: u16, body: Value) -> Self {
        self.push_reply(Ok(TransportResponse::from_json(status, &body)), Some(delay));
        self
    }

    /// Queue a JSON reply on a shared handle
    pub fn push_json(&self, status: u16, body: Value) {
        self.push_reply(Ok(TransportResponse::from_json(status, &body)), None);
    }

    /// Queue any reply on a shared handle
    pub fn push_reply(
        &self,
        reply: Result<TransportResponse, TransportError>,
        delay: Option<Duration>,
    ) {
        self.state
            .lock()
            .unwrap()
            .replies
            .push_back(Scripted { reply, delay });
    }

    /// Every request received so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    /// The most recent request
    #[must_use]
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.state.lock().unwrap().requests.last().cloned()
    }

    /// Number of scripted replies not yet consumed
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.state.lock().unwrap().replies.len()
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let scripted = {
            let mut state = self.state.lock().unwrap();
            let url = request.url.clone();
            state.requests.push(request);
            state.replies.pop_front().ok_or_else(|| {
                TransportError::Network(format!("no scripted reply for {url}"))
            })
        };

        let Scripted { reply, delay } = scripted?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        reply
    }
}
