//! # Composable REST Testing
//!
//! Test support for resource reducers and stores:
//!
//! - [`ReducerTest`]: Given-When-Then harness for reducer transitions
//! - [`MockTransport`]: scripted transport recording every request
//! - [`fixtures`]: record builders
//! - [`init_test_tracing`]: log output captured by the test harness
//!
//! ## Example
//!
//! ```ignore
//! use composable_rest_testing::{MockTransport, init_test_tracing};
//!
//! #[tokio::test]
//! async fn test_fetch_flow() {
//!     init_test_tracing();
//!     let transport = MockTransport::new().with_json(200, json!([{"_id": 1}]));
//!     let store = Resource::new(ResourceConfig::new("widgets"), transport)?.into_store();
//!
//!     store.send(ResourceAction::fetch()).await?.wait().await;
//!
//!     assert!(store.state(|s| s.is_loaded).await);
//! }
//! ```

pub mod mocks;
pub mod reducer_test;

/// Record builders for tests.
pub mod fixtures {
    use composable_rest_resource::Record;
    use serde_json::Value;

    /// A record from a JSON object literal; any other value yields an empty record.
    #[must_use]
    pub fn record(value: Value) -> Record {
        match value {
            Value::Object(record) => record,
            _ => Record::new(),
        }
    }

    /// Records from a JSON array literal, skipping non-objects.
    #[must_use]
    pub fn records(value: Value) -> Vec<Record> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(record) => Some(record),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Route `tracing` output through the test writer.
///
/// Respects `RUST_LOG` and defaults to `debug`. Safe to call from every
/// test: only the first call installs the subscriber.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

pub use mocks::MockTransport;
pub use reducer_test::{ReducerTest, assertions};
