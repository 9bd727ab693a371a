//! # Composable REST Resource
//!
//! Collections of records fetched from REST endpoints, managed by a reducer.
//!
//! A [`Resource`] pairs a [`ResourceReducer`] with the [`Transport`] it sends
//! requests through. The reducer owns no state: the host store passes
//! [`ResourceState`] in and the reducer computes the transition.
//!
//! ## Reconciliation
//!
//! Incoming records are upsert-merged by their identity field (`_id` unless
//! configured): a record with a known identity has its present fields
//! overwritten, an unknown one is appended. The collection is re-sorted with
//! the current comparator after every mutation, so it is always unique by
//! identity and fully ordered.
//!
//! ## Request tracking
//!
//! Every operation name (`fetch`, `fetchById`, `create`, `update`, `delete`,
//! or a custom name) has at most one [`RequestState`]. Starting a request
//! overwrites it with `pending`; settling records `succeeded` or `failed`
//! with the status code, payload and error message. The last request to
//! settle for a name wins.
//!
//! ## Example
//!
//! ```no_run
//! use composable_rest_resource::{Resource, ResourceAction, ResourceConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let widgets = Resource::http(
//!     ResourceConfig::new("widgets").with_base_url("https://api.example.com"),
//! )?;
//! let selectors = widgets.selectors();
//! let store = widgets.into_store();
//!
//! store.send(ResourceAction::fetch()).await?.wait().await;
//!
//! let loaded = store.state(|s| selectors.is_loaded(s)).await;
//! # let _ = loaded;
//! # Ok(())
//! # }
//! ```

pub mod action;
pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod record;
pub mod reducer;
pub mod registry;
pub mod request;
pub mod resource;
pub mod selectors;
pub mod state;
pub mod status;
pub mod transport;

pub use action::{CustomHandlers, CustomRequest, DeleteTarget, RequestKind, ResourceAction};
pub use collection::{Collection, Comparator, SortOrder};
pub use config::ResourceConfig;
pub use error::{ResourceError, Result};
pub use http::{HttpTransport, PreparedRequest};
pub use record::{Params, Record};
pub use reducer::{ResourceEnvironment, ResourceReducer};
pub use registry::{RegistryAction, RegistryState, ResourceRegistry};
pub use request::{RequestError, RequestState, RequestStatus, operation};
pub use resource::{Resource, ResourceStore};
pub use selectors::Selectors;
pub use state::ResourceState;
pub use status::{RequestFailure, failure_message, status_override};
pub use transport::{Method, Transport, TransportError, TransportRequest, TransportResponse};
