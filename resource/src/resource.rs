//! One configured REST resource: reducer, environment and selectors together.

use crate::action::ResourceAction;
use crate::collection::SortOrder;
use crate::config::ResourceConfig;
use crate::error::Result;
use crate::http::HttpTransport;
use crate::record::Record;
use crate::reducer::{ResourceEnvironment, ResourceReducer};
use crate::selectors::Selectors;
use crate::state::ResourceState;
use crate::transport::Transport;
use composable_rest_runtime::Store;
use std::cmp::Ordering;

/// A store running a single resource.
pub type ResourceStore<T> =
    Store<ResourceState, ResourceAction, ResourceEnvironment<T>, ResourceReducer<T>>;

/// A REST resource bound to its transport.
///
/// ```no_run
/// use composable_rest_resource::{Resource, ResourceConfig};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let widgets = Resource::http(ResourceConfig::from_env("widgets"))?;
/// let selectors = widgets.selectors();
/// let store = widgets.into_store();
///
/// let mut handle = store.send(composable_rest_resource::ResourceAction::fetch()).await?;
/// handle.wait().await;
/// let count = store.state(|s| selectors.get_all(s).len()).await;
/// # let _ = count;
/// # Ok(())
/// # }
/// ```
pub struct Resource<T> {
    reducer: ResourceReducer<T>,
    environment: ResourceEnvironment<T>,
    selectors: Selectors,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            reducer: self.reducer.clone(),
            environment: self.environment.clone(),
            selectors: self.selectors.clone(),
        }
    }
}

impl Resource<HttpTransport> {
    /// Resource sending requests over HTTP with the configured headers.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`](crate::ResourceError::Configuration)
    /// when the configuration does not validate.
    pub fn http(config: ResourceConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(&config);
        Self::new(config, transport)
    }
}

impl<T> Resource<T>
where
    T: Transport + 'static,
{
    /// Resource sending requests through `transport`.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`](crate::ResourceError::Configuration)
    /// when the configuration does not validate.
    pub fn new(config: ResourceConfig, transport: T) -> Result<Self> {
        config.validate()?;
        tracing::debug!(
            resource = config.name(),
            url = %config.collection_url(),
            id_field = config.id_field(),
            "Resource configured"
        );
        let selectors = Selectors::new(config.id_field());
        Ok(Self {
            reducer: ResourceReducer::new(config),
            environment: ResourceEnvironment::new(transport),
            selectors,
        })
    }

    /// Resource name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.reducer.config().name()
    }

    /// Resource configuration.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        self.reducer.config()
    }

    /// The reducer, for registration in a host store.
    #[must_use]
    pub const fn reducer(&self) -> &ResourceReducer<T> {
        &self.reducer
    }

    /// The environment the reducer expects.
    #[must_use]
    pub const fn environment(&self) -> &ResourceEnvironment<T> {
        &self.environment
    }

    /// Selectors bound to the identity field.
    #[must_use]
    pub fn selectors(&self) -> Selectors {
        self.selectors.clone()
    }

    /// Shared comparator handle.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.reducer.sort_order().clone()
    }

    /// Replace the comparator used by subsequent sorts.
    pub fn set_comparator<F>(&self, compare: F)
    where
        F: Fn(&Record, &Record) -> Ordering + Send + Sync + 'static,
    {
        self.reducer.sort_order().set(compare);
    }

    /// Empty state for this resource.
    #[must_use]
    pub fn initial_state(&self) -> ResourceState {
        ResourceState::new()
    }

    /// Split into reducer and environment.
    #[must_use]
    pub fn into_parts(self) -> (ResourceReducer<T>, ResourceEnvironment<T>) {
        (self.reducer, self.environment)
    }

    /// A store owning this resource's state.
    #[must_use]
    pub fn into_store(self) -> ResourceStore<T> {
        let state = self.initial_state();
        Store::new(state, self.reducer, self.environment)
    }

}
