//! Several resources in one store, each under its own name.

use crate::action::ResourceAction;
use crate::error::{ResourceError, Result};
use crate::reducer::{ResourceEnvironment, ResourceReducer};
use crate::resource::Resource;
use crate::state::ResourceState;
use crate::transport::Transport;
use composable_rest_core::effect::Effect;
use composable_rest_core::reducer::Reducer;
use composable_rest_core::{SmallVec, smallvec};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// State of every registered resource, keyed by resource name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryState {
    /// Per-resource state.
    pub resources: BTreeMap<String, ResourceState>,
}

impl RegistryState {
    /// State of the named resource.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }
}

/// An action addressed to one resource.
#[derive(Debug, Clone)]
pub struct RegistryAction {
    /// Target resource name.
    pub resource: String,
    /// The resource's action.
    pub action: ResourceAction,
}

impl RegistryAction {
    /// Address `action` to `resource`.
    pub fn new(resource: impl Into<String>, action: ResourceAction) -> Self {
        Self {
            resource: resource.into(),
            action,
        }
    }
}

type Entry<T> = (ResourceReducer<T>, ResourceEnvironment<T>);

/// Routes [`RegistryAction`]s to the reducer of the named resource.
pub struct ResourceRegistry<T> {
    entries: Arc<BTreeMap<String, Entry<T>>>,
}

impl<T> Clone for ResourceRegistry<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<T> Default for ResourceRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Arc::new(BTreeMap::new()),
        }
    }
}

impl<T> ResourceRegistry<T>
where
    T: Transport + 'static,
{
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource under its configured name.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Configuration`] when a resource with the
    /// same name is already registered.
    pub fn register(mut self, resource: Resource<T>) -> Result<Self> {
        let name = resource.name().to_string();
        let entries = Arc::make_mut(&mut self.entries);
        if entries.contains_key(&name) {
            return Err(ResourceError::Configuration(format!(
                "resource `{name}` is already registered"
            )));
        }
        tracing::debug!(resource = %name, "Resource registered");
        entries.insert(name, resource.into_parts());
        Ok(self)
    }

    /// Registered resource names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Initial state with an empty slot per registered resource.
    #[must_use]
    pub fn initial_state(&self) -> RegistryState {
        RegistryState {
            resources: self
                .entries
                .keys()
                .map(|name| (name.clone(), ResourceState::new()))
                .collect(),
        }
    }
}

impl<T> Reducer for ResourceRegistry<T>
where
    T: Transport + 'static,
{
    type State = RegistryState;
    type Action = RegistryAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        let RegistryAction { resource, action } = action;
        let Some((reducer, environment)) = self.entries.get(&resource) else {
            tracing::warn!(resource = %resource, "Ignoring action for unknown resource");
            return smallvec![Effect::None];
        };

        let slot = state.resources.entry(resource.clone()).or_default();
        reducer
            .reduce(slot, action, environment)
            .into_iter()
            .map(|effect| {
                let resource = resource.clone();
                effect.map(move |action| RegistryAction {
                    resource: resource.clone(),
                    action,
                })
            })
            .collect()
    }
}
