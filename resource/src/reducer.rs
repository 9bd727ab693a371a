//! The resource reducer: state transitions plus request orchestration.
//!
//! Commands record a pending request and return an effect that sends it
//! through the environment's transport. The effect feeds back a
//! [`ResourceAction::Settled`], which the reducer resolves into collection
//! transitions and a terminal request state.

use crate::action::{CustomHandlers, DeleteTarget, RequestKind, ResourceAction};
use crate::collection::SortOrder;
use crate::config::ResourceConfig;
use crate::record::{self, Record};
use crate::request::{RequestState, operation};
use crate::state::ResourceState;
use crate::status::RequestFailure;
use crate::transport::{Method, Transport, TransportError, TransportRequest, TransportResponse};
use composable_rest_core::effect::Effect;
use composable_rest_core::reducer::Reducer;
use composable_rest_core::{SmallVec, async_effect, smallvec};
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

type Effects = SmallVec<[Effect<ResourceAction>; 4]>;

/// Dependencies of the resource reducer.
pub struct ResourceEnvironment<T> {
    /// Sends the resource's requests.
    pub transport: Arc<T>,
}

impl<T> ResourceEnvironment<T> {
    /// Environment around `transport`.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// Environment sharing an existing transport.
    pub const fn shared(transport: Arc<T>) -> Self {
        Self { transport }
    }
}

impl<T> Clone for ResourceEnvironment<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

/// Reducer for one resource.
pub struct ResourceReducer<T> {
    config: Arc<ResourceConfig>,
    sort_order: SortOrder,
    _transport: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceReducer<T> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            sort_order: self.sort_order.clone(),
            _transport: PhantomData,
        }
    }
}

impl<T> ResourceReducer<T> {
    /// Reducer for `config`, sorting by the identity field.
    #[must_use]
    pub fn new(config: ResourceConfig) -> Self {
        let sort_order = SortOrder::by_identity(config.id_field());
        Self::with_sort_order(config, sort_order)
    }

    /// Reducer for `config` sorting with a shared order handle.
    #[must_use]
    pub fn with_sort_order(config: ResourceConfig, sort_order: SortOrder) -> Self {
        Self {
            config: Arc::new(config),
            sort_order,
            _transport: PhantomData,
        }
    }

    /// The resource configuration.
    #[must_use]
    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    /// The comparator handle used for every sort.
    #[must_use]
    pub const fn sort_order(&self) -> &SortOrder {
        &self.sort_order
    }

    fn start(&self, state: &mut ResourceState, operation: &str) {
        tracing::debug!(resource = self.config.name(), operation, "Request pending");
        state
            .requests
            .insert(operation.to_string(), RequestState::pending());
    }

    fn merge(&self, state: &mut ResourceState, records: Vec<Record>, transition: &str) {
        let count = records.len();
        let skipped = state
            .records
            .upsert(records, self.config.id_field(), &self.sort_order);
        if skipped > 0 {
            tracing::warn!(
                resource = self.config.name(),
                id_field = self.config.id_field(),
                skipped,
                "Skipped records without an identity value"
            );
        }
        tracing::debug!(
            resource = self.config.name(),
            transition,
            merged = count - skipped,
            total = state.records.len(),
            "Records merged"
        );
    }

    /// Apply follow-up actions in order, collecting their effects.
    fn apply_all(
        &self,
        state: &mut ResourceState,
        actions: Vec<ResourceAction>,
        env: &ResourceEnvironment<T>,
    ) -> Effects
    where
        T: Transport + 'static,
    {
        let mut effects = Effects::new();
        for action in actions {
            effects.extend(
                self.reduce(state, action, env)
                    .into_iter()
                    .filter(|effect| !effect.is_none()),
            );
        }
        if effects.is_empty() {
            effects.push(Effect::None);
        }
        effects
    }

    fn settle(
        &self,
        state: &mut ResourceState,
        operation: String,
        kind: RequestKind,
        outcome: Result<TransportResponse, TransportError>,
        env: &ResourceEnvironment<T>,
    ) -> Effects
    where
        T: Transport + 'static,
    {
        let actions = match outcome {
            Err(error) => Self::on_failure(&operation, kind, &RequestFailure::transport(&error)),
            Ok(response) if !response.ok() => {
                Self::on_failure(&operation, kind, &RequestFailure::from_response(response))
            },
            Ok(response) => Self::on_success(&operation, kind, response),
        };
        self.apply_all(state, actions, env)
    }

    fn on_failure(operation: &str, kind: RequestKind, failure: &RequestFailure) -> Vec<ResourceAction> {
        tracing::warn!(
            operation,
            status_code = failure.status_code,
            message = %failure.message,
            "Request failed"
        );
        if let RequestKind::Custom(CustomHandlers {
            on_failure: Some(handler),
            ..
        }) = kind
        {
            return handler(operation, failure);
        }
        vec![record_failure(operation, failure)]
    }

    fn on_success(operation: &str, kind: RequestKind, response: TransportResponse) -> Vec<ResourceAction> {
        let status = response.status;
        match kind {
            RequestKind::Fetch => match response.json::<Value>().map_err(|e| e.to_string()).and_then(list_payload) {
                Ok((payload, records)) => vec![
                    ResourceAction::Read { records },
                    succeeded(operation, status, Some(payload)),
                ],
                Err(detail) => vec![record_failure(operation, &RequestFailure::unreadable(response, detail))],
            },
            RequestKind::FetchById | RequestKind::Create | RequestKind::Update => {
                match response.json::<Value>().map_err(|e| e.to_string()).and_then(record_payload) {
                    Ok((payload, record)) => {
                        let records = vec![record];
                        let transition = match kind {
                            RequestKind::Create => ResourceAction::Created { records },
                            RequestKind::Update => ResourceAction::Updated { records },
                            _ => ResourceAction::Read { records },
                        };
                        vec![transition, succeeded(operation, status, Some(payload))]
                    },
                    Err(detail) => {
                        vec![record_failure(operation, &RequestFailure::unreadable(response, detail))]
                    },
                }
            },
            RequestKind::Delete { id } => vec![
                ResourceAction::Deleted(DeleteTarget::Id(id)),
                succeeded(operation, status, response.json::<Value>().ok()),
            ],
            RequestKind::Custom(CustomHandlers {
                on_success: Some(handler),
                ..
            }) => handler(operation, &response),
            RequestKind::Custom(_) => vec![succeeded(operation, status, body_data(&response))],
        }
    }

    fn request_effect(
        env: &ResourceEnvironment<T>,
        operation: &str,
        kind: RequestKind,
        request: TransportRequest,
    ) -> Effect<ResourceAction>
    where
        T: Transport + 'static,
    {
        tracing::debug!(operation, method = %request.method, url = %request.url, "Dispatching request");
        let transport = Arc::clone(&env.transport);
        let operation = operation.to_string();
        async_effect! {
            let outcome = transport.send(request).await;
            Some(ResourceAction::Settled { operation, kind, outcome })
        }
    }
}

impl<T> Reducer for ResourceReducer<T>
where
    T: Transport + 'static,
{
    type State = ResourceState;
    type Action = ResourceAction;
    type Environment = ResourceEnvironment<T>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Commands ==========
            ResourceAction::Fetch { params } => {
                self.start(state, operation::FETCH);
                let request = TransportRequest::new(Method::Get, self.config.collection_url(), params);
                smallvec![Self::request_effect(env, operation::FETCH, RequestKind::Fetch, request)]
            },

            ResourceAction::FetchById { id, params } => {
                self.start(state, operation::FETCH_BY_ID);
                let request = TransportRequest::new(Method::Get, self.config.item_url(&id), params);
                smallvec![Self::request_effect(
                    env,
                    operation::FETCH_BY_ID,
                    RequestKind::FetchById,
                    request
                )]
            },

            ResourceAction::Create { record } => {
                self.start(state, operation::CREATE);
                let request = TransportRequest::new(Method::Post, self.config.collection_url(), record);
                smallvec![Self::request_effect(env, operation::CREATE, RequestKind::Create, request)]
            },

            ResourceAction::Update { record } => {
                let Some(id) = record::identity(&record, self.config.id_field()).cloned() else {
                    let message = format!(
                        "Cannot update a record without `{}`",
                        self.config.id_field()
                    );
                    tracing::warn!(resource = self.config.name(), "{message}");
                    state.requests.insert(
                        operation::UPDATE.to_string(),
                        RequestState::failed(None, message),
                    );
                    return smallvec![Effect::None];
                };
                self.start(state, operation::UPDATE);
                let request = TransportRequest::new(Method::Put, self.config.item_url(&id), record);
                smallvec![Self::request_effect(env, operation::UPDATE, RequestKind::Update, request)]
            },

            ResourceAction::Delete { id } => {
                self.start(state, operation::DELETE);
                let request = TransportRequest::new(
                    Method::Delete,
                    self.config.item_url(&id),
                    record::Params::new(),
                );
                smallvec![Self::request_effect(
                    env,
                    operation::DELETE,
                    RequestKind::Delete { id },
                    request
                )]
            },

            ResourceAction::Custom(custom) => {
                let (name, method, path, params, handlers) = custom.into_parts();
                self.start(state, &name);
                let request = TransportRequest::new(method, self.config.nested_url(&path), params);
                smallvec![Self::request_effect(env, &name, RequestKind::Custom(handlers), request)]
            },

            // ========== Feedback ==========
            ResourceAction::Settled {
                operation,
                kind,
                outcome,
            } => self.settle(state, operation, kind, outcome, env),

            // ========== Transitions ==========
            ResourceAction::Read { records } => {
                state.is_loaded = true;
                self.merge(state, records, "read");
                smallvec![Effect::None]
            },

            ResourceAction::Created { records } => {
                self.merge(state, records, "created");
                smallvec![Effect::None]
            },

            ResourceAction::Updated { records } => {
                self.merge(state, records, "updated");
                smallvec![Effect::None]
            },

            ResourceAction::Deleted(DeleteTarget::Id(id)) => {
                let removed = state
                    .records
                    .remove(self.config.id_field(), &id, &self.sort_order);
                tracing::debug!(
                    resource = self.config.name(),
                    %id,
                    removed = removed.is_some(),
                    "Record deleted"
                );
                smallvec![Effect::None]
            },

            ResourceAction::Deleted(DeleteTarget::All) => {
                state.records.clear();
                tracing::debug!(resource = self.config.name(), "All records deleted");
                smallvec![Effect::None]
            },

            ResourceAction::UpdateRequest { operation, request } => {
                tracing::debug!(
                    resource = self.config.name(),
                    operation = %operation,
                    status = %request.status,
                    "Request state updated"
                );
                state.requests.insert(operation, request);
                smallvec![Effect::None]
            },

            ResourceAction::ClearRequest { operation } => {
                state.requests.remove(&operation);
                smallvec![Effect::None]
            },

            ResourceAction::Clear => {
                state.reset();
                tracing::debug!(resource = self.config.name(), "Resource cleared");
                smallvec![Effect::None]
            },
        }
    }
}

fn succeeded(operation: &str, status: u16, data: Option<Value>) -> ResourceAction {
    ResourceAction::update_request(operation, RequestState::succeeded(status, data))
}

fn record_failure(operation: &str, failure: &RequestFailure) -> ResourceAction {
    ResourceAction::update_request(
        operation,
        RequestState::failed(failure.status_code, failure.message.clone()),
    )
}

fn list_payload(payload: Value) -> Result<(Value, Vec<Record>), String> {
    let Value::Array(items) = &payload else {
        return Err("expected a list of records".to_string());
    };
    let records = items
        .iter()
        .cloned()
        .map(|item| record::from_value(item).ok_or_else(|| "expected every list item to be an object".to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((payload, records))
}

fn record_payload(payload: Value) -> Result<(Value, Record), String> {
    match record::from_value(payload.clone()) {
        Some(record) => Ok((payload, record)),
        None => Err("expected a record object".to_string()),
    }
}

/// Success data for a custom request: parsed JSON, else the raw text.
fn body_data(response: &TransportResponse) -> Option<Value> {
    if response.text().trim().is_empty() {
        return None;
    }
    Some(
        response
            .json::<Value>()
            .unwrap_or_else(|_| Value::String(response.text().to_string())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RequestStatus;
    use serde_json::json;

    struct Unreachable;

    impl Transport for Unreachable {
        async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, TransportError> {
            Err(TransportError::Network("unreachable".to_string()))
        }
    }

    fn setup() -> (ResourceReducer<Unreachable>, ResourceEnvironment<Unreachable>, ResourceState) {
        let reducer = ResourceReducer::new(ResourceConfig::new("widgets"));
        (reducer, ResourceEnvironment::new(Unreachable), ResourceState::new())
    }

    fn settled(operation: &str, kind: RequestKind, response: TransportResponse) -> ResourceAction {
        ResourceAction::Settled {
            operation: operation.to_string(),
            kind,
            outcome: Ok(response),
        }
    }

    #[test]
    fn test_command_records_pending_and_returns_request_effect() {
        let (reducer, env, mut state) = setup();

        let effects = reducer.reduce(&mut state, ResourceAction::fetch(), &env);

        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::Future(_)));
        assert_eq!(state.requests.get("fetch"), Some(&RequestState::pending()));
    }

    #[test]
    fn test_settled_fetch_reads_sorted_records() {
        let (reducer, env, mut state) = setup();
        let body = json!([{"_id": "b", "n": 2}, {"_id": "a", "n": 1}]);

        reducer.reduce(&mut state, settled("fetch", RequestKind::Fetch, TransportResponse::from_json(200, &body)), &env);

        assert!(state.is_loaded);
        let ids: Vec<_> = state.records.iter().map(|r| r["_id"].clone()).collect();
        assert_eq!(ids, vec![json!("a"), json!("b")]);
        let request = &state.requests["fetch"];
        assert_eq!(request.status, RequestStatus::Succeeded);
        assert_eq!(request.status_code, Some(200));
        assert_eq!(request.data, Some(body));
    }

    #[test]
    fn test_settled_not_found_records_override_message() {
        let (reducer, env, mut state) = setup();

        reducer.reduce(
            &mut state,
            settled("fetchById", RequestKind::FetchById, TransportResponse::with_body(404, "")),
            &env,
        );

        assert_eq!(
            state.requests["fetchById"],
            RequestState::failed(Some(404), "Page/Resource Not Found")
        );
        assert!(!state.is_loaded);
    }

    #[test]
    fn test_unparseable_success_body_fails_request() {
        let (reducer, env, mut state) = setup();

        reducer.reduce(
            &mut state,
            settled("create", RequestKind::Create, TransportResponse::with_body(201, "not json")),
            &env,
        );

        let request = &state.requests["create"];
        assert_eq!(request.status, RequestStatus::Failed);
        assert_eq!(request.status_code, Some(201));
        assert!(state.records.is_empty());
    }

    #[test]
    fn test_transport_failure_has_message_without_status() {
        let (reducer, env, mut state) = setup();

        reducer.reduce(
            &mut state,
            ResourceAction::Settled {
                operation: "delete".to_string(),
                kind: RequestKind::Delete { id: json!(1) },
                outcome: Err(TransportError::Network("connection reset".to_string())),
            },
            &env,
        );

        assert_eq!(state.requests["delete"], RequestState::failed(None, "connection reset"));
    }

    #[test]
    fn test_update_without_identity_fails_immediately() {
        let (reducer, env, mut state) = setup();
        let record = record::from_value(json!({"name": "Y"})).unwrap_or_default();

        let effects = reducer.reduce(&mut state, ResourceAction::update(record), &env);

        assert!(effects.iter().all(Effect::is_none));
        assert_eq!(state.requests["update"].status, RequestStatus::Failed);
        assert_eq!(state.requests["update"].status_code, None);
    }

    #[test]
    fn test_custom_default_success_records_body() {
        let (reducer, env, mut state) = setup();

        reducer.reduce(
            &mut state,
            settled(
                "archive",
                RequestKind::Custom(CustomHandlers::default()),
                TransportResponse::with_body(200, "archived"),
            ),
            &env,
        );

        assert_eq!(
            state.requests["archive"],
            RequestState::succeeded(200, Some(json!("archived")))
        );
    }

    #[test]
    fn test_deleted_and_clear_transitions() {
        let (reducer, env, mut state) = setup();
        let records = vec![
            record::from_value(json!({"_id": 1})).unwrap_or_default(),
            record::from_value(json!({"_id": 2})).unwrap_or_default(),
        ];
        reducer.reduce(&mut state, ResourceAction::Read { records }, &env);
        reducer.reduce(&mut state, ResourceAction::update_request("fetch", RequestState::pending()), &env);

        reducer.reduce(&mut state, ResourceAction::Deleted(DeleteTarget::Id(json!(1))), &env);
        assert_eq!(state.records.len(), 1);

        reducer.reduce(&mut state, ResourceAction::Clear, &env);
        assert_eq!(state, ResourceState::new());
    }
}
