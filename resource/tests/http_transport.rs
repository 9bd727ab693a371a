//! `HttpTransport` against a local HTTP server

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use composable_rest_resource::{
    HttpTransport, Method, Params, RequestState, Resource, ResourceAction, ResourceConfig,
    Transport, TransportError, TransportRequest, operation,
};
use composable_rest_testing::fixtures::record;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn params(value: serde_json::Value) -> Params {
    record(value)
}

#[tokio::test]
async fn get_sends_query_string_and_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/widgets"))
        .and(query_param("a", "1"))
        .and(query_param("b", "2"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"_id": 1}])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new();
    let response = transport
        .send(TransportRequest::new(
            Method::Get,
            format!("{}/widgets", server.uri()),
            params(json!({"a": "1", "b": "2"})),
        ))
        .await
        .unwrap();

    assert!(response.ok());
    assert_eq!(response.status_text, "OK");
    assert_eq!(response.json::<serde_json::Value>().unwrap(), json!([{"_id": 1}]));
}

#[tokio::test]
async fn post_sends_params_as_json_body_with_default_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/widgets"))
        .and(header("authorization", "Bearer secret"))
        .and(body_json(json!({"name": "X"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"_id": "c", "name": "X"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = ResourceConfig::new("widgets")
        .with_base_url(server.uri())
        .with_header("Authorization", "Bearer secret");
    let store = Resource::http(config).unwrap().into_store();

    let mut handle = store
        .send(ResourceAction::create(record(json!({"name": "X"}))))
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let created = store
        .state(|s| s.requests.get(operation::CREATE).cloned())
        .await;
    assert_eq!(
        created,
        Some(RequestState::succeeded(201, Some(json!({"_id": "c", "name": "X"}))))
    );
    assert_eq!(store.state(|s| s.records.len()).await, 1);
}

#[tokio::test]
async fn error_status_is_a_response_not_a_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/widgets/7"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let config = ResourceConfig::new("widgets").with_base_url(server.uri());
    let store = Resource::http(config).unwrap().into_store();

    let mut handle = store.send(ResourceAction::delete(7)).await.unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let deleted = store
        .state(|s| s.requests.get(operation::DELETE).cloned())
        .await;
    assert_eq!(
        deleted,
        Some(RequestState::failed(
            Some(403),
            "Forbidden: you do not have access to this resource"
        ))
    );
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let transport = HttpTransport::new();

    let result = transport
        .send(TransportRequest::new(Method::Get, "http://127.0.0.1:9/widgets", Params::new()))
        .await;

    assert!(matches!(result, Err(TransportError::Network(_))));
}

#[tokio::test]
async fn malformed_url_is_an_invalid_request() {
    let transport = HttpTransport::new();

    let result = transport
        .send(TransportRequest::new(Method::Get, "not a url", Params::new()))
        .await;

    assert!(matches!(result, Err(TransportError::InvalidRequest(_))));
}
