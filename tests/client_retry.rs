//! End-to-end client behavior: typed calls, retry classification, dynamic
//! dispatch, cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};

use http::Method;
use serde::{Deserialize, Serialize};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use restbind::{
    AdapterRegistry, CancellationToken, Client, ClientConfig, ClientError, JsonEndpoint,
    RetryPolicy,
};

#[derive(Serialize, Deserialize)]
struct ListParams {
    page: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Item {
    id: u32,
    name: String,
}

fn list_items() -> JsonEndpoint<ListParams, Vec<Item>> {
    JsonEndpoint::new("list_items", Method::GET, "/items")
}

/// Policy that counts hook calls while keeping the default classification.
#[derive(Default)]
struct CountingPolicy {
    retrying: AtomicU32,
    rethrowing: AtomicU32,
}

impl RetryPolicy<ClientError> for CountingPolicy {
    fn can_retry(&self, error: &ClientError) -> bool {
        error.is_retryable()
    }

    fn on_retrying(&self, _attempt: u32, _max_retries: u32, _error: &ClientError) {
        self.retrying.fetch_add(1, Ordering::SeqCst);
    }

    fn on_rethrowing(&self, _attempt: u32, _max_retries: u32, _error: &ClientError) {
        self.rethrowing.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn typed_call_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "name": "widget"},
            {"id": 2, "name": "gadget"},
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(
        ClientConfig::builder()
            .base_url(server.uri())
            .retry_timeouts(vec![Duration::from_millis(50)])
            .build(),
    )
    .unwrap();

    let items = client
        .call(&list_items(), &ListParams { page: 1 })
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(
        items[0],
        Item {
            id: 1,
            name: "widget".into()
        }
    );
}

#[tokio::test]
async fn semantic_http_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let client = Client::new(
        ClientConfig::builder()
            .base_url(server.uri())
            .retry_timeouts(vec![Duration::from_millis(50); 3])
            .build(),
    )
    .unwrap();

    let err = client
        .call(&list_items(), &ListParams { page: 1 })
        .await
        .unwrap_err();

    match err {
        ClientError::Http { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected Http error, got {other}"),
    }
    // expect(1) on the mock verifies exactly one attempt was made.
}

#[tokio::test]
async fn connection_failure_retries_and_fires_hooks() {
    let policy = Arc::new(CountingPolicy::default());
    // Nothing listens on the discard port; every attempt is refused.
    let client = Client::with_policy(
        ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .retry_timeouts(vec![Duration::from_millis(50), Duration::from_millis(50)])
            .build(),
        policy.clone(),
    )
    .unwrap();

    let err = client
        .call(&list_items(), &ListParams { page: 1 })
        .await
        .unwrap_err();

    assert!(err.is_connection() || matches!(err, ClientError::Transport(_)));
    assert_eq!(policy.retrying.load(Ordering::SeqCst), 2);
    assert_eq!(policy.rethrowing.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_adapter_is_action_usage_error() {
    let client = Client::new(ClientConfig::default()).unwrap();
    let registry = AdapterRegistry::new();

    let err = client
        .invoke(&registry, "does_not_exist", serde_json::json!({}))
        .await
        .unwrap_err();

    match err {
        ClientError::InvalidArgument { param, .. } => assert_eq!(param, "action"),
        other => panic!("expected InvalidArgument, got {other}"),
    }
}

#[tokio::test]
async fn registry_invoke_round_trips_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/items"))
        .and(query_param("page", "3"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"id": 9, "name": "sprocket"}])),
        )
        .mount(&server)
        .await;

    let client = Client::new(ClientConfig::builder().base_url(server.uri()).build()).unwrap();
    let registry = AdapterRegistry::new();
    registry.register(list_items());

    let result = client
        .invoke(&registry, "list_items", serde_json::json!({"page": 3}))
        .await
        .unwrap();

    assert_eq!(result, serde_json::json!([{"id": 9, "name": "sprocket"}]));
}

#[tokio::test]
async fn cancellation_aborts_pending_retry_delay() {
    let client = Client::new(
        ClientConfig::builder()
            .base_url("http://127.0.0.1:9")
            .retry_timeouts(vec![Duration::from_secs(30)])
            .build(),
    )
    .unwrap();

    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let err = client
        .call_cancellable(&list_items(), &ListParams { page: 1 }, &token)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}
