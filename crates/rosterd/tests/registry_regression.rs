//! Registry regression tests.
//!
//! Drives the REST API through the assembled router (and once through a
//! real socket with the real client) to validate registration,
//! de-duplication, deregistration, and route derivation end to end.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use roster_api::{ApiState, build_router};
use roster_client::{ApplicationRegistrator, ClientConfig, ClientProperties};
use roster_proxy::RouteLocator;
use roster_registry::{ApplicationStore, EventHub};

fn test_state() -> ApiState {
    let store = ApplicationStore::new();
    let hub = EventHub::new();
    let locator = Arc::new(RouteLocator::new(store.clone()));
    hub.subscribe(locator.listener());
    ApiState {
        store,
        hub,
        locator,
    }
}

fn registration(name: &str, health_url: &str) -> serde_json::Value {
    serde_json::json!({
        "name": name,
        "managementUrl": format!("http://{name}:8081"),
        "healthUrl": health_url,
        "serviceUrl": format!("http://{name}:8080"),
    })
}

fn post_application(payload: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/applications")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).unwrap()))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn list_applications_starts_empty() {
    let router = build_router(test_state());

    let req = Request::builder()
        .uri("/api/applications")
        .body(Body::empty())
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, serde_json::json!([]));
}

#[tokio::test]
async fn register_returns_created_with_assigned_id() {
    let router = build_router(test_state());

    let payload = registration("orders", "http://orders:8081/health");
    let resp = router.oneshot(post_application(&payload)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = json_body(resp).await;
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert_eq!(body["healthUrl"], "http://orders:8081/health");
}

#[tokio::test]
async fn duplicate_health_url_upserts_preserving_id() {
    let state = test_state();
    let router = build_router(state.clone());

    let first = registration("orders", "http://shared:8081/health");
    let resp = router.clone().oneshot(post_application(&first)).await.unwrap();
    let first_id = json_body(resp).await["id"].as_str().unwrap().to_string();

    let second = registration("orders-canary", "http://shared:8081/health");
    let resp = router.oneshot(post_application(&second)).await.unwrap();
    let second_id = json_body(resp).await["id"].as_str().unwrap().to_string();

    assert_eq!(first_id, second_id);
    assert_eq!(state.store.len(), 1);
    assert_eq!(state.store.find(&first_id).unwrap().name(), "orders-canary");
}

#[tokio::test]
async fn register_rejects_blank_health_url() {
    let state = test_state();
    let router = build_router(state.clone());

    let payload = serde_json::json!({"name": "orders", "healthUrl": "   "});
    let resp = router.oneshot(post_application(&payload)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(state.store.is_empty());
}

#[tokio::test]
async fn register_rejects_payload_without_health_url() {
    let router = build_router(test_state());

    let payload = serde_json::json!({"name": "orders"});
    let resp = router.oneshot(post_application(&payload)).await.unwrap();

    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn get_unknown_application_is_not_found() {
    let router = build_router(test_state());

    let req = Request::builder()
        .uri("/api/applications/nope")
        .body(Body::empty())
        .unwrap();

    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_then_deregister_leaves_no_entry() {
    let state = test_state();
    let router = build_router(state.clone());

    let payload = registration("orders", "http://orders:8081/health");
    let resp = router.clone().oneshot(post_application(&payload)).await.unwrap();
    let id = json_body(resp).await["id"].as_str().unwrap().to_string();

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/applications/{id}"))
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(state.store.is_empty());

    // Deleting again is a 404.
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/applications/{id}"))
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_table_follows_registry_changes() {
    let state = test_state();
    let router = build_router(state.clone());

    let payload = registration("orders", "http://orders:8081/health");
    let resp = router.clone().oneshot(post_application(&payload)).await.unwrap();
    let id = json_body(resp).await["id"].as_str().unwrap().to_string();

    let req = Request::builder()
        .uri("/api/routes")
        .body(Body::empty())
        .unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let table = json_body(resp).await;
    assert_eq!(table["routes"].as_array().unwrap().len(), 1);
    assert_eq!(table["routes"][0]["pathPrefix"], format!("/proxied/{id}"));
    assert_eq!(table["routes"][0]["targetUrl"], "http://orders:8081");

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/api/applications/{id}"))
        .body(Body::empty())
        .unwrap();
    router.clone().oneshot(req).await.unwrap();

    let req = Request::builder()
        .uri("/api/routes")
        .body(Body::empty())
        .unwrap();
    let table = json_body(router.oneshot(req).await.unwrap()).await;
    assert!(table["routes"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn real_client_registers_and_deregisters_over_a_socket() {
    let state = test_state();
    let router = build_router(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    let mut config = ClientConfig::new("orders");
    config.service_url = Some("http://orders:8080".to_string());
    config.management_url = Some("http://orders:8081".to_string());
    config.health_url = Some("http://orders:8081/health".to_string());
    let props = Arc::new(ClientProperties::new(config));

    let registrator = ApplicationRegistrator::new(format!("http://{addr}"), props)
        .with_request_timeout(Duration::from_secs(2));

    assert!(registrator.register().await);
    let id = registrator.registered_id().expect("id cached after register");
    assert_eq!(state.store.len(), 1);
    assert_eq!(state.store.find(&id).unwrap().name(), "orders");

    // Registering again refreshes, it does not duplicate.
    assert!(registrator.register().await);
    assert_eq!(state.store.len(), 1);

    registrator.deregister().await;
    assert!(registrator.registered_id().is_none());
    assert!(state.store.is_empty());
}
