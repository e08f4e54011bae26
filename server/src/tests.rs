use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use facevault_core::FaceRegistry;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::build_app;
use crate::config::AppConfig;
use crate::state::AppState;


fn test_root(prefix: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock must be monotonic")
        .as_nanos();
    std::env::temp_dir().join(format!(
        "facevault_server_{prefix}_{}_{stamp}",
        std::process::id()
    ))
}

fn cleanup_dir(path: &Path) {
    if path.exists() {
        fs::remove_dir_all(path).expect("temp directory should be removable");
    }
}

fn test_config(data_dir: &Path) -> AppConfig {
    AppConfig {
        bind: "127.0.0.1:0".parse().expect("socket addr must parse"),
        data_dir: data_dir.to_path_buf(),
        db_filename: "faces.json".to_string(),
        match_threshold: 0.35,
        expected_dimension: 0,
        max_dimension: 8,
        sync_on_write: false,
        request_timeout_ms: 2_000,
        max_body_bytes: 1_048_576,
        max_concurrency: 256,
    }
}

fn state_with_config(config: AppConfig) -> AppState {
    let registry = FaceRegistry::open(config.registry_config()).expect("registry must open");
    AppState::new(config, registry)
}

fn test_state(data_dir: &Path) -> AppState {
    state_with_config(test_config(data_dir))
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body must be readable");
    serde_json::from_slice(&bytes).expect("response body must be valid json")
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .expect("request must build"),
        )
        .await
        .expect("response expected")
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .expect("request must build"),
        )
        .await
        .expect("response expected")
}

#[tokio::test]
async fn live_reports_uptime() {
    let root = test_root("live");
    let app = build_app(test_state(&root));

    let response = get(&app, "/live").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "live");
    assert!(body["uptime_ms"].is_u64());

    cleanup_dir(&root);
}

#[tokio::test]
async fn ready_reports_store_shape() {
    let root = test_root("ready");
    let app = build_app(test_state(&root));

    let response = get(&app, "/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ready");
    assert_eq!(body["checks"]["storage_available"], true);
    assert_eq!(body["checks"]["samples"], 0);
    assert_eq!(body["checks"]["dimension"], Value::Null);

    let register = post_json(
        &app,
        "/api/register",
        json!({"name": "Alice", "embedding": [1.0, 0.0, 0.0]}),
    )
    .await;
    assert_eq!(register.status(), StatusCode::OK);

    let body = json_body(get(&app, "/ready").await).await;
    assert_eq!(body["checks"]["samples"], 1);
    assert_eq!(body["checks"]["dimension"], 3);

    cleanup_dir(&root);
}

#[tokio::test]
async fn responses_carry_request_id_and_cors_headers() {
    let root = test_root("headers");
    let app = build_app(test_state(&root));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/live")
                .header("origin", "http://kiosk.local")
                .header("x-request-id", "req-42")
                .body(Body::empty())
                .expect("request must build"),
        )
        .await
        .expect("response expected");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|value| value.to_str().ok()),
        Some("req-42")
    );
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|value| value.to_str().ok()),
        Some("*")
    );

    cleanup_dir(&root);
}
