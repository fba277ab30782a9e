//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{app_from_config, body_bytes, body_json, get, test_config};
use tower::ServiceExt;
use vidrelay_api::config::GenerationMode;

// ---------------------------------------------------------------------------
// Test: GET /health reports the active mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_in_simulate_mode() {
    let app = app_from_config(test_config(GenerationMode::Simulate));
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["mode"], "simulate");
    assert!(json["version"].is_string());
    assert_eq!(json["simulated_jobs"], 0);
    assert!(json.get("upstream_configured").is_none());
}

#[tokio::test]
async fn health_check_degraded_without_upstream_key() {
    let app = app_from_config(test_config(GenerationMode::Proxy));
    let json = body_json(get(app, "/health").await).await;

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["mode"], "proxy");
    assert_eq!(json["upstream_configured"], false);
    assert!(json.get("simulated_jobs").is_none());
}

#[tokio::test]
async fn health_check_ok_with_upstream_key() {
    let mut config = test_config(GenerationMode::Proxy);
    config.upstream.api_key = Some("sk-test".to_string());
    let json = body_json(get(app_from_config(config), "/health").await).await;

    assert_eq!(json["status"], "ok");
    assert_eq!(json["upstream_configured"], true);
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = app_from_config(test_config(GenerationMode::Simulate));
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: static directory is served as the fallback
// ---------------------------------------------------------------------------

#[tokio::test]
async fn static_dir_is_served_as_fallback() {
    let dir = std::env::temp_dir().join(format!("vidrelay-static-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("index.html"), "<h1>poll</h1>").unwrap();

    let mut config = test_config(GenerationMode::Simulate);
    config.static_dir = dir.to_string_lossy().into_owned();
    let app = app_from_config(config);

    let response = get(app.clone(), "/index.html").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"<h1>poll</h1>");

    // API routes still win over the fallback.
    assert_eq!(get(app, "/health").await.status(), StatusCode::OK);

    std::fs::remove_dir_all(&dir).ok();
}

// ---------------------------------------------------------------------------
// Test: x-request-id header is present in response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = app_from_config(test_config(GenerationMode::Simulate));
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    // The value should be a valid UUID (36 chars with hyphens).
    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = app_from_config(test_config(GenerationMode::Simulate));

    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/videos")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();

    let allow_origin = headers
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );
}
