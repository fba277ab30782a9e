#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use vidrelay_api::config::{GenerationMode, ServerConfig};
use vidrelay_api::router::build_app_router;
use vidrelay_api::state::{AppState, JobBackend};
use vidrelay_core::clock::TokioClock;
use vidrelay_core::simulator::{SimulatedJobs, SimulatorConfig};
use vidrelay_upstream::api::{UpstreamClient, UpstreamConfig};

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and a static directory that does not exist.
pub fn test_config(mode: GenerationMode) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        static_dir: "./no-such-static-dir".to_string(),
        mode,
        upstream: UpstreamConfig {
            base_url: "http://127.0.0.1:9/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        },
        simulator: SimulatorConfig::default(),
        sweep_interval: Duration::from_secs(60),
    }
}

/// Build the app in simulate mode with a registry on tokio's clock, so tests
/// running with `start_paused = true` see deterministic timestamps.
pub fn simulated_app(simulator: SimulatorConfig) -> (Router, Arc<SimulatedJobs>) {
    let mut config = test_config(GenerationMode::Simulate);
    config.simulator = simulator.clone();

    let jobs = Arc::new(SimulatedJobs::new(simulator, Arc::new(TokioClock::new())));
    let state = AppState {
        config: Arc::new(config.clone()),
        backend: JobBackend::Simulated(Arc::clone(&jobs)),
    };

    (build_app_router(state, &config), jobs)
}

/// Build the app in proxy mode pointed at `base_url`.
pub fn proxy_app(base_url: &str, api_key: Option<&str>) -> Router {
    let mut config = test_config(GenerationMode::Proxy);
    config.upstream.base_url = base_url.to_string();
    config.upstream.api_key = api_key.map(str::to_string);

    let upstream = UpstreamClient::new(config.upstream.clone()).unwrap();
    let state = AppState {
        config: Arc::new(config.clone()),
        backend: JobBackend::Proxy(Arc::new(upstream)),
    };

    build_app_router(state, &config)
}

/// Build an app from a config, exactly as `main.rs` does.
pub fn app_from_config(config: ServerConfig) -> Router {
    let backend = JobBackend::from_config(&config).unwrap();
    let state = AppState {
        config: Arc::new(config.clone()),
        backend,
    };
    build_app_router(state, &config)
}

/// Serve `router` on an ephemeral port and return its `/v1` base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/v1")
}

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(json.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
