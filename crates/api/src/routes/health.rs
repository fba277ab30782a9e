use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::{AppState, JobBackend};

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Overall service status.
    pub status: &'static str,
    /// Crate version from Cargo.toml.
    pub version: &'static str,
    /// Active job backend (`simulate` or `proxy`).
    pub mode: &'static str,
    /// Jobs held by the simulator; omitted in proxy mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_jobs: Option<usize>,
    /// Whether an upstream credential is configured; omitted in simulate mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_configured: Option<bool>,
}

/// GET /health -- returns service status and the active backend.
///
/// A proxy without a credential reports `degraded`: every job request would
/// fail with a configuration error.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (simulated_jobs, upstream_configured) = match &state.backend {
        JobBackend::Simulated(jobs) => (Some(jobs.len().await), None),
        JobBackend::Proxy(upstream) => (None, Some(upstream.has_credential())),
    };

    let status = if upstream_configured == Some(false) {
        "degraded"
    } else {
        "ok"
    };

    Json(HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        mode: state.config.mode.as_str(),
        simulated_jobs,
        upstream_configured,
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
