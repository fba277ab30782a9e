//! Handlers for the `/videos` resource.
//!
//! In simulate mode the typed [`Job`](vidrelay_core::job::Job) projection is
//! serialized directly. In proxy mode the provider's status and body are
//! relayed untouched, and an empty upstream reply stays empty.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use vidrelay_core::job::GenerationOptions;
use vidrelay_upstream::api::UpstreamReply;

use crate::error::AppResult;
use crate::state::{AppState, JobBackend};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Turn a provider reply into a client response, preserving status and body.
fn relay(reply: UpstreamReply) -> Response {
    match reply {
        UpstreamReply::Json { status, body } => (status, Json(body)).into_response(),
        UpstreamReply::NoContent { status } => status.into_response(),
        UpstreamReply::Raw {
            status,
            content_type,
            body,
        } => {
            let mut response = (status, body).into_response();
            if let Some(value) = content_type.and_then(|ct| HeaderValue::from_str(&ct).ok()) {
                response.headers_mut().insert(CONTENT_TYPE, value);
            }
            response
        }
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/videos
///
/// Submit a generation job. The prompt is validated before either backend
/// is called. The simulator answers 202 with the queued job; the proxy
/// answers with whatever the provider returned.
pub async fn create_video(
    State(state): State<AppState>,
    payload: Result<Json<GenerationOptions>, JsonRejection>,
) -> AppResult<Response> {
    let Json(options) = payload?;
    options.validate()?;

    match &state.backend {
        JobBackend::Simulated(jobs) => {
            let job = jobs.create(options).await?;
            Ok((StatusCode::ACCEPTED, Json(job)).into_response())
        }
        JobBackend::Proxy(upstream) => {
            let reply = upstream.create_video(&options).await?;
            tracing::info!(status = reply.status().as_u16(), "Video job submitted upstream");
            Ok(relay(reply))
        }
    }
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/videos/{id}
///
/// Current state of a job. Unknown ids are 404 in simulate mode; in proxy
/// mode the provider's own not-found response is relayed.
pub async fn get_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match &state.backend {
        JobBackend::Simulated(jobs) => Ok(Json(jobs.get(&id).await?).into_response()),
        JobBackend::Proxy(upstream) => Ok(relay(upstream.get_video(&id).await?)),
    }
}

// ---------------------------------------------------------------------------
// Cancel
// ---------------------------------------------------------------------------

/// POST /api/v1/videos/{id}/cancel
///
/// Cancel a queued or processing job. Cancelling a job that already
/// finished returns it unchanged with 200.
pub async fn cancel_video(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match &state.backend {
        JobBackend::Simulated(jobs) => Ok(Json(jobs.cancel(&id).await?).into_response()),
        JobBackend::Proxy(upstream) => {
            let reply = upstream.cancel_video(&id).await?;
            tracing::info!(job_id = %id, status = reply.status().as_u16(), "Cancel relayed upstream");
            Ok(relay(reply))
        }
    }
}
