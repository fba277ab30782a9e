use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use vidrelay_core::error::CoreError;
use vidrelay_upstream::api::UpstreamError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and [`UpstreamError`] for proxy
/// failures, and adds HTTP-specific variants. Implements [`IntoResponse`] to
/// produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `vidrelay_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A failure talking to the upstream provider.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
            },

            // --- Upstream errors ---
            AppError::Upstream(err) => classify_upstream_error(err),

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify an upstream error into an HTTP status, error code, and message.
///
/// - A missing credential is a configuration error (500) with a fixed message.
/// - Transport failures and unreadable bodies map to 502; details are logged,
///   never returned.
fn classify_upstream_error(err: &UpstreamError) -> (StatusCode, &'static str, String) {
    match err {
        UpstreamError::MissingCredential => {
            tracing::error!("Upstream API key is not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                "Upstream API key is not configured".to_string(),
            )
        }
        UpstreamError::Request(_) | UpstreamError::InvalidBody { .. } => {
            tracing::error!(error = %err, "Upstream request failed");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                "Upstream request failed".to_string(),
            )
        }
    }
}
