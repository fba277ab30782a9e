//! Tests for `AppError` → HTTP response mapping.
//!
//! These tests verify that each `AppError` variant produces the correct HTTP
//! status code, error code, and message. They do NOT need an HTTP server --
//! they call `IntoResponse` directly on `AppError` values.

use axum::response::IntoResponse;
use http_body_util::BodyExt;
use vidrelay_api::error::AppError;
use vidrelay_core::error::CoreError;
use vidrelay_upstream::api::UpstreamError;

/// Helper: convert an `AppError` into its status code and parsed JSON body.
async fn error_to_response(err: AppError) -> (axum::http::StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

// ---------------------------------------------------------------------------
// Test: CoreError::NotFound maps to 404 with NOT_FOUND code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Job",
        id: "abc".to_string(),
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Job with id abc not found");
}

// ---------------------------------------------------------------------------
// Test: CoreError::Validation maps to 400 with VALIDATION_ERROR code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn validation_error_returns_400() {
    let err = AppError::Core(CoreError::Validation("prompt is required".into()));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "prompt is required");
}

// ---------------------------------------------------------------------------
// Test: AppError::BadRequest maps to 400 with BAD_REQUEST code
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bad_request_error_returns_400() {
    let err = AppError::BadRequest("invalid field value".into());

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

// ---------------------------------------------------------------------------
// Test: missing upstream credential maps to 500 CONFIGURATION_ERROR
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_credential_returns_configuration_error() {
    let err = AppError::Upstream(UpstreamError::MissingCredential);

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
}

// ---------------------------------------------------------------------------
// Test: unreadable upstream body maps to 502 and hides the parser detail
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_upstream_body_returns_502_and_sanitizes_message() {
    let source = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
    let err = AppError::Upstream(UpstreamError::InvalidBody {
        status: axum::http::StatusCode::OK,
        source,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, axum::http::StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["error"], "Upstream request failed");
}
