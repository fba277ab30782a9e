//! Route definitions for the `/videos` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::videos;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// POST   /                -> create_video
/// GET    /{id}            -> get_video
/// POST   /{id}/cancel     -> cancel_video
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(videos::create_video))
        .route("/{id}", get(videos::get_video))
        .route("/{id}/cancel", post(videos::cancel_video))
}
