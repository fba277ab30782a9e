pub mod health;
pub mod videos;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /videos                     create
/// /videos/{id}                get
/// /videos/{id}/cancel         cancel
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/videos", videos::router())
}
