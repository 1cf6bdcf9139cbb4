pub mod health;
pub mod jobs;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// POST /jobs            submit a snapshot job (202 Accepted)
/// GET  /jobs/{job_id}   job status snapshot with signed artifact URLs
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/jobs", jobs::router())
}
