use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use skylark_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] and implements [`IntoResponse`] to produce
/// consistent JSON error bodies. Transient concurrency conflicts never
/// reach this layer -- the progress protocol retires them internally --
/// so callers only ever see not-found, duplicate-submission, or a
/// sanitized internal error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let AppError::Core(core) = self;

        let (status, code, message) = match &core {
            CoreError::NotFound(job_id) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("Job {job_id} not found"),
            ),
            // A duplicate UUIDv4 means id generation is broken; still
            // answer with a well-formed conflict rather than a 500.
            CoreError::AlreadyExists(job_id) => (
                StatusCode::CONFLICT,
                "CONFLICT",
                format!("Job {job_id} already exists"),
            ),
            other => {
                tracing::error!(error = %other, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
