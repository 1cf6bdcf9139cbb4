use crate::types::JobId;

/// Shared error taxonomy for the job pipeline.
///
/// `Conflict` is transient and is consumed inside the progress-update
/// retry loop; it must never surface past it. `ProgressUpdateFailed`
/// is the retry-exhaustion terminal state: the job record permanently
/// understates progress by one unit and the failure is logged, never
/// hidden.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Job already exists: {0}")]
    AlreadyExists(JobId),

    #[error("Concurrent write detected, version token is stale")]
    Conflict,

    #[error("Progress update for job {job_id} failed after {attempts} attempts")]
    ProgressUpdateFailed { job_id: JobId, attempts: u32 },

    #[error("Upstream station source unavailable: {0}")]
    Upstream(String),

    #[error("Malformed message: {0}")]
    Malformed(String),

    #[error("Record store error: {0}")]
    Storage(String),

    #[error("Queue error: {0}")]
    Queue(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Malformed(err.to_string())
    }
}
