//! Handlers for the `/jobs` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use skylark_core::job::JobStatus;
use skylark_core::messages::StartJobMessage;

use crate::error::AppResult;
use crate::state::AppState;

/// Response body for `POST /api/v1/jobs`.
#[derive(Debug, Serialize)]
pub struct SubmitJobResponse {
    pub job_id: String,
    pub status_url: String,
}

/// Response body for `GET /api/v1/jobs/{job_id}`.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub completed: u32,
    pub total: u32,
    pub images: Vec<String>,
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Accept a new snapshot job: allocate a fresh id, create the Pending
/// record, enqueue the start signal, and answer 202 immediately -- no
/// work has happened yet. A queue-send failure after the record was
/// created leaves an orphaned Pending job; the queue's delivery
/// guarantee is what we trust to keep that window theoretical.
pub async fn submit_job(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let job_id = Uuid::new_v4().to_string();

    state.status.create(&job_id).await?;

    let start = StartJobMessage {
        job_id: job_id.clone(),
    };
    state
        .start_queue
        .send(&serde_json::to_string(&start).map_err(skylark_core::CoreError::from)?)
        .await?;

    tracing::info!(job_id = %job_id, "Job accepted");

    let body = SubmitJobResponse {
        status_url: format!("/api/v1/jobs/{job_id}"),
        job_id,
    };
    Ok((StatusCode::ACCEPTED, Json(body)))
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{job_id}
///
/// Read-only point-in-time snapshot: the job record plus a signed URL
/// for every artifact under the job's prefix, sorted lexicographically
/// for deterministic output. Callable any number of times, including
/// mid-processing.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let record = state.status.get(&job_id).await?;

    let keys = state.objects.list(&format!("{job_id}/")).await?;

    let mut images = Vec::with_capacity(keys.len());
    for key in &keys {
        images.push(
            state
                .objects
                .signed_url(key, state.config.signed_url_ttl)
                .await?,
        );
    }
    images.sort();

    Ok(Json(JobStatusResponse {
        job_id: record.job_id,
        status: record.status,
        completed: record.completed_units,
        total: record.total_units,
        images,
    }))
}
