//! Handlers for the `/jobs` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use herald_core::error::CoreError;
use herald_core::job_status::JobStatus;
use herald_core::types::JobId;
use herald_db::models::job::CreateJob;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response body for a newly created job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedJob {
    pub job_id: JobId,
    pub status: JobStatus,
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/jobs
///
/// Create a new job. Returns 201 with the job id and its initial `pending`
/// status. The scheduler picks it up once its scheduled time has passed.
pub async fn create_job(
    State(state): State<AppState>,
    input: Result<Json<CreateJob>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let job = state.lifecycle.create(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedJob {
            job_id: job.id,
            status: job.status,
        }),
    ))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/jobs/{id}
///
/// Get a single job by ID. Ids that are not valid UUIDs cannot name a job
/// and are reported as not found.
pub async fn get_job(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "Job",
            id: raw_id.clone(),
        })
    };

    let job_id: JobId = raw_id.parse().map_err(|_| not_found())?;
    let job = state.lifecycle.get(job_id).await?.ok_or_else(not_found)?;

    Ok(Json(job))
}
