//! Axum route handlers for job management and resume ingestion.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::job::JobStatus;
use crate::screening::ingest::{process_resume_batch, ResumeFile};
use crate::state::AppState;
use crate::store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobResponse {
    pub job_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdateRequest {
    pub title: Option<String>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Fields collected from a multipart job upload.
struct JobUpload {
    title: Option<String>,
    job_description: Option<String>,
    resumes: Vec<ResumeFile>,
}

async fn read_job_upload(mut multipart: Multipart) -> Result<JobUpload, AppError> {
    let mut upload = JobUpload {
        title: None,
        job_description: None,
        resumes: Vec::new(),
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => {
                upload.title = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read 'title' field: {e}"))
                })?);
            }
            Some("jobDescription") => {
                upload.job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read 'jobDescription' field: {e}"))
                })?);
            }
            Some("resumes") => {
                let filename = field.file_name().unwrap_or("resume.txt").to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    AppError::Validation(format!("Could not read resume file: {e}"))
                })?;
                upload.resumes.push(ResumeFile { filename, bytes });
            }
            _ => {} // unknown fields are ignored
        }
    }

    Ok(upload)
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/jobs
///
/// Persists the job as `processing` and returns its id immediately; the
/// resume batch is scored in a background task after the response.
pub async fn handle_create_job(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateJobResponse>), AppError> {
    let upload = read_job_upload(multipart).await?;

    let title = upload
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'title' is required.".to_string()))?;
    let job_description = upload
        .job_description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Validation("'jobDescription' is required.".to_string()))?;
    if upload.resumes.is_empty() {
        return Err(AppError::Validation("No resume files provided.".to_string()));
    }

    let job_id = store::create_job(&state.db, &title, &job_description).await?;
    info!(
        "Created job {job_id} ('{title}') with {} resume(s) queued",
        upload.resumes.len()
    );

    let task_state = state.clone();
    tokio::spawn(async move {
        process_resume_batch(task_state, job_id, job_description, upload.resumes).await;
    });

    Ok((StatusCode::CREATED, Json(CreateJobResponse { job_id })))
}

/// PUT /api/jobs/:job_id
///
/// Partial update of title and/or description. An empty payload is a 400.
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    Json(request): Json<JobUpdateRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    if request.title.is_none() && request.job_description.is_none() {
        return Err(AppError::Validation("No fields to update.".to_string()));
    }

    store::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))?;

    store::update_job(
        &state.db,
        job_id,
        request.title.as_deref(),
        request.job_description.as_deref(),
    )
    .await?;

    Ok(Json(MessageResponse {
        message: format!("Job {job_id} updated."),
    }))
}

/// POST /api/jobs/:job_id/resumes
///
/// Re-enters `processing` and runs another scoring batch for an existing
/// job. Batches for the same job are serialized by the ingest lock.
pub async fn handle_add_resumes(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let job = store::get_job(&state.db, job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))?;

    let upload = read_job_upload(multipart).await?;
    if upload.resumes.is_empty() {
        return Err(AppError::Validation("No resume files provided.".to_string()));
    }

    store::update_job_status(&state.db, job_id, JobStatus::Processing).await?;

    let task_state = state.clone();
    tokio::spawn(async move {
        process_resume_batch(task_state, job_id, job.job_description, upload.resumes).await;
    });

    Ok(Json(MessageResponse {
        message: "Resumes are being processed and added to the job.".to_string(),
    }))
}

/// DELETE /api/jobs/:job_id
///
/// Cascades to all candidates. Idempotent: an absent job still returns 204.
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    store::delete_job_cascade(&state.db, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/jobs/:job_id/candidates/:candidate_id
pub async fn handle_delete_candidate(
    State(state): State<AppState>,
    Path((job_id, candidate_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    store::delete_candidate(&state.db, job_id, candidate_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/jobs/:job_id/candidates
pub async fn handle_delete_all_candidates(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    store::delete_all_candidates(&state.db, job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
