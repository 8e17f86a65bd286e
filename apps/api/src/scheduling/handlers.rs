//! Axum route handlers for email drafting and interview scheduling.

use axum::{extract::State, Json};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::principal::RecruiterId;
use crate::calendar::EventRequest;
use crate::errors::AppError;
use crate::models::job::JobStatus;
use crate::scheduling::drafter::draft_email;
use crate::scheduling::slots::SlotCursor;
use crate::state::AppState;
use crate::store;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailBatchRequest {
    pub job_id: Uuid,
    /// ISO-8601; a bare local form is accepted and read as UTC.
    pub interview_datetime: String,
    pub candidate_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftedEmail {
    pub candidate_name: String,
    pub candidate_email: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct ScheduledInterview {
    pub name: String,
    pub event_id: String,
}

#[derive(Debug, Serialize)]
pub struct FailedInterview {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct SendEmailsResponse {
    pub message: String,
    pub scheduled_count: usize,
    pub failed_count: usize,
    pub scheduled: Vec<ScheduledInterview>,
    pub failed: Vec<FailedInterview>,
}

fn parse_interview_datetime(value: &str) -> Result<DateTime<Utc>, AppError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|_| AppError::Validation(format!("'{value}' is not a valid ISO-8601 datetime.")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/emails/draft
///
/// One draft per resolved candidate; unresolved ids are silently omitted.
/// 404 only when the job or every requested candidate is missing.
pub async fn handle_draft_emails(
    State(state): State<AppState>,
    Json(request): Json<EmailBatchRequest>,
) -> Result<Json<Vec<DraftedEmail>>, AppError> {
    let job = store::get_job(&state.db, request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))?;

    parse_interview_datetime(&request.interview_datetime)?;

    let candidates = store::get_candidates(&state.db, job.id, &request.candidate_ids).await?;
    if candidates.is_empty() {
        return Err(AppError::NotFound(
            "No specified candidates found.".to_string(),
        ));
    }

    let mut drafts = Vec::with_capacity(candidates.len());
    for candidate in &candidates {
        let email = draft_email(&state.llm, &job, candidate, &request.interview_datetime).await;
        drafts.push(DraftedEmail {
            candidate_name: candidate.candidate_name.clone(),
            candidate_email: candidate.candidate_email.clone(),
            subject: email.subject,
            body: email.body,
        });
    }

    Ok(Json(drafts))
}

/// POST /api/emails/send
///
/// For each resolved candidate: draft, best-effort delivery, then a calendar
/// event in the next free interview slot. One candidate's provider failure
/// is recorded and the batch continues; `scheduled + failed` always covers
/// every resolved candidate.
pub async fn handle_send_emails(
    State(state): State<AppState>,
    recruiter: RecruiterId,
    Json(request): Json<EmailBatchRequest>,
) -> Result<Json<SendEmailsResponse>, AppError> {
    let job = store::get_job(&state.db, request.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Job not found.".to_string()))?;

    let candidates = store::get_candidates(&state.db, job.id, &request.candidate_ids).await?;
    if candidates.is_empty() {
        return Err(AppError::NotFound(
            "No specified candidates found.".to_string(),
        ));
    }

    let start_time = parse_interview_datetime(&request.interview_datetime)?;

    let token = store::get_user_token(&state.db, &recruiter.0)
        .await?
        .ok_or_else(|| {
            AppError::AuthRequired("User not authenticated with Google.".to_string())
        })?;
    let token = match state.calendar.refresh_if_expired(&token).await? {
        Some(refreshed) => {
            store::store_user_token(&state.db, &refreshed).await?;
            refreshed
        }
        None => token,
    };

    let mut cursor = SlotCursor::new(start_time, state.config.interview_slot_minutes);
    let mut scheduled = Vec::new();
    let mut failed = Vec::new();

    for candidate in &candidates {
        if !candidate.candidate_email.contains('@') {
            failed.push(FailedInterview {
                name: candidate.candidate_name.clone(),
                reason: "Missing candidate email.".to_string(),
            });
            continue;
        }

        let email = draft_email(&state.llm, &job, candidate, &request.interview_datetime).await;

        // Delivery is independently failable; the event is still created.
        if let Some(mailer) = &state.mailer {
            match mailer
                .send(&candidate.candidate_email, &email.subject, &email.body)
                .await
            {
                Ok(_) => {
                    store::mark_candidate_contacted(&state.db, job.id, candidate.id).await?;
                }
                Err(e) => {
                    warn!(
                        "Email delivery to '{}' failed: {e}",
                        candidate.candidate_email
                    );
                }
            }
        }

        let (slot_start, slot_end) = cursor.current();
        let event = EventRequest {
            summary: format!("Interview: {} with {}", job.title, candidate.candidate_name),
            description: format!("Interview for the {} position.", job.title),
            start_time: slot_start,
            end_time: slot_end,
            attendee_emails: vec![candidate.candidate_email.clone()],
            conference_request_id: Some(format!("{}-{}", job.id, candidate.id)),
        };

        match state.calendar.create_event(&token, &event).await {
            Ok(created) => {
                store::mark_candidate_scheduled(
                    &state.db,
                    job.id,
                    candidate.id,
                    created.conference_link.as_deref(),
                )
                .await?;
                scheduled.push(ScheduledInterview {
                    name: candidate.candidate_name.clone(),
                    event_id: created.event_id,
                });
                cursor.advance();
            }
            Err(e) => {
                warn!(
                    "Event creation failed for '{}': {e}",
                    candidate.candidate_name
                );
                failed.push(FailedInterview {
                    name: candidate.candidate_name.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    store::update_job_status(&state.db, job.id, JobStatus::SchedulingCompleted).await?;
    info!(
        "Scheduling for job {} finished: {} scheduled, {} failed",
        job.id,
        scheduled.len(),
        failed.len()
    );

    Ok(Json(SendEmailsResponse {
        message: "Interview scheduling process completed.".to_string(),
        scheduled_count: scheduled.len(),
        failed_count: failed.len(),
        scheduled,
        failed,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_datetime() {
        let dt = parse_interview_datetime("2026-03-02T09:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-02T09:00:00+00:00");
    }

    #[test]
    fn test_parse_offset_datetime_normalized_to_utc() {
        let dt = parse_interview_datetime("2026-03-02T10:00:00+01:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-02T09:00:00+00:00");
    }

    #[test]
    fn test_parse_bare_local_form_read_as_utc() {
        let dt = parse_interview_datetime("2026-03-02T09:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2026-03-02T09:00:00+00:00");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_interview_datetime("next tuesday").is_err());
        assert!(parse_interview_datetime("").is_err());
    }
}
