//! Document Store Adapter — all persistence for jobs, their candidate
//! subcollection, and per-recruiter OAuth token records.
//!
//! Every mutating call is durable once it returns without error; there is no
//! local cache. No transaction spans a job write and a candidate write;
//! cascade deletion instead removes candidates in pages before the job row,
//! so a candidate can never outlive its job.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::candidate::{CandidateRow, CandidateStatus, ScoredCandidate};
use crate::models::job::{JobRow, JobStatus};
use crate::models::token::StoredToken;

/// Page size for batched candidate deletion. Bounds per-statement work when
/// a job has accumulated a large candidate set.
pub const DELETE_PAGE_SIZE: i64 = 100;

// ────────────────────────────────────────────────────────────────────────────
// Jobs
// ────────────────────────────────────────────────────────────────────────────

pub async fn create_job(
    pool: &PgPool,
    title: &str,
    job_description: &str,
) -> Result<Uuid, sqlx::Error> {
    let job_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO jobs (id, title, job_description, status) VALUES ($1, $2, $3, $4)",
    )
    .bind(job_id)
    .bind(title)
    .bind(job_description)
    .bind(JobStatus::Processing.as_str())
    .execute(pool)
    .await?;
    Ok(job_id)
}

pub async fn get_job(pool: &PgPool, job_id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await
}

/// Partial update: absent fields keep their current value.
pub async fn update_job(
    pool: &PgPool,
    job_id: Uuid,
    title: Option<&str>,
    job_description: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE jobs SET title = COALESCE($2, title), \
         job_description = COALESCE($3, job_description) WHERE id = $1",
    )
    .bind(job_id)
    .bind(title)
    .bind(job_description)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn update_job_status(
    pool: &PgPool,
    job_id: Uuid,
    status: JobStatus,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE jobs SET status = $2 WHERE id = $1")
        .bind(job_id)
        .bind(status.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes all of a job's candidates in pages, then the job itself.
/// Idempotent: deleting an absent job is a no-op, never partial state.
pub async fn delete_job_cascade(pool: &PgPool, job_id: Uuid) -> Result<(), sqlx::Error> {
    let deleted = delete_all_candidates(pool, job_id).await?;
    sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(job_id)
        .execute(pool)
        .await?;
    info!("Deleted job {job_id} and {deleted} associated candidates");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

pub async fn add_candidate(
    pool: &PgPool,
    job_id: Uuid,
    candidate: &ScoredCandidate,
) -> Result<Uuid, sqlx::Error> {
    let candidate_id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO candidates \
         (id, job_id, candidate_name, candidate_email, suitability_score, summary) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(candidate_id)
    .bind(job_id)
    .bind(&candidate.candidate_name)
    .bind(&candidate.candidate_email)
    .bind(candidate.suitability_score)
    .bind(&candidate.summary)
    .execute(pool)
    .await?;
    Ok(candidate_id)
}

/// Fetches the requested candidates of a job. Ids that do not resolve are
/// skipped, not errors; callers decide whether an empty result matters.
pub async fn get_candidates(
    pool: &PgPool,
    job_id: Uuid,
    candidate_ids: &[Uuid],
) -> Result<Vec<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        "SELECT * FROM candidates WHERE job_id = $1 AND id = ANY($2) ORDER BY created_at",
    )
    .bind(job_id)
    .bind(candidate_ids)
    .fetch_all(pool)
    .await
}

pub async fn delete_candidate(
    pool: &PgPool,
    job_id: Uuid,
    candidate_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM candidates WHERE job_id = $1 AND id = $2")
        .bind(job_id)
        .bind(candidate_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Deletes every candidate of a job in pages of `DELETE_PAGE_SIZE`.
/// Returns the number of rows removed.
pub async fn delete_all_candidates(pool: &PgPool, job_id: Uuid) -> Result<u64, sqlx::Error> {
    let mut total: u64 = 0;
    loop {
        let deleted = sqlx::query(
            "DELETE FROM candidates WHERE id IN \
             (SELECT id FROM candidates WHERE job_id = $1 LIMIT $2)",
        )
        .bind(job_id)
        .bind(DELETE_PAGE_SIZE)
        .execute(pool)
        .await?
        .rows_affected();

        total += deleted;
        if (deleted as i64) < DELETE_PAGE_SIZE {
            return Ok(total);
        }
    }
}

pub async fn mark_candidate_contacted(
    pool: &PgPool,
    job_id: Uuid,
    candidate_id: Uuid,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE candidates SET status = $3 WHERE job_id = $1 AND id = $2")
        .bind(job_id)
        .bind(candidate_id)
        .bind(CandidateStatus::Contacted.as_str())
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn mark_candidate_scheduled(
    pool: &PgPool,
    job_id: Uuid,
    candidate_id: Uuid,
    interview_link: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE candidates SET status = $3, interview_link = $4 \
         WHERE job_id = $1 AND id = $2",
    )
    .bind(job_id)
    .bind(candidate_id)
    .bind(CandidateStatus::Scheduled.as_str())
    .bind(interview_link)
    .execute(pool)
    .await?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// OAuth token records
// ────────────────────────────────────────────────────────────────────────────

pub async fn store_user_token(pool: &PgPool, token: &StoredToken) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_tokens \
         (user_id, access_token, refresh_token, token_uri, client_id, client_secret, \
          scopes, expires_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now()) \
         ON CONFLICT (user_id) DO UPDATE SET \
          access_token = EXCLUDED.access_token, \
          refresh_token = COALESCE(EXCLUDED.refresh_token, user_tokens.refresh_token), \
          token_uri = EXCLUDED.token_uri, \
          client_id = EXCLUDED.client_id, \
          client_secret = EXCLUDED.client_secret, \
          scopes = EXCLUDED.scopes, \
          expires_at = EXCLUDED.expires_at, \
          updated_at = now()",
    )
    .bind(&token.user_id)
    .bind(&token.access_token)
    .bind(&token.refresh_token)
    .bind(&token.token_uri)
    .bind(&token.client_id)
    .bind(&token.client_secret)
    .bind(&token.scopes)
    .bind(token.expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_user_token(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<StoredToken>, sqlx::Error> {
    sqlx::query_as::<_, StoredToken>("SELECT * FROM user_tokens WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}
