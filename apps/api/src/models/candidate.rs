use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Scheduling status of a candidate. Unset until the first interview email
/// goes out; `Contacted` moves to `Scheduled` once a calendar event exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    Contacted,
    Scheduled,
}

impl CandidateStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::Contacted => "contacted",
            CandidateStatus::Scheduled => "scheduled",
        }
    }
}

/// A scored candidate record as produced by the resume scorer, before it is
/// persisted under a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub candidate_name: String,
    pub candidate_email: String,
    /// Always within [0, 1]; the scorer rejects anything else.
    pub suitability_score: f64,
    pub summary: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub suitability_score: f64,
    pub summary: String,
    pub status: Option<String>,
    pub interview_link: Option<String>,
    pub created_at: DateTime<Utc>,
}
