use std::sync::Arc;

use sqlx::PgPool;

use crate::calendar::GoogleCalendar;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::scheduling::mailer::ResendMailer;
use crate::screening::ingest::JobLocks;
use crate::screening::scorer::ResumeScorer;

/// Shared application state injected into all route handlers via Axum
/// extractors. Every client is constructed in `main`; no module-level
/// globals.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub calendar: GoogleCalendar,
    /// Present only when RESEND_API_KEY is configured; drafting and
    /// scheduling still work without delivery.
    pub mailer: Option<ResendMailer>,
    /// Pluggable scorer seam. Default: `LlmResumeScorer`.
    pub scorer: Arc<dyn ResumeScorer>,
    pub config: Config,
    /// Serializes resume batches per job.
    pub ingest_locks: JobLocks,
}
