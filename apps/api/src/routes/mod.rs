pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::auth;
use crate::scheduling;
use crate::screening;
use crate::state::AppState;

/// Resume uploads can be multi-megabyte PDFs; axum's 2 MB default is too low.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job management
        .route("/api/jobs", post(screening::handlers::handle_create_job))
        .route(
            "/api/jobs/:job_id",
            put(screening::handlers::handle_update_job)
                .delete(screening::handlers::handle_delete_job),
        )
        .route(
            "/api/jobs/:job_id/resumes",
            post(screening::handlers::handle_add_resumes),
        )
        // Candidate management
        .route(
            "/api/jobs/:job_id/candidates",
            delete(screening::handlers::handle_delete_all_candidates),
        )
        .route(
            "/api/jobs/:job_id/candidates/:candidate_id",
            delete(screening::handlers::handle_delete_candidate),
        )
        // Email & scheduling
        .route(
            "/api/emails/draft",
            post(scheduling::handlers::handle_draft_emails),
        )
        .route(
            "/api/emails/send",
            post(scheduling::handlers::handle_send_emails),
        )
        // Google authorization
        .route("/api/auth/google", get(auth::handlers::handle_google_auth))
        .route(
            "/api/auth/google/callback",
            get(auth::handlers::handle_google_auth_callback),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
