use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;
use crate::state::AppState;

pub const RECRUITER_HEADER: &str = "x-recruiter-id";

/// The recruiter principal a request acts as. OAuth tokens are stored and
/// looked up under this key, never under a hardcoded placeholder.
///
/// Taken from the `x-recruiter-id` header, else the configured fallback;
/// with neither, the request is rejected as unauthenticated.
#[derive(Debug, Clone)]
pub struct RecruiterId(pub String);

#[async_trait]
impl FromRequestParts<AppState> for RecruiterId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(value) = parts.headers.get(RECRUITER_HEADER) {
            let id = value
                .to_str()
                .map_err(|_| {
                    AppError::Validation(format!("'{RECRUITER_HEADER}' header is not valid UTF-8"))
                })?
                .trim();
            if !id.is_empty() {
                return Ok(RecruiterId(id.to_string()));
            }
        }

        state
            .config
            .fallback_recruiter_id
            .clone()
            .map(RecruiterId)
            .ok_or_else(|| {
                AppError::AuthRequired(format!(
                    "No '{RECRUITER_HEADER}' header on request and no fallback recruiter configured"
                ))
            })
    }
}
