//! Axum route handlers for the Google OAuth redirect flow.

use axum::{
    extract::{Query, State},
    response::Redirect,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::principal::RecruiterId;
use crate::errors::AppError;
use crate::state::AppState;
use crate::store;

#[derive(Debug, Serialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    /// The principal embedded by `authorization_url`.
    pub state: Option<String>,
    pub error: Option<String>,
}

/// GET /api/auth/google
///
/// Issues the consent URL. The recruiter principal rides the OAuth `state`
/// parameter so the callback stores the token under the same key.
pub async fn handle_google_auth(
    State(state): State<AppState>,
    recruiter: RecruiterId,
) -> Json<AuthUrlResponse> {
    Json(AuthUrlResponse {
        url: state.calendar.authorization_url(&recruiter.0),
    })
}

/// GET /api/auth/google/callback
///
/// Exchanges the authorization code, stores the token record server-side,
/// and redirects back to the frontend with a success indicator.
pub async fn handle_google_auth_callback(
    State(state): State<AppState>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Redirect, AppError> {
    if let Some(error) = query.error {
        return Err(AppError::Validation(format!(
            "Google authorization was denied: {error}"
        )));
    }
    let code = query
        .code
        .ok_or_else(|| AppError::Validation("Missing authorization code.".to_string()))?;

    let principal = query
        .state
        .filter(|s| !s.trim().is_empty())
        .or_else(|| state.config.fallback_recruiter_id.clone())
        .ok_or_else(|| {
            AppError::AuthRequired("No recruiter identity on OAuth callback".to_string())
        })?;

    let token = state
        .calendar
        .exchange_code(&code, &principal)
        .await
        .map_err(|e| AppError::Validation(format!("Error fetching token: {e}")))?;

    store::store_user_token(&state.db, &token).await?;
    info!("Stored Google Calendar token for '{principal}'");

    Ok(Redirect::to(&format!(
        "{}?calendar=connected",
        state.config.frontend_url
    )))
}
