//! Calendar Connector — Google OAuth token lifecycle and event creation.
//!
//! ARCHITECTURAL RULE: no other module talks to the Google endpoints
//! directly; token exchange, refresh, and event insertion all live here.

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::token::StoredToken;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const CALENDAR_EVENTS_URL: &str =
    "https://www.googleapis.com/calendar/v3/calendars/primary/events";
/// Scopes requested during the consent flow.
pub const GOOGLE_API_SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar.events"];
/// Refresh when the access token expires within this window.
const EXPIRY_MARGIN_SECS: i64 = 60;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum CalendarError {
    #[error("calendar authorization required: {0}")]
    AuthRequired(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Everything needed to insert one event into the primary calendar.
#[derive(Debug, Clone)]
pub struct EventRequest {
    pub summary: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub attendee_emails: Vec<String>,
    /// When set, a Meet link is requested; the id de-duplicates the
    /// conference request provider-side across retries.
    pub conference_request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreatedEvent {
    pub event_id: String,
    pub conference_link: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventResponse {
    id: String,
    #[serde(rename = "hangoutLink")]
    #[serde(default)]
    hangout_link: Option<String>,
}

#[derive(Clone)]
pub struct GoogleCalendar {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl GoogleCalendar {
    pub fn new(client_id: String, client_secret: String, redirect_uri: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            client_id,
            client_secret,
            redirect_uri,
        }
    }

    /// Begins 3-legged OAuth. `access_type=offline` plus forced consent so a
    /// refresh token is always issued; the principal rides the `state`
    /// parameter back to the callback.
    pub fn authorization_url(&self, principal: &str) -> String {
        let scope = GOOGLE_API_SCOPES.join(" ");
        format!(
            "{GOOGLE_AUTH_URL}?response_type=code&client_id={}&redirect_uri={}&scope={}\
             &access_type=offline&prompt=consent&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(principal),
        )
    }

    /// Exchanges an authorization code for a token record keyed by the
    /// principal.
    pub async fn exchange_code(
        &self,
        code: &str,
        principal: &str,
    ) -> Result<StoredToken, CalendarError> {
        let params = [
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(GOOGLE_TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        debug!("Exchanged authorization code for principal '{principal}'");
        Ok(self.token_record(principal, body, None))
    }

    /// Returns a refreshed token when the stored one is at or near expiry,
    /// `None` when it is still usable. Expired with no refresh token is an
    /// auth-required error; the caller surfaces it as a 401.
    pub async fn refresh_if_expired(
        &self,
        token: &StoredToken,
    ) -> Result<Option<StoredToken>, CalendarError> {
        if !token.expires_within(EXPIRY_MARGIN_SECS) {
            return Ok(None);
        }

        let refresh_token = token.refresh_token.as_deref().ok_or_else(|| {
            CalendarError::AuthRequired(
                "access token expired and no refresh token is stored".to_string(),
            )
        })?;

        let params = [
            ("client_id", token.client_id.as_str()),
            ("client_secret", token.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(token.token_uri.as_str())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 400 || status.as_u16() == 401 {
            let message = response.text().await.unwrap_or_default();
            // Revoked or invalid grant: the user has to run consent again.
            return Err(CalendarError::AuthRequired(message));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CalendarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: TokenResponse = response.json().await?;
        debug!("Refreshed access token for '{}'", token.user_id);
        Ok(Some(
            self.token_record(&token.user_id, body, token.refresh_token.clone()),
        ))
    }

    /// Inserts an event into the principal's primary calendar.
    /// Transient provider errors (429/5xx) are retried with backoff; anything
    /// else is fatal for this event and recorded by the caller.
    pub async fn create_event(
        &self,
        token: &StoredToken,
        request: &EventRequest,
    ) -> Result<CreatedEvent, CalendarError> {
        let body = build_event_body(request);
        let url = if request.conference_request_id.is_some() {
            format!("{CALENDAR_EVENTS_URL}?conferenceDataVersion=1")
        } else {
            CALENDAR_EVENTS_URL.to_string()
        };

        let mut last_error: Option<CalendarError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "Event creation attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self
                .client
                .post(&url)
                .bearer_auth(&token.access_token)
                .json(&body)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(CalendarError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                last_error = Some(CalendarError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if status.as_u16() == 401 {
                let message = response.text().await.unwrap_or_default();
                return Err(CalendarError::AuthRequired(message));
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(CalendarError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let event: EventResponse = response.json().await?;
            return Ok(CreatedEvent {
                event_id: event.id,
                conference_link: event.hangout_link,
            });
        }

        Err(last_error.unwrap_or(CalendarError::Api {
            status: 0,
            message: "event creation retries exhausted".to_string(),
        }))
    }

    fn token_record(
        &self,
        principal: &str,
        body: TokenResponse,
        existing_refresh: Option<String>,
    ) -> StoredToken {
        StoredToken {
            user_id: principal.to_string(),
            access_token: body.access_token,
            // Google omits refresh_token on refresh responses; keep the old one.
            refresh_token: body.refresh_token.or(existing_refresh),
            token_uri: GOOGLE_TOKEN_URL.to_string(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scopes: body
                .scope
                .map(|s| s.split(' ').map(String::from).collect())
                .unwrap_or_default(),
            expires_at: body.expires_in.map(|secs| Utc::now() + Duration::seconds(secs)),
            updated_at: Utc::now(),
        }
    }
}

/// Builds the Calendar API event payload.
fn build_event_body(request: &EventRequest) -> serde_json::Value {
    let mut body = json!({
        "summary": request.summary,
        "description": request.description,
        "start": {"dateTime": request.start_time.to_rfc3339(), "timeZone": "UTC"},
        "end": {"dateTime": request.end_time.to_rfc3339(), "timeZone": "UTC"},
        "attendees": request
            .attendee_emails
            .iter()
            .map(|email| json!({"email": email}))
            .collect::<Vec<_>>(),
    });

    if let Some(request_id) = &request.conference_request_id {
        body["conferenceData"] = json!({
            "createRequest": {
                "requestId": request_id,
                "conferenceSolutionKey": {"type": "hangoutsMeet"}
            }
        });
    }

    body
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn connector() -> GoogleCalendar {
        GoogleCalendar::new(
            "client-123".to_string(),
            "secret".to_string(),
            "http://localhost:8080/api/auth/google/callback".to_string(),
        )
    }

    fn event_request(conference: bool) -> EventRequest {
        EventRequest {
            summary: "Interview: Backend Engineer with Jane Doe".to_string(),
            description: "Interview for the Backend Engineer position.".to_string(),
            start_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap(),
            attendee_emails: vec!["jane@example.com".to_string()],
            conference_request_id: conference.then(|| "job-1-cand-1".to_string()),
        }
    }

    #[test]
    fn test_authorization_url_requests_offline_consent() {
        let url = connector().authorization_url("recruiter-1");
        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("prompt=consent"));
        assert!(url.contains("state=recruiter-1"));
        assert!(url.contains(&urlencoding::encode(GOOGLE_API_SCOPES[0]).into_owned()));
    }

    #[test]
    fn test_event_body_shape() {
        let body = build_event_body(&event_request(false));
        assert_eq!(body["summary"], "Interview: Backend Engineer with Jane Doe");
        assert_eq!(body["start"]["timeZone"], "UTC");
        assert_eq!(body["attendees"][0]["email"], "jane@example.com");
        assert!(body.get("conferenceData").is_none());
    }

    #[test]
    fn test_event_body_with_conference_request() {
        let body = build_event_body(&event_request(true));
        assert_eq!(
            body["conferenceData"]["createRequest"]["requestId"],
            "job-1-cand-1"
        );
        assert_eq!(
            body["conferenceData"]["createRequest"]["conferenceSolutionKey"]["type"],
            "hangoutsMeet"
        );
    }
}
