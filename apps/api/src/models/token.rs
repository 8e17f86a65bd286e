use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A recruiter's OAuth token record, one row per principal.
///
/// Carries everything needed to refresh without re-consulting app config:
/// the token endpoint, client credentials, and granted scopes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredToken {
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub scopes: Vec<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl StoredToken {
    /// True when the access token is expired or expires within `margin_secs`.
    /// Tokens without a recorded expiry are treated as still valid.
    pub fn expires_within(&self, margin_secs: i64) -> bool {
        match self.expires_at {
            Some(expires_at) => expires_at - Utc::now() <= chrono::Duration::seconds(margin_secs),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(expires_at: Option<DateTime<Utc>>) -> StoredToken {
        StoredToken {
            user_id: "recruiter-1".to_string(),
            access_token: "ya29.test".to_string(),
            refresh_token: Some("1//refresh".to_string()),
            token_uri: "https://oauth2.googleapis.com/token".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            scopes: vec!["https://www.googleapis.com/auth/calendar.events".to_string()],
            expires_at,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_expired_token_detected() {
        let t = token(Some(Utc::now() - chrono::Duration::minutes(5)));
        assert!(t.expires_within(60));
    }

    #[test]
    fn test_fresh_token_not_expired() {
        let t = token(Some(Utc::now() + chrono::Duration::hours(1)));
        assert!(!t.expires_within(60));
    }

    #[test]
    fn test_missing_expiry_treated_as_valid() {
        assert!(!token(None).expires_within(60));
    }
}
