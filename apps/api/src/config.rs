use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing. A missing Google client
/// secret in particular is a fatal condition, not a runtime fallback.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,
    pub frontend_url: String,
    /// Enables outbound interview email delivery when set.
    pub resend_api_key: Option<String>,
    pub email_from: String,
    /// Principal used when a request carries no `x-recruiter-id` header.
    pub fallback_recruiter_id: Option<String>,
    /// Interview slot length in minutes for sequential scheduling.
    pub interview_slot_minutes: i64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            google_client_id: require_env("GOOGLE_CLIENT_ID")?,
            google_client_secret: require_env("GOOGLE_CLIENT_SECRET")?,
            google_redirect_uri: require_env("GOOGLE_REDIRECT_URI")?,
            frontend_url: require_env("FRONTEND_URL")?,
            resend_api_key: std::env::var("RESEND_API_KEY").ok(),
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "ResumeRank <onboarding@resend.dev>".to_string()),
            fallback_recruiter_id: std::env::var("FALLBACK_RECRUITER_ID").ok(),
            interview_slot_minutes: std::env::var("INTERVIEW_SLOT_MINUTES")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<i64>()
                .context("INTERVIEW_SLOT_MINUTES must be a positive integer")?,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
