mod auth;
mod calendar;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod routes;
mod scheduling;
mod screening;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::calendar::GoogleCalendar;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::scheduling::mailer::ResendMailer;
use crate::screening::ingest::JobLocks;
use crate::screening::scorer::LlmResumeScorer;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ResumeRank API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and apply migrations
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize Google Calendar connector
    let calendar = GoogleCalendar::new(
        config.google_client_id.clone(),
        config.google_client_secret.clone(),
        config.google_redirect_uri.clone(),
    );
    info!("Google Calendar connector initialized");

    // Initialize outbound email delivery, if configured
    let mailer = config
        .resend_api_key
        .clone()
        .map(|key| ResendMailer::new(key, config.email_from.clone()));
    if mailer.is_none() {
        info!("RESEND_API_KEY not set; interview emails will be drafted but not delivered");
    }

    // Initialize resume scorer
    let scorer = Arc::new(LlmResumeScorer::new(llm.clone()));

    // Build app state
    let state = AppState {
        db,
        llm,
        calendar,
        mailer,
        scorer,
        config: config.clone(),
        ingest_locks: JobLocks::default(),
    };

    // CORS: only the configured frontend origin
    let cors = CorsLayer::new()
        .allow_origin(
            config
                .frontend_url
                .parse::<HeaderValue>()
                .context("FRONTEND_URL is not a valid origin")?,
        )
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
