mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod pdf;
mod postings;
mod questions;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;
mod wizard;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::{LanguageModel, LlmClient};
use crate::pdf::build_extractor;
use crate::postings::repository::PgSurveyRepository;
use crate::questions::generator::QuestionGenerator;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Survey API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let repo = Arc::new(PgSurveyRepository::new(db));

    // Initialize S3 / MinIO
    let store = Arc::new(S3ObjectStore::from_config(&config).await);
    info!("S3 client initialized ({})", config.s3_endpoint);

    // Initialize LLM client
    if config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY is not set; question generation will fail until it is");
    }
    let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
    )?);
    info!(
        "LLM client initialized (model: {})",
        llm_client::CHAT_MODEL
    );

    let pdf_extractor = build_extractor(config.pdf_extractor, llm.clone());

    // Build app state
    let state = AppState {
        config: config.clone(),
        questions: QuestionGenerator::new(llm),
        pdf_extractor,
        store,
        repo,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
