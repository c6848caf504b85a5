mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod optimization;
mod routes;
mod scorecard;
mod state;
mod store;
mod text;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::embeddings::EmbeddingClient;
use crate::llm_client::LlmClient;
use crate::optimization::parse_cache::ParseCache;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgRunStore;

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

    info!("Starting Tailor API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let store = Arc::new(PgRunStore::new(db));

    // Initialize LLM and embedding clients
    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_api_url.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    let embedder = EmbeddingClient::new(
        config.embedding_api_key.clone(),
        config.embedding_api_url.clone(),
        config.embedding_model.clone(),
    )?;
    info!("Embedding client initialized (model: {})", config.embedding_model);

    let parse_cache = ParseCache::new(
        config.parse_cache_capacity,
        Duration::from_secs(config.parse_cache_ttl_secs),
    );

    // Build app state
    let state = AppState {
        store,
        llm: Arc::new(llm),
        embedder: Arc::new(embedder),
        parse_cache,
        score_weights: Arc::new(config.score_weights.clone()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client's domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
