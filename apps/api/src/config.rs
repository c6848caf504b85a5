use anyhow::{Context, Result};

use crate::llm_client::embeddings::DEFAULT_EMBEDDING_API_URL;
use crate::llm_client::DEFAULT_LLM_API_URL;
use crate::scorecard::aggregator::MetricWeights;

const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
const DEFAULT_PARSE_CACHE_CAPACITY: u64 = 256;
const DEFAULT_PARSE_CACHE_TTL_SECS: u64 = 3600;

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub llm_api_url: String,
    pub embedding_api_key: String,
    pub embedding_api_url: String,
    pub embedding_model: String,
    pub parse_cache_capacity: u64,
    pub parse_cache_ttl_secs: u64,
    pub score_weights: MetricWeights,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let score_weights = match std::env::var("SCORE_WEIGHTS") {
            Ok(raw) => MetricWeights::from_json(&raw).context("SCORE_WEIGHTS is invalid")?,
            Err(_) => MetricWeights::default(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_api_url: optional_env("LLM_API_URL", DEFAULT_LLM_API_URL),
            embedding_api_key: require_env("EMBEDDING_API_KEY")?,
            embedding_api_url: optional_env("EMBEDDING_API_URL", DEFAULT_EMBEDDING_API_URL),
            embedding_model: optional_env("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            parse_cache_capacity: parse_env("PARSE_CACHE_CAPACITY", DEFAULT_PARSE_CACHE_CAPACITY)?,
            parse_cache_ttl_secs: parse_env("PARSE_CACHE_TTL_SECS", DEFAULT_PARSE_CACHE_TTL_SECS)?,
            score_weights,
            port: parse_env("PORT", 8080u16)?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
