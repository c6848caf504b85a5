use std::sync::Arc;

use crate::llm_client::embeddings::Embedder;
use crate::llm_client::TextGenerator;
use crate::optimization::parse_cache::ParseCache;
use crate::optimization::pipeline::Pipeline;
use crate::scorecard::aggregator::MetricWeights;
use crate::scorecard::engine::ScorecardEngine;
use crate::store::RunStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external dependency sits behind a trait object so tests can swap in
/// scripted generators and the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RunStore>,
    pub llm: Arc<dyn TextGenerator>,
    pub embedder: Arc<dyn Embedder>,
    /// Shared across requests; identical résumé text skips the parse call.
    pub parse_cache: ParseCache,
    pub score_weights: Arc<MetricWeights>,
}

impl AppState {
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            self.llm.clone(),
            self.store.clone(),
            self.parse_cache.clone(),
        )
    }

    pub fn scorecard_engine(&self) -> ScorecardEngine {
        ScorecardEngine::new(
            self.store.clone(),
            self.llm.clone(),
            self.embedder.clone(),
            self.score_weights.clone(),
        )
    }
}
