pub mod aggregator;
pub mod engine;
pub mod fallback;
pub mod handlers;
pub mod metrics;
pub mod prompts;
pub mod red_flags;
