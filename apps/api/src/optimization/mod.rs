// Résumé optimization pipeline.
// Implements: JD extraction, résumé parsing, keyword mapping, bullet/summary/skills
// rewriting, persistence, and NDJSON progress streaming.
// All LLM calls go through llm_client. No direct Anthropic calls here.

pub mod bullet_rewriter;
pub mod handlers;
pub mod jd_extractor;
pub mod keyword_mapper;
pub mod parse_cache;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod resume_parser;
pub mod section_rewriter;
pub mod stages;
