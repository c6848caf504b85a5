//! Résumé parse stage: raw text to `ResumeDocument`, memoised through `ParseCache`.

use std::sync::Arc;

use tracing::debug;

use crate::llm_client::prompts::{FACTUALITY_INSTRUCTION, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{generate_json, TextGenerator};
use crate::models::resume::ResumeDocument;
use crate::optimization::parse_cache::ParseCache;
use crate::optimization::prompts::{RESUME_PARSE_PROMPT_TEMPLATE, RESUME_PARSE_SYSTEM};
use crate::optimization::stages::StageError;

pub struct ParsedResume {
    pub document: Arc<ResumeDocument>,
    pub cache_hit: bool,
}

pub async fn parse_resume(
    resume_text: &str,
    llm: &dyn TextGenerator,
    cache: &ParseCache,
) -> Result<ParsedResume, StageError> {
    if let Some(document) = cache.get(resume_text).await {
        debug!("Parse cache hit");
        return Ok(ParsedResume {
            document,
            cache_hit: true,
        });
    }

    let prompt = RESUME_PARSE_PROMPT_TEMPLATE
        .replace("{json_instruction}", JSON_ONLY_INSTRUCTION)
        .replace("{factuality_instruction}", FACTUALITY_INSTRUCTION)
        .replace("{resume_text}", resume_text);

    let raw: ResumeDocument = generate_json(llm, &prompt, RESUME_PARSE_SYSTEM).await?;
    let document = Arc::new(validate(raw)?);
    cache.insert(resume_text, document.clone()).await;

    Ok(ParsedResume {
        document,
        cache_hit: false,
    })
}

/// Blank bullets are removed before any index is assigned. At least one work
/// entry must keep at least one bullet.
fn validate(mut doc: ResumeDocument) -> Result<ResumeDocument, StageError> {
    for work in &mut doc.work {
        work.bullets = work
            .bullets
            .drain(..)
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
    }
    doc.contact.email = doc.contact.email.trim().to_string();
    doc.summary = doc.summary.trim().to_string();

    if doc.bullet_count() == 0 {
        return Err(StageError::Malformed(
            "parsed résumé has no work bullets".to_string(),
        ));
    }
    Ok(doc)
}
