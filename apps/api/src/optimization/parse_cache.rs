//! Parse cache: bounded, TTL-evicting cache of parsed résumés keyed by content hash.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sha2::{Digest, Sha256};

use crate::models::resume::ResumeDocument;

#[derive(Clone)]
pub struct ParseCache {
    inner: Cache<String, Arc<ResumeDocument>>,
}

impl ParseCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// SHA-256 hex digest of the trimmed résumé text.
    pub fn key_for(resume_text: &str) -> String {
        let digest = Sha256::digest(resume_text.trim().as_bytes());
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }

    pub async fn get(&self, resume_text: &str) -> Option<Arc<ResumeDocument>> {
        self.inner.get(&Self::key_for(resume_text)).await
    }

    pub async fn insert(&self, resume_text: &str, document: Arc<ResumeDocument>) {
        self.inner.insert(Self::key_for(resume_text), document).await;
    }
}
