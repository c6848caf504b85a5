//! Scripted text generator for tests. Replies are keyed by system prompt so a
//! single generator can drive a whole pipeline run.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::embeddings::{Embedder, EmbeddingError};
use super::{LlmError, TextGenerator};

type Responder = Arc<dyn Fn(&str) -> Result<String, LlmError> + Send + Sync>;

#[derive(Clone)]
enum Reply {
    Text(String),
    Fail(u16),
    With(Responder),
}

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub prompt: String,
}

/// Each system prompt owns a queue of replies. The last reply in a queue is
/// sticky and answers every further call.
#[derive(Default)]
pub struct ScriptedGenerator {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply_to(self, system: &str, text: &str) -> Self {
        self.push(system, Reply::Text(text.to_string()))
    }

    pub fn fail(self, system: &str, status: u16) -> Self {
        self.push(system, Reply::Fail(status))
    }

    pub fn respond_with<F>(self, system: &str, f: F) -> Self
    where
        F: Fn(&str) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.push(system, Reply::With(Arc::new(f)))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, system: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.system == system)
            .collect()
    }

    fn push(self, system: &str, reply: Reply) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(system.to_string())
            .or_default()
            .push_back(reply);
        self
    }

    fn next_reply(&self, system: &str) -> Option<Reply> {
        let mut scripts = self.scripts.lock().unwrap();
        let queue = scripts.get_mut(system)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn complete(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            system: system.to_string(),
            prompt: prompt.to_string(),
        });

        match self.next_reply(system) {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(status)) => Err(LlmError::Api {
                status,
                message: "scripted failure".to_string(),
            }),
            Some(Reply::With(responder)) => responder(prompt),
            None => Err(LlmError::Api {
                status: 500,
                message: "no scripted reply for this system prompt".to_string(),
            }),
        }
    }
}

/// Embedder double. Each input is mapped through `f`; `failing()` errors on every call.
pub struct FixedEmbedder {
    f: Option<Box<dyn Fn(&str) -> Vec<f32> + Send + Sync>>,
}

impl FixedEmbedder {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> Vec<f32> + Send + Sync + 'static,
    {
        Self { f: Some(Box::new(f)) }
    }

    pub fn failing() -> Self {
        Self { f: None }
    }
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        match &self.f {
            Some(f) => Ok(inputs.iter().map(|s| f(s)).collect()),
            None => Err(EmbeddingError::Api {
                status: 503,
                message: "scripted embedding failure".to_string(),
            }),
        }
    }
}
