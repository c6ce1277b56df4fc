//! Answer generation with a deterministic fallback: the pipeline always
//! produces some textual answer.

use std::sync::Arc;

use crate::backends::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::config::GenerationConfig;

/// Returned whenever the completion backend errors or produces nothing
/// usable.
pub const FALLBACK_ANSWER: &str =
    "No relevant information found in the documentation index.";

pub struct AnswerGenerator {
    backend: Arc<dyn CompletionBackend>,
    temperature: f64,
    max_tokens: u32,
}

impl AnswerGenerator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: &GenerationConfig) -> Self {
        Self {
            backend,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    pub async fn generate(&self, messages: Vec<ChatMessage>) -> String {
        let request = CompletionRequest {
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        match self.backend.complete(&request).await {
            Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
            Ok(_) => {
                tracing::warn!("completion returned empty text, using fallback answer");
                FALLBACK_ANSWER.to_string()
            }
            Err(err) => {
                tracing::warn!("completion failed, using fallback answer: {err}");
                FALLBACK_ANSWER.to_string()
            }
        }
    }
}
