//! Contracts for the external backends the pipeline calls.
//!
//! The pipeline never talks to a concrete service directly; it holds
//! trait objects so tests can swap in in-process fakes and deployments
//! can swap providers without touching pipeline code.

pub mod azure_openai;
pub mod azure_search;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::BackendError;

pub use azure_openai::AzureOpenAiClient;
pub use azure_search::AzureSearchClient;

/// One role-tagged entry in a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// One retrieval request against the document index. `vector` present
/// makes it a hybrid query; the backend fuses the keyword and vector
/// rankings (RRF) and returns a single pre-fused ordering.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query_text: String,
    pub top: usize,
    pub vector: Option<Vec<f32>>,
    pub vector_k: usize,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub title: String,
    pub content: String,
    pub url: String,
    pub score: f64,
    pub kind: Option<String>,
}

#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Execute one retrieval request. Hit order is the backend's ranking
    /// and must be preserved by callers.
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, BackendError>;
}

#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Embed bounded text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError>;
}

#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Non-streaming chat completion; returns the generated text.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}
