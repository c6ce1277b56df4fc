//! Query embedding with a never-block policy: retrieval must not fail
//! because the embedding backend did.

use std::sync::Arc;

use crate::backends::EmbeddingBackend;
use crate::config::EmbeddingConfig;

use super::truncate_chars;

/// Result of an embedding attempt. `degraded` marks a backend failure
/// that was absorbed; callers use it to fall back to keyword-only
/// relevance instead of treating the zero vector as a real embedding.
#[derive(Debug, Clone)]
pub struct EmbeddingOutcome {
    pub vector: Vec<f32>,
    pub degraded: bool,
}

impl EmbeddingOutcome {
    pub fn is_zero(&self) -> bool {
        self.vector.iter().all(|v| *v == 0.0)
    }
}

pub struct EmbeddingClient {
    backend: Arc<dyn EmbeddingBackend>,
    dimension: usize,
    max_chars: usize,
}

impl EmbeddingClient {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, config: &EmbeddingConfig) -> Self {
        Self {
            backend,
            dimension: config.dimension,
            max_chars: config.max_chars,
        }
    }

    /// Embed `text`, truncated to the configured character cap.
    ///
    /// Empty input yields the zero vector without a backend call. A
    /// backend error yields the zero vector with `degraded` set and a
    /// warning log; it is never surfaced as an error.
    pub async fn embed(&self, text: &str) -> EmbeddingOutcome {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.zero(false);
        }

        let bounded = truncate_chars(trimmed, self.max_chars);
        match self.backend.embed(bounded).await {
            Ok(vector) if vector.is_empty() => {
                tracing::warn!("embedding backend returned an empty vector");
                self.zero(true)
            }
            Ok(vector) => {
                if vector.len() != self.dimension {
                    tracing::debug!(
                        got = vector.len(),
                        expected = self.dimension,
                        "embedding dimension differs from configured value"
                    );
                }
                EmbeddingOutcome {
                    vector,
                    degraded: false,
                }
            }
            Err(err) => {
                tracing::warn!("embedding failed, retrieval degrades to keyword relevance: {err}");
                self.zero(true)
            }
        }
    }

    fn zero(&self, degraded: bool) -> EmbeddingOutcome {
        EmbeddingOutcome {
            vector: vec![0.0; self.dimension],
            degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::errors::BackendError;

    use super::*;

    struct FakeBackend {
        calls: AtomicUsize,
        response: Result<Vec<f32>, ()>,
        seen_len: AtomicUsize,
    }

    impl FakeBackend {
        fn ok(vector: Vec<f32>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Ok(vector),
                seen_len: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                response: Err(()),
                seen_len: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingBackend for FakeBackend {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_len.store(text.chars().count(), Ordering::SeqCst);
            match &self.response {
                Ok(vector) => Ok(vector.clone()),
                Err(()) => Err(BackendError::Malformed("fake failure".to_string())),
            }
        }
    }

    fn config(dimension: usize, max_chars: usize) -> EmbeddingConfig {
        EmbeddingConfig {
            dimension,
            max_chars,
        }
    }

    #[tokio::test]
    async fn empty_text_skips_the_backend() {
        let backend = Arc::new(FakeBackend::ok(vec![1.0; 4]));
        let client = EmbeddingClient::new(backend.clone(), &config(4, 8000));

        let outcome = client.embed("   \n ").await;
        assert!(outcome.is_zero());
        assert!(!outcome.degraded);
        assert_eq!(outcome.vector.len(), 4);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn long_input_is_truncated_before_embedding() {
        let backend = Arc::new(FakeBackend::ok(vec![0.5; 4]));
        let client = EmbeddingClient::new(backend.clone(), &config(4, 100));

        let outcome = client.embed(&"x".repeat(5000)).await;
        assert!(!outcome.degraded);
        assert_eq!(backend.seen_len.load(Ordering::SeqCst), 100);
    }

    #[tokio::test]
    async fn backend_failure_yields_degraded_zero_vector() {
        let backend = Arc::new(FakeBackend::failing());
        let client = EmbeddingClient::new(backend, &config(768, 8000));

        let outcome = client.embed("how do I configure SSO?").await;
        assert!(outcome.degraded);
        assert!(outcome.is_zero());
        assert_eq!(outcome.vector.len(), 768);
    }
}
