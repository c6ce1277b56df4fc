//! Retrieval against the document index: classic keyword queries or
//! hybrid keyword+vector queries, each with its own relevance cutoff.

use std::sync::Arc;

use crate::backends::{SearchBackend, SearchRequest};
use crate::config::{RetrievalConfig, RetrievalMode};

use super::embedding::EmbeddingClient;
use super::types::{Document, Query};

pub struct SearchClient {
    backend: Arc<dyn SearchBackend>,
    embedder: EmbeddingClient,
    config: RetrievalConfig,
}

impl SearchClient {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        embedder: EmbeddingClient,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            backend,
            embedder,
            config,
        }
    }

    /// One-shot retrieval. Returns candidates in the backend's rank
    /// order, filtered by the active mode's score threshold. Any backend
    /// failure yields an empty list, which downstream treats the same as
    /// a genuinely empty retrieval.
    pub async fn retrieve(&self, query: &Query) -> Vec<Document> {
        let keywords = normalize_keyword_query(&query.text);

        let (vector, mode) = match self.config.mode {
            RetrievalMode::Classic => (None, RetrievalMode::Classic),
            RetrievalMode::Hybrid => {
                let embedding = self.embedder.embed(&query.text).await;
                if embedding.degraded || embedding.is_zero() {
                    // Keyword-only fallback scores on the keyword scale,
                    // so the classic threshold applies.
                    tracing::warn!("hybrid retrieval downgraded to keyword-only");
                    (None, RetrievalMode::Classic)
                } else {
                    (Some(embedding.vector), RetrievalMode::Hybrid)
                }
            }
        };

        let request = SearchRequest {
            query_text: keywords,
            top: self.config.top_k,
            vector,
            vector_k: self.config.vector_k,
        };
        let threshold = self.config.threshold_for(mode);

        match self.backend.search(&request).await {
            Ok(hits) => {
                let documents: Vec<Document> = hits
                    .into_iter()
                    .map(Document::from)
                    .filter(|doc| doc.score >= threshold)
                    .collect();
                tracing::debug!(
                    count = documents.len(),
                    threshold,
                    "retrieval finished"
                );
                documents
            }
            Err(err) => {
                tracing::warn!("search backend failed, returning no documents: {err}");
                Vec::new()
            }
        }
    }
}

/// Trim a question down to its searchable terms for the keyword leg:
/// lowercase, drop interrogative filler words, strip punctuation. The
/// literal question still reaches the prompt untouched.
pub fn normalize_keyword_query(text: &str) -> String {
    const STOPWORDS: &[&str] = &[
        "a", "an", "and", "are", "can", "could", "do", "does", "for", "how", "i", "in", "is",
        "it", "my", "of", "on", "our", "should", "the", "to", "what", "when", "where", "which",
        "who", "why", "would", "you",
    ];

    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| !word.is_empty())
        .collect();

    let terms: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| !STOPWORDS.contains(word))
        .collect();
    if !terms.is_empty() {
        return terms.join(" ");
    }

    if !words.is_empty() {
        // All filler; searching the cleaned filler words beats
        // searching nothing.
        return words.join(" ");
    }

    lowered
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::backends::{EmbeddingBackend, SearchHit};
    use crate::config::EmbeddingConfig;
    use crate::errors::BackendError;

    use super::*;

    struct FakeSearch {
        hits: Vec<SearchHit>,
        fail: bool,
        last_request: Mutex<Option<SearchRequest>>,
    }

    impl FakeSearch {
        fn with_hits(hits: Vec<SearchHit>) -> Self {
            Self {
                hits,
                fail: false,
                last_request: Mutex::new(None),
            }
        }

        fn failing() -> Self {
            Self {
                hits: Vec::new(),
                fail: true,
                last_request: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl SearchBackend for FakeSearch {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchHit>, BackendError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            if self.fail {
                return Err(BackendError::Malformed("fake outage".to_string()));
            }
            Ok(self.hits.clone())
        }
    }

    struct FakeEmbedding {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl EmbeddingBackend for FakeEmbedding {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(BackendError::Malformed("fake outage".to_string()));
            }
            Ok(vec![0.1, 0.2, 0.3])
        }
    }

    fn hit(url: &str, score: f64) -> SearchHit {
        SearchHit {
            title: format!("doc {url}"),
            content: "content".to_string(),
            url: url.to_string(),
            score,
            kind: None,
        }
    }

    fn client(search: Arc<FakeSearch>, embed_fail: bool, config: RetrievalConfig) -> SearchClient {
        let embedder = EmbeddingClient::new(
            Arc::new(FakeEmbedding {
                fail: embed_fail,
                calls: AtomicUsize::new(0),
            }),
            &EmbeddingConfig {
                dimension: 3,
                max_chars: 8000,
            },
        );
        SearchClient::new(search, embedder, config)
    }

    #[tokio::test]
    async fn classic_mode_filters_by_classic_threshold() {
        let search = Arc::new(FakeSearch::with_hits(vec![
            hit("a", 25.0),
            hit("b", 10.0),
            hit("c", 9.9),
        ]));
        let config = RetrievalConfig {
            mode: RetrievalMode::Classic,
            ..Default::default()
        };
        let documents = client(search.clone(), false, config)
            .retrieve(&Query::new("How do I configure SSO?"))
            .await;

        assert_eq!(documents.len(), 2);
        assert!(documents.iter().all(|d| d.score >= 10.0));
        // No local re-sorting: backend order preserved.
        assert_eq!(documents[0].url, "a");
        assert_eq!(documents[1].url, "b");

        let request = search.last_request.lock().unwrap().clone().unwrap();
        assert!(request.vector.is_none());
    }

    #[tokio::test]
    async fn hybrid_mode_sends_vector_and_uses_hybrid_threshold() {
        let search = Arc::new(FakeSearch::with_hits(vec![
            hit("a", 0.05),
            hit("b", 0.009),
        ]));
        let documents = client(search.clone(), false, RetrievalConfig::default())
            .retrieve(&Query::new("How do I configure SSO?"))
            .await;

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].url, "a");

        let request = search.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(request.vector, Some(vec![0.1, 0.2, 0.3]));
        assert_eq!(request.vector_k, 50);
    }

    #[tokio::test]
    async fn embedding_failure_falls_back_to_keyword_only() {
        // Keyword-scale scores: the classic threshold must apply after
        // the downgrade or every hit would pass.
        let search = Arc::new(FakeSearch::with_hits(vec![
            hit("a", 25.0),
            hit("b", 2.0),
        ]));
        let documents = client(search.clone(), true, RetrievalConfig::default())
            .retrieve(&Query::new("How do I configure SSO?"))
            .await;

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].url, "a");

        let request = search.last_request.lock().unwrap().clone().unwrap();
        assert!(request.vector.is_none());
    }

    #[tokio::test]
    async fn backend_failure_yields_empty_list() {
        let search = Arc::new(FakeSearch::failing());
        let documents = client(search, false, RetrievalConfig::default())
            .retrieve(&Query::new("anything at all"))
            .await;
        assert!(documents.is_empty());
    }

    #[test]
    fn keyword_normalization_drops_filler_and_punctuation() {
        assert_eq!(
            normalize_keyword_query("How do I configure SSO?"),
            "configure sso"
        );
        assert_eq!(
            normalize_keyword_query("What is the deployment pipeline?"),
            "deployment pipeline"
        );
    }

    #[test]
    fn keyword_normalization_keeps_all_filler_queries_searchable() {
        // The fallback still goes through the same lowercase and
        // punctuation stripping as the normal path.
        assert_eq!(normalize_keyword_query("How do I?"), "how do i");
        assert_eq!(normalize_keyword_query("Can you?!"), "can you");
    }
}
