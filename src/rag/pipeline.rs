//! The orchestrator: one linear pass from query to cited answer.
//!
//! Every stage degrades to a safe default on failure; the only fatal
//! outcome is an empty query. There are no retries and no branching
//! back, so caller cancellation simply drops the in-flight request.

use std::sync::Arc;

use crate::backends::{CompletionBackend, EmbeddingBackend, SearchBackend};
use crate::config::AppConfig;
use crate::errors::PipelineError;

use super::citations::CitationFormatter;
use super::context::ContextAssembler;
use super::embedding::EmbeddingClient;
use super::generate::AnswerGenerator;
use super::intent::{self, IntentClassifier};
use super::prompt;
use super::retrieval::SearchClient;
use super::types::{AnswerResult, Query};

/// Returned without a completion call when retrieval produces nothing
/// above the threshold.
pub const INSUFFICIENT_INFORMATION_ANSWER: &str = "No relevant documents were found in the \
index; there is insufficient information to answer this question.";

pub struct RagPipeline {
    classifier: Arc<dyn IntentClassifier>,
    search: SearchClient,
    assembler: ContextAssembler,
    generator: AnswerGenerator,
    citations: CitationFormatter,
}

impl RagPipeline {
    pub fn new(
        classifier: Arc<dyn IntentClassifier>,
        search: SearchClient,
        assembler: ContextAssembler,
        generator: AnswerGenerator,
        citations: CitationFormatter,
    ) -> Self {
        Self {
            classifier,
            search,
            assembler,
            generator,
            citations,
        }
    }

    /// Wire a pipeline from validated configuration and backend handles.
    /// The same object may serve one or both of the embedding and
    /// completion roles.
    pub fn from_config(
        config: &AppConfig,
        search_backend: Arc<dyn SearchBackend>,
        embedding_backend: Arc<dyn EmbeddingBackend>,
        completion_backend: Arc<dyn CompletionBackend>,
    ) -> Self {
        let embedder = EmbeddingClient::new(embedding_backend, &config.embedding);
        Self {
            classifier: intent::build_classifier(
                config.intent.strategy,
                completion_backend.clone(),
            ),
            search: SearchClient::new(search_backend, embedder, config.retrieval.clone()),
            assembler: ContextAssembler::new(&config.context),
            generator: AnswerGenerator::new(completion_backend, &config.generation),
            citations: CitationFormatter::new(config.citations.max_citations),
        }
    }

    /// The single boundary exposed to transports.
    pub async fn answer(&self, query_text: &str) -> Result<AnswerResult, PipelineError> {
        self.answer_query(Query::new(query_text)).await
    }

    /// Variant accepting a pre-built query, e.g. with an explicit
    /// intent that skips classification.
    pub async fn answer_query(&self, query: Query) -> Result<AnswerResult, PipelineError> {
        if query.text.is_empty() {
            return Err(PipelineError::InvalidInput);
        }

        let intent = match query.explicit_intent {
            Some(intent) => intent,
            None => self.classifier.classify(&query).await,
        };
        tracing::debug!(
            intent = intent.as_str(),
            classifier = self.classifier.name(),
            "intent classified"
        );

        let documents = self.search.retrieve(&query).await;
        if documents.is_empty() {
            tracing::info!("no documents above threshold, answering without generation");
            return Ok(AnswerResult {
                text: INSUFFICIENT_INFORMATION_ANSWER.to_string(),
                citations: Vec::new(),
            });
        }

        let context = self.assembler.build(&documents);
        tracing::debug!(
            included = context.included_docs,
            truncated = context.truncated,
            "context assembled"
        );

        let messages = prompt::compose(&query, &context, intent);
        let answer = self.generator.generate(messages).await;

        Ok(self.citations.attach(answer, &documents))
    }
}
