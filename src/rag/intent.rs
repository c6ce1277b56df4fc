//! Query intent classification: which answer style to request from the
//! model. Two interchangeable strategies behind one trait, selected by
//! config — the heuristic one exists to avoid a paid model call when
//! latency or cost matters.

use std::sync::Arc;

use async_trait::async_trait;

use crate::backends::{ChatMessage, CompletionBackend, CompletionRequest};
use crate::config::IntentStrategy;

use super::types::{Intent, Query};

#[async_trait]
pub trait IntentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    /// Classification never aborts the pipeline; failures map to the
    /// default intent.
    async fn classify(&self, query: &Query) -> Intent;
}

pub fn build_classifier(
    strategy: IntentStrategy,
    backend: Arc<dyn CompletionBackend>,
) -> Arc<dyn IntentClassifier> {
    match strategy {
        IntentStrategy::Heuristic => Arc::new(HeuristicClassifier),
        IntentStrategy::Model => Arc::new(ModelClassifier::new(backend)),
    }
}

/// Offline keyword matching against per-intent trigger sets.
pub struct HeuristicClassifier;

const PROCEDURE_TRIGGERS: &[&str] = &[
    "how do i", "how to", "steps", "step by step", "configure", "install", "set up", "setup",
    "enable", "deploy",
];
const SUMMARY_TRIGGERS: &[&str] = &[
    "summarize", "summary", "what is", "what are", "overview", "tl;dr",
];
const EXTRACTION_TRIGGERS: &[&str] = &["list", "extract", "enumerate", "table of", "fields"];

#[async_trait]
impl IntentClassifier for HeuristicClassifier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn classify(&self, query: &Query) -> Intent {
        let lowered = query.text.to_lowercase();
        let matches = |triggers: &[&str]| triggers.iter().any(|t| lowered.contains(t));

        if matches(PROCEDURE_TRIGGERS) {
            Intent::Procedure
        } else if matches(SUMMARY_TRIGGERS) {
            Intent::Summary
        } else if matches(EXTRACTION_TRIGGERS) {
            Intent::Extraction
        } else {
            Intent::DirectAnswer
        }
    }
}

/// Single-label classification call to the completion backend,
/// constrained to the closed intent set.
pub struct ModelClassifier {
    backend: Arc<dyn CompletionBackend>,
}

impl ModelClassifier {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }
}

const CLASSIFY_INSTRUCTION: &str = "Classify the user's question into exactly one of these \
categories: summary, extraction, direct_answer, procedure. Reply with the category label only, \
in lowercase, with no other text.";

#[async_trait]
impl IntentClassifier for ModelClassifier {
    fn name(&self) -> &'static str {
        "model"
    }

    async fn classify(&self, query: &Query) -> Intent {
        let request = CompletionRequest {
            messages: vec![
                ChatMessage::system(CLASSIFY_INSTRUCTION),
                ChatMessage::user(query.text.clone()),
            ],
            temperature: 0.0,
            max_tokens: 8,
        };

        match self.backend.complete(&request).await {
            Ok(label) => Intent::parse_label(&label),
            Err(err) => {
                tracing::warn!("intent classification degraded to default: {err}");
                Intent::DirectAnswer
            }
        }
    }
}
