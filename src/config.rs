//! Process-wide configuration.
//!
//! Loaded once at startup from a TOML file, overridden by environment
//! variables for endpoints and keys, validated, and then passed by
//! reference into every component constructor. Nothing in the pipeline
//! reads ambient global state.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub openai: OpenAiConfig,
    pub retrieval: RetrievalConfig,
    pub embedding: EmbeddingConfig,
    pub context: ContextConfig,
    pub generation: GenerationConfig,
    pub citations: CitationConfig,
    pub intent: IntentConfig,
    pub logging: LoggingConfig,
}

/// Azure AI Search connection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub api_key: String,
    pub index: String,
    pub api_version: String,
    /// Name of the vector field in the index, used by hybrid queries.
    pub vector_field: String,
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            index: "confluence-index".to_string(),
            api_version: "2024-07-01".to_string(),
            vector_field: "content_vector".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Azure OpenAI connection settings (completions and embeddings).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub embedding_deployment: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: String::new(),
            embedding_deployment: String::new(),
            api_version: "2024-02-01".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalMode {
    Classic,
    Hybrid,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub mode: RetrievalMode,
    pub top_k: usize,
    /// Absolute score cutoff for keyword-only results. Keyword scores and
    /// fused hybrid scores live on different numeric scales, so the two
    /// thresholds are independent values tuned against the backend's
    /// scoring distribution. Never share or derive one from the other.
    pub classic_min_score: f64,
    pub hybrid_min_score: f64,
    /// Nearest-neighbor count for the vector leg of a hybrid query.
    pub vector_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            mode: RetrievalMode::Hybrid,
            top_k: 10,
            classic_min_score: 10.0,
            hybrid_min_score: 0.01,
            vector_k: 50,
        }
    }
}

impl RetrievalConfig {
    /// The score cutoff matching the given mode's scale.
    pub fn threshold_for(&self, mode: RetrievalMode) -> f64 {
        match mode {
            RetrievalMode::Classic => self.classic_min_score,
            RetrievalMode::Hybrid => self.hybrid_min_score,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub dimension: usize,
    /// Input longer than this is truncated before embedding.
    pub max_chars: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: 768,
            max_chars: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Maximum total context length in characters.
    pub char_budget: usize,
    /// Per-document content cap in characters.
    pub per_doc_chars: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            char_budget: 60_000,
            per_doc_chars: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.2,
            max_tokens: 900,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CitationConfig {
    /// Cap on distinct cited URLs. `None` keeps every distinct source;
    /// the lean profile sets 3.
    pub max_citations: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntentStrategy {
    /// Keyword matching against trigger-word sets; no model call.
    #[default]
    Heuristic,
    /// Single-label classification call to the completion backend.
    Model,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    pub strategy: IntentStrategy,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling log file; stdout-only when unset.
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    /// Read a TOML config file, apply environment overrides and validate.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&raw)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Environment variables take precedence over file values for
    /// endpoints and secrets, so keys never have to live in the file.
    pub fn apply_env_overrides(&mut self) {
        override_from_env(&mut self.search.endpoint, "AZURE_SEARCH_ENDPOINT");
        override_from_env(&mut self.search.api_key, "AZURE_SEARCH_API_KEY");
        override_from_env(&mut self.search.index, "AZURE_SEARCH_INDEX");
        override_from_env(&mut self.openai.endpoint, "AZURE_OPENAI_ENDPOINT");
        override_from_env(&mut self.openai.api_key, "AZURE_OPENAI_API_KEY");
        override_from_env(&mut self.openai.deployment, "AZURE_OPENAI_DEPLOYMENT");
        override_from_env(
            &mut self.openai.embedding_deployment,
            "AZURE_OPENAI_EMBEDDING_DEPLOYMENT",
        );
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty("search.endpoint", &self.search.endpoint)?;
        require_non_empty("search.api_key", &self.search.api_key)?;
        require_non_empty("search.index", &self.search.index)?;
        require_non_empty("openai.endpoint", &self.openai.endpoint)?;
        require_non_empty("openai.api_key", &self.openai.api_key)?;
        require_non_empty("openai.deployment", &self.openai.deployment)?;
        if self.retrieval.mode == RetrievalMode::Hybrid {
            require_non_empty(
                "openai.embedding_deployment",
                &self.openai.embedding_deployment,
            )?;
        }

        require_range("retrieval.top_k", self.retrieval.top_k as u64, 1, 1000)?;
        require_range("retrieval.vector_k", self.retrieval.vector_k as u64, 1, 10_000)?;
        require_range("embedding.dimension", self.embedding.dimension as u64, 1, 100_000)?;
        require_range("embedding.max_chars", self.embedding.max_chars as u64, 1, 1_000_000)?;
        require_range("context.char_budget", self.context.char_budget as u64, 1, 10_000_000)?;
        require_range("context.per_doc_chars", self.context.per_doc_chars as u64, 1, 1_000_000)?;
        require_range("generation.max_tokens", u64::from(self.generation.max_tokens), 1, 32_768)?;

        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::invalid(
                "generation.temperature",
                "must be between 0.0 and 2.0",
            ));
        }
        if self.retrieval.classic_min_score < 0.0 {
            return Err(ConfigError::invalid(
                "retrieval.classic_min_score",
                "must not be negative",
            ));
        }
        if self.retrieval.hybrid_min_score < 0.0 {
            return Err(ConfigError::invalid(
                "retrieval.hybrid_min_score",
                "must not be negative",
            ));
        }
        Ok(())
    }
}

fn override_from_env(target: &mut String, var: &str) {
    if let Ok(value) = env::var(var) {
        if !value.trim().is_empty() {
            *target = value;
        }
    }
}

fn require_non_empty(path: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::invalid(path, "value cannot be empty"));
    }
    Ok(())
}

fn require_range(path: &str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::invalid(
            path,
            format!("must be between {} and {}", min, max),
        ));
    }
    Ok(())
}
