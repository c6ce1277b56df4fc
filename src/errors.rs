use thiserror::Error;

/// Transport-level failure from an outbound backend call.
///
/// Never escapes past the component wrappers in `rag/`: retrieval collapses
/// it to an empty result set, classification to the default intent and
/// generation to the fixed fallback answer.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

/// The only fatal outcome of `RagPipeline::answer`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("query text is empty")]
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config at '{path}': {reason}")]
    Invalid { path: String, reason: String },
}

impl ConfigError {
    pub fn invalid(path: &str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
