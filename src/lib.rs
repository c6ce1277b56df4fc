pub mod backends;
pub mod config;
pub mod errors;
pub mod logging;
pub mod rag;

pub use config::{AppConfig, RetrievalConfig, RetrievalMode};
pub use errors::{BackendError, ConfigError, PipelineError};
pub use rag::pipeline::RagPipeline;
pub use rag::types::{AnswerResult, Citation, Document, Intent, Query};
