//! Error types for the recommendation pipeline

use caseforge_core::CaseforgeError;

#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(Box<CaseforgeError>),
}

impl From<CaseforgeError> for RecommendError {
    fn from(err: CaseforgeError) -> Self {
        RecommendError::Core(Box::new(err))
    }
}

impl RecommendError {
    /// Whether the caller, not a collaborator, is at fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, RecommendError::Validation(_))
    }
}

pub type RecommendResult<T> = Result<T, RecommendError>;
