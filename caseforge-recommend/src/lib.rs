//! Caseforge Recommend - test-case recommendation pipeline
//!
//! Turns a located file and its sibling artifacts into a request for an
//! external completion service, and converts the untrusted reply into a
//! predictable result shape.

pub mod client;
pub mod llm_client;
pub mod payload;
pub mod pipeline;
pub mod types;
pub mod validator;

pub use client::{
    RecommendationClient, RECOMMENDATION_SYSTEM_PROMPT, RECOMMENDATION_TEMPERATURE,
};
pub use llm_client::{CompletionService, SiumaiCompletionService};
pub use payload::{PayloadBuilder, RecommendationRequest, TargetFile};
pub use pipeline::{PipelineOutcome, RecommendationPipeline, RequestStage};
pub use types::{RecommendError, RecommendResult};
pub use validator::{RecommendationResponse, ResponseValidator, INVALID_JSON_ERROR};
