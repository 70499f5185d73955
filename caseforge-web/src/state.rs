//! Shared application state

use caseforge_core::CaseforgeConfig;
use caseforge_recommend::RecommendationPipeline;
use std::sync::Arc;
use tracing::info;

use crate::WebResult;

/// Read-only for the lifetime of the process
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RecommendationPipeline>,
}

impl AppState {
    pub fn new(pipeline: RecommendationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build the production pipeline from configuration
    pub async fn from_config(config: &CaseforgeConfig) -> WebResult<Self> {
        let pipeline = RecommendationPipeline::from_config(config).await?;
        info!(
            scope = %config.github.scope(),
            provider = %config.llm.provider,
            model = %config.llm.model,
            "Application state initialized"
        );
        Ok(Self::new(pipeline))
    }
}
