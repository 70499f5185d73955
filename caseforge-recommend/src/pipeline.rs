//! End-to-end recommendation request processing

use caseforge_core::{CaseforgeConfig, FileMatch};
use caseforge_repo::{
    fetch_text, ApiClientConfig, ArtifactCollector, FileLocator, GitHubApiClient, LocateOutcome,
    RepositoryFailure, SourceHost,
};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::{RecommendationClient, RECOMMENDATION_TEMPERATURE};
use crate::llm_client::{CompletionService, SiumaiCompletionService};
use crate::payload::PayloadBuilder;
use crate::types::{RecommendError, RecommendResult};
use crate::validator::{RecommendationResponse, ResponseValidator};

/// Lifecycle of one request; stages are entered strictly in this order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    LocatingFile,
    NotFound,
    Found,
    CollectingArtifacts,
    BuildingPayload,
    CallingService,
    Validating,
    Done,
}

impl RequestStage {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStage::NotFound | RequestStage::Done)
    }
}

impl fmt::Display for RequestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestStage::Received => "received",
            RequestStage::LocatingFile => "locating_file",
            RequestStage::NotFound => "not_found",
            RequestStage::Found => "found",
            RequestStage::CollectingArtifacts => "collecting_artifacts",
            RequestStage::BuildingPayload => "building_payload",
            RequestStage::CallingService => "calling_service",
            RequestStage::Validating => "validating",
            RequestStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal result of a request that did not fail
#[derive(Debug, Clone)]
pub enum PipelineOutcome {
    NotFound {
        filename: String,
        failures: Vec<RepositoryFailure>,
    },
    Completed {
        file_match: FileMatch,
        artifacts: usize,
        failures: Vec<RepositoryFailure>,
        response: RecommendationResponse,
    },
}

impl PipelineOutcome {
    /// Repositories skipped during the search
    pub fn failures(&self) -> &[RepositoryFailure] {
        match self {
            PipelineOutcome::NotFound { failures, .. } => failures,
            PipelineOutcome::Completed { failures, .. } => failures,
        }
    }
}

/// Locates a file, gathers its artifacts and asks for recommendations.
///
/// Every collaborator is injected at construction; nothing is read from
/// the environment while a request runs.
pub struct RecommendationPipeline {
    host: Arc<dyn SourceHost>,
    locator: FileLocator,
    collector: ArtifactCollector,
    payload: PayloadBuilder,
    client: RecommendationClient,
}

impl RecommendationPipeline {
    pub fn new(
        host: Arc<dyn SourceHost>,
        service: Arc<dyn CompletionService>,
        config: &CaseforgeConfig,
    ) -> Self {
        Self {
            locator: FileLocator::new(host.clone(), config.github.scope()),
            collector: ArtifactCollector::new(
                host.clone(),
                config.recommend.artifact_extension.clone(),
            ),
            payload: PayloadBuilder::new(config.recommend.default_top_n),
            client: RecommendationClient::new(service),
            host,
        }
    }

    /// Wire up the GitHub host and the configured LLM provider
    pub async fn from_config(config: &CaseforgeConfig) -> RecommendResult<Self> {
        let host = GitHubApiClient::new(ApiClientConfig::from_github_config(&config.github))?;
        let service =
            SiumaiCompletionService::new(config.llm.clone(), RECOMMENDATION_TEMPERATURE).await?;
        Ok(Self::new(Arc::new(host), Arc::new(service), config))
    }

    /// Discovery only, reporting every match
    pub async fn locate(&self, filename: &str) -> RecommendResult<LocateOutcome> {
        Ok(self.locator.locate(filename).await?)
    }

    pub async fn run(&self, filename: &str, top_n: Option<i64>) -> RecommendResult<PipelineOutcome> {
        self.run_observed(filename, top_n, |_| {}).await
    }

    /// Like [`run`](Self::run), reporting each stage as it is entered
    pub async fn run_observed<F>(
        &self,
        filename: &str,
        top_n: Option<i64>,
        mut observe: F,
    ) -> RecommendResult<PipelineOutcome>
    where
        F: FnMut(RequestStage) + Send,
    {
        let mut enter = |stage: RequestStage| {
            debug!(filename, %stage, "Entering stage");
            observe(stage);
        };

        enter(RequestStage::Received);
        if filename.is_empty() {
            return Err(RecommendError::Validation("Missing filename".to_string()));
        }

        enter(RequestStage::LocatingFile);
        let outcome = self.locator.locate(filename).await?;
        if outcome.matches.len() > 1 {
            info!(
                filename,
                matches = outcome.matches.len(),
                "Several matches found, using the first"
            );
        }
        let failures = outcome.failures.clone();

        let Some(file_match) = outcome.into_first_match() else {
            enter(RequestStage::NotFound);
            return Ok(PipelineOutcome::NotFound {
                filename: filename.to_string(),
                failures,
            });
        };

        enter(RequestStage::Found);
        info!(file_match = %file_match, "Target file located");
        let content = fetch_text(self.host.as_ref(), &file_match).await?;

        enter(RequestStage::CollectingArtifacts);
        let related = self.collector.collect(&file_match).await?;
        let artifacts = related.len();

        enter(RequestStage::BuildingPayload);
        let request = self.payload.build(filename, content, related, top_n);

        enter(RequestStage::CallingService);
        let reply = self.client.recommend(&request).await?;

        enter(RequestStage::Validating);
        let response = ResponseValidator::validate(&reply);
        if !response.is_parsed() {
            warn!(filename, "Returning invalid JSON envelope");
        }

        enter(RequestStage::Done);
        Ok(PipelineOutcome::Completed {
            file_match,
            artifacts,
            failures,
            response,
        })
    }
}
