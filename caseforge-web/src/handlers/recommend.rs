//! Recommendation endpoint

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use caseforge_recommend::{PipelineOutcome, RecommendError};
use caseforge_repo::RepositoryFailure;
use serde_json::Value;
use tracing::{error, info};

use super::types::{ApiError, ErrorResponse, InvalidReplyResponse, RecommendRequest};
use crate::AppState;

/// Lists repositories skipped during the search, comma separated
pub const SKIPPED_REPOSITORIES_HEADER: &str = "x-caseforge-skipped-repositories";

/// Validated request fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendParams {
    pub filename: String,
    pub top_n: Option<i64>,
}

impl RecommendParams {
    /// Read the request body without requiring a well-formed document.
    ///
    /// The filename check comes first so a bad filename always yields
    /// "Missing filename", whatever else is in the body.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        let value: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let filename = match value.get("filename") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            _ => return Err(ApiError::bad_request("Missing filename")),
        };

        let top_n = match value.get("top_n") {
            None | Some(Value::Null) => None,
            Some(n) => match (n.as_i64(), n.as_u64()) {
                (Some(n), _) => Some(n),
                (None, Some(_)) => {
                    return Err(ApiError::bad_request(format!(
                        "top_n must be an integer between {} and {}",
                        i64::MIN,
                        i64::MAX
                    )))
                }
                (None, None) => return Err(ApiError::bad_request("top_n must be an integer")),
            },
        };

        Ok(Self { filename, top_n })
    }
}

fn skipped_header(failures: &[RepositoryFailure]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if failures.is_empty() {
        return headers;
    }

    let names = failures
        .iter()
        .map(|f| f.repository.as_str())
        .collect::<Vec<_>>()
        .join(",");
    if let Ok(value) = HeaderValue::from_str(&names) {
        headers.insert(SKIPPED_REPOSITORIES_HEADER, value);
    }
    headers
}

/// Recommend test cases for a file found anywhere in scope
#[utoipa::path(
    post,
    path = "/recommend",
    tag = "Recommendations",
    summary = "Recommend test cases",
    description = "Locate the file across every repository and branch in scope, collect sibling artifacts and ask the completion service for test cases",
    request_body = RecommendRequest,
    responses(
        (status = 200, description = "Parsed recommendation, or the invalid-reply envelope", body = InvalidReplyResponse),
        (status = 400, description = "Missing filename or invalid top_n", body = ErrorResponse),
        (status = 404, description = "File not found in any repository or branch", body = ErrorResponse),
        (status = 500, description = "Source host or completion service failure", body = ErrorResponse)
    )
)]
pub async fn recommend(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let params = RecommendParams::from_body(&body)?;
    info!(filename = %params.filename, top_n = ?params.top_n, "Recommendation requested");

    let outcome = state
        .pipeline
        .run(&params.filename, params.top_n)
        .await
        .map_err(|e| match e {
            RecommendError::Validation(message) => ApiError::bad_request(message),
            e => {
                error!(filename = %params.filename, error = %e, "Recommendation failed");
                ApiError::internal(e.to_string())
            }
        })?;

    let headers = skipped_header(outcome.failures());
    match outcome {
        PipelineOutcome::NotFound { filename, .. } => {
            let not_found = ApiError::not_found(format!("{} not found in any repo/branch", filename));
            Ok((headers, not_found).into_response())
        }
        PipelineOutcome::Completed {
            file_match,
            response,
            ..
        } => {
            info!(file_match = %file_match, parsed = response.is_parsed(), "Recommendation completed");
            Ok((StatusCode::OK, headers, Json(response.into_json())).into_response())
        }
    }
}
