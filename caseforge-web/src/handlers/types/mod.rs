//! Request and response types for the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Recommendation request.
///
/// Documentation only; the handler reads the body leniently.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendRequest {
    /// Exact file name to search for
    #[schema(example = "report.py")]
    pub filename: String,
    /// Number of test cases to ask for
    #[schema(example = 3)]
    pub top_n: Option<i64>,
}

/// Error body returned for 4xx and 5xx responses
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Missing filename")]
    pub error: String,
}

/// Reply that did not parse as JSON
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InvalidReplyResponse {
    #[schema(example = "OpenAI returned invalid JSON")]
    pub error: String,
    /// Completion text as received
    pub raw: String,
}

/// A request that ends with an error status
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}
