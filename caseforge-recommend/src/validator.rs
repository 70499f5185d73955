//! Interpretation of untrusted completion text

use serde_json::{json, Value};
use tracing::warn;

/// Error indicator placed in the envelope for unparseable replies
pub const INVALID_JSON_ERROR: &str = "OpenAI returned invalid JSON";

/// What a completion reply turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationResponse {
    /// The reply parsed as JSON; kept unchanged
    Parsed(Value),
    /// The reply did not parse; carries the text as received
    Malformed { raw: String },
}

impl RecommendationResponse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, RecommendationResponse::Parsed(_))
    }

    /// Body returned to the caller in both cases
    pub fn to_json(&self) -> Value {
        match self {
            RecommendationResponse::Parsed(value) => value.clone(),
            RecommendationResponse::Malformed { raw } => json!({
                "error": INVALID_JSON_ERROR,
                "raw": raw,
            }),
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            RecommendationResponse::Parsed(value) => value,
            malformed => malformed.to_json(),
        }
    }
}

/// Strict JSON parse with no recovery attempts on the text itself
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn validate(text: &str) -> RecommendationResponse {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => RecommendationResponse::Parsed(value),
            Err(e) => {
                warn!(error = %e, length = text.len(), "Completion reply is not valid JSON");
                RecommendationResponse::Malformed {
                    raw: text.to_string(),
                }
            }
        }
    }
}
