//! The request object handed to the completion service

use caseforge_core::RelatedArtifact;
use serde::{Deserialize, Serialize};

use crate::types::RecommendResult;

/// The file recommendations are generated for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetFile {
    /// Name as supplied by the caller
    pub file_name: String,
    pub content: String,
}

/// Complete input to one recommendation call.
///
/// Field names on the wire are part of the prompt contract and must not
/// change independently of the prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    #[serde(rename = "python_file")]
    pub target: TargetFile,
    #[serde(rename = "related_pdfs")]
    pub related: Vec<RelatedArtifact>,
    pub top_n: i64,
}

impl RecommendationRequest {
    pub fn to_json(&self) -> RecommendResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Assembles a [`RecommendationRequest`], filling in the default count
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    default_top_n: i64,
}

impl PayloadBuilder {
    pub fn new(default_top_n: i64) -> Self {
        Self { default_top_n }
    }

    pub fn build(
        &self,
        file_name: &str,
        content: String,
        related: Vec<RelatedArtifact>,
        top_n: Option<i64>,
    ) -> RecommendationRequest {
        RecommendationRequest {
            target: TargetFile {
                file_name: file_name.to_string(),
                content,
            },
            related,
            top_n: top_n.unwrap_or(self.default_top_n),
        }
    }
}

impl Default for PayloadBuilder {
    fn default() -> Self {
        Self::new(3)
    }
}
