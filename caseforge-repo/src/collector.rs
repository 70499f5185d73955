//! Collection of sibling artifacts next to a located file

use caseforge_core::{CaseforgeResult, FileMatch, RelatedArtifact};
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::SourceHost;
use crate::content::decode_text;

/// Content recorded for an artifact that could not be fetched or decoded
pub const UNDECODED_ARTIFACT_PLACEHOLDER: &str = "Binary PDF content (not decoded)";

/// Gathers files with a fixed extension from the directory of a match.
///
/// Only direct children are considered; subdirectories are not entered.
pub struct ArtifactCollector {
    host: Arc<dyn SourceHost>,
    extension: String,
}

impl ArtifactCollector {
    pub fn new(host: Arc<dyn SourceHost>, extension: impl Into<String>) -> Self {
        Self {
            host,
            extension: extension.into(),
        }
    }

    /// Artifacts in directory-listing order.
    ///
    /// Listing the directory may fail the call; a single artifact that cannot
    /// be read never does, it gets the placeholder content instead.
    pub async fn collect(&self, file_match: &FileMatch) -> CaseforgeResult<Vec<RelatedArtifact>> {
        let directory = file_match.directory();
        let entries = self
            .host
            .list_directory(&file_match.repository, &file_match.branch, directory)
            .await?;

        let mut artifacts = Vec::new();
        for entry in entries
            .iter()
            .filter(|e| e.is_file() && e.name.ends_with(&self.extension))
        {
            let content = match self
                .host
                .get_file(&file_match.repository, &file_match.branch, &entry.path)
                .await
                .and_then(|file| decode_text(&file))
            {
                Ok(text) => text,
                Err(e) => {
                    debug!(path = %entry.path, error = %e, "Artifact content not decoded");
                    UNDECODED_ARTIFACT_PLACEHOLDER.to_string()
                }
            };

            artifacts.push(RelatedArtifact {
                file_name: entry.name.clone(),
                content,
            });
        }

        info!(
            directory,
            extension = %self.extension,
            count = artifacts.len(),
            "Collected related artifacts"
        );
        Ok(artifacts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBranch, MemoryHost, MemoryRepository};
    use caseforge_core::{BranchRef, RepositoryRef};

    fn file_match(path: &str) -> FileMatch {
        FileMatch {
            repository: RepositoryRef::new("acme/repoA"),
            branch: BranchRef::new("main"),
            path: path.to_string(),
        }
    }

    fn collector(branch: MemoryBranch) -> ArtifactCollector {
        let host = MemoryHost::new()
            .with_repository(MemoryRepository::new("acme/repoA").with_branch(branch));
        ArtifactCollector::new(Arc::new(host), ".pdf")
    }

    #[tokio::test]
    async fn test_only_direct_siblings_with_extension() {
        let collector = collector(
            MemoryBranch::new("main")
                .with_file("jobs/report.py", "print(1)")
                .with_file("jobs/a-plan.pdf", "plan text")
                .with_file("jobs/notes.txt", "ignored")
                .with_file("jobs/pdf", "no dot, ignored")
                .with_file("jobs/archive/old.pdf", "nested, ignored")
                .with_file("jobs/z-spec.pdf", "spec text")
                .with_file("other.pdf", "other directory"),
        );

        let artifacts = collector.collect(&file_match("jobs/report.py")).await.unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["a-plan.pdf", "z-spec.pdf"]);
        assert_eq!(artifacts[0].content, "plan text");
    }

    #[tokio::test]
    async fn test_listing_order_is_kept() {
        let collector = collector(
            MemoryBranch::new("main")
                .with_file("jobs/z.pdf", "last by name")
                .with_file("jobs/report.py", "")
                .with_file("jobs/a.pdf", "first by name"),
        );

        let artifacts = collector.collect(&file_match("jobs/report.py")).await.unwrap();
        let names: Vec<&str> = artifacts.iter().map(|a| a.file_name.as_str()).collect();
        assert_eq!(names, vec!["z.pdf", "a.pdf"]);
    }

    #[tokio::test]
    async fn test_root_level_match_uses_root_directory() {
        let collector = collector(
            MemoryBranch::new("main")
                .with_file("report.py", "")
                .with_file("spec.pdf", "root spec"),
        );

        let artifacts = collector.collect(&file_match("report.py")).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].content, "root spec");
    }

    #[tokio::test]
    async fn test_unreadable_artifacts_get_placeholder() {
        let collector = collector(
            MemoryBranch::new("main")
                .with_file("jobs/report.py", "")
                .with_undelivered_file("jobs/huge.pdf")
                .with_broken_file("jobs/lost.pdf", "HTTP 502")
                .with_file("jobs/binary.pdf", vec![0x25, 0x50, 0x44, 0x46, 0xff]),
        );

        let artifacts = collector.collect(&file_match("jobs/report.py")).await.unwrap();
        assert_eq!(artifacts.len(), 3);

        let by_name = |name: &str| {
            artifacts
                .iter()
                .find(|a| a.file_name == name)
                .map(|a| a.content.clone())
                .unwrap()
        };
        assert_eq!(by_name("huge.pdf"), UNDECODED_ARTIFACT_PLACEHOLDER);
        assert_eq!(by_name("lost.pdf"), UNDECODED_ARTIFACT_PLACEHOLDER);
        // Invalid UTF-8 is replaced, not turned into the placeholder
        assert!(by_name("binary.pdf").starts_with("%PDF"));
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let collector = collector(MemoryBranch::new("main").with_file("x.py", ""));
        assert!(collector.collect(&file_match("gone/report.py")).await.is_err());
    }
}
