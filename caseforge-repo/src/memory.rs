//! In-memory source host
//!
//! Serves a fixed set of repositories, branches and files through the
//! `SourceHost` trait, with failure injection per repository and branch.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use caseforge_core::{
    AccountScope, BranchRef, CaseforgeError, CaseforgeResult, ErrorContext, RepositoryRef,
    TreeEntry,
};
use std::collections::HashSet;

use crate::api::{status_error, RemoteFile, SourceHost};

#[derive(Debug, Clone)]
enum MemoryFile {
    Bytes(Vec<u8>),
    /// Delivered like GitHub delivers oversized files: encoding `none`, no content
    Undelivered,
    /// Content request fails outright
    Broken(String),
}

/// Files are listed in the order they were added, the way a real host
/// returns listings in its own order rather than sorted.
#[derive(Debug, Clone)]
pub struct MemoryBranch {
    name: String,
    files: Vec<(String, MemoryFile)>,
    tree_failure: Option<String>,
}

impl MemoryBranch {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            files: Vec::new(),
            tree_failure: None,
        }
    }

    pub fn with_file(mut self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(path, MemoryFile::Bytes(content.into()));
        self
    }

    pub fn with_undelivered_file(mut self, path: &str) -> Self {
        self.insert(path, MemoryFile::Undelivered);
        self
    }

    pub fn with_broken_file(mut self, path: &str, reason: &str) -> Self {
        self.insert(path, MemoryFile::Broken(reason.to_string()));
        self
    }

    /// Every directory listing on this branch fails
    pub fn with_tree_failure(mut self, reason: &str) -> Self {
        self.tree_failure = Some(reason.to_string());
        self
    }

    /// Replaces an existing file in place, keeping its listing position
    fn insert(&mut self, path: &str, file: MemoryFile) {
        match self.files.iter_mut().find(|(p, _)| p == path) {
            Some((_, existing)) => *existing = file,
            None => self.files.push((path.to_string(), file)),
        }
    }

    fn file(&self, path: &str) -> Option<&MemoryFile> {
        self.files.iter().find(|(p, _)| p == path).map(|(_, f)| f)
    }

    fn children(&self, dir: &str) -> Option<Vec<TreeEntry>> {
        let prefix = if dir.is_empty() {
            String::new()
        } else {
            format!("{}/", dir)
        };

        let mut seen_dirs = HashSet::new();
        let mut entries = Vec::new();
        for (path, _) in &self.files {
            let Some(rest) = path.strip_prefix(&prefix) else {
                continue;
            };
            match rest.split_once('/') {
                Some((child_dir, _)) => {
                    if seen_dirs.insert(child_dir.to_string()) {
                        entries.push(TreeEntry::directory(format!("{}{}", prefix, child_dir)));
                    }
                }
                None => entries.push(TreeEntry::file(path.clone())),
            }
        }

        if entries.is_empty() {
            None
        } else {
            Some(entries)
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryRepository {
    full_name: String,
    branches: Vec<MemoryBranch>,
    branch_failure: Option<String>,
}

impl MemoryRepository {
    pub fn new(full_name: &str) -> Self {
        Self {
            full_name: full_name.to_string(),
            branches: Vec::new(),
            branch_failure: None,
        }
    }

    pub fn with_branch(mut self, branch: MemoryBranch) -> Self {
        self.branches.push(branch);
        self
    }

    /// Branch listing for this repository fails
    pub fn with_branch_failure(mut self, reason: &str) -> Self {
        self.branch_failure = Some(reason.to_string());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    repositories: Vec<MemoryRepository>,
    listing_failure: Option<String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repository(mut self, repository: MemoryRepository) -> Self {
        self.repositories.push(repository);
        self
    }

    /// Repository enumeration fails as an authentication error
    pub fn with_listing_failure(mut self, reason: &str) -> Self {
        self.listing_failure = Some(reason.to_string());
        self
    }

    fn repository(&self, repository: &RepositoryRef) -> CaseforgeResult<&MemoryRepository> {
        self.repositories
            .iter()
            .find(|r| r.full_name == repository.full_name)
            .ok_or_else(|| {
                status_error(
                    404,
                    format!("Repository {} not found", repository),
                    "memory_host",
                )
            })
    }

    fn branch(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
    ) -> CaseforgeResult<&MemoryBranch> {
        self.repository(repository)?
            .branches
            .iter()
            .find(|b| b.name == branch.name)
            .ok_or_else(|| {
                status_error(
                    404,
                    format!("Branch {} not found in {}", branch, repository),
                    "memory_host",
                )
            })
    }
}

/// Base64 with line breaks every 60 columns, as the GitHub contents API returns it
fn encode_wrapped(bytes: &[u8]) -> String {
    let encoded = BASE64.encode(bytes);
    encoded
        .as_bytes()
        .chunks(60)
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl SourceHost for MemoryHost {
    async fn list_repositories(
        &self,
        scope: &AccountScope,
    ) -> CaseforgeResult<Vec<RepositoryRef>> {
        if let Some(reason) = &self.listing_failure {
            return Err(CaseforgeError::Authentication {
                message: reason.clone(),
                context: ErrorContext::new("memory_host").with_operation("list_repositories"),
            });
        }

        Ok(self
            .repositories
            .iter()
            .filter(|r| match scope {
                AccountScope::AuthenticatedUser => true,
                AccountScope::Organization(org) => r
                    .full_name
                    .split_once('/')
                    .is_some_and(|(owner, _)| owner == org),
            })
            .map(|r| RepositoryRef::new(r.full_name.clone()))
            .collect())
    }

    async fn list_branches(&self, repository: &RepositoryRef) -> CaseforgeResult<Vec<BranchRef>> {
        let repo = self.repository(repository)?;
        if let Some(reason) = &repo.branch_failure {
            return Err(status_error(500, reason.clone(), "list_branches"));
        }
        Ok(repo
            .branches
            .iter()
            .map(|b| BranchRef::new(b.name.clone()))
            .collect())
    }

    async fn list_directory(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<Vec<TreeEntry>> {
        let memory_branch = self.branch(repository, branch)?;
        if let Some(reason) = &memory_branch.tree_failure {
            return Err(status_error(500, reason.clone(), "list_directory"));
        }

        let path = path.trim_matches('/');
        memory_branch.children(path).ok_or_else(|| {
            if path.is_empty() {
                status_error(404, "This repository is empty.".to_string(), "list_directory")
            } else {
                status_error(
                    404,
                    format!("Directory {} not found in {}@{}", path, repository, branch),
                    "list_directory",
                )
            }
        })
    }

    async fn get_file(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<RemoteFile> {
        let memory_branch = self.branch(repository, branch)?;
        match memory_branch.file(path) {
            Some(MemoryFile::Bytes(bytes)) => Ok(RemoteFile {
                path: path.to_string(),
                encoding: "base64".to_string(),
                content: encode_wrapped(bytes),
            }),
            Some(MemoryFile::Undelivered) => Ok(RemoteFile {
                path: path.to_string(),
                encoding: "none".to_string(),
                content: String::new(),
            }),
            Some(MemoryFile::Broken(reason)) => Err(status_error(502, reason.clone(), "get_file")),
            None => Err(status_error(
                404,
                format!("File {} not found in {}@{}", path, repository, branch),
                "get_file",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::decode_text;

    fn branch() -> MemoryBranch {
        MemoryBranch::new("main")
            .with_file("README.md", "# readme")
            .with_file("jobs/report.py", "print('report')")
            .with_file("jobs/spec.pdf", "%PDF-1.4")
            .with_file("jobs/nightly/cleanup.py", "pass")
    }

    #[test]
    fn test_children_of_root_and_subdirectory() {
        let branch = branch();

        let root = branch.children("").unwrap();
        let root_paths: Vec<&str> = root.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(root_paths, vec!["README.md", "jobs"]);
        assert!(root[1].is_directory());

        let jobs = branch.children("jobs").unwrap();
        let job_paths: Vec<&str> = jobs.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            job_paths,
            vec!["jobs/report.py", "jobs/spec.pdf", "jobs/nightly"]
        );

        assert!(branch.children("missing").is_none());
    }

    #[test]
    fn test_listing_keeps_insertion_order() {
        let branch = MemoryBranch::new("main")
            .with_file("z.pdf", "z")
            .with_file("docs/b.md", "")
            .with_file("a.pdf", "a")
            .with_file("z.pdf", "replaced");

        let root: Vec<String> = branch
            .children("")
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect();
        assert_eq!(root, vec!["z.pdf", "docs", "a.pdf"]);
        assert!(matches!(branch.file("z.pdf"), Some(MemoryFile::Bytes(b)) if b == b"replaced"));
    }

    #[tokio::test]
    async fn test_files_round_trip_through_base64() {
        let long_text = "x".repeat(500);
        let host = MemoryHost::new().with_repository(
            MemoryRepository::new("acme/repo")
                .with_branch(MemoryBranch::new("main").with_file("big.txt", long_text.clone())),
        );

        let file = host
            .get_file(
                &RepositoryRef::new("acme/repo"),
                &BranchRef::new("main"),
                "big.txt",
            )
            .await
            .unwrap();
        assert!(file.content.contains('\n'));
        assert_eq!(decode_text(&file).unwrap(), long_text);
    }

    #[tokio::test]
    async fn test_empty_branch_root_fails() {
        let host = MemoryHost::new()
            .with_repository(MemoryRepository::new("acme/empty").with_branch(MemoryBranch::new("main")));

        let result = host
            .list_directory(&RepositoryRef::new("acme/empty"), &BranchRef::new("main"), "")
            .await;
        assert!(result.is_err());
    }
}
