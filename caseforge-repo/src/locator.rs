//! Cross-repository file search

use caseforge_core::{
    AccountScope, BranchRef, CaseforgeResult, FileMatch, RepositoryRef,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::api::SourceHost;
use crate::enumerator::RepositoryEnumerator;
use crate::walker::TreeWalker;

/// A repository whose branches or tree could not be listed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryFailure {
    pub repository: String,
    pub reason: String,
}

/// Everything a search produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocateOutcome {
    /// All matches, in repository, branch, then traversal order
    pub matches: Vec<FileMatch>,
    /// Repositories skipped after a listing failure
    pub failures: Vec<RepositoryFailure>,
    pub repositories_scanned: usize,
    pub branches_scanned: usize,
}

impl LocateOutcome {
    /// The match the rest of the pipeline works on
    pub fn first_match(&self) -> Option<&FileMatch> {
        self.matches.first()
    }

    pub fn into_first_match(self) -> Option<FileMatch> {
        self.matches.into_iter().next()
    }
}

/// Searches every branch of every repository in scope for an exact file name
pub struct FileLocator {
    enumerator: RepositoryEnumerator,
    walker: TreeWalker,
    host: Arc<dyn SourceHost>,
}

impl FileLocator {
    pub fn new(host: Arc<dyn SourceHost>, scope: AccountScope) -> Self {
        Self {
            enumerator: RepositoryEnumerator::new(host.clone(), scope),
            walker: TreeWalker::new(host.clone()),
            host,
        }
    }

    /// Scan all repositories and branches for `filename`.
    ///
    /// Only the repository enumeration can fail the search. A listing
    /// failure inside one repository is recorded in `failures` and the scan
    /// moves on; matches found in that repository before the failure are kept.
    pub async fn locate(&self, filename: &str) -> CaseforgeResult<LocateOutcome> {
        let repositories = self.enumerator.repositories().await?;
        let mut outcome = LocateOutcome::default();

        for repository in &repositories {
            outcome.repositories_scanned += 1;
            if let Err(e) = self
                .scan_repository(repository, filename, &mut outcome)
                .await
            {
                warn!(
                    repository = %repository,
                    error = %e,
                    "Skipping repository after listing failure"
                );
                outcome.failures.push(RepositoryFailure {
                    repository: repository.full_name.clone(),
                    reason: e.to_string(),
                });
            }
        }

        info!(
            filename,
            matches = outcome.matches.len(),
            repositories = outcome.repositories_scanned,
            branches = outcome.branches_scanned,
            skipped = outcome.failures.len(),
            "File search finished"
        );
        Ok(outcome)
    }

    async fn scan_repository(
        &self,
        repository: &RepositoryRef,
        filename: &str,
        outcome: &mut LocateOutcome,
    ) -> CaseforgeResult<()> {
        let branches = self.host.list_branches(repository).await?;
        debug!(repository = %repository, branches = branches.len(), "Scanning repository");

        for branch in branches {
            outcome.branches_scanned += 1;
            self.scan_branch(repository, &branch, filename, &mut outcome.matches)
                .await?;
        }
        Ok(())
    }

    async fn scan_branch(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        filename: &str,
        matches: &mut Vec<FileMatch>,
    ) -> CaseforgeResult<()> {
        self.walker
            .walk(repository, branch, |entry| {
                if entry.name == filename {
                    debug!(repository = %repository, branch = %branch, path = %entry.path, "Match");
                    matches.push(FileMatch {
                        repository: repository.clone(),
                        branch: branch.clone(),
                        path: entry.path.clone(),
                    });
                }
            })
            .await?;
        Ok(())
    }
}
