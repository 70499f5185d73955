//! Iterative traversal of one branch's file tree

use caseforge_core::{BranchRef, CaseforgeResult, RepositoryRef, TreeEntry};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

use crate::api::SourceHost;

/// Expands a branch's tree breadth-first from the root.
///
/// Pending directories live on an explicit queue, so tree depth never
/// translates into call-stack depth.
pub struct TreeWalker {
    host: Arc<dyn SourceHost>,
}

/// Counters from one walk
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub directories_listed: usize,
    pub files_visited: usize,
}

impl TreeWalker {
    pub fn new(host: Arc<dyn SourceHost>) -> Self {
        Self { host }
    }

    /// Visit every file entry of `branch`, in queue order.
    ///
    /// The first failing directory listing aborts the walk.
    pub async fn walk<F>(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        mut visit: F,
    ) -> CaseforgeResult<WalkStats>
    where
        F: FnMut(&TreeEntry),
    {
        let mut stats = WalkStats::default();
        let mut queue: VecDeque<TreeEntry> = self
            .host
            .list_directory(repository, branch, "")
            .await?
            .into();
        stats.directories_listed += 1;

        while let Some(entry) = queue.pop_front() {
            if entry.is_directory() {
                trace!(repository = %repository, branch = %branch, path = %entry.path, "Expanding directory");
                let children = self
                    .host
                    .list_directory(repository, branch, &entry.path)
                    .await?;
                stats.directories_listed += 1;
                queue.extend(children);
            } else if entry.is_file() {
                stats.files_visited += 1;
                visit(&entry);
            }
        }

        Ok(stats)
    }
}
