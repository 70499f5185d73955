//! Repository enumeration under an account scope

use caseforge_core::{AccountScope, CaseforgeResult, RepositoryRef};
use std::sync::Arc;
use tracing::info;

use crate::api::SourceHost;

/// Lists every repository reachable under the configured scope.
///
/// Failures here are fatal: without a repository list there is nothing to search.
pub struct RepositoryEnumerator {
    host: Arc<dyn SourceHost>,
    scope: AccountScope,
}

impl RepositoryEnumerator {
    pub fn new(host: Arc<dyn SourceHost>, scope: AccountScope) -> Self {
        Self { host, scope }
    }

    /// Repositories in host listing order
    pub async fn repositories(&self) -> CaseforgeResult<Vec<RepositoryRef>> {
        let repositories = self.host.list_repositories(&self.scope).await?;
        info!(
            scope = %self.scope,
            count = repositories.len(),
            "Enumerated repositories"
        );
        Ok(repositories)
    }
}
