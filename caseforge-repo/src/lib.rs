//! Caseforge Repository - cross-repository discovery
//!
//! Enumerates repositories and branches on a source host, walks their trees
//! looking for a file by name, and gathers the artifacts stored beside it.

pub mod api;
pub mod collector;
pub mod content;
pub mod enumerator;
pub mod locator;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod walker;

pub use api::{ApiClientConfig, GitHubApiClient, RemoteFile, SourceHost};
pub use collector::{ArtifactCollector, UNDECODED_ARTIFACT_PLACEHOLDER};
pub use content::{decode_text, fetch_text};
pub use enumerator::RepositoryEnumerator;
pub use locator::{FileLocator, LocateOutcome, RepositoryFailure};
#[cfg(any(test, feature = "test-support"))]
pub use memory::{MemoryBranch, MemoryHost, MemoryRepository};
pub use walker::{TreeWalker, WalkStats};
