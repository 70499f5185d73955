//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which repositories the configured credential should enumerate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountScope {
    /// Every repository visible to the authenticated identity
    AuthenticatedUser,
    /// Only repositories of the named organization
    Organization(String),
}

impl AccountScope {
    /// Build a scope from an optional organization filter; blank counts as absent
    pub fn from_filter(org: Option<&str>) -> Self {
        match org.map(str::trim) {
            Some(org) if !org.is_empty() => AccountScope::Organization(org.to_string()),
            _ => AccountScope::AuthenticatedUser,
        }
    }
}

impl fmt::Display for AccountScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountScope::AuthenticatedUser => write!(f, "authenticated user"),
            AccountScope::Organization(org) => write!(f, "organization {}", org),
        }
    }
}

/// One repository under the account scope
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Fully qualified name, `owner/name`
    pub full_name: String,
}

impl RepositoryRef {
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
        }
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

/// One branch of a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BranchRef {
    pub name: String,
}

impl BranchRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Kind of a node in a branch's file tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks and submodules; neither expanded nor matched
    Other,
}

/// One node in a branch's file tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// Path relative to the repository root
    pub path: String,
    /// Final path component
    pub name: String,
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn file(path: impl Into<String>) -> Self {
        Self::with_kind(path, EntryKind::File)
    }

    pub fn directory(path: impl Into<String>) -> Self {
        Self::with_kind(path, EntryKind::Directory)
    }

    pub fn with_kind(path: impl Into<String>, kind: EntryKind) -> Self {
        let path = path.into();
        let name = path.rsplit('/').next().unwrap_or_default().to_string();
        Self { path, name, kind }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// A located target file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMatch {
    pub repository: RepositoryRef,
    pub branch: BranchRef,
    pub path: String,
}

impl FileMatch {
    /// Directory containing the match; empty for the repository root
    pub fn directory(&self) -> &str {
        match self.path.rfind('/') {
            Some(idx) => &self.path[..idx],
            None => "",
        }
    }
}

impl fmt::Display for FileMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.repository, self.branch, self.path)
    }
}

/// A sibling file of the artifact extension, decoded as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedArtifact {
    pub file_name: String,
    /// Decoded text, or the undecodable-content placeholder
    pub content: String,
}
