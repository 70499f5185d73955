//! API clients for accessing remote repositories
//!
//! `SourceHost` is the seam between discovery logic and a concrete hosting
//! service. Everything above it works on caseforge-core types only.

use async_trait::async_trait;
use caseforge_core::{
    AccountScope, BranchRef, CaseforgeError, CaseforgeResult, ErrorContext, RepositoryRef,
    TreeEntry,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod github;


pub use github::GitHubApiClient;

/// A file as delivered by the host, still encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteFile {
    /// File path relative to repository root
    pub path: String,
    /// Transfer encoding reported by the host (`base64`, `none`, ...)
    pub encoding: String,
    /// Encoded content
    pub content: String,
}

/// Configuration for API clients
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Access token for authentication
    pub access_token: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Additional headers
    pub headers: HashMap<String, String>,
    /// Page size for list endpoints
    pub per_page: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            access_token: None,
            timeout_seconds: 30,
            user_agent: "caseforge/1.0".to_string(),
            headers: HashMap::new(),
            per_page: 100,
        }
    }
}

impl ApiClientConfig {
    /// Create a new configuration for GitHub
    pub fn github(access_token: Option<String>) -> Self {
        Self {
            base_url: "https://api.github.com".to_string(),
            access_token,
            ..Default::default()
        }
    }

    /// Build from the `[github]` section of the application config
    pub fn from_github_config(config: &caseforge_core::GitHubConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            access_token: config.token.clone(),
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
            ..Default::default()
        }
    }

    /// Set additional header
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// Read access to a source-hosting service
#[async_trait]
pub trait SourceHost: Send + Sync {
    /// Every repository the credential can see under `scope`, in listing order
    async fn list_repositories(&self, scope: &AccountScope)
        -> CaseforgeResult<Vec<RepositoryRef>>;

    /// Branches of one repository, in listing order
    async fn list_branches(&self, repository: &RepositoryRef) -> CaseforgeResult<Vec<BranchRef>>;

    /// Direct children of `path` on `branch`; the empty path is the root
    async fn list_directory(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<Vec<TreeEntry>>;

    /// Encoded content of one file
    async fn get_file(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<RemoteFile>;
}

/// Helper function to create HTTP client with common configuration
pub(crate) fn create_http_client(config: &ApiClientConfig) -> CaseforgeResult<reqwest::Client> {
    let mut headers = reqwest::header::HeaderMap::new();

    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_str(&config.user_agent).map_err(|e| {
            CaseforgeError::Config {
                message: format!("Invalid user agent: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?,
    );

    for (key, value) in &config.headers {
        let header_name = reqwest::header::HeaderName::from_bytes(key.as_bytes()).map_err(|e| {
            CaseforgeError::Config {
                message: format!("Invalid header name '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            }
        })?;

        let header_value =
            reqwest::header::HeaderValue::from_str(value).map_err(|e| CaseforgeError::Config {
                message: format!("Invalid header value for '{}': {}", key, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("http_client").with_operation("create_client"),
            })?;

        headers.insert(header_name, header_value);
    }

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .default_headers(headers)
        .build()
        .map_err(|e| CaseforgeError::Network {
            message: format!("Failed to create HTTP client: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("http_client").with_operation("create_client"),
        })?;

    Ok(client)
}

/// Map a non-success HTTP response to an error.
///
/// 401 and 403 become `Authentication`; other statuses become `Repository`.
pub(crate) async fn handle_response_error(
    response: reqwest::Response,
    operation: &str,
) -> CaseforgeError {
    let status = response.status();
    let url = response.url().clone();

    let error_body = response.text().await.unwrap_or_default();
    let message = format!(
        "HTTP {} error for {}: {}",
        status.as_u16(),
        url,
        if error_body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error")
        } else {
            &error_body
        }
    );

    status_error(status.as_u16(), message, operation)
}

pub(crate) fn status_error(status: u16, message: String, operation: &str) -> CaseforgeError {
    let context = ErrorContext::new("api_client")
        .with_operation(operation)
        .with_metadata("status", &status.to_string());

    match status {
        401 | 403 => CaseforgeError::Authentication {
            message,
            context: context.with_suggestion(if status == 401 {
                "Check your access token"
            } else {
                "Check repository permissions or rate limits"
            }),
        },
        _ => CaseforgeError::Repository {
            message,
            source: None,
            context: context.with_suggestion(match status {
                404 => "Repository, branch or path not found or not accessible",
                409 => "Repository is empty",
                _ => "Check network connectivity and API status",
            }),
        },
    }
}

/// Extract the `rel="next"` target from an RFC 8288 `Link` header
pub(crate) fn next_page_link(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|link| {
        let mut parts = link.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| param.trim() == "rel=\"next\"");
        if is_next {
            target
                .strip_prefix('<')
                .and_then(|t| t.strip_suffix('>'))
                .map(str::to_string)
        } else {
            None
        }
    })
}

/// Percent-encode each segment of a repository path, keeping the separators
pub(crate) fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
