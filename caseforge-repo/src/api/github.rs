//! GitHub API client implementation

use async_trait::async_trait;
use caseforge_core::{
    AccountScope, BranchRef, CaseforgeError, CaseforgeResult, EntryKind, ErrorContext,
    RepositoryRef, TreeEntry,
};
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::{
    create_http_client, encode_path, handle_response_error, next_page_link, ApiClientConfig,
    RemoteFile, SourceHost,
};

/// GitHub API client
pub struct GitHubApiClient {
    client: reqwest::Client,
    config: ApiClientConfig,
}

/// GitHub repository response
#[derive(Debug, Deserialize)]
struct GitHubRepository {
    full_name: String,
}

/// GitHub branch response
#[derive(Debug, Deserialize)]
struct GitHubBranch {
    name: String,
}

/// GitHub directory listing item
#[derive(Debug, Deserialize)]
struct GitHubContentItem {
    name: String,
    path: String,
    #[serde(rename = "type")]
    item_type: String,
}

/// GitHub file content response
#[derive(Debug, Deserialize)]
struct GitHubFileResponse {
    path: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

impl GitHubContentItem {
    fn into_entry(self) -> TreeEntry {
        let kind = match self.item_type.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Directory,
            _ => EntryKind::Other,
        };
        TreeEntry {
            path: self.path,
            name: self.name,
            kind,
        }
    }
}

impl GitHubApiClient {
    /// Create a new GitHub API client
    pub fn new(config: ApiClientConfig) -> CaseforgeResult<Self> {
        let client = create_http_client(&config)?;

        info!("Created GitHub API client for {}", config.base_url);

        Ok(Self { client, config })
    }

    /// Create authorization headers
    fn create_auth_headers(&self) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();

        if let Some(ref token) = self.config.access_token {
            if let Ok(auth_value) =
                reqwest::header::HeaderValue::from_str(&format!("token {}", token))
            {
                headers.insert(reqwest::header::AUTHORIZATION, auth_value);
            }
        }

        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        headers
    }

    fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Make a GET request to an absolute GitHub API URL
    async fn get_url(&self, url: &str, operation: &str) -> CaseforgeResult<reqwest::Response> {
        debug!("Making GitHub API request to: {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.create_auth_headers())
            .send()
            .await
            .map_err(|e| CaseforgeError::Network {
                message: format!("Failed to make request to GitHub API: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("github_api_client").with_operation(operation),
            })?;

        if !response.status().is_success() {
            return Err(handle_response_error(response, operation).await);
        }

        Ok(response)
    }

    async fn parse_json<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &str,
    ) -> CaseforgeResult<T> {
        response.json().await.map_err(|e| CaseforgeError::Repository {
            message: format!("Failed to parse GitHub response: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("github_api_client").with_operation(operation),
        })
    }

    /// Fetch every page of a list endpoint, following `Link: rel="next"`
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        operation: &str,
    ) -> CaseforgeResult<Vec<T>> {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        let mut next = Some(self.endpoint_url(&format!(
            "{}{}per_page={}",
            endpoint, separator, self.config.per_page
        )));
        let mut items = Vec::new();
        let mut pages = 0usize;

        while let Some(url) = next.take() {
            let response = self.get_url(&url, operation).await?;
            next = response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(next_page_link);

            let page: Vec<T> = Self::parse_json(response, operation).await?;
            items.extend(page);
            pages += 1;
        }

        debug!(
            "Fetched {} items over {} page(s) from {}",
            items.len(),
            pages,
            endpoint
        );
        Ok(items)
    }

    fn contents_endpoint(repository: &RepositoryRef, branch: &BranchRef, path: &str) -> String {
        let path = path.trim_matches('/');
        let mut endpoint = format!("repos/{}/contents", repository.full_name);
        if !path.is_empty() {
            endpoint.push('/');
            endpoint.push_str(&encode_path(path));
        }
        endpoint.push_str(&format!("?ref={}", urlencoding::encode(&branch.name)));
        endpoint
    }
}

#[async_trait]
impl SourceHost for GitHubApiClient {
    async fn list_repositories(
        &self,
        scope: &AccountScope,
    ) -> CaseforgeResult<Vec<RepositoryRef>> {
        info!("Listing GitHub repositories for {}", scope);

        let endpoint = match scope {
            AccountScope::Organization(org) => {
                format!("orgs/{}/repos", urlencoding::encode(org))
            }
            AccountScope::AuthenticatedUser => "user/repos".to_string(),
        };

        let repositories: Vec<GitHubRepository> =
            self.get_all_pages(&endpoint, "list_repositories").await?;

        info!("Found {} repositories for {}", repositories.len(), scope);
        Ok(repositories
            .into_iter()
            .map(|r| RepositoryRef::new(r.full_name))
            .collect())
    }

    async fn list_branches(&self, repository: &RepositoryRef) -> CaseforgeResult<Vec<BranchRef>> {
        debug!("Listing branches of {}", repository);

        let endpoint = format!("repos/{}/branches", repository.full_name);
        let branches: Vec<GitHubBranch> = self.get_all_pages(&endpoint, "list_branches").await?;

        Ok(branches.into_iter().map(|b| BranchRef::new(b.name)).collect())
    }

    async fn list_directory(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<Vec<TreeEntry>> {
        debug!(
            "Listing {}@{}:/{}",
            repository.full_name, branch.name, path
        );

        let endpoint = Self::contents_endpoint(repository, branch, path);
        let url = self.endpoint_url(&endpoint);
        let response = self.get_url(&url, "list_directory").await?;

        // A file path yields an object rather than an array
        let body: serde_json::Value = Self::parse_json(response, "list_directory").await?;
        if !body.is_array() {
            return Err(CaseforgeError::Repository {
                message: format!("'{}' is not a directory in {}", path, repository),
                source: None,
                context: ErrorContext::new("github_api_client")
                    .with_operation("list_directory")
                    .with_metadata("branch", &branch.name),
            });
        }

        let items: Vec<GitHubContentItem> =
            serde_json::from_value(body).map_err(CaseforgeError::Serialization)?;

        Ok(items.into_iter().map(GitHubContentItem::into_entry).collect())
    }

    async fn get_file(
        &self,
        repository: &RepositoryRef,
        branch: &BranchRef,
        path: &str,
    ) -> CaseforgeResult<RemoteFile> {
        debug!(
            "Fetching GitHub file content for {}@{}:{}",
            repository.full_name, branch.name, path
        );

        let endpoint = Self::contents_endpoint(repository, branch, path);
        let url = self.endpoint_url(&endpoint);
        let response = self.get_url(&url, "get_file").await?;
        let file: GitHubFileResponse = Self::parse_json(response, "get_file").await?;

        Ok(RemoteFile {
            path: file.path,
            encoding: file.encoding,
            content: file.content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_endpoint() {
        let repo = RepositoryRef::new("acme/widgets");
        let main = BranchRef::new("main");
        assert_eq!(
            GitHubApiClient::contents_endpoint(&repo, &main, ""),
            "repos/acme/widgets/contents?ref=main"
        );
        assert_eq!(
            GitHubApiClient::contents_endpoint(&repo, &main, "jobs/nightly report.py"),
            "repos/acme/widgets/contents/jobs/nightly%20report.py?ref=main"
        );

        let feature = BranchRef::new("feature/login");
        assert_eq!(
            GitHubApiClient::contents_endpoint(&repo, &feature, "/docs/"),
            "repos/acme/widgets/contents/docs?ref=feature%2Flogin"
        );
    }

    #[test]
    fn test_content_item_kinds() {
        let items: Vec<GitHubContentItem> = serde_json::from_str(
            r#"[
                {"name": "jobs", "path": "jobs", "type": "dir", "sha": "a1"},
                {"name": "report.py", "path": "report.py", "type": "file", "size": 12},
                {"name": "vendor", "path": "vendor", "type": "submodule"}
            ]"#,
        )
        .unwrap();

        let entries: Vec<TreeEntry> = items.into_iter().map(GitHubContentItem::into_entry).collect();
        assert_eq!(entries[0].kind, EntryKind::Directory);
        assert_eq!(entries[1].kind, EntryKind::File);
        assert_eq!(entries[1].name, "report.py");
        assert_eq!(entries[2].kind, EntryKind::Other);
    }

    #[test]
    fn test_file_response_without_content() {
        // Files over 1 MB come back with encoding "none" and no content
        let file: GitHubFileResponse =
            serde_json::from_str(r#"{"path": "docs/big.pdf", "encoding": "none"}"#).unwrap();
        assert_eq!(file.encoding, "none");
        assert!(file.content.is_empty());
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        let config = ApiClientConfig {
            base_url: "https://github.example.com/api/v3/".to_string(),
            ..ApiClientConfig::default()
        };
        let client = GitHubApiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint_url("/user/repos"),
            "https://github.example.com/api/v3/user/repos"
        );
    }
}
