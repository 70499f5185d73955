//! Configuration management
//!
//! Layering: defaults, then an optional TOML file, then environment variables.
//! The result is immutable once loaded and handed to each component explicitly.

use crate::error::{CaseforgeError, CaseforgeResult, ErrorContext};
use crate::types::AccountScope;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaseforgeConfig {
    pub github: GitHubConfig,
    pub llm: LlmConfig,
    pub recommend: RecommendConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    /// Access token; anonymous access only sees public data
    pub token: Option<String>,
    /// Organization filter; absent means every repository of the token owner
    pub org: Option<String>,
    pub base_url: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type (openai, anthropic, ollama, groq)
    pub provider: String,
    pub model: String,
    /// API key (optional, falls back to the provider's environment variable)
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendConfig {
    /// Result count used when a request omits `top_n`
    pub default_top_n: i64,
    /// Suffix of sibling files collected next to a match
    pub artifact_extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for CaseforgeConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig::default(),
            llm: LlmConfig::default(),
            recommend: RecommendConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            org: None,
            base_url: "https://api.github.com".to_string(),
            timeout_seconds: 30,
            user_agent: format!("caseforge/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4.1".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: None,
        }
    }
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_top_n: 3,
            artifact_extension: ".pdf".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl GitHubConfig {
    pub fn scope(&self) -> AccountScope {
        AccountScope::from_filter(self.org.as_deref())
    }
}

impl CaseforgeConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> CaseforgeResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CaseforgeError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: CaseforgeConfig =
            toml::from_str(&content).map_err(|e| CaseforgeError::Config {
                message: format!("Failed to parse config: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config")
                    .with_operation("parse_toml")
                    .with_suggestion("Check TOML syntax in config file"),
            })?;

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> CaseforgeResult<()> {
        let content = toml::to_string_pretty(self).map_err(|e| CaseforgeError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        std::fs::write(path, content).map_err(|e| CaseforgeError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// File (or defaults when no path is given), then environment, then validation
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> CaseforgeResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.overlay_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values from an environment lookup
    pub fn overlay_env_with<F>(&mut self, lookup: F) -> CaseforgeResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(org) = non_empty("GITHUB_ORG") {
            self.github.org = Some(org);
        }
        if let Some(base_url) = non_empty("GITHUB_API_URL") {
            self.github.base_url = base_url;
        }
        if let Some(provider) = non_empty("CASEFORGE_LLM_PROVIDER") {
            self.llm.provider = provider;
        }
        if let Some(model) = non_empty("CASEFORGE_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(base_url) = non_empty("CASEFORGE_LLM_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if self.llm.provider == "openai" {
            if let Some(key) = non_empty("OPENAI_API_KEY") {
                self.llm.api_key = Some(key);
            }
        }
        if let Some(host) = non_empty("CASEFORGE_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty("CASEFORGE_PORT") {
            self.server.port = port.parse().map_err(|e| CaseforgeError::Config {
                message: format!("Invalid CASEFORGE_PORT '{}': {}", port, e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("config").with_operation("overlay_env"),
            })?;
        }

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> CaseforgeResult<()> {
        let invalid = |message: &str, suggestion: &str| CaseforgeError::Config {
            message: message.to_string(),
            source: None,
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion(suggestion),
        };

        if self.github.timeout_seconds == 0 {
            return Err(invalid(
                "GitHub timeout_seconds must be greater than 0",
                "Set github.timeout_seconds to a positive value",
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(invalid(
                "LLM model must not be empty",
                "Set llm.model or CASEFORGE_LLM_MODEL",
            ));
        }

        if self.recommend.artifact_extension.is_empty() {
            return Err(invalid(
                "Artifact extension must not be empty",
                "Set recommend.artifact_extension, e.g. \".pdf\"",
            ));
        }

        if self.recommend.default_top_n <= 0 {
            return Err(invalid(
                "default_top_n must be greater than 0",
                "Set recommend.default_top_n to a positive value",
            ));
        }

        Ok(())
    }

    /// Server bind address
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
