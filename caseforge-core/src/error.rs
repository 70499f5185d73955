//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type CaseforgeResult<T> = Result<T, CaseforgeError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the caseforge system
#[derive(Error, Debug)]
pub enum CaseforgeError {
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Content decode error: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CaseforgeError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            CaseforgeError::Repository { context, .. } => Some(context),
            CaseforgeError::Config { context, .. } => Some(context),
            CaseforgeError::Network { context, .. } => Some(context),
            CaseforgeError::Authentication { context, .. } => Some(context),
            CaseforgeError::Decode { context, .. } => Some(context),
            CaseforgeError::Io(_) | CaseforgeError::Serialization(_) => None,
        }
    }

    /// Credential and configuration errors, which retrying cannot fix.
    ///
    /// Classification only. Callers decide the scope of the failure: the
    /// file search still skips a single repository that fails this way.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            CaseforgeError::Authentication { .. } | CaseforgeError::Config { .. }
        )
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let error_id = self.context().map(|c| c.error_id.as_str());
        match self {
            CaseforgeError::Config { .. } => {
                error!(error_id = ?error_id, error = %self, "Configuration error");
            }
            CaseforgeError::Network { .. } | CaseforgeError::Decode { .. } => {
                warn!(error_id = ?error_id, error = %self, "Network or decode error");
            }
            _ => {
                error!(error_id = ?error_id, error = %self, "Error occurred");
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! repository_error {
    ($msg:expr, $component:expr) => {
        $crate::CaseforgeError::Repository {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::CaseforgeError::Repository {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::CaseforgeError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file and environment")
                .with_suggestion("Run 'caseforge config --init' to create a default config"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("github_api_client")
            .with_operation("list_branches")
            .with_metadata("repository", "acme/widgets")
            .with_suggestion("Check your access token");

        assert_eq!(context.component, "github_api_client");
        assert_eq!(context.operation.as_deref(), Some("list_branches"));
        assert_eq!(
            context.metadata.get("repository").map(String::as_str),
            Some("acme/widgets")
        );
        assert_eq!(context.recovery_suggestions.len(), 1);
        assert!(!context.error_id.is_empty());
    }

    #[test]
    fn test_fatal_classification() {
        let auth = CaseforgeError::Authentication {
            message: "Bad credentials".to_string(),
            context: ErrorContext::new("test"),
        };
        assert!(auth.is_fatal());
        assert!(config_error!("missing token", "test").is_fatal());
        assert!(!repository_error!("HTTP 404", "test").is_fatal());
    }

    #[test]
    fn test_io_error_has_no_context() {
        let err: CaseforgeError = std::io::Error::new(std::io::ErrorKind::Other, "boom").into();
        assert!(err.context().is_none());
        assert!(err.to_string().contains("boom"));
    }
}
