//! Caseforge Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use caseforge_core::CaseforgeConfig;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main Caseforge web server
pub struct CaseforgeServer {
    config: CaseforgeConfig,
    state: AppState,
}

impl CaseforgeServer {
    /// Create a server with the production source host and completion service
    pub async fn new(config: CaseforgeConfig) -> WebResult<Self> {
        config
            .validate()
            .map_err(|e| WebError::Config(e.to_string()))?;
        let state = AppState::from_config(&config).await?;

        Ok(Self { config, state })
    }

    /// Create a server around an already assembled state
    pub fn with_state(config: CaseforgeConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting Caseforge Web Server");
        info!("Server address: http://{}", address);

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &CaseforgeConfig {
        &self.config
    }
}

/// Builder for CaseforgeServer
pub struct CaseforgeServerBuilder {
    config: CaseforgeConfig,
}

impl CaseforgeServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: CaseforgeConfig::default(),
        }
    }

    /// Start from a loaded configuration
    pub fn config(mut self, config: CaseforgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<CaseforgeServer> {
        CaseforgeServer::new(self.config).await
    }
}

impl Default for CaseforgeServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let builder = CaseforgeServerBuilder::new().host("localhost").port(3000);

        assert_eq!(builder.config.server.host, "localhost");
        assert_eq!(builder.config.server.port, 3000);
        assert_eq!(builder.config.address(), "localhost:3000");
    }

    #[test]
    fn test_builder_keeps_loaded_config() {
        let mut config = CaseforgeConfig::default();
        config.github.org = Some("acme".to_string());

        let builder = CaseforgeServerBuilder::new().config(config).port(9000);
        assert_eq!(builder.config.github.org.as_deref(), Some("acme"));
        assert_eq!(builder.config.server.port, 9000);
    }

    #[tokio::test]
    async fn test_invalid_config_is_rejected() {
        let mut config = CaseforgeConfig::default();
        config.recommend.artifact_extension = String::new();

        let result = CaseforgeServer::new(config).await;
        assert!(matches!(result, Err(WebError::Config(_))));
    }
}
