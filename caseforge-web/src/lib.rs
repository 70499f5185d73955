//! Caseforge Web Server
//!
//! HTTP front end for the recommendation pipeline.

pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;

// Re-export main types
pub use server::{CaseforgeServer, CaseforgeServerBuilder};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, Method,
    },
    Router,
};
use caseforge_core::LoggingConfig;
use caseforge_recommend::RecommendError;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([ACCEPT, CONTENT_TYPE])
        .expose_headers([HeaderName::from_static(handlers::SKIPPED_REPOSITORIES_HEADER)]);

    Router::new()
        .merge(routes::api_routes())
        .merge(routes::docs_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024)) // 10MB max body size
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Recommendation error: {0}")]
    Recommend(#[from] RecommendError),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// Initialize logging for the web server
pub fn init_logging(log_level: &str) -> WebResult<()> {
    let mut config = LoggingConfig::with_level(log_level);
    config
        .filter_directives
        .push("tower_http=debug".to_string());

    caseforge_core::init_logging(&config)
        .map_err(|e| WebError::Config(format!("Failed to initialize logging: {}", e)))
}
