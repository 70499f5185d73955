//! OpenAPI document for the Caseforge web server

use axum::response::Json;
use utoipa::OpenApi;

use crate::handlers::{ErrorResponse, HealthResponse, InvalidReplyResponse, RecommendRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Caseforge Web API",
        version = "0.1.0",
        description = "Test-case recommendations for files located across GitHub repositories",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local development server")
    ),
    paths(
        crate::handlers::health_check,
        crate::handlers::recommend,
    ),
    components(
        schemas(
            HealthResponse,
            RecommendRequest,
            ErrorResponse,
            InvalidReplyResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Recommendations", description = "Test-case recommendation operations"),
    )
)]
pub struct ApiDoc;

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// The OpenAPI document as pretty-printed JSON
pub fn get_openapi_json() -> Result<String, serde_json::Error> {
    ApiDoc::openapi().to_pretty_json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let openapi = ApiDoc::openapi();
        assert_eq!(openapi.info.title, "Caseforge Web API");
        assert!(openapi.paths.paths.contains_key("/recommend"));
        assert!(openapi.paths.paths.contains_key("/health"));
    }

    #[test]
    fn test_openapi_json() {
        let json = get_openapi_json().unwrap();
        assert!(json.contains("Caseforge Web API"));
        assert!(json.contains("top_n"));
    }
}
