//! Test harness for driving the router in-process

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use caseforge_core::CaseforgeConfig;
use caseforge_recommend::{
    CompletionService, RecommendError, RecommendResult, RecommendationPipeline,
};
use caseforge_repo::MemoryHost;
use caseforge_web::{create_app, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Completion service that answers every call with one scripted reply
pub struct ScriptedService {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedService {
    pub fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    /// Payload embedded in the most recent prompt
    pub fn last_payload(&self) -> Value {
        let prompts = self.prompts.lock().unwrap();
        let prompt = prompts.last().expect("no completion call recorded");
        let (_, json) = prompt.split_once('\n').expect("prompt without payload");
        serde_json::from_str(json).expect("payload is not JSON")
    }
}

#[async_trait]
impl CompletionService for ScriptedService {
    async fn complete(&self, _system: &str, user: &str, _temperature: f32) -> RecommendResult<String> {
        self.prompts.lock().unwrap().push(user.to_string());
        self.reply.clone().map_err(RecommendError::Llm)
    }
}

/// Router under test plus the service it talks to
pub struct TestApp {
    pub router: Router,
    pub service: Arc<ScriptedService>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn new(host: MemoryHost, service: Arc<ScriptedService>) -> Self {
        let config = CaseforgeConfig::default();
        let pipeline = RecommendationPipeline::new(Arc::new(host), service.clone(), &config);
        let router = create_app(AppState::new(pipeline));
        Self { router, service }
    }

    pub async fn post_recommend(&self, body: impl Into<Body>) -> TestResponse {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/recommend")
                .header("content-type", "application/json")
                .body(body.into())
                .unwrap(),
        )
        .await
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
        }
    }
}
