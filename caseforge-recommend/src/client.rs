//! Prompt construction around a completion service

use std::sync::Arc;
use tracing::info;

use crate::llm_client::CompletionService;
use crate::payload::RecommendationRequest;
use crate::types::RecommendResult;

pub const RECOMMENDATION_SYSTEM_PROMPT: &str =
    "You are a test case recommendation engine. Always return valid JSON.";

/// Sampling temperature used for every recommendation call
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.3;

/// Sends one recommendation request and returns the raw reply text
#[derive(Clone)]
pub struct RecommendationClient {
    service: Arc<dyn CompletionService>,
}

impl RecommendationClient {
    pub fn new(service: Arc<dyn CompletionService>) -> Self {
        Self { service }
    }

    pub fn user_prompt(request: &RecommendationRequest) -> RecommendResult<String> {
        Ok(format!(
            "Generate top {} recommended test cases based on this input:\n{}",
            request.top_n,
            request.to_json()?
        ))
    }

    /// The reply is untrusted and returned as received
    pub async fn recommend(&self, request: &RecommendationRequest) -> RecommendResult<String> {
        let user_prompt = Self::user_prompt(request)?;

        info!(
            service = %self.service.describe(),
            file = %request.target.file_name,
            related = request.related.len(),
            top_n = request.top_n,
            "Requesting recommendations"
        );

        self.service
            .complete(
                RECOMMENDATION_SYSTEM_PROMPT,
                &user_prompt,
                RECOMMENDATION_TEMPERATURE,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::PayloadBuilder;
    use crate::types::RecommendError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<(String, String, f32)>>,
    }

    #[async_trait]
    impl CompletionService for RecordingService {
        async fn complete(
            &self,
            system: &str,
            user: &str,
            temperature: f32,
        ) -> RecommendResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((system.to_string(), user.to_string(), temperature));
            Ok("not json".to_string())
        }
    }

    struct FailingService;

    #[async_trait]
    impl CompletionService for FailingService {
        async fn complete(&self, _: &str, _: &str, _: f32) -> RecommendResult<String> {
            Err(RecommendError::Llm("rate limited".to_string()))
        }
    }

    #[tokio::test]
    async fn test_fixed_prompts_and_temperature() {
        let service = Arc::new(RecordingService::default());
        let client = RecommendationClient::new(service.clone());
        let request =
            PayloadBuilder::default().build("report.py", "x = 1".to_string(), vec![], Some(5));

        let reply = client.recommend(&request).await.unwrap();
        assert_eq!(reply, "not json");

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (system, user, temperature) = &calls[0];
        assert_eq!(system, RECOMMENDATION_SYSTEM_PROMPT);
        assert!(user.starts_with(
            "Generate top 5 recommended test cases based on this input:\n{\"python_file\""
        ));
        assert!(user.contains("\"top_n\":5"));
        assert_eq!(*temperature, RECOMMENDATION_TEMPERATURE);
    }

    #[tokio::test]
    async fn test_service_errors_propagate() {
        let client = RecommendationClient::new(Arc::new(FailingService));
        let request = PayloadBuilder::default().build("a.py", String::new(), vec![], None);

        assert!(matches!(
            client.recommend(&request).await,
            Err(RecommendError::Llm(_))
        ));
    }
}
