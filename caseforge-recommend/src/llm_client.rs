//! Completion service abstraction and its siumai-backed implementation

use async_trait::async_trait;
use caseforge_core::LlmConfig;
use siumai::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

use crate::types::{RecommendError, RecommendResult};

/// A chat-style text completion backend.
///
/// The reply is returned as an opaque string; nothing here interprets it.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, system: &str, user: &str, temperature: f32)
        -> RecommendResult<String>;

    /// Short label for logs, e.g. `openai/gpt-4.1`
    fn describe(&self) -> String {
        "completion-service".to_string()
    }
}

/// Completion service backed by a siumai provider client
pub struct SiumaiCompletionService {
    client: Box<dyn LlmClient>,
    config: LlmConfig,
    temperature: f32,
}

impl SiumaiCompletionService {
    /// Build a client for `config.provider` with a fixed sampling temperature
    pub async fn new(config: LlmConfig, temperature: f32) -> RecommendResult<Self> {
        let client = build_client(&config, temperature).await?;

        info!(
            "Created LLM client for provider: {} with model: {}",
            config.provider, config.model
        );

        Ok(Self {
            client,
            config,
            temperature,
        })
    }

    async fn chat(
        client: &dyn LlmClient,
        messages: Vec<ChatMessage>,
    ) -> RecommendResult<String> {
        let start_time = Instant::now();

        let response = client
            .chat(messages)
            .await
            .map_err(|e| RecommendError::Llm(format!("LLM generation failed: {}", e)))?;

        match response.content_text() {
            Some(content) => {
                info!(
                    "Generated response in {:?} ({} chars)",
                    start_time.elapsed(),
                    content.len()
                );
                Ok(content.to_string())
            }
            None => Err(RecommendError::Llm(
                "No text content in LLM response".to_string(),
            )),
        }
    }
}

#[async_trait]
impl CompletionService for SiumaiCompletionService {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> RecommendResult<String> {
        let messages = vec![system!(system), user!(user)];
        debug!("Requesting completion with {} messages", messages.len());

        // Temperature is fixed when a siumai client is built
        if (temperature - self.temperature).abs() > f32::EPSILON {
            let client = build_client(&self.config, temperature).await?;
            return Self::chat(client.as_ref(), messages).await;
        }
        Self::chat(self.client.as_ref(), messages).await
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.config.provider, self.config.model)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProviderKind {
    OpenAi,
    Anthropic,
    Ollama,
    Groq,
}

/// Connection defaults of one supported provider
#[derive(Debug)]
struct ProviderProfile {
    name: &'static str,
    label: &'static str,
    kind: ProviderKind,
    /// Consulted when no key is configured; `None` for keyless providers
    key_env: Option<&'static str>,
    default_base_url: Option<&'static str>,
}

const PROVIDERS: &[ProviderProfile] = &[
    ProviderProfile {
        name: "openai",
        label: "OpenAI",
        kind: ProviderKind::OpenAi,
        key_env: Some("OPENAI_API_KEY"),
        default_base_url: None,
    },
    ProviderProfile {
        name: "anthropic",
        label: "Anthropic",
        kind: ProviderKind::Anthropic,
        key_env: Some("ANTHROPIC_API_KEY"),
        default_base_url: None,
    },
    ProviderProfile {
        name: "ollama",
        label: "Ollama",
        kind: ProviderKind::Ollama,
        key_env: None,
        default_base_url: Some("http://localhost:11434"),
    },
    ProviderProfile {
        name: "groq",
        label: "Groq",
        kind: ProviderKind::Groq,
        key_env: Some("GROQ_API_KEY"),
        default_base_url: None,
    },
];

/// Builder inputs resolved from configuration and environment
#[derive(Debug)]
struct ClientSettings<'a> {
    api_key: Option<String>,
    base_url: Option<String>,
    model: &'a str,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ProviderProfile {
    fn lookup(provider: &str) -> RecommendResult<&'static ProviderProfile> {
        PROVIDERS
            .iter()
            .find(|p| p.name == provider)
            .ok_or_else(|| RecommendError::Config(format!("Unsupported LLM provider: {}", provider)))
    }

    /// A configured key wins over the provider's environment variable
    fn settings<'a, F>(
        &self,
        config: &'a LlmConfig,
        temperature: f32,
        env: F,
    ) -> RecommendResult<ClientSettings<'a>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match self.key_env {
            Some(var) => Some(
                config
                    .api_key
                    .clone()
                    .or_else(|| env(var))
                    .ok_or_else(|| {
                        RecommendError::Config(format!("{} API key not found", self.label))
                    })?,
            ),
            None => None,
        };

        Ok(ClientSettings {
            api_key,
            base_url: config
                .base_url
                .clone()
                .or_else(|| self.default_base_url.map(str::to_string)),
            model: &config.model,
            temperature,
            max_tokens: config.max_tokens,
        })
    }
}

/// Settings every siumai provider builder accepts
macro_rules! apply_settings {
    ($builder:expr, $settings:expr) => {{
        let settings = $settings;
        let mut builder = $builder
            .model(settings.model)
            .temperature(settings.temperature);
        if let Some(max_tokens) = settings.max_tokens {
            builder = builder.max_tokens(max_tokens);
        }
        if let Some(base_url) = &settings.base_url {
            builder = builder.base_url(base_url);
        }
        builder
    }};
}

/// Build the siumai client matching `config.provider`
async fn build_client(config: &LlmConfig, temperature: f32) -> RecommendResult<Box<dyn LlmClient>> {
    let profile = ProviderProfile::lookup(&config.provider)?;
    let settings = profile.settings(config, temperature, |var| std::env::var(var).ok())?;
    let key = settings.api_key.clone().unwrap_or_default();
    let failed = |e: LlmError| {
        RecommendError::Llm(format!("Failed to build {} client: {}", profile.label, e))
    };

    let client: Box<dyn LlmClient> = match profile.kind {
        ProviderKind::OpenAi => Box::new(
            apply_settings!(LlmBuilder::new().openai().api_key(&key), &settings)
                .build()
                .await
                .map_err(failed)?,
        ),
        ProviderKind::Anthropic => Box::new(
            apply_settings!(LlmBuilder::new().anthropic().api_key(&key), &settings)
                .build()
                .await
                .map_err(failed)?,
        ),
        ProviderKind::Ollama => Box::new(
            apply_settings!(LlmBuilder::new().ollama(), &settings)
                .build()
                .await
                .map_err(failed)?,
        ),
        ProviderKind::Groq => Box::new(
            apply_settings!(LlmBuilder::new().groq().api_key(&key), &settings)
                .build()
                .await
                .map_err(failed)?,
        ),
    };

    Ok(client)
}
