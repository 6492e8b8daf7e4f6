// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Groq chat completions provider for batsignal.
//!
//! Implements [`ProviderAdapter`] over the OpenAI-compatible
//! `/openai/v1/chat/completions` endpoint.

pub mod client;
pub mod types;

use async_trait::async_trait;
use batsignal_config::model::{AgentConfig, GroqConfig};
use batsignal_core::error::{BatsignalError, ProviderErrorKind};
use batsignal_core::traits::{PluginAdapter, ProviderAdapter};
use batsignal_core::types::{
    AdapterType, HealthStatus, ProviderRequest, ProviderResponse, TokenUsage,
};
use tracing::{debug, info, warn};

use crate::client::GroqClient;
use crate::types::{ApiMessage, ChatCompletionRequest};

/// Persona prompt used when neither a prompt file nor an inline prompt is set.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are Batman, the Dark Knight of Gotham. \
Your responses should be:
- Dark, mysterious, and intense but not overly dramatic
- Brief and direct (1-2 sentences)
- Use phrases like \"I am Batman\", \"The night calls\", \"Gotham needs me\"
- Speak with authority but keep it concise
Remember to maintain the Batman persona throughout the conversation.";

/// Groq provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `GROQ_API_KEY` env var -> error.
pub struct GroqProvider {
    client: GroqClient,
}

impl GroqProvider {
    /// Creates a provider from the `[groq]` config section.
    pub fn new(config: &GroqConfig) -> Result<Self, BatsignalError> {
        let api_key = resolve_api_key(config.api_key.as_deref())?;
        let client = GroqClient::new(
            &api_key,
            config.base_url.clone(),
            config.model.clone(),
            config.attempt_timeout(),
        )?
        .with_max_retries(config.max_retries)
        .with_retry_backoff(config.retry_backoff());

        info!(
            model = config.model,
            max_retries = config.max_retries,
            "Groq provider initialized"
        );
        Ok(Self { client })
    }

    /// Wraps an existing client.
    pub fn with_client(client: GroqClient) -> Self {
        Self { client }
    }

    fn to_completion_request(&self, request: &ProviderRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if !request.system_prompt.is_empty() {
            messages.push(ApiMessage {
                role: "system".into(),
                content: request.system_prompt.clone(),
            });
        }
        messages.extend(request.messages.iter().map(|m| ApiMessage {
            role: m.role.clone(),
            content: m.content.clone(),
        }));

        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.client.default_model().to_string()),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

#[async_trait]
impl PluginAdapter for GroqProvider {
    fn name(&self) -> &str {
        "groq"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, BatsignalError> {
        // Probing the API would spend quota.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BatsignalError> {
        debug!("Groq provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for GroqProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, BatsignalError> {
        let api_request = self.to_completion_request(&request);
        let response = self.client.complete(&api_request).await?;

        let choice = response.choices.first();
        let content = choice
            .and_then(|c| c.message.content.clone())
            .ok_or_else(|| {
                BatsignalError::provider(
                    ProviderErrorKind::MalformedResponse,
                    "response has no choices[0].message.content",
                )
            })?;
        let finish_reason = choice.and_then(|c| c.finish_reason.clone());
        let usage = response.usage.unwrap_or_default();

        Ok(ProviderResponse {
            id: response.id,
            content,
            model: response.model,
            finish_reason,
            usage: TokenUsage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
            },
        })
    }
}

/// Resolves the API key from config or the environment.
pub fn resolve_api_key(config_key: Option<&str>) -> Result<String, BatsignalError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.to_string());
    }
    match std::env::var("GROQ_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => Err(BatsignalError::Config(
            "Groq API key not found. Set groq.api_key in config or the GROQ_API_KEY environment variable.".into(),
        )),
    }
}

/// Loads the persona prompt: file, then inline, then [`DEFAULT_SYSTEM_PROMPT`].
pub async fn load_system_prompt(agent: &AgentConfig) -> String {
    if let Some(file_path) = &agent.system_prompt_file {
        match tokio::fs::read_to_string(file_path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(path = file_path, "loaded system prompt from file");
                    return trimmed.to_string();
                }
                warn!(path = file_path, "system prompt file is empty, falling back");
            }
            Err(e) => {
                warn!(
                    path = file_path,
                    error = %e,
                    "failed to read system prompt file, falling back"
                );
            }
        }
    }

    if let Some(prompt) = &agent.system_prompt
        && !prompt.is_empty()
    {
        return prompt.clone();
    }

    DEFAULT_SYSTEM_PROMPT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use batsignal_core::types::ChatMessage;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> GroqProvider {
        let client = GroqClient::new("gsk_test", server.uri(), "mixtral-8x7b-32768", Duration::from_secs(5))
            .unwrap();
        GroqProvider::with_client(client)
    }

    fn batman_request(text: &str) -> ProviderRequest {
        ProviderRequest {
            model: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            messages: vec![ChatMessage::user(text)],
            max_tokens: 50,
            temperature: 0.7,
        }
    }

    #[test]
    fn request_puts_persona_first() {
        let client = GroqClient::new("k", "http://localhost", "mixtral-8x7b-32768", Duration::from_secs(1)).unwrap();
        let provider = GroqProvider::with_client(client);
        let req = provider.to_completion_request(&batman_request("who are you"));

        assert_eq!(req.model, "mixtral-8x7b-32768");
        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, "system");
        assert!(req.messages[0].content.starts_with("You are Batman"));
        assert_eq!(req.messages[1].content, "who are you");
    }

    #[test]
    fn empty_system_prompt_is_omitted() {
        let client = GroqClient::new("k", "http://localhost", "m", Duration::from_secs(1)).unwrap();
        let provider = GroqProvider::with_client(client);
        let mut request = batman_request("hi");
        request.system_prompt.clear();
        request.model = Some("llama3-8b-8192".into());

        let req = provider.to_completion_request(&request);
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.model, "llama3-8b-8192");
    }

    #[tokio::test]
    async fn complete_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "model": "mixtral-8x7b-32768",
                "max_tokens": 50
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-9",
                "model": "mixtral-8x7b-32768",
                "choices": [{"message": {"role": "assistant", "content": "I am Batman."}, "finish_reason": "stop"}],
                "usage": {"prompt_tokens": 80, "completion_tokens": 4}
            })))
            .mount(&server)
            .await;

        let response = provider_for(&server)
            .complete(batman_request("Who are you?"))
            .await
            .unwrap();
        assert_eq!(response.content, "I am Batman.");
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.prompt_tokens, 80);
    }

    #[tokio::test]
    async fn missing_choices_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .complete(batman_request("hi"))
            .await
            .unwrap_err();
        assert_eq!(err.provider_kind(), Some(ProviderErrorKind::MalformedResponse));
    }

    #[test]
    fn config_key_wins() {
        assert_eq!(resolve_api_key(Some("gsk_cfg")).unwrap(), "gsk_cfg");
    }

    #[tokio::test]
    async fn prompt_file_wins_over_inline() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("prompt.txt");
        std::fs::write(&file, "  You are the Joker.\n").unwrap();

        let agent = AgentConfig {
            system_prompt: Some("inline".into()),
            system_prompt_file: Some(file.display().to_string()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&agent).await, "You are the Joker.");
    }

    #[tokio::test]
    async fn missing_prompt_file_falls_back_to_inline() {
        let agent = AgentConfig {
            system_prompt: Some("Be brief.".into()),
            system_prompt_file: Some("/nonexistent/prompt.txt".into()),
            ..AgentConfig::default()
        };
        assert_eq!(load_system_prompt(&agent).await, "Be brief.");
    }

    #[tokio::test]
    async fn default_prompt_is_batman() {
        let prompt = load_system_prompt(&AgentConfig::default()).await;
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
        assert!(prompt.contains("I am Batman"));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let client = GroqClient::new("k", "http://localhost", "m", Duration::from_secs(1)).unwrap();
        let provider = GroqProvider::with_client(client);
        assert_eq!(provider.name(), "groq");
        assert_eq!(provider.version(), semver::Version::new(0, 1, 0));
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }
}
