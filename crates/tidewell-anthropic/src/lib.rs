// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic provider adapter for Tidewell.
//!
//! Implements [`ProviderAdapter`] over the Anthropic Messages API with a
//! single non-streaming request per prompt.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tidewell_config::{TidewellConfig, resolve_api_key};
use tidewell_core::error::TidewellError;
use tidewell_core::traits::{PluginAdapter, ProviderAdapter};
use tidewell_core::types::{AdapterType, HealthStatus};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest};

/// Anthropic provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    max_tokens: u32,
    temperature: f32,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    pub fn new(config: &TidewellConfig) -> Result<Self, TidewellError> {
        let api_key = resolve_api_key(config).ok_or_else(|| {
            TidewellError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
            )
        })?;

        let anthropic = &config.anthropic;
        let client = AnthropicClient::new(
            api_key,
            anthropic.api_version.clone(),
            anthropic.default_model.clone(),
        )?
        .with_base_url(anthropic.base_url.clone());

        info!(
            model = %anthropic.default_model,
            max_tokens = anthropic.max_tokens,
            "Anthropic provider initialized"
        );

        Ok(Self {
            client,
            max_tokens: anthropic.max_tokens,
            temperature: anthropic.temperature,
        })
    }

    fn to_message_request(&self, prompt: &str) -> MessageRequest {
        MessageRequest {
            model: self.client.default_model().to_string(),
            messages: vec![ApiMessage::user(prompt)],
            max_tokens: self.max_tokens,
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TidewellError> {
        // Avoids spending tokens: a constructed client is considered healthy.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TidewellError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicProvider {
    async fn complete(&self, prompt: &str) -> Result<String, TidewellError> {
        let request = self.to_message_request(prompt);
        let response = self.client.complete_message(&request).await?;
        debug!(
            response_id = %response.id,
            output_tokens = response.usage.output_tokens,
            stop_reason = ?response.stop_reason,
            "completion received"
        );
        Ok(response.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_uri: &str) -> TidewellConfig {
        let mut config = TidewellConfig::default();
        config.anthropic.api_key = Some("sk-test-123".into());
        config.anthropic.base_url = server_uri.to_string();
        config
    }

    #[test]
    fn provider_identity() {
        let provider = AnthropicProvider::new(&config_for("http://localhost:1")).unwrap();
        assert_eq!(provider.name(), "anthropic");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }

    #[test]
    fn request_carries_configured_sampling() {
        let mut config = config_for("http://localhost:1");
        config.anthropic.max_tokens = 123;
        config.anthropic.temperature = 0.2;
        let provider = AnthropicProvider::new(&config).unwrap();

        let req = provider.to_message_request("analyze this");
        assert_eq!(req.max_tokens, 123);
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.model, config.anthropic.default_model);
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].content, "analyze this");
    }

    #[tokio::test]
    async fn complete_returns_response_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "messages": [{"role": "user", "content": "prompt text"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "msg_1",
                "type": "message",
                "role": "assistant",
                "content": [{"type": "text", "text": "1. [MUSIC]: Put on a favourite album"}],
                "model": "claude-3-5-haiku-20241022",
                "stop_reason": "end_turn",
                "usage": {"input_tokens": 40, "output_tokens": 12}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config_for(&server.uri())).unwrap();
        let text = provider.complete("prompt text").await.unwrap();
        assert_eq!(text, "1. [MUSIC]: Put on a favourite album");
    }

    #[tokio::test]
    async fn upstream_failure_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let provider = AnthropicProvider::new(&config_for(&server.uri())).unwrap();
        let err = provider.complete("prompt").await.unwrap_err();
        assert!(matches!(err, TidewellError::Provider { .. }));
    }
}
