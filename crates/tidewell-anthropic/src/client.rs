// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication and error decoding. It never retries; callers that need
//! resilience wrap it.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tidewell_core::TidewellError;
use tracing::debug;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// Default endpoint for the Anthropic Messages API.
pub const API_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Transport-level ceiling. The generator applies its own, shorter deadline.
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// HTTP client for Anthropic API communication.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    default_model: String,
    base_url: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic API client.
    ///
    /// # Arguments
    /// * `api_key` - Anthropic API key for authentication
    /// * `api_version` - API version string (e.g., "2023-06-01")
    /// * `model` - Default model identifier
    pub fn new(api_key: String, api_version: String, model: String) -> Result<Self, TidewellError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-api-key",
            HeaderValue::from_str(&api_key).map_err(|e| {
                TidewellError::Config(format!("invalid API key header value: {e}"))
            })?,
        );
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(&api_version).map_err(|e| {
                TidewellError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| TidewellError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            default_model: model,
            base_url: API_BASE_URL.to_string(),
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Returns the endpoint requests are posted to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Overrides the endpoint (proxies, wiremock).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sends a non-streaming request and returns the full response.
    ///
    /// Any transport failure or non-2xx status is reported as
    /// [`TidewellError::Provider`].
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, TidewellError> {
        let response = self
            .client
            .post(&self.base_url)
            .json(request)
            .send()
            .await
            .map_err(|e| TidewellError::Provider {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, model = %request.model, "completion response received");

        let body = response.text().await.map_err(|e| TidewellError::Provider {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let error_msg = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(TidewellError::provider(error_msg));
        }

        serde_json::from_str(&body).map_err(|e| TidewellError::Provider {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> AnthropicClient {
        AnthropicClient::new(
            "test-api-key".into(),
            "2023-06-01".into(),
            "claude-3-5-haiku-20241022".into(),
        )
        .unwrap()
        .with_base_url(base_url)
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-3-5-haiku-20241022".into(),
            messages: vec![ApiMessage::user("Hello")],
            max_tokens: 300,
            temperature: Some(0.7),
        }
    }

    fn success_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": text}],
            "model": "claude-3-5-haiku-20241022",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("Hi there!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await.unwrap();

        assert_eq!(result.id, "msg_test");
        assert_eq!(result.usage.input_tokens, 10);
        assert_eq!(result.text(), "Hi there!");
    }

    #[tokio::test]
    async fn complete_message_does_not_retry_on_429() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(matches!(err, TidewellError::Provider { .. }));
        assert!(err.to_string().contains("rate_limit_error"), "got: {err}");
    }

    #[tokio::test]
    async fn non_json_error_body_is_reported_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("502") && msg.contains("bad gateway"), "got: {msg}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_headers_and_sampling_params() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "model": "claude-3-5-haiku-20241022",
                "max_tokens": 300
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(success_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[test]
    fn invalid_api_key_is_config_error() {
        let err = AnthropicClient::new("bad\nkey".into(), "2023-06-01".into(), "m".into())
            .unwrap_err();
        assert!(matches!(err, TidewellError::Config(_)));
    }
}
