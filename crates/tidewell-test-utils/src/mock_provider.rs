// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock text-generation provider for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` with scripted replies, so the
//! generator and the orchestrator can be exercised without network calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use tidewell_core::types::{AdapterType, HealthStatus};
use tidewell_core::{PluginAdapter, ProviderAdapter, TidewellError};

/// Text returned once the script runs out.
pub const DEFAULT_MOCK_RESPONSE: &str = "1. [CUSTOM]: mock recommendation";

/// One scripted provider reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return this text.
    Text(String),
    /// Fail with a provider error carrying this message.
    Fail(String),
    /// Sleep, then return the text.
    Delayed(Duration, String),
}

impl MockReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::Fail(message.into())
    }

    pub fn delayed(delay: Duration, text: impl Into<String>) -> Self {
        Self::Delayed(delay, text.into())
    }
}

/// A mock provider that plays back scripted replies in FIFO order.
///
/// When the script is empty, [`DEFAULT_MOCK_RESPONSE`] is returned.
pub struct MockProvider {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::with_replies(Vec::new())
    }

    pub fn with_replies(replies: Vec<MockReply>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::from(replies))),
            prompts: Arc::new(Mutex::new(Vec::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Script plain text replies.
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self::with_replies(responses.into_iter().map(MockReply::Text).collect())
    }

    pub async fn add_reply(&self, reply: MockReply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of `complete` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::text(DEFAULT_MOCK_RESPONSE))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, TidewellError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TidewellError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, prompt: &str) -> Result<String, TidewellError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().await.push(prompt.to_string());

        match self.next_reply().await {
            MockReply::Text(text) => Ok(text),
            MockReply::Fail(message) => Err(TidewellError::provider(message)),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_response_when_script_empty() {
        let provider = MockProvider::new();
        assert_eq!(provider.complete("p").await.unwrap(), DEFAULT_MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn scripted_replies_returned_in_order() {
        let provider = MockProvider::with_replies(vec![
            MockReply::text("first"),
            MockReply::fail("rate limited"),
            MockReply::text("third"),
        ]);

        assert_eq!(provider.complete("a").await.unwrap(), "first");
        let err = provider.complete("b").await.unwrap_err();
        assert!(err.to_string().contains("rate limited"));
        assert_eq!(provider.complete("c").await.unwrap(), "third");
        assert_eq!(provider.complete("d").await.unwrap(), DEFAULT_MOCK_RESPONSE);
    }

    #[tokio::test]
    async fn records_calls_and_prompts() {
        let provider = MockProvider::with_responses(vec!["x".into()]);
        provider.complete("hello").await.unwrap();
        provider.complete("again").await.unwrap();
        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.prompts().await, vec!["hello", "again"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delayed_reply_waits_before_answering() {
        let provider = MockProvider::with_replies(vec![MockReply::delayed(
            Duration::from_secs(30),
            "late",
        )]);
        let start = tokio::time::Instant::now();
        assert_eq!(provider.complete("p").await.unwrap(), "late");
        assert!(start.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn add_reply_after_construction() {
        let provider = MockProvider::new();
        provider.add_reply(MockReply::text("dynamic")).await;
        assert_eq!(provider.complete("p").await.unwrap(), "dynamic");
    }
}
