// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end pipeline testing.
//!
//! `TestHarness` assembles the full recommendation stack over a temp SQLite
//! database: storage, cache, orchestrator, producer and an in-process
//! consumer sharing the orchestrator's cache.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use tidewell_config::model::{
    CacheConfig, GeneratorConfig, QueueConfig, RecommendationsConfig, StorageConfig,
    TidewellConfig,
};
use tidewell_core::{MoodSample, ProviderAdapter, StorageAdapter, TidewellError};
use tidewell_engine::GeneratorWithFallback;
use tidewell_pipeline::{Consumer, Orchestrator, Producer, RecommendationCache};
use tidewell_storage::SqliteStorage;
use tracing::debug;

use crate::mock_provider::{MockProvider, MockReply};

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    replies: Vec<MockReply>,
    generator_enabled: bool,
    generator_timeout_secs: Option<u64>,
    async_mode: bool,
    single_flight: bool,
    queue: QueueConfig,
    cache: CacheConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            replies: Vec::new(),
            generator_enabled: false,
            generator_timeout_secs: None,
            async_mode: false,
            single_flight: true,
            queue: QueueConfig::default(),
            cache: CacheConfig::default(),
        }
    }

    /// Script plain text provider replies. Enables the external generator.
    pub fn with_mock_responses(mut self, responses: Vec<String>) -> Self {
        self.replies = responses.into_iter().map(MockReply::Text).collect();
        self.generator_enabled = true;
        self
    }

    /// Script provider replies. Enables the external generator.
    pub fn with_mock_replies(mut self, replies: Vec<MockReply>) -> Self {
        self.replies = replies;
        self.generator_enabled = true;
        self
    }

    /// Turn the external generator on or off.
    pub fn with_generator(mut self, enabled: bool) -> Self {
        self.generator_enabled = enabled;
        self
    }

    pub fn with_generator_timeout_secs(mut self, secs: u64) -> Self {
        self.generator_timeout_secs = Some(secs);
        self
    }

    pub fn with_async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    pub fn with_single_flight(mut self, single_flight: bool) -> Self {
        self.single_flight = single_flight;
        self
    }

    pub fn with_queue_config(mut self, queue: QueueConfig) -> Self {
        self.queue = queue;
        self
    }

    pub fn with_cache_config(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, TidewellError> {
        let temp_dir = tempfile::TempDir::new().map_err(TidewellError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            ..StorageConfig::default()
        };
        let storage = SqliteStorage::new(storage_config.clone()).with_queue_config(&self.queue);
        storage.initialize().await?;
        let storage = Arc::new(storage);

        let defaults = GeneratorConfig::default();
        let generator_config = GeneratorConfig {
            enabled: self.generator_enabled,
            timeout_secs: self.generator_timeout_secs.unwrap_or(defaults.timeout_secs),
        };
        let recommendations = RecommendationsConfig {
            async_mode: self.async_mode,
            single_flight: self.single_flight,
            ..RecommendationsConfig::default()
        };

        let mock_provider = Arc::new(MockProvider::with_replies(self.replies));
        let provider: Arc<dyn ProviderAdapter> = mock_provider.clone();
        let generator = GeneratorWithFallback::new(Some(provider), &generator_config);

        let cache = Arc::new(RecommendationCache::new(&self.cache));
        let producer = Producer::new(storage.clone(), &self.queue);
        let orchestrator = Orchestrator::new(
            storage.clone(),
            generator,
            producer.clone(),
            cache.clone(),
            &recommendations,
        );
        let consumer =
            Consumer::new(storage.clone(), storage.clone(), &self.queue).with_cache(cache.clone());

        let config = TidewellConfig {
            storage: storage_config,
            recommendations,
            generator: generator_config,
            queue: self.queue,
            cache: self.cache,
            ..TidewellConfig::default()
        };

        Ok(TestHarness {
            mock_provider,
            storage,
            cache,
            producer,
            orchestrator,
            consumer,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete pipeline over temp storage and a mock provider.
pub struct TestHarness {
    /// The scripted provider behind the generator.
    pub mock_provider: Arc<MockProvider>,
    /// SQLite storage and queue (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// Listing cache shared by the orchestrator and the consumer.
    pub cache: Arc<RecommendationCache>,
    pub producer: Producer,
    pub orchestrator: Orchestrator,
    /// In-process consumer wired to the shared cache.
    pub consumer: Consumer,
    /// Effective configuration for this harness.
    pub config: TidewellConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Insert one sample per `(days_ago, mood, stress, productivity)` tuple,
    /// dated relative to today in UTC.
    pub async fn seed_samples(
        &self,
        user_id: &str,
        samples: &[(u64, u8, u8, u8)],
    ) -> Result<(), TidewellError> {
        let today = Utc::now().date_naive();
        for &(days_ago, mood, stress, productivity) in samples {
            let date = today.checked_sub_days(Days::new(days_ago)).unwrap_or(today);
            self.storage
                .insert_sample(&MoodSample::new(user_id, date, mood, stress, productivity))
                .await?;
        }
        debug!(user_id, count = samples.len(), "seeded mood samples");
        Ok(())
    }

    /// Poll the consumer until the queue has nothing deliverable. Returns the
    /// number of deliveries handled.
    pub async fn drain_queue(&self) -> Result<usize, TidewellError> {
        let mut delivered = 0;
        while self.consumer.poll_once().await? {
            delivered += 1;
        }
        Ok(delivered)
    }

    /// Lock timeout configured for queue deliveries.
    pub fn lock_timeout(&self) -> Duration {
        self.config.queue.lock_timeout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn harness_builds_with_defaults() {
        let harness = TestHarness::builder().build().await.unwrap();
        assert!(!harness.orchestrator.is_async());
        assert!(!harness.config.generator.enabled);
        assert_eq!(harness.mock_provider.call_count(), 0);
    }

    #[tokio::test]
    async fn seeded_samples_are_visible_to_storage() {
        let harness = TestHarness::builder().build().await.unwrap();
        harness
            .seed_samples("u1", &[(0, 3, 3, 3), (1, 4, 2, 4)])
            .await
            .unwrap();

        let today = Utc::now().date_naive();
        let from = today.checked_sub_days(Days::new(7)).unwrap();
        let samples = harness
            .storage
            .samples_in_range("u1", from, today)
            .await
            .unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].date, today);
    }

    #[tokio::test]
    async fn async_harness_drains_through_consumer() {
        let harness = TestHarness::builder()
            .with_async_mode(true)
            .build()
            .await
            .unwrap();
        harness.orchestrator.generate("u1", 7).await.unwrap();
        assert_eq!(harness.drain_queue().await.unwrap(), 1);
        assert_eq!(harness.orchestrator.list("u1", None).await.unwrap().len(), 1);
    }
}
