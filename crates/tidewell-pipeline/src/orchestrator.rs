// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entry point for reading and generating recommendations.
//!
//! `generate` either runs the whole fetch, generate, persist sequence inline
//! or hands a request to the [`Producer`] and returns immediately. The choice
//! is fixed at construction. Both paths evict the user's cached listings.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use dashmap::DashMap;
use tidewell_config::model::RecommendationsConfig;
use tidewell_core::types::{MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use tidewell_core::{GenerationRequest, Recommendation, StorageAdapter, TidewellError};
use tidewell_engine::GeneratorWithFallback;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::cache::RecommendationCache;
use crate::producer::Producer;

/// Coordinates storage, generator, producer and cache.
pub struct Orchestrator {
    storage: Arc<dyn StorageAdapter>,
    generator: GeneratorWithFallback,
    producer: Producer,
    cache: Arc<RecommendationCache>,
    async_mode: bool,
    /// Per-user guard for the synchronous path, when enabled.
    in_flight: Option<DashMap<String, Arc<Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        generator: GeneratorWithFallback,
        producer: Producer,
        cache: Arc<RecommendationCache>,
        config: &RecommendationsConfig,
    ) -> Self {
        Self {
            storage,
            generator,
            producer,
            cache,
            async_mode: config.async_mode,
            in_flight: config.single_flight.then(DashMap::new),
        }
    }

    pub fn is_async(&self) -> bool {
        self.async_mode
    }

    pub fn cache(&self) -> &Arc<RecommendationCache> {
        &self.cache
    }

    /// Recommendations for `user_id`, most recent first, read through the cache.
    /// `None` or a non-positive `limit` means the storage default cap.
    pub async fn list(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        let key = self.cache.key(user_id, limit);
        if let Some(hit) = self.cache.get(&key) {
            debug!(user_id, limit = key.limit(), "recommendation cache hit");
            return Ok(hit.as_ref().clone());
        }

        let storage_limit = (key.limit() > 0).then_some(key.limit());
        let listing = self.storage.list_recommendations(user_id, storage_limit).await?;
        debug!(user_id, count = listing.len(), "recommendation cache filled");
        Ok(self.cache.put(key, listing).as_ref().clone())
    }

    /// Generate recommendations over the trailing `window_days`.
    ///
    /// Synchronous mode returns the persisted recommendations (never empty).
    /// Asynchronous mode enqueues a request and returns an empty list.
    pub async fn generate(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        validate_window(window_days)?;
        if self.async_mode {
            self.generate_async(user_id, window_days).await
        } else {
            self.generate_sync(user_id, window_days).await
        }
    }

    /// Invalidate every cached listing for `user_id`.
    pub fn evict(&self, user_id: &str) {
        self.cache.evict(user_id);
    }

    async fn generate_async(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        let request = GenerationRequest::new(user_id, window_days);
        self.producer.submit(&request).await?;
        self.evict(user_id);
        Ok(Vec::new())
    }

    async fn generate_sync(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        let Some(lock) = self.user_lock(user_id) else {
            return self.generate_and_persist(user_id, window_days).await;
        };
        let result = {
            let _held = lock.lock().await;
            self.generate_and_persist(user_id, window_days).await
        };
        drop(lock);
        self.release_user_lock(user_id);
        result
    }

    async fn generate_and_persist(
        &self,
        user_id: &str,
        window_days: u32,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        let (from, to) = window_range(Utc::now().date_naive(), window_days);
        let samples = self.storage.samples_in_range(user_id, from, to).await?;
        let drafts = self.generator.generate(user_id, &samples).await;
        let saved = self.storage.save_recommendations(&drafts).await?;
        self.evict(user_id);

        info!(user_id, window_days, count = saved.len(), "generated recommendations");
        Ok(saved)
    }

    fn user_lock(&self, user_id: &str) -> Option<Arc<Mutex<()>>> {
        let locks = self.in_flight.as_ref()?;
        let lock = locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())));
        Some(Arc::clone(&lock))
    }

    /// Drop the user's lock once no other caller holds or waits on it.
    fn release_user_lock(&self, user_id: &str) {
        if let Some(locks) = &self.in_flight {
            locks.remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);
        }
    }
}

fn validate_window(window_days: u32) -> Result<(), TidewellError> {
    if (MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&window_days) {
        Ok(())
    } else {
        Err(TidewellError::Validation(format!(
            "window_days must be between {MIN_WINDOW_DAYS} and {MAX_WINDOW_DAYS}, got {window_days}"
        )))
    }
}

/// Inclusive `[today - window_days, today]`.
pub fn window_range(today: NaiveDate, window_days: u32) -> (NaiveDate, NaiveDate) {
    let from = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(today);
    (from, today)
}
