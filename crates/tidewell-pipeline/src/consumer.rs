// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Consumer side of queue dispatch.
//!
//! [`Consumer::handle`] turns one request into persisted rule-based
//! recommendations. [`Consumer::run`] is the transport loop around it: it
//! acknowledges on success and reports failure otherwise, so a failed or
//! interrupted delivery is retried until its attempt budget or TTL runs out.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use tidewell_config::model::QueueConfig;
use tidewell_core::types::{MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};
use tidewell_core::{GenerationRequest, QueueAdapter, QueueEntry, StorageAdapter, TidewellError};
use tidewell_engine::RuleEngine;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::cache::RecommendationCache;

/// What handling one request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleOutcome {
    /// Recommendations were written for the first time.
    Persisted(usize),
    /// The request id was already in the ledger; nothing was written.
    Duplicate,
}

/// Dequeues generation requests and answers them with the rule engine.
pub struct Consumer {
    queue: Arc<dyn QueueAdapter>,
    storage: Arc<dyn StorageAdapter>,
    rules: RuleEngine,
    queue_name: String,
    poll_interval: Duration,
    cache: Option<Arc<RecommendationCache>>,
}

impl Consumer {
    pub fn new(
        queue: Arc<dyn QueueAdapter>,
        storage: Arc<dyn StorageAdapter>,
        config: &QueueConfig,
    ) -> Self {
        Self {
            queue,
            storage,
            rules: RuleEngine::new(),
            queue_name: config.name.clone(),
            poll_interval: config.poll_interval(),
            cache: None,
        }
    }

    /// Evict this cache after each persist. Use when the consumer shares a
    /// process with the orchestrator.
    pub fn with_cache(mut self, cache: Arc<RecommendationCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Generate and persist recommendations for one request.
    pub async fn handle(&self, request: &GenerationRequest) -> Result<HandleOutcome, TidewellError> {
        if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&request.window_days) {
            return Err(TidewellError::Validation(format!(
                "window_days must be between {MIN_WINDOW_DAYS} and {MAX_WINDOW_DAYS}, got {}",
                request.window_days
            )));
        }

        let to = Utc::now().date_naive();
        let from = to
            .checked_sub_days(Days::new(u64::from(request.window_days)))
            .unwrap_or(to);
        let samples = self
            .storage
            .samples_in_range(&request.user_id, from, to)
            .await?;

        let drafts = self.rules.generate(&request.user_id, &samples);
        let saved = self
            .storage
            .save_recommendations_for_request(&request.request_id, &drafts)
            .await?;

        let outcome = match saved {
            Some(records) => {
                if let Some(cache) = &self.cache {
                    cache.evict(&request.user_id);
                }
                HandleOutcome::Persisted(records.len())
            }
            None => {
                info!(request_id = %request.request_id, "request already processed, skipping persist");
                HandleOutcome::Duplicate
            }
        };
        Ok(outcome)
    }

    /// Decode and handle one delivered entry.
    pub async fn process_entry(&self, entry: &QueueEntry) -> Result<HandleOutcome, TidewellError> {
        let request: GenerationRequest = serde_json::from_str(&entry.payload)?;
        self.handle(&request).await
    }

    /// Run one poll cycle. Returns `true` if an entry was delivered.
    pub async fn poll_once(&self) -> Result<bool, TidewellError> {
        let expired = self.queue.purge_expired(&self.queue_name).await?;
        if expired > 0 {
            warn!(queue = %self.queue_name, count = expired, "expired undelivered requests");
        }

        let Some(entry) = self.queue.dequeue(&self.queue_name).await? else {
            return Ok(false);
        };
        debug!(queue_id = entry.id, attempt = entry.attempts, "delivered queue entry");

        match self.process_entry(&entry).await {
            Ok(outcome) => {
                self.queue.ack(entry.id).await?;
                info!(queue_id = entry.id, ?outcome, "queue entry processed");
            }
            Err(e) => {
                error!(
                    queue_id = entry.id,
                    attempt = entry.attempts,
                    max_attempts = entry.max_attempts,
                    error = %e,
                    "failed to process queue entry"
                );
                self.queue.fail(entry.id).await?;
            }
        }
        Ok(true)
    }

    /// Poll until `cancel` fires. Sleeps for the poll interval when idle.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(queue = %self.queue_name, "consumer started");
        while !cancel.is_cancelled() {
            let idle = match self.poll_once().await {
                Ok(delivered) => !delivered,
                Err(e) => {
                    error!(queue = %self.queue_name, error = %e, "consumer poll failed");
                    true
                }
            };
            if idle {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(self.poll_interval) => {}
                }
            }
        }
        info!(queue = %self.queue_name, "consumer stopped");
    }
}
