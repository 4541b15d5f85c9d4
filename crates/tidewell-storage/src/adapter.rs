// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter and QueueAdapter traits.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::OnceCell;
use tracing::debug;

use tidewell_config::model::{QueueConfig, StorageConfig};
use tidewell_core::{
    AdapterType, HealthStatus, MoodSample, PluginAdapter, QueueAdapter, QueueEntry,
    Recommendation, RecommendationDraft, StorageAdapter, TidewellError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage and queue adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is lazily initialized on the first
/// call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    max_attempts: i32,
    lock_timeout: Duration,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration and default
    /// queue settings.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: StorageAdapter::initialize
    pub fn new(config: StorageConfig) -> Self {
        let queue = QueueConfig::default();
        Self {
            config,
            max_attempts: queue.max_attempts,
            lock_timeout: queue.lock_timeout(),
            db: OnceCell::new(),
        }
    }

    /// Apply the attempt budget and lock timeout used for queue deliveries.
    pub fn with_queue_config(mut self, queue: &QueueConfig) -> Self {
        self.max_attempts = queue.max_attempts;
        self.lock_timeout = queue.lock_timeout();
        self
    }

    /// Returns a reference to the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, TidewellError> {
        self.db.get().ok_or_else(|| TidewellError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// A positive limit is used as given; anything else means the default cap.
    fn effective_limit(&self, limit: Option<i64>) -> i64 {
        match limit {
            Some(n) if n > 0 => n,
            _ => self.config.default_list_cap.max(1),
        }
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TidewellError> {
        let Some(db) = self.db.get() else {
            return Ok(HealthStatus::Unhealthy("storage not initialized".into()));
        };
        db.connection()
            .call(|conn| -> Result<i64, rusqlite::Error> {
                conn.query_row("SELECT 1", [], |row| row.get(0))
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TidewellError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TidewellError> {
        let path = self.config.database_path.clone();
        if let Some(parent) = std::path::Path::new(&path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(TidewellError::storage)?;
            }
        }
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TidewellError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TidewellError> {
        self.db()?.close().await
    }

    // --- Samples ---

    async fn insert_sample(&self, sample: &MoodSample) -> Result<(), TidewellError> {
        queries::samples::insert_sample(self.db()?, sample).await
    }

    async fn samples_in_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodSample>, TidewellError> {
        queries::samples::samples_in_range(self.db()?, user_id, from, to).await
    }

    // --- Recommendations ---

    async fn save_recommendations(
        &self,
        drafts: &[RecommendationDraft],
    ) -> Result<Vec<Recommendation>, TidewellError> {
        queries::recommendations::save_recommendations(self.db()?, drafts).await
    }

    async fn save_recommendations_for_request(
        &self,
        request_id: &str,
        drafts: &[RecommendationDraft],
    ) -> Result<Option<Vec<Recommendation>>, TidewellError> {
        queries::recommendations::save_recommendations_for_request(self.db()?, request_id, drafts)
            .await
    }

    async fn list_recommendations(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, TidewellError> {
        let limit = self.effective_limit(limit);
        queries::recommendations::list_recommendations(self.db()?, user_id, limit).await
    }
}

#[async_trait]
impl QueueAdapter for SqliteStorage {
    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<i64, TidewellError> {
        queries::queue::enqueue(self.db()?, queue_name, payload, ttl, self.max_attempts).await
    }

    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, TidewellError> {
        queries::queue::dequeue(self.db()?, queue_name, self.lock_timeout).await
    }

    async fn ack(&self, id: i64) -> Result<(), TidewellError> {
        queries::queue::ack(self.db()?, id).await
    }

    async fn fail(&self, id: i64) -> Result<(), TidewellError> {
        let status = queries::queue::fail(self.db()?, id).await?;
        debug!(queue_id = id, status = %status, "queue entry failed");
        Ok(())
    }

    async fn purge_expired(&self, queue_name: &str) -> Result<u64, TidewellError> {
        queries::queue::purge_expired(self.db()?, queue_name).await
    }
}
