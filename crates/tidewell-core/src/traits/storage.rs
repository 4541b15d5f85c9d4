// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for sample and recommendation persistence.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::TidewellError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{MoodSample, Recommendation, RecommendationDraft};

/// Adapter for the persistence collaborator.
///
/// Owns mood samples and recommendations. Recommendations are immutable once
/// saved; identifiers and creation timestamps are assigned here.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), TidewellError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TidewellError>;

    /// Insert one sample. At most one sample may exist per (user, date).
    async fn insert_sample(&self, sample: &MoodSample) -> Result<(), TidewellError>;

    /// All samples for `user_id` with `from <= date <= to`, most recent first.
    async fn samples_in_range(
        &self,
        user_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<MoodSample>, TidewellError>;

    /// Persist drafts in order and return the stored recommendations.
    async fn save_recommendations(
        &self,
        drafts: &[RecommendationDraft],
    ) -> Result<Vec<Recommendation>, TidewellError>;

    /// Persist drafts on behalf of a queued request.
    ///
    /// Returns `None` without writing anything if `request_id` was already
    /// processed. The ledger entry and the inserts commit atomically.
    async fn save_recommendations_for_request(
        &self,
        request_id: &str,
        drafts: &[RecommendationDraft],
    ) -> Result<Option<Vec<Recommendation>>, TidewellError>;

    /// Recommendations for `user_id`, most recent first. `None` applies the
    /// backend's default cap.
    async fn list_recommendations(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<Recommendation>, TidewellError>;
}
