// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue adapter trait for durable, at-least-once message transport.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TidewellError;
use crate::traits::adapter::PluginAdapter;
use crate::types::QueueEntry;

/// Durable point-to-point queue with bounded message lifetime.
///
/// Each dequeue locks the entry for one consumer. An entry whose lock lapses
/// without `ack` or `fail` becomes deliverable again, so delivery is
/// at-least-once end-to-end.
#[async_trait]
pub trait QueueAdapter: PluginAdapter {
    /// Enqueue a payload. The entry expires if not acknowledged within `ttl`.
    /// Returns the queue entry id.
    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        ttl: Duration,
    ) -> Result<i64, TidewellError>;

    /// Take the next deliverable entry from the named queue, if any.
    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, TidewellError>;

    /// Acknowledge successful processing.
    async fn ack(&self, id: i64) -> Result<(), TidewellError>;

    /// Report a failed delivery. The entry returns to `pending` until its
    /// attempt budget is spent, then becomes `failed`.
    async fn fail(&self, id: i64) -> Result<(), TidewellError>;

    /// Mark undelivered entries past their expiry as `expired`.
    /// Returns the number of entries expired.
    async fn purge_expired(&self, queue_name: &str) -> Result<u64, TidewellError>;
}
