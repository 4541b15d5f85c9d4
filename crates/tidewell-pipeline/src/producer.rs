// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Producer side of queue dispatch.

use std::sync::Arc;
use std::time::Duration;

use tidewell_config::model::QueueConfig;
use tidewell_core::{GenerationRequest, QueueAdapter, TidewellError};
use tracing::info;

/// Serializes generation requests onto the durable queue.
#[derive(Clone)]
pub struct Producer {
    queue: Arc<dyn QueueAdapter>,
    queue_name: String,
    ttl: Duration,
}

impl Producer {
    pub fn new(queue: Arc<dyn QueueAdapter>, config: &QueueConfig) -> Self {
        Self {
            queue,
            queue_name: config.name.clone(),
            ttl: config.message_ttl(),
        }
    }

    pub fn queue_name(&self) -> &str {
        &self.queue_name
    }

    /// Enqueue `request`. Returns the queue entry id once the write commits.
    pub async fn submit(&self, request: &GenerationRequest) -> Result<i64, TidewellError> {
        let payload = serde_json::to_string(request)?;
        let id = self.queue.enqueue(&self.queue_name, &payload, self.ttl).await?;
        info!(
            queue_id = id,
            queue = %self.queue_name,
            user_id = %request.user_id,
            request_id = %request.request_id,
            window_days = request.window_days,
            "generation request enqueued"
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewell_config::model::StorageConfig;
    use tidewell_core::StorageAdapter;
    use tidewell_storage::SqliteStorage;

    #[tokio::test]
    async fn submit_writes_json_payload() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("p.db").display().to_string(),
            ..StorageConfig::default()
        }));
        storage.initialize().await.unwrap();

        let producer = Producer::new(storage.clone(), &QueueConfig::default());
        let request = GenerationRequest::new("u1", 14);
        let id = producer.submit(&request).await.unwrap();

        let entry = storage.dequeue("recommendations").await.unwrap().unwrap();
        assert_eq!(entry.id, id);
        let decoded: GenerationRequest = serde_json::from_str(&entry.payload).unwrap();
        assert_eq!(decoded, request);
    }
}
