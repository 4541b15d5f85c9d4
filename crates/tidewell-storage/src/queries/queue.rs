// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for at-least-once request delivery.
//!
//! An entry is deliverable while it has not expired and is either `pending`
//! or `processing` with a lapsed lock and attempts left. Every dequeue counts
//! as one attempt.

use std::str::FromStr;
use std::time::Duration;

use rusqlite::params;
use tidewell_core::{QueueEntry, QueueStatus, TidewellError};

use crate::database::{Database, map_tr_err};

const ENTRY_COLUMNS: &str = "id, queue_name, payload, status, attempts, max_attempts,
     created_at, updated_at, locked_until, expires_at";

/// SQLite datetime modifier for a duration, e.g. `+3600.000 seconds`.
fn offset_modifier(duration: Duration) -> String {
    format!("+{:.3} seconds", duration.as_secs_f64())
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    let status: String = row.get(3)?;
    let status = QueueStatus::from_str(&status).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(QueueEntry {
        id: row.get(0)?,
        queue_name: row.get(1)?,
        payload: row.get(2)?,
        status,
        attempts: row.get(4)?,
        max_attempts: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
        locked_until: row.get(8)?,
        expires_at: row.get(9)?,
    })
}

/// Enqueue a new item that expires `ttl` from now. Returns the entry ID.
pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
    ttl: Duration,
    max_attempts: i32,
) -> Result<i64, TidewellError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    let expiry = offset_modifier(ttl);
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.execute(
                "INSERT INTO queue (queue_name, payload, max_attempts, expires_at)
                 VALUES (?1, ?2, ?3, strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?4))",
                params![queue_name, payload, max_attempts, expiry],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Dequeue the next deliverable entry from the named queue.
///
/// Atomically selects the oldest deliverable entry, marks it `processing`,
/// bumps its attempt count and locks it for `lock_timeout`. Returns `None`
/// if nothing is deliverable.
pub async fn dequeue(
    db: &Database,
    queue_name: &str,
    lock_timeout: Duration,
) -> Result<Option<QueueEntry>, TidewellError> {
    let queue_name = queue_name.to_string();
    let lock = offset_modifier(lock_timeout);
    db.connection()
        .call(move |conn| -> Result<Option<QueueEntry>, rusqlite::Error> {
            let tx = conn.transaction()?;

            let result = {
                let sql = format!(
                    "SELECT {ENTRY_COLUMNS}
                     FROM queue
                     WHERE queue_name = ?1
                       AND expires_at > strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                       AND (status = 'pending'
                            OR (status = 'processing'
                                AND locked_until <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                                AND attempts < max_attempts))
                     ORDER BY id ASC
                     LIMIT 1"
                );
                let mut stmt = tx.prepare(&sql)?;
                stmt.query_row(params![queue_name], row_to_entry)
            };

            match result {
                Ok(entry) => {
                    tx.execute(
                        "UPDATE queue SET status = 'processing',
                         attempts = attempts + 1,
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', ?2),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![entry.id, lock],
                    )?;
                    let sql = format!("SELECT {ENTRY_COLUMNS} FROM queue WHERE id = ?1");
                    let updated = tx.query_row(&sql, params![entry.id], row_to_entry)?;
                    tx.commit()?;
                    Ok(Some(updated))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Acknowledge successful processing of a queue entry.
pub async fn ack(db: &Database, id: i64) -> Result<(), TidewellError> {
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(TidewellError::Queue {
            message: format!("no queue entry with id {id}"),
        });
    }
    Ok(())
}

/// Mark a delivery of a queue entry as failed.
///
/// If the attempt budget is spent the entry becomes `failed`. Otherwise it
/// returns to `pending` with its lock cleared.
pub async fn fail(db: &Database, id: i64) -> Result<QueueStatus, TidewellError> {
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Option<bool>, rusqlite::Error> {
            let counts: Result<(i32, i32), _> = conn.query_row(
                "SELECT attempts, max_attempts FROM queue WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            );
            let (attempts, max_attempts) = match counts {
                Ok(counts) => counts,
                Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                Err(e) => return Err(e),
            };

            let exhausted = attempts >= max_attempts;
            let status = if exhausted { "failed" } else { "pending" };
            conn.execute(
                "UPDATE queue SET status = ?1,
                 locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(Some(exhausted))
        })
        .await
        .map_err(map_tr_err)?;

    match outcome {
        Some(true) => Ok(QueueStatus::Failed),
        Some(false) => Ok(QueueStatus::Pending),
        None => Err(TidewellError::Queue {
            message: format!("no queue entry with id {id}"),
        }),
    }
}

/// Mark undelivered entries whose expiry has passed as `expired`.
pub async fn purge_expired(db: &Database, queue_name: &str) -> Result<u64, TidewellError> {
    let queue_name = queue_name.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE queue SET status = 'expired',
                 locked_until = NULL,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE queue_name = ?1
                   AND status IN ('pending', 'processing')
                   AND expires_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![queue_name],
            )
        })
        .await
        .map_err(map_tr_err)?;
    Ok(changed as u64)
}

/// Fetch one entry by id, regardless of status.
pub async fn get_entry(db: &Database, id: i64) -> Result<Option<QueueEntry>, TidewellError> {
    db.connection()
        .call(move |conn| -> Result<Option<QueueEntry>, rusqlite::Error> {
            let sql = format!("SELECT {ENTRY_COLUMNS} FROM queue WHERE id = ?1");
            match conn.query_row(&sql, params![id], row_to_entry) {
                Ok(entry) => Ok(Some(entry)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Number of entries in the named queue with the given status.
pub async fn count_by_status(
    db: &Database,
    queue_name: &str,
    status: QueueStatus,
) -> Result<i64, TidewellError> {
    let queue_name = queue_name.to_string();
    let status = status.to_string();
    db.connection()
        .call(move |conn| -> Result<i64, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*) FROM queue WHERE queue_name = ?1 AND status = ?2",
                params![queue_name, status],
                |row| row.get(0),
            )
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const HOUR: Duration = Duration::from_secs(3600);
    const LOCK: Duration = Duration::from_secs(300);

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("queue.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn enqueue_and_dequeue() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "recommendations", r#"{"user_id":"u1"}"#, HOUR, 3)
            .await
            .unwrap();
        assert!(id > 0);

        let entry = dequeue(&db, "recommendations", LOCK).await.unwrap().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.status, QueueStatus::Processing);
        assert_eq!(entry.attempts, 1);
        assert_eq!(entry.max_attempts, 3);
        assert!(entry.locked_until.is_some());
        assert!(entry.expires_at > entry.created_at);
    }

    #[tokio::test]
    async fn dequeue_empty_queue_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(dequeue(&db, "recommendations", LOCK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn dequeue_is_fifo_and_scoped_by_name() {
        let (db, _dir) = setup_db().await;
        let first = enqueue(&db, "a", "1", HOUR, 3).await.unwrap();
        let _other = enqueue(&db, "b", "x", HOUR, 3).await.unwrap();
        let second = enqueue(&db, "a", "2", HOUR, 3).await.unwrap();

        assert_eq!(dequeue(&db, "a", LOCK).await.unwrap().unwrap().id, first);
        assert_eq!(dequeue(&db, "a", LOCK).await.unwrap().unwrap().id, second);
        assert!(dequeue(&db, "a", LOCK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn locked_entry_is_not_redelivered() {
        let (db, _dir) = setup_db().await;
        enqueue(&db, "q", "p", HOUR, 3).await.unwrap();
        assert!(dequeue(&db, "q", LOCK).await.unwrap().is_some());
        assert!(dequeue(&db, "q", LOCK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lapsed_lock_is_redelivered() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "q", "p", HOUR, 3).await.unwrap();
        let first = dequeue(&db, "q", Duration::ZERO).await.unwrap().unwrap();
        assert_eq!(first.attempts, 1);

        let again = dequeue(&db, "q", LOCK).await.unwrap().unwrap();
        assert_eq!(again.id, id);
        assert_eq!(again.attempts, 2);
    }

    #[tokio::test]
    async fn lapsed_lock_respects_attempt_budget() {
        let (db, _dir) = setup_db().await;
        enqueue(&db, "q", "p", HOUR, 1).await.unwrap();
        assert!(dequeue(&db, "q", Duration::ZERO).await.unwrap().is_some());
        assert!(dequeue(&db, "q", Duration::ZERO).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ack_marks_completed() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "q", "p", HOUR, 3).await.unwrap();
        dequeue(&db, "q", LOCK).await.unwrap();
        ack(&db, id).await.unwrap();

        let entry = get_entry(&db, id).await.unwrap().unwrap();
        assert_eq!(entry.status, QueueStatus::Completed);
        assert!(entry.locked_until.is_none());
        assert!(dequeue(&db, "q", Duration::ZERO).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ack_unknown_id_is_queue_error() {
        let (db, _dir) = setup_db().await;
        assert!(matches!(
            ack(&db, 42).await,
            Err(TidewellError::Queue { .. })
        ));
    }

    #[tokio::test]
    async fn fail_requeues_until_budget_spent() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "q", "p", HOUR, 2).await.unwrap();

        dequeue(&db, "q", LOCK).await.unwrap().unwrap();
        assert_eq!(fail(&db, id).await.unwrap(), QueueStatus::Pending);
        let entry = get_entry(&db, id).await.unwrap().unwrap();
        assert_eq!(entry.status, QueueStatus::Pending);
        assert!(entry.locked_until.is_none());

        let again = dequeue(&db, "q", LOCK).await.unwrap().unwrap();
        assert_eq!(again.attempts, 2);
        assert_eq!(fail(&db, id).await.unwrap(), QueueStatus::Failed);
        assert_eq!(
            get_entry(&db, id).await.unwrap().unwrap().status,
            QueueStatus::Failed
        );
        assert!(dequeue(&db, "q", LOCK).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_not_delivered_and_get_purged() {
        let (db, _dir) = setup_db().await;
        let stale = enqueue(&db, "q", "old", Duration::ZERO, 3).await.unwrap();
        let fresh = enqueue(&db, "q", "new", HOUR, 3).await.unwrap();

        let delivered = dequeue(&db, "q", LOCK).await.unwrap().unwrap();
        assert_eq!(delivered.id, fresh);

        assert_eq!(purge_expired(&db, "q").await.unwrap(), 1);
        assert_eq!(
            get_entry(&db, stale).await.unwrap().unwrap().status,
            QueueStatus::Expired
        );
        assert_eq!(purge_expired(&db, "q").await.unwrap(), 0);
        assert_eq!(count_by_status(&db, "q", QueueStatus::Processing).await.unwrap(), 1);
    }
}
