// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All reads and writes are serialized through tokio-rusqlite's single
//! background thread. Do NOT create additional Connection instances for writes.

use tidewell_core::TidewellError;
use tracing::debug;

use crate::migrations;

/// Handle to the Tidewell SQLite database.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (creating if needed) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, TidewellError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, TidewellError> {
        let owned = path.to_string();
        tokio::task::spawn_blocking(move || prepare(&owned, wal_mode))
            .await
            .map_err(|e| TidewellError::Internal(format!("migration task panicked: {e}")))??;

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(TidewellError::storage)?;
        conn.call(|conn| -> Result<(), rusqlite::Error> { configure(conn) })
            .await
            .map_err(map_tr_err)?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The shared connection. Every query goes through `call()` on it.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the background connection.
    pub async fn close(&self) -> Result<(), TidewellError> {
        self.checkpoint().await?;
        self.conn.clone().close().await.map_err(map_tr_err)?;
        debug!("database closed");
        Ok(())
    }

    /// Fold the WAL back into the main database file.
    pub async fn checkpoint(&self) -> Result<(), TidewellError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Journal mode and schema, applied once on a short-lived synchronous connection.
fn prepare(path: &str, wal_mode: bool) -> Result<(), TidewellError> {
    let mut conn = rusqlite::Connection::open(path).map_err(TidewellError::storage)?;
    let journal = if wal_mode { "WAL" } else { "DELETE" };
    conn.pragma_update(None, "journal_mode", journal)
        .map_err(TidewellError::storage)?;
    configure(&conn).map_err(TidewellError::storage)?;
    migrations::run_migrations(&mut conn)
}

/// Per-connection pragmas.
fn configure(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA foreign_keys = ON;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = 5000;",
    )
}

/// Convert a tokio-rusqlite error into `TidewellError::Storage`.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> TidewellError {
    TidewellError::storage(e)
}

/// Current UTC time in the storage timestamp format.
pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn open_creates_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("schema.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();

        let tables: Vec<String> = db
            .connection()
            .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
                let mut stmt = conn.prepare(
                    "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
                )?;
                let rows = stmt.query_map([], |row| row.get(0))?;
                rows.collect()
            })
            .await
            .unwrap();

        for table in ["mood_samples", "processed_requests", "queue", "recommendations"] {
            assert!(tables.iter().any(|t| t == table), "missing table {table}");
        }
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reopening_is_idempotent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reopen.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn wal_mode_is_applied() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wal.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        let mode: String = db
            .connection()
            .call(|conn| -> Result<String, rusqlite::Error> {
                conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
