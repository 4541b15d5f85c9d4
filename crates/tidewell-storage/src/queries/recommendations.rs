// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation persistence and the processed-request ledger.

use std::str::FromStr;

use rusqlite::{Transaction, params};
use tidewell_core::types::{MAX_MESSAGE_CHARS, truncate_chars};
use tidewell_core::{
    Recommendation, RecommendationDraft, RecommendationSource, RecommendationType, TidewellError,
};

use crate::database::{Database, map_tr_err, now_timestamp};

/// Assign ids and the creation timestamp, capping message length.
fn materialize(drafts: &[RecommendationDraft]) -> Vec<Recommendation> {
    let created_at = now_timestamp();
    drafts
        .iter()
        .map(|draft| Recommendation {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: draft.user_id.clone(),
            kind: draft.kind,
            message: truncate_chars(&draft.message, MAX_MESSAGE_CHARS),
            action_url: draft.action_url.clone(),
            scheduled_at: draft.scheduled_at.clone(),
            source: draft.source,
            created_at: created_at.clone(),
        })
        .collect()
}

fn insert_all(tx: &Transaction<'_>, records: &[Recommendation]) -> Result<(), rusqlite::Error> {
    let mut stmt = tx.prepare(
        "INSERT INTO recommendations
         (id, user_id, type, message, action_url, scheduled_at, source, created_at, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for (position, rec) in records.iter().enumerate() {
        stmt.execute(params![
            rec.id,
            rec.user_id,
            rec.kind.to_string(),
            rec.message,
            rec.action_url,
            rec.scheduled_at,
            rec.source.to_string(),
            rec.created_at,
            position as i64,
        ])?;
    }
    Ok(())
}

/// Persist drafts in one transaction and return the stored records in order.
pub async fn save_recommendations(
    db: &Database,
    drafts: &[RecommendationDraft],
) -> Result<Vec<Recommendation>, TidewellError> {
    let records = materialize(drafts);
    if records.is_empty() {
        return Ok(records);
    }
    db.connection()
        .call(move |conn| -> Result<Vec<Recommendation>, rusqlite::Error> {
            let tx = conn.transaction()?;
            insert_all(&tx, &records)?;
            tx.commit()?;
            Ok(records)
        })
        .await
        .map_err(map_tr_err)
}

/// Persist drafts for a queued request, at most once per `request_id`.
///
/// The ledger row and the inserts share a transaction. Returns `None` when
/// the request was already processed, in which case nothing is written.
pub async fn save_recommendations_for_request(
    db: &Database,
    request_id: &str,
    drafts: &[RecommendationDraft],
) -> Result<Option<Vec<Recommendation>>, TidewellError> {
    let request_id = request_id.to_string();
    let user_id = drafts.first().map(|d| d.user_id.clone()).unwrap_or_default();
    let records = materialize(drafts);
    db.connection()
        .call(move |conn| -> Result<Option<Vec<Recommendation>>, rusqlite::Error> {
            let tx = conn.transaction()?;
            let claimed = tx.execute(
                "INSERT OR IGNORE INTO processed_requests (request_id, user_id, recommendation_count)
                 VALUES (?1, ?2, ?3)",
                params![request_id, user_id, records.len() as i64],
            )?;
            if claimed == 0 {
                tx.rollback()?;
                return Ok(None);
            }
            insert_all(&tx, &records)?;
            tx.commit()?;
            Ok(Some(records))
        })
        .await
        .map_err(map_tr_err)
}

/// Recommendations for a user, most recent batch first, at most `limit` rows.
/// Rows of one batch keep the order they were generated in.
pub async fn list_recommendations(
    db: &Database,
    user_id: &str,
    limit: i64,
) -> Result<Vec<Recommendation>, TidewellError> {
    let user_id = user_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<(Recommendation, String, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, type, message, action_url, scheduled_at, source, created_at
                 FROM recommendations
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid - position DESC, position ASC
                 LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![user_id, limit], |row| {
                Ok((
                    Recommendation {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        kind: RecommendationType::Custom,
                        message: row.get(3)?,
                        action_url: row.get(4)?,
                        scheduled_at: row.get(5)?,
                        source: RecommendationSource::Rule,
                        created_at: row.get(7)?,
                    },
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(6)?,
                ))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(mut rec, kind, source)| {
            rec.kind = RecommendationType::from_token(&kind);
            rec.source = RecommendationSource::from_str(&source).map_err(|_| {
                TidewellError::storage(std::io::Error::other(format!(
                    "unknown recommendation source in storage: {source}"
                )))
            })?;
            Ok(rec)
        })
        .collect()
}
