// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mood sample queries.

use chrono::NaiveDate;
use rusqlite::params;
use tidewell_core::{MoodSample, TidewellError};

use crate::database::{Database, map_tr_err};

/// Insert a sample. Fails with a storage error if the user already has a
/// sample for that date.
pub async fn insert_sample(db: &Database, sample: &MoodSample) -> Result<(), TidewellError> {
    let sample = sample.clone();
    let tags = serde_json::to_string(&sample.tags)?;
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO mood_samples (user_id, date, mood, stress, productivity, notes, tags)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    sample.user_id,
                    sample.date,
                    sample.mood,
                    sample.stress,
                    sample.productivity,
                    sample.notes,
                    tags,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Samples for a user with `from <= date <= to`, most recent first.
pub async fn samples_in_range(
    db: &Database,
    user_id: &str,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<MoodSample>, TidewellError> {
    let user_id = user_id.to_string();
    let rows = db
        .connection()
        .call(move |conn| -> Result<Vec<(MoodSample, String)>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT user_id, date, mood, stress, productivity, notes, tags
                 FROM mood_samples
                 WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
                 ORDER BY date DESC",
            )?;
            let rows = stmt.query_map(params![user_id, from, to], |row| {
                Ok((
                    MoodSample {
                        user_id: row.get(0)?,
                        date: row.get(1)?,
                        mood: row.get(2)?,
                        stress: row.get(3)?,
                        productivity: row.get(4)?,
                        notes: row.get(5)?,
                        tags: Vec::new(),
                    },
                    row.get::<_, String>(6)?,
                ))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    rows.into_iter()
        .map(|(mut sample, tags)| {
            sample.tags = serde_json::from_str(&tags)?;
            Ok(sample)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("samples.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[tokio::test]
    async fn range_is_inclusive_and_most_recent_first() {
        let (db, _dir) = setup_db().await;
        for d in 1..=5 {
            insert_sample(&db, &MoodSample::new("u1", day(d), 3, 3, 3))
                .await
                .unwrap();
        }
        insert_sample(&db, &MoodSample::new("u2", day(3), 1, 5, 1))
            .await
            .unwrap();

        let found = samples_in_range(&db, "u1", day(2), day(4)).await.unwrap();
        let dates: Vec<_> = found.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(4), day(3), day(2)]);
        assert!(found.iter().all(|s| s.user_id == "u1"));
    }

    #[tokio::test]
    async fn notes_and_tags_round_trip() {
        let (db, _dir) = setup_db().await;
        let mut sample = MoodSample::new("u1", day(7), 2, 4, 3);
        sample.notes = Some("deadline week".into());
        sample.tags = vec!["work".into(), "sleep".into()];
        insert_sample(&db, &sample).await.unwrap();

        let found = samples_in_range(&db, "u1", day(7), day(7)).await.unwrap();
        assert_eq!(found, vec![sample]);
    }

    #[tokio::test]
    async fn duplicate_day_is_rejected() {
        let (db, _dir) = setup_db().await;
        insert_sample(&db, &MoodSample::new("u1", day(1), 3, 3, 3))
            .await
            .unwrap();
        let dup = insert_sample(&db, &MoodSample::new("u1", day(1), 4, 4, 4)).await;
        assert!(matches!(dup, Err(TidewellError::Storage { .. })));
    }

    #[tokio::test]
    async fn out_of_range_scores_violate_schema() {
        let (db, _dir) = setup_db().await;
        let bad = insert_sample(&db, &MoodSample::new("u1", day(1), 0, 3, 3)).await;
        assert!(bad.is_err());
    }
}
