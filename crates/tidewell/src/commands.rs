// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tidewell generate`, `tidewell list` and `tidewell record`.

use chrono::{NaiveDate, Utc};
use tidewell_config::model::TidewellConfig;
use tidewell_core::types::{MAX_SCORE, MIN_SCORE};
use tidewell_core::{MoodSample, Recommendation, StorageAdapter, TidewellError};

use crate::app::App;

/// Arguments of `tidewell record`.
#[derive(Debug, Clone)]
pub struct RecordInput {
    pub user: String,
    pub date: Option<NaiveDate>,
    pub mood: u8,
    pub stress: u8,
    pub productivity: u8,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl RecordInput {
    fn into_sample(self) -> Result<MoodSample, TidewellError> {
        let date = self.date.unwrap_or_else(|| Utc::now().date_naive());
        let mut sample = MoodSample::new(self.user, date, self.mood, self.stress, self.productivity);
        sample.notes = self.notes;
        sample.tags = self.tags;

        if let Some(field) = sample.out_of_range_score() {
            return Err(TidewellError::Validation(format!(
                "{field} must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }
        Ok(sample)
    }
}

pub async fn run_generate(
    config: TidewellConfig,
    user: &str,
    days: u32,
    sync: bool,
) -> Result<(), TidewellError> {
    let app = App::open(config, sync).await?;
    let saved = app.orchestrator.generate(user, days).await?;
    if app.orchestrator.is_async() {
        println!("queued generation for {user} over the last {days} days");
    } else {
        print_recommendations(&saved);
    }
    app.close().await
}

pub async fn run_list(
    config: TidewellConfig,
    user: &str,
    limit: Option<i64>,
) -> Result<(), TidewellError> {
    let app = App::open(config, false).await?;
    let listing = app.orchestrator.list(user, limit).await?;
    if listing.is_empty() {
        println!("no recommendations for {user}");
    } else {
        print_recommendations(&listing);
    }
    app.close().await
}

pub async fn run_record(config: TidewellConfig, input: RecordInput) -> Result<(), TidewellError> {
    let sample = input.into_sample()?;
    let app = App::open(config, false).await?;
    app.storage.insert_sample(&sample).await?;
    println!(
        "recorded {} for {}: mood {}, stress {}, productivity {}",
        sample.date, sample.user_id, sample.mood, sample.stress, sample.productivity
    );
    app.close().await
}

fn print_recommendations(records: &[Recommendation]) {
    for record in records {
        println!("{}", format_recommendation(record));
    }
}

/// One output line: `<created_at>  <type>  <source>  <message>`.
pub fn format_recommendation(record: &Recommendation) -> String {
    format!(
        "{}  {:<9}  {:<4}  {}",
        record.created_at,
        record.kind.label(),
        record.source.label(),
        record.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidewell_core::{RecommendationSource, RecommendationType};

    fn input(mood: u8, stress: u8, productivity: u8) -> RecordInput {
        RecordInput {
            user: "u1".into(),
            date: NaiveDate::from_ymd_opt(2026, 6, 1),
            mood,
            stress,
            productivity,
            notes: Some("long day".into()),
            tags: vec!["work".into()],
        }
    }

    #[test]
    fn record_input_builds_sample() {
        let sample = input(3, 4, 2).into_sample().unwrap();
        assert_eq!(sample.date, NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(sample.notes.as_deref(), Some("long day"));
        assert_eq!(sample.tags, vec!["work"]);
    }

    #[test]
    fn record_input_rejects_out_of_range_scores() {
        let err = input(3, 6, 2).into_sample().unwrap_err();
        assert!(matches!(err, TidewellError::Validation(ref m) if m.contains("stress")));
        assert!(input(0, 3, 3).into_sample().is_err());
    }

    #[test]
    fn recommendation_line_uses_lower_case_labels() {
        let line = format_recommendation(&Recommendation {
            id: "r1".into(),
            user_id: "u1".into(),
            kind: RecommendationType::Breathing,
            message: "Breathe slowly.".into(),
            action_url: None,
            scheduled_at: None,
            source: RecommendationSource::Rule,
            created_at: "2026-06-01T08:00:00.000Z".into(),
        });
        assert!(line.contains("breathing"));
        assert!(line.contains("rule"));
        assert!(line.ends_with("Breathe slowly."));
    }
}
