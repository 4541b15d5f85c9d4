// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic rule engine.
//!
//! Maps a window of mood samples to recommendations using six independent
//! threshold rules evaluated in a fixed order. Pure: no I/O, no state.

use tidewell_core::{MoodSample, RecommendationDraft, RecommendationSource, RecommendationType};
use tracing::debug;

pub const START_TRACKING_MESSAGE: &str =
    "Start tracking your mood daily to receive personalized recommendations!";
pub const BREATHING_MESSAGE: &str =
    "Your stress levels have been high. Try a 3-minute breathing exercise.";
pub const FOCUS_MESSAGE: &str = "Silence notifications for 20 minutes and try a focus playlist.";
pub const STRETCH_MESSAGE: &str = "Take a 5-minute stretch break to reset your posture and mood.";
pub const BREAK_MESSAGE: &str =
    "Consider taking a longer break. Your stress levels are consistently high.";
pub const MUSIC_MESSAGE: &str = "Listen to uplifting music to boost your mood.";
pub const BALANCE_MESSAGE: &str =
    "Great work-life balance! Consider leaving on time to reduce office energy consumption.";
pub const HYDRATION_MESSAGE: &str =
    "You're doing great! Remember to stay hydrated throughout the day.";

/// A score at or above this counts as high stress.
const HIGH_STRESS: u8 = 4;
/// A score at or below this counts as low mood or low productivity.
const LOW_SCORE: u8 = 2;
/// Occurrences needed before a count-based rule fires.
const MIN_OCCURRENCES: usize = 2;

/// Aggregates computed over a sample window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoodMetrics {
    pub sample_count: usize,
    pub high_stress_days: usize,
    pub low_productivity_days: usize,
    pub low_mood_days: usize,
    pub avg_stress: f64,
    pub avg_mood: f64,
    pub avg_productivity: f64,
}

impl MoodMetrics {
    /// Returns `None` for an empty window.
    pub fn compute(samples: &[MoodSample]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = |f: fn(&MoodSample) -> u8| samples.iter().map(|s| f64::from(f(s))).sum::<f64>() / n;
        Some(Self {
            sample_count: samples.len(),
            high_stress_days: samples.iter().filter(|s| s.stress >= HIGH_STRESS).count(),
            low_productivity_days: samples.iter().filter(|s| s.productivity <= LOW_SCORE).count(),
            low_mood_days: samples.iter().filter(|s| s.mood <= LOW_SCORE).count(),
            avg_stress: mean(|s| s.stress),
            avg_mood: mean(|s| s.mood),
            avg_productivity: mean(|s| s.productivity),
        })
    }
}

/// One threshold rule: a predicate over the metrics and what it recommends.
struct Rule {
    name: &'static str,
    applies: fn(&MoodMetrics) -> bool,
    kind: RecommendationType,
    message: &'static str,
}

/// Evaluation order is output order.
const RULES: &[Rule] = &[
    Rule {
        name: "frequent_high_stress",
        applies: |m| m.high_stress_days >= MIN_OCCURRENCES,
        kind: RecommendationType::Breathing,
        message: BREATHING_MESSAGE,
    },
    Rule {
        name: "low_productivity_under_stress",
        applies: |m| m.low_productivity_days >= MIN_OCCURRENCES && m.avg_stress >= 3.5,
        kind: RecommendationType::Focus,
        message: FOCUS_MESSAGE,
    },
    Rule {
        name: "frequent_low_mood",
        applies: |m| m.low_mood_days >= MIN_OCCURRENCES,
        kind: RecommendationType::Stretch,
        message: STRETCH_MESSAGE,
    },
    Rule {
        name: "sustained_stress",
        applies: |m| m.avg_stress >= 4.0,
        kind: RecommendationType::Break,
        message: BREAK_MESSAGE,
    },
    Rule {
        name: "low_average_mood",
        applies: |m| m.avg_mood <= 2.5,
        kind: RecommendationType::Music,
        message: MUSIC_MESSAGE,
    },
    Rule {
        name: "healthy_balance",
        applies: |m| m.avg_productivity >= 4.0 && m.avg_stress <= 2.5,
        kind: RecommendationType::Custom,
        message: BALANCE_MESSAGE,
    },
];

/// The deterministic recommendation engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEngine;

impl RuleEngine {
    pub fn new() -> Self {
        Self
    }

    /// Recommendations for `user_id` from `samples`. Never empty.
    pub fn generate(&self, user_id: &str, samples: &[MoodSample]) -> Vec<RecommendationDraft> {
        let rule = |kind, message: &str| {
            RecommendationDraft::new(user_id, kind, message, RecommendationSource::Rule)
        };

        let Some(metrics) = MoodMetrics::compute(samples) else {
            return vec![rule(RecommendationType::Custom, START_TRACKING_MESSAGE)];
        };
        debug!(user_id, ?metrics, "computed mood metrics");

        let mut out: Vec<RecommendationDraft> = RULES
            .iter()
            .filter(|r| (r.applies)(&metrics))
            .inspect(|r| debug!(user_id, rule = r.name, "rule matched"))
            .map(|r| rule(r.kind, r.message))
            .collect();

        if out.is_empty() {
            out.push(rule(RecommendationType::Hydration, HYDRATION_MESSAGE));
        }
        out
    }
}
