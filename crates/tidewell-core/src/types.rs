// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across Tidewell crates.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Lowest valid score for mood, stress, and productivity.
pub const MIN_SCORE: u8 = 1;
/// Highest valid score for mood, stress, and productivity.
pub const MAX_SCORE: u8 = 5;
/// Smallest generation window, in days.
pub const MIN_WINDOW_DAYS: u32 = 1;
/// Largest generation window, in days.
pub const MAX_WINDOW_DAYS: u32 = 30;
/// Window applied when a queued request omits one.
pub const DEFAULT_WINDOW_DAYS: u32 = 7;
/// Storage column limit for recommendation messages, in characters.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the kind of collaborator an adapter implements.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Queue,
}

/// One user's self-reported scores for a single calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodSample {
    pub user_id: String,
    pub date: NaiveDate,
    pub mood: u8,
    pub stress: u8,
    pub productivity: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl MoodSample {
    /// A sample with no notes or tags.
    pub fn new(user_id: impl Into<String>, date: NaiveDate, mood: u8, stress: u8, productivity: u8) -> Self {
        Self {
            user_id: user_id.into(),
            date,
            mood,
            stress,
            productivity,
            notes: None,
            tags: Vec::new(),
        }
    }

    /// Returns the name of the first score outside `[MIN_SCORE, MAX_SCORE]`.
    pub fn out_of_range_score(&self) -> Option<&'static str> {
        let in_range = |v: u8| (MIN_SCORE..=MAX_SCORE).contains(&v);
        if !in_range(self.mood) {
            Some("mood")
        } else if !in_range(self.stress) {
            Some("stress")
        } else if !in_range(self.productivity) {
            Some("productivity")
        } else {
            None
        }
    }
}

/// The fixed vocabulary of recommendation kinds.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendationType {
    Break,
    Breathing,
    Stretch,
    Focus,
    Music,
    Hydration,
    Custom,
}

impl RecommendationType {
    /// Parses a type token case-insensitively, coercing anything unknown to `Custom`.
    pub fn from_token(token: &str) -> Self {
        token.trim().parse().unwrap_or(RecommendationType::Custom)
    }

    /// Lower-case label for user-facing output.
    pub fn label(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

/// Where a recommendation came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RecommendationSource {
    /// External text generator.
    Ai,
    /// Deterministic rule engine.
    Rule,
}

impl RecommendationSource {
    /// Lower-case label for user-facing output.
    pub fn label(&self) -> String {
        self.to_string().to_ascii_lowercase()
    }
}

/// A recommendation produced by the engine or generator, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationDraft {
    pub user_id: String,
    pub kind: RecommendationType,
    pub message: String,
    #[serde(default)]
    pub action_url: Option<String>,
    /// RFC 3339 timestamp.
    #[serde(default)]
    pub scheduled_at: Option<String>,
    pub source: RecommendationSource,
}

impl RecommendationDraft {
    pub fn new(
        user_id: impl Into<String>,
        kind: RecommendationType,
        message: impl Into<String>,
        source: RecommendationSource,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            message: message.into(),
            action_url: None,
            scheduled_at: None,
            source,
        }
    }
}

/// A persisted recommendation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// UUID v4 assigned on persist.
    pub id: String,
    pub user_id: String,
    pub kind: RecommendationType,
    pub message: String,
    pub action_url: Option<String>,
    pub scheduled_at: Option<String>,
    pub source: RecommendationSource,
    /// ISO 8601 UTC timestamp assigned on persist.
    pub created_at: String,
}

/// Queue payload asking for recommendations over a trailing window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub user_id: String,
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    pub request_id: String,
}

impl GenerationRequest {
    /// Builds a request with a freshly generated request id.
    pub fn new(user_id: impl Into<String>, window_days: u32) -> Self {
        Self {
            user_id: user_id.into(),
            window_days,
            request_id: uuid::Uuid::new_v4().to_string(),
        }
    }
}

fn default_window_days() -> u32 {
    DEFAULT_WINDOW_DAYS
}

/// Delivery state of a queue entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QueueStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Expired,
}

/// A durable queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: QueueStatus,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
    pub expires_at: String,
}
