// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Tidewell.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key is
//! rejected at startup instead of silently falling back to a default.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level Tidewell configuration.
///
/// Every section is optional and defaults to the values documented on its fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TidewellConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Generation pipeline behavior.
    #[serde(default)]
    pub recommendations: RecommendationsConfig,

    /// External generator switch and timeout.
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Anthropic API settings used by the external generator.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Durable queue settings.
    #[serde(default)]
    pub queue: QueueConfig,

    /// Recommendation list cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name used in logs and health output.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "tidewell".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,

    /// Cap applied to unbounded recommendation listings.
    #[serde(default = "default_list_cap")]
    pub default_list_cap: i64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
            default_list_cap: default_list_cap(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("tidewell").join("tidewell.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "tidewell.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

fn default_list_cap() -> i64 {
    100
}

/// Generation pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecommendationsConfig {
    /// Route `generate` through the queue instead of generating inline.
    #[serde(default = "default_async_mode")]
    pub async_mode: bool,

    /// Window used by the CLI when `--days` is omitted.
    #[serde(default = "default_window_days")]
    pub default_window_days: u32,

    /// Serialize concurrent synchronous generations for the same user.
    #[serde(default = "default_single_flight")]
    pub single_flight: bool,
}

impl Default for RecommendationsConfig {
    fn default() -> Self {
        Self {
            async_mode: default_async_mode(),
            default_window_days: default_window_days(),
            single_flight: default_single_flight(),
        }
    }
}

fn default_async_mode() -> bool {
    true
}

fn default_window_days() -> u32 {
    7
}

fn default_single_flight() -> bool {
    true
}

/// External generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Use the external generator on the synchronous path.
    #[serde(default)]
    pub enabled: bool,

    /// Upper bound on a single provider call, in seconds.
    #[serde(default = "default_generator_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: default_generator_timeout_secs(),
        }
    }
}

impl GeneratorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_generator_timeout_secs() -> u64 {
    20
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for recommendation prompts.
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Messages endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            api_version: default_api_version(),
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-haiku-20241022".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.7
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

/// Durable queue configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueueConfig {
    /// Queue that generation requests are routed to.
    #[serde(default = "default_queue_name")]
    pub name: String,

    /// Lifetime of an undelivered request, in seconds.
    #[serde(default = "default_message_ttl_secs")]
    pub message_ttl_secs: u64,

    /// Deliveries attempted before an entry is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,

    /// Consumer sleep when the queue is empty, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long a delivery stays locked to one consumer, in seconds.
    #[serde(default = "default_lock_timeout_secs")]
    pub lock_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            name: default_queue_name(),
            message_ttl_secs: default_message_ttl_secs(),
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            lock_timeout_secs: default_lock_timeout_secs(),
        }
    }
}

impl QueueConfig {
    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn lock_timeout(&self) -> Duration {
        Duration::from_secs(self.lock_timeout_secs)
    }
}

fn default_queue_name() -> String {
    "recommendations".to_string()
}

fn default_message_ttl_secs() -> u64 {
    3600
}

fn default_max_attempts() -> i32 {
    3
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_lock_timeout_secs() -> u64 {
    300
}

/// Recommendation list cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Entry lifetime, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Maximum cached listings.
    #[serde(default = "default_cache_max_entries")]
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            max_entries: default_cache_max_entries(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

fn default_cache_ttl_secs() -> u64 {
    600
}

fn default_cache_max_entries() -> u64 {
    1000
}
