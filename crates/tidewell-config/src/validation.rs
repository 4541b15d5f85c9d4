// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks semantic constraints serde attributes cannot express. All failures
//! are collected; validation does not stop at the first one.

use tidewell_core::types::{MAX_WINDOW_DAYS, MIN_WINDOW_DAYS};

use crate::diagnostic::ConfigError;
use crate::model::TidewellConfig;

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &TidewellConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if config.storage.default_list_cap < 1 {
        fail(format!(
            "storage.default_list_cap must be at least 1, got {}",
            config.storage.default_list_cap
        ));
    }

    let window = config.recommendations.default_window_days;
    if !(MIN_WINDOW_DAYS..=MAX_WINDOW_DAYS).contains(&window) {
        fail(format!(
            "recommendations.default_window_days must be within {MIN_WINDOW_DAYS}..={MAX_WINDOW_DAYS}, got {window}"
        ));
    }

    if config.generator.timeout_secs == 0 {
        fail("generator.timeout_secs must be greater than 0".to_string());
    }

    let temperature = config.anthropic.temperature;
    if !(0.0..=1.0).contains(&temperature) {
        fail(format!(
            "anthropic.temperature must be within 0.0..=1.0, got {temperature}"
        ));
    }

    if config.anthropic.max_tokens == 0 {
        fail("anthropic.max_tokens must be greater than 0".to_string());
    }

    if config.generator.enabled && resolve_api_key(config).is_none() {
        fail(
            "generator.enabled requires anthropic.api_key or the ANTHROPIC_API_KEY environment variable"
                .to_string(),
        );
    }

    if config.queue.name.trim().is_empty() {
        fail("queue.name must not be empty".to_string());
    }

    if config.queue.message_ttl_secs == 0 {
        fail("queue.message_ttl_secs must be greater than 0".to_string());
    }

    if config.queue.max_attempts < 1 {
        fail(format!(
            "queue.max_attempts must be at least 1, got {}",
            config.queue.max_attempts
        ));
    }

    if config.queue.poll_interval_ms == 0 {
        fail("queue.poll_interval_ms must be greater than 0".to_string());
    }

    if config.queue.lock_timeout_secs == 0 {
        fail("queue.lock_timeout_secs must be greater than 0".to_string());
    }

    if config.cache.ttl_secs == 0 {
        fail("cache.ttl_secs must be greater than 0".to_string());
    }

    if config.cache.max_entries == 0 {
        fail("cache.max_entries must be greater than 0".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// API key from config, falling back to `ANTHROPIC_API_KEY`.
pub fn resolve_api_key(config: &TidewellConfig) -> Option<String> {
    config
        .anthropic
        .api_key
        .clone()
        .filter(|k| !k.trim().is_empty())
        .or_else(|| {
            std::env::var("ANTHROPIC_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn messages(errors: Vec<ConfigError>) -> Vec<String> {
        errors.into_iter().map(|e| e.to_string()).collect()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(validate_config(&TidewellConfig::default()).is_ok());
    }

    #[test]
    fn window_outside_range_is_rejected() {
        let mut config = TidewellConfig::default();
        config.recommendations.default_window_days = 31;
        let errs = messages(validate_config(&config).unwrap_err());
        assert_eq!(errs.len(), 1);
        assert!(errs[0].contains("default_window_days"));
    }

    #[test]
    fn collects_every_failure() {
        let mut config = TidewellConfig::default();
        config.queue.name = "  ".into();
        config.queue.max_attempts = 0;
        config.cache.ttl_secs = 0;
        config.storage.database_path = String::new();
        let errs = messages(validate_config(&config).unwrap_err());
        assert_eq!(errs.len(), 4, "{errs:?}");
    }

    #[test]
    fn temperature_out_of_range_is_rejected() {
        let mut config = TidewellConfig::default();
        config.anthropic.temperature = 1.5;
        let errs = messages(validate_config(&config).unwrap_err());
        assert!(errs[0].contains("temperature"));
    }

    #[test]
    fn enabled_generator_with_configured_key_is_valid() {
        let mut config = TidewellConfig::default();
        config.generator.enabled = true;
        config.anthropic.api_key = Some("sk-ant-test".into());
        assert!(validate_config(&config).is_ok());
    }
}
