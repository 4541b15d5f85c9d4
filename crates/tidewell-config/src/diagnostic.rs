// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns figment errors into miette diagnostics.
//!
//! Unknown keys name the section and the provider they came from (a file
//! path or the `TIDEWELL_` environment), with a "did you mean" hint.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use figment::error::Kind;
use miette::Diagnostic;
use thiserror::Error;

/// Minimum Jaro-Winkler similarity for a key suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.75;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` in {section} (from {origin})")]
    #[diagnostic(
        code(tidewell::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        section: String,
        origin: String,
        suggestion: Option<String>,
        valid_keys: String,
    },

    #[error("invalid value for `{key}` (from {origin}): {detail}")]
    #[diagnostic(code(tidewell::config::invalid_type))]
    InvalidType {
        key: String,
        origin: String,
        detail: String,
    },

    /// A value parsed but violates a semantic constraint.
    #[error("validation error: {message}")]
    #[diagnostic(code(tidewell::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(tidewell::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? Valid keys: {valid_keys}"),
        None => format!("valid keys: {valid_keys}"),
    }
}

/// One diagnostic per error figment collected.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|error| {
            let origin = origin_of(&error);
            match &error.kind {
                Kind::UnknownField(field, expected) => ConfigError::UnknownKey {
                    key: field.clone(),
                    section: section_of(&error.path),
                    origin,
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                },
                Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                    key: error.path.join("."),
                    origin,
                    detail: format!("found {actual}, expected {expected}"),
                },
                _ => ConfigError::Other(error.to_string()),
            }
        })
        .collect()
}

fn section_of(path: &[String]) -> String {
    if path.is_empty() {
        "the top level".to_string()
    } else {
        format!("[{}]", path.join("."))
    }
}

fn origin_of(error: &figment::error::Error) -> String {
    match &error.metadata {
        Some(meta) => match &meta.source {
            Some(source) => source.to_string(),
            None => meta.name.to_string(),
        },
        None => "defaults".to_string(),
    }
}

/// Closest valid key above the similarity threshold.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|&key| (strsim::jaro_winkler(unknown, key), key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr using miette's graphical handler.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = miette::GraphicalReportHandler::new();
    for error in errors {
        let mut buf = String::new();
        if handler.render_report(&mut buf, error).is_ok() {
            eprint!("{buf}");
        } else {
            eprintln!("Error: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggests_close_key() {
        let valid = &["async_mode", "default_window_days", "single_flight"];
        assert_eq!(suggest_key("asyn_mode", valid), Some("async_mode".to_string()));
    }

    #[test]
    fn no_suggestion_for_distant_key() {
        let valid = &["ttl_secs", "max_entries"];
        assert_eq!(suggest_key("zzzzzz", valid), None);
    }

    #[test]
    fn sections_are_bracketed() {
        assert_eq!(section_of(&["queue".to_string()]), "[queue]");
        assert_eq!(section_of(&[]), "the top level");
    }
}
