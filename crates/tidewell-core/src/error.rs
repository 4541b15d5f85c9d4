// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Tidewell recommendation pipeline.

use thiserror::Error;

/// The primary error type used across all Tidewell adapter traits and pipeline operations.
#[derive(Debug, Error)]
pub enum TidewellError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Text-generation provider errors (API failure, quota, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Queue transport errors (unknown entry, undecodable payload).
    #[error("queue error: {message}")]
    Queue { message: String },

    /// Input rejected before reaching the pipeline (window range, score range).
    #[error("validation error: {0}")]
    Validation(String),

    /// JSON encoding or decoding failed.
    #[error("serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TidewellError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        TidewellError::Storage {
            source: Box::new(err),
        }
    }

    /// Builds a provider failure without an underlying source.
    pub fn provider(message: impl Into<String>) -> Self {
        TidewellError::Provider {
            message: message.into(),
            source: None,
        }
    }
}
