// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Tidewell recommendation pipeline.
//!
//! Provides the error type, the domain types that flow through the pipeline,
//! and the adapter traits implemented by the storage, queue, and provider
//! collaborators.

pub mod error;
pub mod traits;
pub mod types;

pub use error::TidewellError;
pub use types::{
    AdapterType, GenerationRequest, HealthStatus, MoodSample, QueueEntry, QueueStatus,
    Recommendation, RecommendationDraft, RecommendationSource, RecommendationType,
};

pub use traits::{PluginAdapter, ProviderAdapter, QueueAdapter, StorageAdapter};
