// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `tidewell-core::types` so they can cross
//! adapter trait boundaries. Re-exported here for use inside the crate.

pub use tidewell_core::types::{
    MoodSample, QueueEntry, QueueStatus, Recommendation, RecommendationDraft,
};
