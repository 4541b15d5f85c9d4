// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation pipeline for Tidewell.
//!
//! Wires storage, the generator and the durable queue into the two request
//! flows: synchronous generation inside [`Orchestrator::generate`], and
//! asynchronous generation via [`Producer`] and [`Consumer`]. Listings are
//! served through [`RecommendationCache`].

pub mod cache;
pub mod consumer;
pub mod orchestrator;
pub mod producer;
pub mod shutdown;

pub use cache::{CacheKey, RecommendationCache, normalize_limit};
pub use consumer::{Consumer, HandleOutcome};
pub use orchestrator::Orchestrator;
pub use producer::Producer;
pub use shutdown::install_signal_handler;
