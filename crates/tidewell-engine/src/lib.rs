// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation generation for Tidewell.
//!
//! - [`RuleEngine`]: deterministic threshold rules over a sample window
//! - [`build_prompt`] / [`decode_response`]: the text contract with an
//!   external generator
//! - [`GeneratorWithFallback`]: provider call under a deadline, answered by
//!   the rule engine whenever the provider cannot be used

pub mod decoder;
pub mod generator;
pub mod prompt;
pub mod rules;

pub use decoder::{DecodedLine, Decoding, LineRejection, decode_line, decode_response};
pub use generator::GeneratorWithFallback;
pub use prompt::build_prompt;
pub use rules::{MoodMetrics, RuleEngine};
