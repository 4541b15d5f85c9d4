// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Tidewell integration tests.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted text-generation provider
//! - [`TestHarness`] - full pipeline over a temp SQLite database

pub mod harness;
pub mod mock_provider;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_provider::{DEFAULT_MOCK_RESPONSE, MockProvider, MockReply};
