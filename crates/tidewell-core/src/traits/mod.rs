// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for Tidewell collaborators.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod provider;
pub mod queue;
pub mod storage;

pub use adapter::PluginAdapter;
pub use provider::ProviderAdapter;
pub use queue::QueueAdapter;
pub use storage::StorageAdapter;
