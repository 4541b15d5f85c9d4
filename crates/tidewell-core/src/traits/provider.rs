// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for external text-generation services.

use async_trait::async_trait;

use crate::error::TidewellError;
use crate::traits::adapter::PluginAdapter;

/// Adapter for an external text-generation service.
///
/// Takes a fully rendered prompt and returns the raw completion text.
/// Implementations perform no retries; a single failure is reported as an error
/// and the caller decides how to recover.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends a prompt and returns the completion text.
    async fn complete(&self, prompt: &str) -> Result<String, TidewellError>;
}
