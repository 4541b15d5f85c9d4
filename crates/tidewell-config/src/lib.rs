// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for Tidewell.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`), XDG
//! file hierarchy lookup, `TIDEWELL_*` environment overrides, and miette
//! diagnostics with typo suggestions.
//!
//! ```no_run
//! use tidewell_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("async mode: {}", config.recommendations.async_mode);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TidewellConfig;
pub use validation::resolve_api_key;

/// Load configuration from the standard hierarchy and validate it.
pub fn load_and_validate() -> Result<TidewellConfig, Vec<ConfigError>> {
    checked(loader::load_config())
}

/// Load configuration from an explicit file (plus env overrides) and validate it.
pub fn load_and_validate_path(path: &std::path::Path) -> Result<TidewellConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path))
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<TidewellConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content))
}

#[allow(clippy::result_large_err)]
fn checked(
    loaded: Result<TidewellConfig, figment::Error>,
) -> Result<TidewellConfig, Vec<ConfigError>> {
    let config = loaded.map_err(diagnostic::figment_to_config_errors)?;
    validation::validate_config(&config)?;
    Ok(config)
}
