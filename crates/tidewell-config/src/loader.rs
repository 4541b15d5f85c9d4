// SPDX-FileCopyrightText: 2026 Tidewell Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./tidewell.toml` > `~/.config/tidewell/tidewell.toml`
//! > `/etc/tidewell/tidewell.toml`, with environment variable overrides via the
//! `TIDEWELL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TidewellConfig;

/// Top-level sections an environment variable may address.
const SECTIONS: &[&str] = &[
    "agent",
    "storage",
    "recommendations",
    "generator",
    "anthropic",
    "queue",
    "cache",
];

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/tidewell/tidewell.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "tidewell.toml";

/// `~/.config/tidewell/tidewell.toml`, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tidewell").join("tidewell.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/tidewell/tidewell.toml`
/// 3. `~/.config/tidewell/tidewell.toml`
/// 4. `./tidewell.toml`
/// 5. `TIDEWELL_*` environment variables
pub fn load_config() -> Result<TidewellConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<TidewellConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TidewellConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TidewellConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TidewellConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TidewellConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map `TIDEWELL_<SECTION>_<KEY>` to `<section>.<key>`.
///
/// Figment hands over the key as written, so it is lower-cased first. Only
/// the section prefix is split, so `TIDEWELL_QUEUE_MESSAGE_TTL_SECS` becomes
/// `queue.message_ttl_secs`.
fn env_provider() -> Env {
    Env::prefixed("TIDEWELL_").map(|key| env_key_to_path(key.as_str()).into())
}

pub(crate) fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key
}
