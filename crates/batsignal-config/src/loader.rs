// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./batsignal.toml` > `~/.config/batsignal/batsignal.toml`
//! > `/etc/batsignal/batsignal.toml`, with environment variable overrides via
//! the `BATSIGNAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::BatsignalConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/batsignal/batsignal.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "batsignal.toml";

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("batsignal/batsignal.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/batsignal/batsignal.toml`
/// 3. `~/.config/batsignal/batsignal.toml`
/// 4. `./batsignal.toml`
/// 5. `BATSIGNAL_*` environment variables
pub fn load_config() -> Result<BatsignalConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<BatsignalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BatsignalConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<BatsignalConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BatsignalConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BatsignalConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `BATSIGNAL_<SECTION>_<KEY>` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because keys contain
/// underscores: `BATSIGNAL_GROQ_API_KEY` must map to `groq.api_key`.
fn env_provider() -> Env {
    Env::prefixed("BATSIGNAL_").map(|key| map_env_key(key.as_str()).into())
}

/// Map a lowercased, prefix-stripped env var name to a dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: [&str; 6] = ["agent", "groq", "journal", "knowledge", "gateway", "training"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
