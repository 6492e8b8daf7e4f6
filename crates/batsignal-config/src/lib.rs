// SPDX-FileCopyrightText: 2026 Batsignal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered TOML configuration for batsignal.
//!
//! Keys are checked strictly, values are validated after merging, and every
//! failure is reported as a [`ConfigError`] diagnostic that miette can render
//! against the TOML it came from.
//!
//! ```no_run
//! let config = match batsignal_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         batsignal_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("persona: {}", config.agent.name);
//! ```

use std::path::Path;

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::BatsignalConfig;

/// Loads the standard file hierarchy plus `BATSIGNAL_*` overrides.
pub fn load_and_validate() -> Result<BatsignalConfig, Vec<ConfigError>> {
    checked(loader::load_config(), hierarchy_sources)
}

/// Loads one explicit file plus `BATSIGNAL_*` overrides.
pub fn load_and_validate_path(path: &Path) -> Result<BatsignalConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_path(path), || {
        read_source(path).into_iter().collect()
    })
}

/// Loads a TOML string over the defaults, ignoring files and environment.
pub fn load_and_validate_str(toml_content: &str) -> Result<BatsignalConfig, Vec<ConfigError>> {
    checked(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Turns an extraction result into a validated config or diagnostics.
///
/// `sources` is only read when extraction fails, to attach spans.
fn checked(
    extracted: Result<BatsignalConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<BatsignalConfig, Vec<ConfigError>> {
    let config = extracted.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

fn read_source(path: &Path) -> Option<(String, String)> {
    let content = std::fs::read_to_string(path).ok()?;
    Some((path.display().to_string(), content))
}

/// Every hierarchy file that exists, keyed the way figment names it.
fn hierarchy_sources() -> Vec<(String, String)> {
    let local = std::env::current_dir()
        .map(|dir| dir.join(loader::LOCAL_CONFIG_FILE))
        .unwrap_or_else(|_| loader::LOCAL_CONFIG_FILE.into());

    [
        Some(local),
        loader::user_config_path(),
        Some(loader::SYSTEM_CONFIG_FILE.into()),
    ]
    .into_iter()
    .flatten()
    .filter_map(|path| read_source(&path))
    .collect()
}
