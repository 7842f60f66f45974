// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for rdpctl.
//!
//! TOML configuration with strict key checking (`deny_unknown_fields`),
//! user/local file lookup, `RDPCTL_*` environment overrides, and miette
//! diagnostics with typo suggestions.

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod paths;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{ClientConfig, RdpctlConfig};
pub use paths::resolve_vault_path;

/// Load configuration from the standard hierarchy and validate it.
///
/// With `explicit` set, only that file (plus env vars) is read.
pub fn load_and_validate(explicit: Option<&Path>) -> Result<RdpctlConfig, Vec<ConfigError>> {
    let loaded = match explicit {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };
    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(
            err,
            &collect_toml_sources(explicit),
        )),
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<RdpctlConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let candidates: Vec<std::path::PathBuf> = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => {
            let mut paths = Vec::new();
            if let Some(dir) = paths::config_dir() {
                paths.push(dir.join(loader::CONFIG_FILE_NAME));
            }
            if let Ok(cwd) = std::env::current_dir() {
                paths.push(cwd.join(loader::CONFIG_FILE_NAME));
            }
            paths
        }
    };

    candidates
        .into_iter()
        .filter_map(|path| {
            std::fs::read_to_string(&path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
