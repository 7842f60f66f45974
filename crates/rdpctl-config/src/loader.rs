// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports `./rdpctl.toml` > `~/.config/rdp/rdpctl.toml` with environment
//! variable overrides via the `RDPCTL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RdpctlConfig;
use crate::paths;

/// Name of the configuration file looked up in each layer.
pub const CONFIG_FILE_NAME: &str = "rdpctl.toml";

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `~/.config/rdp/rdpctl.toml` (user config)
/// 3. `./rdpctl.toml` (local directory)
/// 4. `RDPCTL_*` environment variables
pub fn load_config() -> Result<RdpctlConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RdpctlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RdpctlConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RdpctlConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RdpctlConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RdpctlConfig::default()))
        .merge(Toml::file(
            paths::config_dir()
                .map(|d| d.join(CONFIG_FILE_NAME))
                .unwrap_or_default(),
        ))
        .merge(Toml::file(CONFIG_FILE_NAME))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping, so `RDPCTL_VAULT_PATH` becomes `vault.path`.
fn env_provider() -> Env {
    Env::prefixed("RDPCTL_")
        .ignore(&["MASTER_PASSWORD"])
        .map(|key| {
            let mapped = key
                .as_str()
                .replacen("vault_", "vault.", 1)
                .replacen("log_", "log.", 1)
                .replacen("client_", "client.", 1);
            mapped.into()
        })
}
