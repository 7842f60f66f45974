// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for rdpctl.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level rdpctl configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RdpctlConfig {
    /// Vault file settings.
    #[serde(default)]
    pub vault: VaultConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Remote desktop client settings.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Vault file location.
///
/// The KDF cost is part of the file format and deliberately not configurable.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// Explicit vault file path. `None` uses `<config dir>/rdp/vault.enc`.
    #[serde(default)]
    pub path: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Remote desktop client launched by `rdpctl connect`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Program name or path, resolved through `PATH`.
    #[serde(default = "default_client_program")]
    pub program: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            program: default_client_program(),
        }
    }
}

fn default_client_program() -> String {
    "xfreerdp".to_string()
}
