// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::RdpctlConfig;

/// Log levels accepted by `log.level`.
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RdpctlConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {}, got `{}`",
                LOG_LEVELS.join(", "),
                config.log.level
            ),
        });
    }

    if let Some(path) = &config.vault.path
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "vault.path must not be empty when set".to_string(),
        });
    }

    if config.client.program.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "client.program must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
