// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the rdpctl configuration system.

use rdpctl_config::diagnostic::ConfigError;
use rdpctl_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_config() {
    let toml = r#"
[vault]
path = "/tmp/rdpctl/vault.enc"

[log]
level = "debug"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.vault.path.as_deref(), Some("/tmp/rdpctl/vault.enc"));
    assert_eq!(config.log.level, "debug");
}

/// An empty file yields the defaults.
#[test]
fn empty_toml_uses_defaults() {
    let config = load_and_validate_str("").expect("defaults should be valid");
    assert_eq!(config.vault.path, None);
    assert_eq!(config.log.level, "warn");
}

/// A misspelled key is reported with a suggestion.
#[test]
fn unknown_key_suggests_correction() {
    let toml = r#"
[vault]
pth = "/tmp/vault.enc"
"#;

    let errors = load_and_validate_str(toml).unwrap_err();
    assert_eq!(errors.len(), 1);
    match &errors[0] {
        ConfigError::UnknownKey {
            key, suggestion, ..
        } => {
            assert_eq!(key, "pth");
            assert_eq!(suggestion.as_deref(), Some("path"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}

/// Unknown top-level sections are rejected.
#[test]
fn unknown_section_is_rejected() {
    let toml = r#"
[telemetry]
enabled = true
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::UnknownKey { key, .. } if key == "telemetry"));
}

/// A wrong value type is reported as InvalidType.
#[test]
fn wrong_type_is_reported() {
    let toml = r#"
[log]
level = 3
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::InvalidType { key, .. } if key == "log.level"));
}

/// An unsupported log level fails semantic validation.
#[test]
fn invalid_log_level_fails_validation() {
    let toml = r#"
[log]
level = "verbose"
"#;
    let errors = load_and_validate_str(toml).unwrap_err();
    assert!(matches!(&errors[0], ConfigError::Validation { message } if message.contains("log.level")));
}

/// The client section defaults to xfreerdp and rejects misspelled keys.
#[test]
fn client_section_defaults_and_suggestions() {
    let config = load_and_validate_str("").unwrap();
    assert_eq!(config.client.program, "xfreerdp");

    let errors = load_and_validate_str("[client]\nprogam = \"wlfreerdp\"\n").unwrap_err();
    match &errors[0] {
        ConfigError::UnknownKey { key, suggestion, .. } => {
            assert_eq!(key, "progam");
            assert_eq!(suggestion.as_deref(), Some("program"));
        }
        other => panic!("expected UnknownKey, got {other:?}"),
    }
}
