// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the rdpctl vault.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across the vault, its codec and the CLI.
///
/// `AuthenticationFailure` deliberately covers both a wrong master password
/// and a tampered ciphertext. Callers must not try to tell them apart.
#[derive(Debug, Error)]
pub enum RdpctlError {
    /// Malformed input to a primitive (wrong salt length, blank profile field).
    #[error("validation error: {0}")]
    Validation(String),

    /// The vault file does not exist.
    #[error("vault file not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The envelope is structurally invalid (bad marker, truncated header).
    #[error("corrupt vault file: {0}")]
    CorruptFile(String),

    /// The envelope carries a format version this build cannot read.
    #[error("unsupported vault version: {found} (expected {expected})")]
    UnsupportedVersion { found: u8, expected: u8 },

    /// Wrong master password or corrupted ciphertext.
    #[error("invalid master password or corrupted vault -- decryption failed")]
    AuthenticationFailure,

    /// Decryption succeeded but the plaintext is not a valid vault document.
    #[error("vault document is malformed: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// The in-memory document could not be serialized.
    #[error("failed to serialize vault document: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Filesystem failure other than a missing vault file.
    #[error("vault I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The unlock attempt budget was used up.
    #[error("too many incorrect password attempts")]
    TooManyAttempts,

    /// First-time setup password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Another process holds the vault lock.
    #[error("vault is locked by another process")]
    Locked,

    /// No profile matches the given id or query.
    #[error("connection profile not found: {0}")]
    ProfileNotFound(String),

    /// The user interrupted a prompt.
    #[error("operation cancelled")]
    Cancelled,

    /// Reading from the terminal failed.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// Configuration could not be loaded or resolved.
    #[error("configuration error: {0}")]
    Config(String),

    /// The remote desktop client could not be started or exited with failure.
    #[error("remote desktop client failed: {0}")]
    Client(String),

    /// Internal or unexpected errors (CSPRNG failure, key setup).
    #[error("internal error: {0}")]
    Internal(String),
}

impl RdpctlError {
    /// Returns `true` for the one error the unlock loop may retry on.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, RdpctlError::AuthenticationFailure)
    }
}
