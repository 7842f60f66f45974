// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault lifecycle: create, load and save the encrypted profile document.
//!
//! Every save is a full re-encryption of the whole document under a fresh
//! salt and nonce. Nothing from the file being replaced is reused.

use std::path::Path;

use rdpctl_core::{RdpctlError, VaultDocument};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto;
use crate::envelope::{self, VaultEnvelope};
use crate::kdf;

/// Check whether a vault file exists at `path`.
pub fn exists(path: &Path) -> Result<bool, RdpctlError> {
    Ok(path.try_exists()?)
}

/// Create a new, empty vault at `path` and return its document.
///
/// Overwrites unconditionally; callers check [`exists`] first.
pub fn create_new(path: &Path, password: &SecretString) -> Result<VaultDocument, RdpctlError> {
    let document = VaultDocument::new();
    save(path, &document, password)?;
    info!(path = %path.display(), "vault created");
    Ok(document)
}

/// Read, decrypt and parse the vault at `path`.
///
/// A wrong password and a tampered file both surface as
/// [`RdpctlError::AuthenticationFailure`]. The file is never modified.
pub fn load(path: &Path, password: &SecretString) -> Result<VaultDocument, RdpctlError> {
    let envelope = envelope::read(path)?;
    let key = kdf::derive_key(password.expose_secret().as_bytes(), &envelope.salt)?;
    let plaintext = Zeroizing::new(crypto::open(&key, &envelope.nonce, &envelope.ciphertext)?);

    let document: VaultDocument =
        serde_json::from_slice(&plaintext).map_err(RdpctlError::Deserialization)?;

    debug!(
        path = %path.display(),
        profiles = document.len(),
        "vault loaded"
    );
    Ok(document)
}

/// Encrypt the full document under a fresh salt and nonce and replace the
/// file at `path`.
pub fn save(
    path: &Path,
    document: &VaultDocument,
    password: &SecretString,
) -> Result<(), RdpctlError> {
    let plaintext = Zeroizing::new(
        serde_json::to_vec(document).map_err(RdpctlError::Serialization)?,
    );

    let salt = kdf::generate_salt()?;
    let key = kdf::derive_key(password.expose_secret().as_bytes(), &salt)?;
    let (ciphertext, nonce) = crypto::seal(&key, &plaintext)?;

    envelope::write(
        path,
        &VaultEnvelope {
            salt,
            nonce,
            ciphertext,
        },
    )?;

    debug!(
        path = %path.display(),
        profiles = document.len(),
        "vault saved"
    );
    Ok(())
}
