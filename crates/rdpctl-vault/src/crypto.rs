// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use rdpctl_core::RdpctlError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

use crate::kdf::KEY_LEN;

/// Nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

/// Encrypt plaintext with AES-256-GCM under a fresh random nonce, no AAD.
///
/// Returns `(ciphertext_with_tag, nonce)`.
pub fn seal(key: &[u8; KEY_LEN], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), RdpctlError> {
    let key = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| RdpctlError::Internal("failed to generate random nonce".to_string()))?;

    let mut in_out = plaintext.to_vec();
    key.seal_in_place_append_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut in_out,
    )
    .map_err(|_| RdpctlError::Internal("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt and verify ciphertext produced by [`seal`].
///
/// The tag is checked before any plaintext is returned. A wrong key, a
/// tampered byte anywhere, or a truncated ciphertext all fail with the same
/// [`RdpctlError::AuthenticationFailure`].
pub fn open(
    key: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, RdpctlError> {
    let key = aead_key(key)?;

    let mut in_out = ciphertext.to_vec();
    let plaintext = key
        .open_in_place(Nonce::assume_unique_for_key(*nonce), Aad::empty(), &mut in_out)
        .map_err(|_| RdpctlError::AuthenticationFailure)?;

    Ok(plaintext.to_vec())
}

fn aead_key(key: &[u8; KEY_LEN]) -> Result<LessSafeKey, RdpctlError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| RdpctlError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}
