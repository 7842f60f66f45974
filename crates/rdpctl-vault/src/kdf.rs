// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from the master password.
//!
//! The cost parameters are part of the vault format: every vault at format
//! version 1 uses t=1, m=64 MiB, p=4. Changing them would make existing
//! vaults unreadable, so they are constants and not configuration.

use std::time::Instant;

use rdpctl_core::RdpctlError;
use ring::rand::{SecureRandom, SystemRandom};
use tracing::debug;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Argon2id iteration count.
pub const KDF_TIME_COST: u32 = 1;

/// Argon2id memory cost in KiB (64 MiB).
pub const KDF_MEMORY_COST_KIB: u32 = 64 * 1024;

/// Argon2id parallelism lanes.
pub const KDF_PARALLELISM: u32 = 4;

/// Derive a 32-byte key from the password and salt using Argon2id.
///
/// Deterministic for identical inputs. Slow on purpose (tens to hundreds of
/// milliseconds). The returned key is zeroed on drop.
pub fn derive_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<[u8; KEY_LEN]>, RdpctlError> {
    if salt.len() != SALT_LEN {
        return Err(RdpctlError::Validation(format!(
            "salt must be {SALT_LEN} bytes long, got {}",
            salt.len()
        )));
    }

    let params = argon2::Params::new(
        KDF_MEMORY_COST_KIB,
        KDF_TIME_COST,
        KDF_PARALLELISM,
        Some(KEY_LEN),
    )
    .map_err(|e| RdpctlError::Internal(format!("invalid Argon2id parameters: {e}")))?;
    let argon2 = argon2::Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let started = Instant::now();
    let mut output = Zeroizing::new([0u8; KEY_LEN]);
    argon2
        .hash_password_into(password, salt, output.as_mut())
        .map_err(|e| RdpctlError::Internal(format!("Argon2id key derivation failed: {e}")))?;
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "derived vault key");

    Ok(output)
}

/// Generate a random 16-byte salt from the system CSPRNG.
pub fn generate_salt() -> Result<[u8; SALT_LEN], RdpctlError> {
    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    rng.fill(&mut salt)
        .map_err(|_| RdpctlError::Internal("failed to generate random salt".to_string()))?;
    Ok(salt)
}
