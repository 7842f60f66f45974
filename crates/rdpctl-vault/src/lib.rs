// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM encrypted vault for rdpctl connection profiles.
//!
//! The whole profile document is serialized, encrypted under a key derived
//! from the master password with Argon2id, and written as one binary
//! envelope. Each save re-derives the key under a fresh random salt and
//! encrypts under a fresh random nonce.

pub mod crypto;
pub mod envelope;
pub mod kdf;
pub mod lock;
pub mod prompt;
pub mod store;
pub mod unlock;

pub use envelope::VaultEnvelope;
pub use lock::VaultLock;
pub use prompt::{read_hidden, PasswordSource, TerminalPrompt, MASTER_PASSWORD_ENV_VAR};
pub use unlock::{run as unlock, UnlockState, UnlockedVault, MAX_UNLOCK_ATTEMPTS};
