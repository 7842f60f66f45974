// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bounded-retry unlock protocol and the unlocked session it produces.
//!
//! The retry policy is a small state machine ([`UnlockState`]) so that its
//! transitions can be checked on their own. [`run`] drives it against a
//! [`PasswordSource`] and the vault store.

use std::path::{Path, PathBuf};

use rdpctl_core::{RdpctlError, VaultDocument};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};

use crate::lock::VaultLock;
use crate::prompt::PasswordSource;
use crate::store;

/// Number of password attempts allowed when unlocking an existing vault.
pub const MAX_UNLOCK_ATTEMPTS: u32 = 3;

/// State of the unlock protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockState {
    /// Waiting for a password; `remaining` attempts are left, including this one.
    Attempting { remaining: u32 },
    /// A password was accepted.
    Unlocked,
    /// The attempt budget is used up.
    Exhausted,
}

/// Result of one password attempt, as seen by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    Accepted,
    Rejected,
}

impl UnlockState {
    /// Initial state for a given attempt budget.
    pub fn start(budget: u32) -> Self {
        if budget == 0 {
            UnlockState::Exhausted
        } else {
            UnlockState::Attempting { remaining: budget }
        }
    }

    /// Transition after one attempt. Terminal states do not move.
    pub fn on_attempt(self, outcome: AttemptOutcome) -> Self {
        match (self, outcome) {
            (UnlockState::Attempting { .. }, AttemptOutcome::Accepted) => UnlockState::Unlocked,
            (UnlockState::Attempting { remaining }, AttemptOutcome::Rejected) => {
                match remaining.saturating_sub(1) {
                    0 => UnlockState::Exhausted,
                    left => UnlockState::Attempting { remaining: left },
                }
            }
            (terminal, _) => terminal,
        }
    }

    /// Attempts left before the protocol gives up.
    pub fn remaining(self) -> u32 {
        match self {
            UnlockState::Attempting { remaining } => remaining,
            UnlockState::Unlocked | UnlockState::Exhausted => 0,
        }
    }
}

/// An unlocked vault session.
///
/// Holds the decrypted document, the master password needed to re-encrypt
/// on every save, and the advisory lock on the vault file. The password is
/// zeroed when the session is dropped. No derived key is cached; each save
/// derives a new one under a fresh salt.
pub struct UnlockedVault {
    path: PathBuf,
    document: VaultDocument,
    password: SecretString,
    _lock: VaultLock,
}

impl std::fmt::Debug for UnlockedVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockedVault")
            .field("path", &self.path)
            .field("profiles", &self.document.len())
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl UnlockedVault {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &VaultDocument {
        &self.document
    }

    /// Mutable access to the in-memory document. Call [`Self::save`] after
    /// each change; until then memory and disk differ.
    pub fn document_mut(&mut self) -> &mut VaultDocument {
        &mut self.document
    }

    /// Re-encrypt and write the whole document with the session password.
    pub fn save(&self) -> Result<(), RdpctlError> {
        store::save(&self.path, &self.document, &self.password)
    }

    /// Re-encrypt the vault under a new master password.
    ///
    /// The session keeps the old password if the write fails.
    pub fn change_password(&mut self, new_password: SecretString) -> Result<(), RdpctlError> {
        store::save(&self.path, &self.document, &new_password)?;
        self.password = new_password;
        info!(path = %self.path.display(), "master password changed");
        Ok(())
    }

    /// Split the session into its document and retained password, releasing
    /// the file lock.
    pub fn into_parts(self) -> (VaultDocument, SecretString) {
        (self.document, self.password)
    }
}

/// Unlock the vault at `path`, or create it on first run.
///
/// Takes the advisory lock first; a vault held by another process fails
/// with [`RdpctlError::Locked`] before any prompt.
pub fn run<S>(path: &Path, source: &mut S) -> Result<UnlockedVault, RdpctlError>
where
    S: PasswordSource + ?Sized,
{
    run_with_budget(path, source, MAX_UNLOCK_ATTEMPTS)
}

/// [`run`] with an explicit attempt budget.
pub fn run_with_budget<S>(
    path: &Path,
    source: &mut S,
    budget: u32,
) -> Result<UnlockedVault, RdpctlError>
where
    S: PasswordSource + ?Sized,
{
    let lock = VaultLock::acquire(path)?;

    let (document, password) = if store::exists(path)? {
        unlock_existing(path, source, budget)?
    } else {
        first_time_setup(path, source)?
    };

    Ok(UnlockedVault {
        path: path.to_path_buf(),
        document,
        password,
        _lock: lock,
    })
}

/// Create a new vault after a confirmed password.
///
/// Any confirmed string is accepted, including the empty one.
pub fn first_time_setup<S>(
    path: &Path,
    source: &mut S,
) -> Result<(VaultDocument, SecretString), RdpctlError>
where
    S: PasswordSource + ?Sized,
{
    debug!(path = %path.display(), "no vault found, running first-time setup");
    let (password, confirmation) = source.prompt_password_with_confirmation()?;

    if password.expose_secret() != confirmation.expose_secret() {
        return Err(RdpctlError::PasswordMismatch);
    }

    let document = store::create_new(path, &password)?;
    Ok((document, password))
}

/// Prompt and try to load until a password is accepted or the budget runs out.
///
/// Only [`RdpctlError::AuthenticationFailure`] consumes an attempt. Any other
/// error aborts immediately.
pub fn unlock_existing<S>(
    path: &Path,
    source: &mut S,
    budget: u32,
) -> Result<(VaultDocument, SecretString), RdpctlError>
where
    S: PasswordSource + ?Sized,
{
    let mut state = UnlockState::start(budget);

    while let UnlockState::Attempting { .. } = state {
        let password = source.prompt_password("Master password: ")?;
        match store::load(path, &password) {
            Ok(document) => {
                state = state.on_attempt(AttemptOutcome::Accepted);
                debug!(?state, "vault unlocked");
                return Ok((document, password));
            }
            Err(e) if e.is_authentication_failure() => {
                state = state.on_attempt(AttemptOutcome::Rejected);
                warn!(remaining = state.remaining(), "incorrect master password");
                if state != UnlockState::Exhausted {
                    source.report_failure(state.remaining());
                }
            }
            Err(e) => return Err(e),
        }
    }

    Err(RdpctlError::TooManyAttempts)
}
