// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Advisory cross-process lock around a vault file.
//!
//! Every save rewrites the whole vault, so two processes editing the same
//! file would silently drop each other's changes. An unlocked session holds
//! an exclusive lock on a sidecar `.<name>.lock` file until it ends.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use rdpctl_core::RdpctlError;
use tracing::debug;

/// An exclusive advisory lock on a vault path, released on drop.
#[derive(Debug)]
pub struct VaultLock {
    lock_path: PathBuf,
    file: File,
}

impl VaultLock {
    /// Try to take the lock without blocking.
    ///
    /// Fails with [`RdpctlError::Locked`] if another handle already holds it.
    pub fn acquire(vault_path: &Path) -> Result<Self, RdpctlError> {
        let lock_path = lock_file_path(vault_path);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(path = %lock_path.display(), "vault lock acquired");
                Ok(Self { lock_path, file })
            }
            Err(e) if e.kind() == fs2::lock_contended_error().kind() => Err(RdpctlError::Locked),
            Err(e) => Err(RdpctlError::Io(e)),
        }
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }
}

impl Drop for VaultLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Sidecar lock file next to the vault: `vault.enc` -> `.vault.enc.lock`.
pub fn lock_file_path(vault_path: &Path) -> PathBuf {
    let file_name = vault_path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("vault");
    vault_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!(".{file_name}.lock"))
}
