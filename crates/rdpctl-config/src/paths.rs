// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault and config file location.

use std::path::{Path, PathBuf};

use rdpctl_core::RdpctlError;
use tracing::debug;

use crate::model::RdpctlConfig;

/// Subdirectory of the user config dir that holds the vault.
pub const APP_DIR_NAME: &str = "rdp";

/// File name of the vault inside [`APP_DIR_NAME`].
pub const VAULT_FILE_NAME: &str = "vault.enc";

/// The rdpctl config directory, `~/.config/rdp` on every platform.
///
/// Not the platform config dir: on macOS that would be
/// `~/Library/Application Support` and existing vaults would be missed.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join(APP_DIR_NAME))
}

/// Resolve the vault path from an explicit override, the config, or the
/// default location, in that order. The containing directory is created
/// with owner-only permissions.
pub fn resolve_vault_path(
    config: &RdpctlConfig,
    override_path: Option<&Path>,
) -> Result<PathBuf, RdpctlError> {
    let path = match (override_path, config.vault.path.as_deref()) {
        (Some(path), _) => path.to_path_buf(),
        (None, Some(path)) => PathBuf::from(path),
        (None, None) => config_dir()
            .ok_or_else(|| {
                RdpctlError::Config("could not determine the user config directory".to_string())
            })?
            .join(VAULT_FILE_NAME),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        ensure_private_dir(parent)?;
    }

    debug!(path = %path.display(), "resolved vault path");
    Ok(path)
}

fn ensure_private_dir(dir: &Path) -> Result<(), RdpctlError> {
    if dir.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::VaultConfig;

    #[test]
    #[serial_test::serial]
    fn config_dir_is_under_home_dot_config() {
        let home = tempfile::tempdir().unwrap();
        let previous = std::env::var_os("HOME");
        // SAFETY: test-only env mutation, serialized with #[serial].
        unsafe { std::env::set_var("HOME", home.path()) };
        let dir = config_dir();
        match previous {
            Some(value) => unsafe { std::env::set_var("HOME", value) },
            None => unsafe { std::env::remove_var("HOME") },
        }

        assert_eq!(dir, Some(home.path().join(".config").join("rdp")));
    }

    #[test]
    fn explicit_override_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = RdpctlConfig {
            vault: VaultConfig {
                path: Some(dir.path().join("from-config.enc").display().to_string()),
            },
            ..Default::default()
        };
        let override_path = dir.path().join("override.enc");

        let resolved = resolve_vault_path(&config, Some(&override_path)).unwrap();
        assert_eq!(resolved, override_path);
    }

    #[test]
    fn config_path_creates_private_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let vault = dir.path().join("nested").join("vault.enc");
        let config = RdpctlConfig {
            vault: VaultConfig {
                path: Some(vault.display().to_string()),
            },
            ..Default::default()
        };

        let resolved = resolve_vault_path(&config, None).unwrap();
        assert_eq!(resolved, vault);
        assert!(dir.path().join("nested").is_dir());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mode = std::fs::metadata(dir.path().join("nested"))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o700);
        }
    }
}
