// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk binary envelope of the vault file.
//!
//! Layout, fixed order, no padding:
//!
//! | field      | size     |
//! |------------|----------|
//! | marker     | 4        |
//! | version    | 1        |
//! | salt       | 16       |
//! | nonce      | 12       |
//! | ciphertext | the rest |
//!
//! The envelope knows nothing about the plaintext schema. Marker and version
//! are checked before any key derivation happens.

use std::fs;
use std::io::Write;
use std::path::Path;

use rdpctl_core::{RdpctlError, FORMAT_VERSION};
use tracing::debug;

use crate::crypto::NONCE_LEN;
use crate::kdf::SALT_LEN;

/// Marker identifying a vault file.
pub const MAGIC: [u8; 4] = *b"RDP1";

/// Length of the fixed-size header preceding the ciphertext.
pub const HEADER_LEN: usize = MAGIC.len() + 1 + SALT_LEN + NONCE_LEN;

/// A parsed vault envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultEnvelope {
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    /// AES-256-GCM ciphertext with the tag appended.
    pub ciphertext: Vec<u8>,
}

impl VaultEnvelope {
    /// Serialize the envelope at the current format version.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(HEADER_LEN + self.ciphertext.len());
        out.extend_from_slice(&MAGIC);
        out.push(FORMAT_VERSION);
        out.extend_from_slice(&self.salt);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Parse an envelope from raw file bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RdpctlError> {
        let mut reader = FieldReader { rest: bytes };

        let marker: [u8; 4] = reader.take("marker")?;
        if marker != MAGIC {
            return Err(RdpctlError::CorruptFile(
                "invalid vault file marker".to_string(),
            ));
        }

        let [version]: [u8; 1] = reader.take("version")?;
        if version != FORMAT_VERSION {
            return Err(RdpctlError::UnsupportedVersion {
                found: version,
                expected: FORMAT_VERSION,
            });
        }

        let salt = reader.take("salt")?;
        let nonce = reader.take("nonce")?;

        Ok(Self {
            salt,
            nonce,
            ciphertext: reader.rest.to_vec(),
        })
    }
}

/// Sequential reader over the fixed-size header fields.
struct FieldReader<'a> {
    rest: &'a [u8],
}

impl FieldReader<'_> {
    fn take<const N: usize>(&mut self, field: &str) -> Result<[u8; N], RdpctlError> {
        let Some((head, tail)) = self.rest.split_first_chunk::<N>() else {
            return Err(RdpctlError::CorruptFile(format!(
                "file ends before the {field} field ({} of {N} bytes)",
                self.rest.len()
            )));
        };
        self.rest = tail;
        Ok(*head)
    }
}

/// Read and parse the envelope stored at `path`.
pub fn read(path: &Path) -> Result<VaultEnvelope, RdpctlError> {
    let bytes = fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => RdpctlError::NotFound {
            path: path.to_path_buf(),
        },
        _ => RdpctlError::Io(e),
    })?;
    debug!(path = %path.display(), len = bytes.len(), "read vault envelope");
    VaultEnvelope::from_bytes(&bytes)
}

/// Write the envelope to `path`, replacing any existing file atomically.
///
/// The bytes go to a temporary file in the same directory, which is flushed
/// to disk and then renamed over the target. A crash leaves either the old
/// complete file or the new complete file, never a partial one.
pub fn write(path: &Path, envelope: &VaultEnvelope) -> Result<(), RdpctlError> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = tempfile::Builder::new()
        .prefix(".vault-")
        .suffix(".tmp")
        .tempfile_in(parent)?;
    set_owner_only(temp.path())?;
    temp.write_all(&envelope.to_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| RdpctlError::Io(e.error))?;

    // Persist the rename itself; not every platform allows syncing a directory.
    if let Ok(dir) = fs::File::open(parent) {
        let _ = dir.sync_all();
    }

    debug!(path = %path.display(), "wrote vault envelope");
    Ok(())
}

fn set_owner_only(_path: &Path) -> Result<(), RdpctlError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(_path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
