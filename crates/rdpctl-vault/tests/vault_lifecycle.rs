// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the vault store and the unlock protocol.

use std::collections::VecDeque;
use std::path::Path;

use rdpctl_core::{ConnectionProfile, ProfileDraft, RdpctlError, FORMAT_VERSION};
use rdpctl_vault::{store, unlock, PasswordSource, VaultLock, MAX_UNLOCK_ATTEMPTS};
use secrecy::{ExposeSecret, SecretString};
use tempfile::tempdir;

/// Password source that replays a fixed script and records what happened.
#[derive(Default)]
struct ScriptedPasswords {
    passwords: VecDeque<String>,
    confirmations: VecDeque<(String, String)>,
    prompts: usize,
    failures_reported: Vec<u32>,
}

impl ScriptedPasswords {
    fn attempts(passwords: &[&str]) -> Self {
        Self {
            passwords: passwords.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn setup(password: &str, confirmation: &str) -> Self {
        Self {
            confirmations: VecDeque::from([(password.to_string(), confirmation.to_string())]),
            ..Default::default()
        }
    }
}

impl PasswordSource for ScriptedPasswords {
    fn prompt_password(&mut self, _label: &str) -> Result<SecretString, RdpctlError> {
        self.prompts += 1;
        self.passwords
            .pop_front()
            .map(SecretString::from)
            .ok_or(RdpctlError::Cancelled)
    }

    fn prompt_password_with_confirmation(
        &mut self,
    ) -> Result<(SecretString, SecretString), RdpctlError> {
        self.prompts += 1;
        self.confirmations
            .pop_front()
            .map(|(a, b)| (SecretString::from(a), SecretString::from(b)))
            .ok_or(RdpctlError::Cancelled)
    }

    fn report_failure(&mut self, remaining: u32) {
        self.failures_reported.push(remaining);
    }
}

fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}

fn web_profile() -> ConnectionProfile {
    ConnectionProfile::new(ProfileDraft {
        name: "web".to_string(),
        host: "10.0.0.5".to_string(),
        username: "admin".to_string(),
        store_password: true,
        password: Some("s3cret".to_string()),
        ..Default::default()
    })
    .unwrap()
}

fn seeded_vault(path: &Path, password: &str) -> ConnectionProfile {
    let password = secret(password);
    let mut document = store::create_new(path, &password).unwrap();
    let profile = web_profile();
    document.add(profile.clone()).unwrap();
    store::save(path, &document, &password).unwrap();
    profile
}

#[test]
fn scenario_a_create_then_load_is_empty() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");

    store::create_new(&path, &secret("correct-password")).unwrap();
    let document = store::load(&path, &secret("correct-password")).unwrap();

    assert!(document.is_empty());
    assert_eq!(document.version, FORMAT_VERSION);
}

#[test]
fn scenario_b_saved_profile_loads_identically() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    let profile = seeded_vault(&path, "p@ss1");

    let document = store::load(&path, &secret("p@ss1")).unwrap();
    assert_eq!(document.len(), 1);
    let loaded = &document.connections()[0];
    assert_eq!(loaded, &profile);
    assert_eq!(loaded.id(), profile.id());
    assert_eq!(loaded.created_at(), profile.created_at());
    assert_eq!(loaded.updated_at(), profile.updated_at());
    assert_eq!(loaded.password(), Some("s3cret"));
}

#[test]
fn scenario_c_wrong_password_leaves_file_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");
    let before = std::fs::read(&path).unwrap();

    let result = store::load(&path, &secret("wrong"));

    assert!(matches!(result, Err(RdpctlError::AuthenticationFailure)));
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn tampered_ciphertext_is_authentication_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");

    let mut bytes = std::fs::read(&path).unwrap();
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store::load(&path, &secret("p@ss1")),
        Err(RdpctlError::AuthenticationFailure)
    ));
}

#[test]
fn tampered_salt_is_authentication_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");

    let mut bytes = std::fs::read(&path).unwrap();
    bytes[5] ^= 0x01;
    std::fs::write(&path, &bytes).unwrap();

    assert!(matches!(
        store::load(&path, &secret("p@ss1")),
        Err(RdpctlError::AuthenticationFailure)
    ));
}

#[test]
fn format_guard_applies_regardless_of_password() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");
    let original = std::fs::read(&path).unwrap();

    let mut bad_marker = original.clone();
    bad_marker[..4].copy_from_slice(b"ZIP!");
    std::fs::write(&path, &bad_marker).unwrap();
    for password in ["p@ss1", "wrong"] {
        assert!(matches!(
            store::load(&path, &secret(password)),
            Err(RdpctlError::CorruptFile(_))
        ));
    }

    let mut bad_version = original;
    bad_version[4] = 7;
    std::fs::write(&path, &bad_version).unwrap();
    for password in ["p@ss1", "wrong"] {
        assert!(matches!(
            store::load(&path, &secret(password)),
            Err(RdpctlError::UnsupportedVersion { found: 7, .. })
        ));
    }
}

#[test]
fn unlock_succeeds_after_two_wrong_attempts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    let profile = seeded_vault(&path, "p@ss1");

    let mut source = ScriptedPasswords::attempts(&["nope", "still-nope", "p@ss1"]);
    let session = unlock::run(&path, &mut source).unwrap();

    assert_eq!(session.document().connections(), &[profile]);
    assert_eq!(source.prompts, 3);
    assert_eq!(source.failures_reported, vec![2, 1]);
}

#[test]
fn unlock_gives_up_after_budget() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");
    let before = std::fs::read(&path).unwrap();

    // A fourth, correct password is queued but must never be asked for.
    let mut source = ScriptedPasswords::attempts(&["a", "b", "c", "p@ss1"]);
    let result = unlock::run(&path, &mut source);

    assert!(matches!(result, Err(RdpctlError::TooManyAttempts)));
    assert_eq!(source.prompts, MAX_UNLOCK_ATTEMPTS as usize);
    assert_eq!(source.passwords.len(), 1);
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn corrupt_file_aborts_unlock_without_consuming_attempts() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    std::fs::write(&path, b"not a vault at all").unwrap();

    let mut source = ScriptedPasswords::attempts(&["a", "b", "c"]);
    let result = unlock::run(&path, &mut source);

    assert!(matches!(result, Err(RdpctlError::CorruptFile(_))));
    assert_eq!(source.prompts, 1);
    assert!(source.failures_reported.is_empty());
}

#[test]
fn first_run_creates_vault_and_retains_password() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");

    let mut source = ScriptedPasswords::setup("master", "master");
    let mut session = unlock::run(&path, &mut source).unwrap();
    assert!(path.is_file());
    assert!(session.document().is_empty());

    session.document_mut().add(web_profile()).unwrap();
    session.save().unwrap();
    drop(session);

    let document = store::load(&path, &secret("master")).unwrap();
    assert_eq!(document.len(), 1);
}

#[test]
fn first_run_with_mismatched_confirmation_creates_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");

    let mut source = ScriptedPasswords::setup("master", "masterr");
    let result = unlock::run(&path, &mut source);

    assert!(matches!(result, Err(RdpctlError::PasswordMismatch)));
    assert!(!path.exists());
}

#[test]
fn first_run_accepts_empty_password_and_unlocks_with_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");

    let mut source = ScriptedPasswords::setup("", "");
    let session = unlock::run(&path, &mut source).unwrap();
    assert!(path.is_file());
    drop(session);

    let mut source = ScriptedPasswords::attempts(&[""]);
    let session = unlock::run(&path, &mut source).unwrap();
    assert!(session.document().is_empty());
    assert_eq!(source.prompts, 1);
    assert!(source.failures_reported.is_empty());
}

#[test]
fn session_holds_the_vault_lock() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    seeded_vault(&path, "p@ss1");

    let mut source = ScriptedPasswords::attempts(&["p@ss1"]);
    let session = unlock::run(&path, &mut source).unwrap();

    let mut second = ScriptedPasswords::attempts(&["p@ss1"]);
    assert!(matches!(
        unlock::run(&path, &mut second),
        Err(RdpctlError::Locked)
    ));
    assert_eq!(second.prompts, 0);
    assert!(matches!(VaultLock::acquire(&path), Err(RdpctlError::Locked)));

    drop(session);
    assert!(VaultLock::acquire(&path).is_ok());
}

#[test]
fn change_password_reencrypts_everything() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("vault.enc");
    let profile = seeded_vault(&path, "old");

    let mut source = ScriptedPasswords::attempts(&["old"]);
    let mut session = unlock::run(&path, &mut source).unwrap();
    session.change_password(secret("new")).unwrap();
    let (_, password) = session.into_parts();
    assert_eq!(password.expose_secret(), "new");

    assert!(matches!(
        store::load(&path, &secret("old")),
        Err(RdpctlError::AuthenticationFailure)
    ));
    let document = store::load(&path, &secret("new")).unwrap();
    assert_eq!(document.connections(), &[profile]);
}
