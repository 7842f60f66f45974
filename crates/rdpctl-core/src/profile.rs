// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection profiles and the vault document that holds them.
//!
//! The document is the plaintext payload of the vault file. It is an ordered
//! list of profiles; order is insertion/edit order and only matters for
//! display. Lookups are linear scans by id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::debug;

use crate::error::RdpctlError;

/// Format version written into new documents and vault envelopes.
pub const FORMAT_VERSION: u8 = 1;

/// One stored remote-host credential and parameter record.
///
/// The stored password is only ever non-empty when `store_password` is set.
/// Constructors and [`ConnectionProfile::apply`] clear it otherwise, and
/// deserialization drops a stale secret carried by older files.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ProfileRecord")]
pub struct ConnectionProfile {
    id: String,
    name: String,
    host: String,
    #[serde(serialize_with = "serialize_optional_str")]
    domain: Option<String>,
    username: String,
    store_password: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    password: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    extra_args: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for ConnectionProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionProfile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("host", &self.host)
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("store_password", &self.store_password)
            .field("password", &"[REDACTED]")
            .field("extra_args", &self.extra_args)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// User-supplied fields for a new profile.
#[derive(Clone, Default)]
pub struct ProfileDraft {
    pub name: String,
    pub host: String,
    pub domain: Option<String>,
    pub username: String,
    pub store_password: bool,
    pub password: Option<String>,
    pub extra_args: Vec<String>,
}

/// A partial update to an existing profile. `None` keeps the current value.
///
/// `domain: Some("")` clears the domain. An empty `password` keeps the
/// currently stored secret.
#[derive(Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub host: Option<String>,
    pub domain: Option<String>,
    pub username: Option<String>,
    pub store_password: Option<bool>,
    pub password: Option<String>,
    pub extra_args: Option<Vec<String>>,
}

impl ConnectionProfile {
    /// Build a new profile with a fresh id and both timestamps set to now.
    pub fn new(draft: ProfileDraft) -> Result<Self, RdpctlError> {
        Self::new_at(draft, Utc::now())
    }

    /// Build a new profile stamped with the given creation time.
    pub fn new_at(draft: ProfileDraft, now: DateTime<Utc>) -> Result<Self, RdpctlError> {
        let name = require_input("name", &draft.name)?;
        let host = require_input("host", &draft.host)?;
        let username = require_input("username", &draft.username)?;

        let password = if draft.store_password {
            let secret = draft.password.unwrap_or_default();
            if secret.is_empty() {
                return Err(RdpctlError::Validation(
                    "a password is required when store_password is set".to_string(),
                ));
            }
            secret
        } else {
            String::new()
        };

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            host,
            domain: normalize_domain(draft.domain),
            username,
            store_password: draft.store_password,
            password,
            extra_args: clean_extra_args(draft.extra_args),
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial edit, stamping `updated_at` with the current time.
    pub fn apply(&mut self, edit: ProfileEdit) -> Result<(), RdpctlError> {
        self.apply_at(edit, Utc::now())
    }

    /// Apply a partial edit with an explicit timestamp.
    ///
    /// Validation runs before anything is changed, so a rejected edit leaves
    /// the profile untouched. `updated_at` never moves before `created_at`.
    pub fn apply_at(&mut self, edit: ProfileEdit, now: DateTime<Utc>) -> Result<(), RdpctlError> {
        let name = edit.name.as_deref().map(|v| require_input("name", v)).transpose()?;
        let host = edit.host.as_deref().map(|v| require_input("host", v)).transpose()?;
        let username = edit
            .username
            .as_deref()
            .map(|v| require_input("username", v))
            .transpose()?;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(domain) = edit.domain {
            self.domain = normalize_domain(Some(domain));
        }
        if let Some(username) = username {
            self.username = username;
        }
        if let Some(store) = edit.store_password {
            self.store_password = store;
        }
        if self.store_password {
            if let Some(password) = edit.password
                && !password.is_empty()
            {
                self.password = password;
            }
        } else {
            self.password.clear();
        }
        if let Some(args) = edit.extra_args {
            self.extra_args = clean_extra_args(args);
        }

        self.updated_at = now.max(self.created_at);
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn store_password(&self) -> bool {
        self.store_password
    }

    /// The stored secret, or `None` when nothing is stored.
    pub fn password(&self) -> Option<&str> {
        if self.store_password && !self.password.is_empty() {
            Some(&self.password)
        } else {
            None
        }
    }

    pub fn extra_args(&self) -> &[String] {
        &self.extra_args
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Display form of the stored secret: masked preview or "(not stored)".
    pub fn password_display(&self) -> String {
        match self.password() {
            Some(secret) => mask_secret(secret),
            None => "(not stored)".to_string(),
        }
    }
}

/// The plaintext payload of a vault: format version plus ordered profiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDocument {
    pub version: u8,
    #[serde(default)]
    connections: Vec<ConnectionProfile>,
}

impl Default for VaultDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl VaultDocument {
    /// An empty document at the current format version.
    pub fn new() -> Self {
        Self {
            version: FORMAT_VERSION,
            connections: Vec::new(),
        }
    }

    pub fn connections(&self) -> &[ConnectionProfile] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Append a profile. Rejects an id that is already present.
    pub fn add(&mut self, profile: ConnectionProfile) -> Result<(), RdpctlError> {
        if self.position(&profile.id).is_some() {
            return Err(RdpctlError::Validation(format!(
                "a profile with id {} already exists",
                profile.id
            )));
        }
        debug!(id = %profile.id, "profile added");
        self.connections.push(profile);
        Ok(())
    }

    /// Replace the profile with the same id, keeping its position.
    ///
    /// The stored id and creation time are kept; `updated_at` is stamped now.
    pub fn replace(&mut self, mut profile: ConnectionProfile) -> Result<(), RdpctlError> {
        let index = self
            .position(&profile.id)
            .ok_or_else(|| RdpctlError::ProfileNotFound(profile.id.clone()))?;
        let existing = &self.connections[index];
        profile.created_at = existing.created_at;
        profile.updated_at = Utc::now().max(profile.created_at);
        if !profile.store_password {
            profile.password.clear();
        }
        debug!(id = %profile.id, "profile replaced");
        self.connections[index] = profile;
        Ok(())
    }

    /// Apply a partial edit to the profile with the given id.
    pub fn edit(&mut self, id: &str, edit: ProfileEdit) -> Result<&ConnectionProfile, RdpctlError> {
        let index = self
            .position(id)
            .ok_or_else(|| RdpctlError::ProfileNotFound(id.to_string()))?;
        let profile = &mut self.connections[index];
        profile.apply(edit)?;
        debug!(id = %id, "profile edited");
        Ok(&*profile)
    }

    /// Remove and return the profile with the given id.
    pub fn remove(&mut self, id: &str) -> Result<ConnectionProfile, RdpctlError> {
        let index = self
            .position(id)
            .ok_or_else(|| RdpctlError::ProfileNotFound(id.to_string()))?;
        debug!(id = %id, "profile removed");
        Ok(self.connections.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&ConnectionProfile> {
        self.connections.iter().find(|p| p.id == id)
    }

    /// Resolve a user query to a single profile.
    ///
    /// Tries, in order: exact id, exact name, then a case-insensitive
    /// substring of name or host. A substring query that matches more than
    /// one profile is rejected as ambiguous.
    pub fn find(&self, query: &str) -> Result<&ConnectionProfile, RdpctlError> {
        if let Some(profile) = self.get(query) {
            return Ok(profile);
        }
        if let Some(profile) = self.connections.iter().find(|p| p.name == query) {
            return Ok(profile);
        }

        let needle = query.to_lowercase();
        let mut matches = self.connections.iter().filter(|p| {
            p.name.to_lowercase().contains(&needle) || p.host.to_lowercase().contains(&needle)
        });
        match (matches.next(), matches.next()) {
            (Some(profile), None) => Ok(profile),
            (Some(_), Some(_)) => Err(RdpctlError::Validation(format!(
                "query `{query}` matches more than one profile"
            ))),
            (None, _) => Err(RdpctlError::ProfileNotFound(query.to_string())),
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.connections.iter().position(|p| p.id == id)
    }
}

/// Split a comma-separated argument list, trimming parts and dropping empties.
pub fn parse_extra_args(input: &str) -> Vec<String> {
    clean_extra_args(input.split(',').map(str::to_string).collect())
}

/// Mask a secret value for display: "abcd...wxyz" format.
///
/// Short values (< 10 chars) are fully masked as "****".
pub fn mask_secret(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() < 10 {
        return "****".to_string();
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{prefix}...{suffix}")
}

fn clean_extra_args(args: Vec<String>) -> Vec<String> {
    args.into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

fn normalize_domain(domain: Option<String>) -> Option<String> {
    domain
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

fn require_input(field: &str, value: &str) -> Result<String, RdpctlError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RdpctlError::Validation(format!("{field} cannot be empty")));
    }
    Ok(trimmed.to_string())
}

/// The domain is always written, as an empty string when absent.
fn serialize_optional_str<S: serde::Serializer>(
    value: &Option<String>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(value.as_deref().unwrap_or(""))
}

fn deserialize_optional_str<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(normalize_domain(value))
}

/// Wire form of a profile, normalized into [`ConnectionProfile`] on load.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileRecord {
    id: String,
    name: String,
    host: String,
    #[serde(default, deserialize_with = "deserialize_optional_str")]
    domain: Option<String>,
    username: String,
    #[serde(default)]
    store_password: bool,
    #[serde(default)]
    password: String,
    #[serde(default)]
    extra_args: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRecord> for ConnectionProfile {
    fn from(record: ProfileRecord) -> Self {
        let password = if record.store_password {
            record.password
        } else {
            if !record.password.is_empty() {
                debug!(id = %record.id, "dropping stale secret on profile without store_password");
            }
            String::new()
        };
        Self {
            id: record.id,
            name: record.name,
            host: record.host,
            domain: record.domain,
            username: record.username,
            store_password: record.store_password,
            password,
            extra_args: record.extra_args,
            created_at: record.created_at,
            updated_at: record.updated_at.max(record.created_at),
        }
    }
}
