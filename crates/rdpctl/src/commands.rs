// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.
//!
//! Every mutating command changes the in-memory document first and then
//! saves the whole vault. If the save fails the error is returned and the
//! file on disk still holds the previous complete vault.

use std::io::Write;
use std::process::{Command, Stdio};

use colored::Colorize;
use rdpctl_core::{
    build_args, parse_extra_args, sanitize_args_for_display, ConnectionProfile, ProfileDraft,
    ProfileEdit, RdpctlError, VaultDocument,
};
use rdpctl_vault::UnlockedVault;
use serde::Serialize;
use tracing::{error, info};

/// Fields for a new profile, as collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct AddRequest {
    pub name: String,
    pub host: String,
    pub username: String,
    pub domain: Option<String>,
    pub extra_args: Option<String>,
    /// Connection password to store. `None` means it is not stored.
    pub password: Option<String>,
}

/// Partial update collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct EditRequest {
    pub name: Option<String>,
    pub host: Option<String>,
    pub username: Option<String>,
    pub domain: Option<String>,
    pub store_password: Option<bool>,
    pub password: Option<String>,
    pub extra_args: Option<String>,
}

/// Profile summary for `list --json`. Never carries the secret.
#[derive(Debug, Serialize)]
pub struct ProfileSummary<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub host: &'a str,
    pub domain: Option<&'a str>,
    pub username: &'a str,
    pub password_stored: bool,
    pub extra_args: &'a [String],
}

impl<'a> From<&'a ConnectionProfile> for ProfileSummary<'a> {
    fn from(p: &'a ConnectionProfile) -> Self {
        Self {
            id: p.id(),
            name: p.name(),
            host: p.host(),
            domain: p.domain(),
            username: p.username(),
            password_stored: p.password().is_some(),
            extra_args: p.extra_args(),
        }
    }
}

/// Print all profiles as a table, or as JSON summaries.
pub fn list(document: &VaultDocument, json: bool, out: &mut impl Write) -> Result<(), RdpctlError> {
    if json {
        let summaries: Vec<ProfileSummary<'_>> =
            document.connections().iter().map(ProfileSummary::from).collect();
        serde_json::to_writer_pretty(&mut *out, &summaries).map_err(RdpctlError::Serialization)?;
        writeln!(out)?;
        return Ok(());
    }

    if document.is_empty() {
        writeln!(out, "Vault is empty.")?;
        return Ok(());
    }
    write!(out, "{}", render_table(document))?;
    Ok(())
}

/// Print one profile. The stored password is masked unless `reveal` is set.
pub fn show(
    document: &VaultDocument,
    query: &str,
    reveal: bool,
    out: &mut impl Write,
) -> Result<(), RdpctlError> {
    let profile = document.find(query)?;
    let password = match (reveal, profile.password()) {
        (true, Some(secret)) => secret.to_string(),
        _ => profile.password_display(),
    };

    writeln!(out, "Name:       {}", profile.name())?;
    writeln!(out, "Id:         {}", profile.id())?;
    writeln!(out, "Host:       {}", profile.host())?;
    writeln!(out, "Domain:     {}", profile.domain().unwrap_or("-"))?;
    writeln!(out, "Username:   {}", profile.username())?;
    writeln!(out, "Password:   {password}")?;
    writeln!(out, "Extra args: {}", profile.extra_args().join(", "))?;
    writeln!(out, "Created:    {}", profile.created_at().to_rfc3339())?;
    writeln!(out, "Updated:    {}", profile.updated_at().to_rfc3339())?;
    Ok(())
}

/// Add a profile and save the vault.
pub fn add(
    session: &mut UnlockedVault,
    request: AddRequest,
    out: &mut impl Write,
) -> Result<(), RdpctlError> {
    let profile = ConnectionProfile::new(ProfileDraft {
        name: request.name,
        host: request.host,
        domain: request.domain,
        username: request.username,
        store_password: request.password.is_some(),
        password: request.password,
        extra_args: request
            .extra_args
            .as_deref()
            .map(parse_extra_args)
            .unwrap_or_default(),
    })?;
    let name = profile.name().to_string();

    session.document_mut().add(profile)?;
    save(session)?;
    writeln!(out, "{}", format!("Connection '{name}' added.").green())?;
    Ok(())
}

/// Edit the profile matching `query` and save the vault.
pub fn edit(
    session: &mut UnlockedVault,
    query: &str,
    request: EditRequest,
    out: &mut impl Write,
) -> Result<(), RdpctlError> {
    let id = session.document().find(query)?.id().to_string();
    let profile = session.document_mut().edit(
        &id,
        ProfileEdit {
            name: request.name,
            host: request.host,
            domain: request.domain,
            username: request.username,
            store_password: request.store_password,
            password: request.password,
            extra_args: request.extra_args.as_deref().map(parse_extra_args),
        },
    )?;
    let name = profile.name().to_string();

    save(session)?;
    writeln!(out, "{}", format!("Connection '{name}' updated.").green())?;
    Ok(())
}

/// Remove the profile matching `query` and save the vault.
pub fn remove(
    session: &mut UnlockedVault,
    query: &str,
    out: &mut impl Write,
) -> Result<(), RdpctlError> {
    let id = session.document().find(query)?.id().to_string();
    let removed = session.document_mut().remove(&id)?;

    save(session)?;
    writeln!(
        out,
        "{}",
        format!("Connection '{}' deleted.", removed.name()).green()
    )?;
    Ok(())
}

/// Launch the remote desktop client for `profile` and wait for it to exit.
///
/// Only the masked argument list is printed. The client inherits the
/// terminal.
pub fn connect(
    profile: &ConnectionProfile,
    password: Option<&str>,
    program: &str,
    out: &mut impl Write,
) -> Result<(), RdpctlError> {
    let args = build_args(profile, password);

    writeln!(out, "Connecting to {}...", profile.name())?;
    writeln!(
        out,
        "Running {program} {}",
        sanitize_args_for_display(&args).join(" ")
    )?;
    out.flush()?;

    info!(program, host = %profile.host(), "starting remote desktop client");
    let status = Command::new(program)
        .args(&args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .map_err(|e| RdpctlError::Client(format!("failed to start {program}: {e}")))?;

    if !status.success() {
        return Err(RdpctlError::Client(format!("{program} exited with {status}")));
    }
    Ok(())
}

fn save(session: &UnlockedVault) -> Result<(), RdpctlError> {
    session.save().inspect_err(|e| {
        error!(error = %e, path = %session.path().display(), "failed to save vault");
    })
}

/// Render profiles as an aligned table.
pub fn render_table(document: &VaultDocument) -> String {
    const HEADERS: [&str; 6] = ["Name", "Host", "Domain", "Username", "Password", "Extra Args"];

    let rows: Vec<[String; 6]> = document
        .connections()
        .iter()
        .map(|p| {
            [
                p.name().to_string(),
                p.host().to_string(),
                p.domain().unwrap_or("").to_string(),
                p.username().to_string(),
                p.password_display(),
                p.extra_args().join(", "),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    let underline = HEADERS.map(|h| "-".repeat(h.len()));
    push_row(&mut table, &HEADERS.map(str::to_string), &widths);
    push_row(&mut table, &underline, &widths);
    for row in &rows {
        push_row(&mut table, row, &widths);
    }
    table
}

fn push_row(table: &mut String, cells: &[String; 6], widths: &[usize; 6]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("   ");
    table.push_str(line.trim_end());
    table.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document() -> VaultDocument {
        let mut doc = VaultDocument::new();
        doc.add(
            ConnectionProfile::new(ProfileDraft {
                name: "web".to_string(),
                host: "10.0.0.5".to_string(),
                username: "admin".to_string(),
                store_password: true,
                password: Some("correct-horse-battery".to_string()),
                extra_args: vec!["/cert-ignore".to_string()],
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();
        doc.add(
            ConnectionProfile::new(ProfileDraft {
                name: "database".to_string(),
                host: "db.internal".to_string(),
                domain: Some("CORP".to_string()),
                username: "dba".to_string(),
                ..Default::default()
            })
            .unwrap(),
        )
        .unwrap();
        doc
    }

    #[test]
    fn table_aligns_columns_and_masks_secrets() {
        let table = render_table(&document());
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("Name       Host"));
        assert!(lines[2].contains("corr...tery"));
        assert!(!table.contains("correct-horse-battery"));
        assert!(lines[3].contains("(not stored)"));
        assert!(lines[3].contains("CORP"));
    }

    #[test]
    fn list_empty_vault() {
        let mut out = Vec::new();
        list(&VaultDocument::new(), false, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Vault is empty.\n");
    }

    #[test]
    fn list_json_never_contains_secret() {
        let mut out = Vec::new();
        list(&document(), true, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(!text.contains("correct-horse-battery"));
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed[0]["name"], "web");
        assert_eq!(parsed[0]["password_stored"], true);
        assert_eq!(parsed[1]["password_stored"], false);
        assert_eq!(parsed[1]["domain"], "CORP");
    }

    #[test]
    fn show_masks_unless_revealed() {
        let doc = document();

        let mut masked = Vec::new();
        show(&doc, "web", false, &mut masked).unwrap();
        let masked = String::from_utf8(masked).unwrap();
        assert!(masked.contains("Password:   corr...tery"));

        let mut revealed = Vec::new();
        show(&doc, "web", true, &mut revealed).unwrap();
        let revealed = String::from_utf8(revealed).unwrap();
        assert!(revealed.contains("Password:   correct-horse-battery"));
    }

    #[cfg(unix)]
    #[test]
    fn connect_prints_masked_command_and_runs_client() {
        let doc = document();
        let profile = doc.find("web").unwrap();

        let mut out = Vec::new();
        connect(profile, profile.password(), "true", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Connecting to web..."));
        assert!(text.contains(
            "Running true +clipboard +dynamic-resolution /v:10.0.0.5 /u:admin /p:******** /cert-ignore"
        ));
        assert!(!text.contains("correct-horse-battery"));
    }

    #[cfg(unix)]
    #[test]
    fn connect_reports_failing_client() {
        let doc = document();
        let profile = doc.find("database").unwrap();

        let mut out = Vec::new();
        let result = connect(profile, Some("typed-at-prompt"), "false", &mut out);
        assert!(matches!(result, Err(RdpctlError::Client(_))));
        assert!(String::from_utf8(out).unwrap().contains("/d:CORP /p:********"));
    }

    #[test]
    fn connect_with_missing_program_is_client_error() {
        let doc = document();
        let profile = doc.find("web").unwrap();

        let mut out = Vec::new();
        let result = connect(profile, None, "rdpctl-no-such-client-program", &mut out);
        assert!(matches!(result, Err(RdpctlError::Client(message)) if message.contains("failed to start")));
    }

    #[test]
    fn show_unknown_profile_fails() {
        let mut out = Vec::new();
        let result = show(&document(), "mail", false, &mut out);
        assert!(matches!(result, Err(RdpctlError::ProfileNotFound(_))));
    }
}
