// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! rdpctl - encrypted vault of remote desktop connection profiles.
//!
//! This is the binary entry point.

mod commands;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rdpctl_config::RdpctlConfig;
use rdpctl_core::RdpctlError;
use rdpctl_vault::{store, unlock, read_hidden, TerminalPrompt, UnlockedVault};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::commands::{AddRequest, EditRequest};

/// rdpctl - manage an encrypted vault of RDP connection profiles.
#[derive(Parser, Debug)]
#[command(name = "rdpctl", version, about, long_about = None)]
struct Cli {
    /// Path to the vault file (overrides configuration).
    #[arg(long, global = true, value_name = "PATH")]
    vault: Option<PathBuf>,

    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault.
    Init,
    /// List all connection profiles.
    List {
        /// Print JSON instead of a table. Passwords are never included.
        #[arg(long)]
        json: bool,
    },
    /// Show one connection profile.
    Show {
        /// Profile id or name (case-insensitive).
        query: String,
        /// Print the stored password in clear.
        #[arg(long)]
        reveal: bool,
    },
    /// Add a connection profile.
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        host: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        domain: Option<String>,
        /// Prompt for a connection password and store it in the vault.
        #[arg(long)]
        password_prompt: bool,
        /// Comma-separated extra client arguments.
        #[arg(long, value_name = "ARGS")]
        extra_args: Option<String>,
    },
    /// Edit a connection profile. Omitted fields keep their values.
    Edit {
        /// Profile id or name (case-insensitive).
        query: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        host: Option<String>,
        /// New domain; an empty value clears it.
        #[arg(long)]
        domain: Option<String>,
        #[arg(long)]
        username: Option<String>,
        /// Whether the connection password is kept in the vault.
        #[arg(long, value_name = "BOOL")]
        store_password: Option<bool>,
        /// Prompt for a new connection password.
        #[arg(long)]
        password_prompt: bool,
        /// Comma-separated extra client arguments; replaces the current list.
        #[arg(long, value_name = "ARGS")]
        extra_args: Option<String>,
    },
    /// Remove a connection profile.
    Remove {
        /// Profile id or name (case-insensitive).
        query: String,
    },
    /// Re-encrypt the vault under a new master password.
    Passwd,
    /// Connect to a host with the remote desktop client.
    Connect {
        /// Profile id or name (case-insensitive).
        query: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match rdpctl_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            rdpctl_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.log.level);

    match run(cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: &RdpctlConfig) -> Result<(), RdpctlError> {
    let path = rdpctl_config::resolve_vault_path(config, cli.vault.as_deref())?;
    debug!(path = %path.display(), "resolved vault path");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Init => {
            if store::exists(&path)? {
                return Err(RdpctlError::Validation(format!(
                    "a vault already exists at {}",
                    path.display()
                )));
            }
            let session = open(&path)?;
            writeln!(out, "New vault created at {}", session.path().display())?;
        }
        Commands::List { json } => {
            let session = open(&path)?;
            commands::list(session.document(), json, &mut out)?;
        }
        Commands::Show { query, reveal } => {
            let session = open(&path)?;
            commands::show(session.document(), &query, reveal, &mut out)?;
        }
        Commands::Add {
            name,
            host,
            username,
            domain,
            password_prompt,
            extra_args,
        } => {
            let mut session = open(&path)?;
            let password = if password_prompt {
                Some(connection_password()?)
            } else {
                None
            };
            let request = AddRequest {
                name,
                host,
                username,
                domain,
                extra_args,
                password,
            };
            commands::add(&mut session, request, &mut out)?;
        }
        Commands::Edit {
            query,
            name,
            host,
            domain,
            username,
            store_password,
            password_prompt,
            extra_args,
        } => {
            let mut session = open(&path)?;
            let password = if password_prompt {
                Some(connection_password()?)
            } else {
                None
            };
            let request = EditRequest {
                name,
                host,
                username,
                domain,
                store_password: store_password.or(password.as_ref().map(|_| true)),
                password,
                extra_args,
            };
            commands::edit(&mut session, &query, request, &mut out)?;
        }
        Commands::Remove { query } => {
            let mut session = open(&path)?;
            commands::remove(&mut session, &query, &mut out)?;
        }
        Commands::Passwd => {
            let mut session = open(&path)?;
            let new_password = new_master_password()?;
            session.change_password(new_password)?;
            writeln!(out, "Master password changed.")?;
        }
        Commands::Connect { query } => {
            // The vault is released before the client runs.
            let profile = {
                let session = open(&path)?;
                session.document().find(&query)?.clone()
            };
            let prompted = match profile.password() {
                Some(_) => None,
                None => Some(read_hidden(&format!(
                    "Password for {}@{}: ",
                    profile.username(),
                    profile.host()
                ))?),
            };
            let password = profile
                .password()
                .or(prompted.as_ref().map(|p| p.expose_secret()));
            commands::connect(&profile, password, &config.client.program, &mut out)?;
        }
    }

    Ok(())
}

/// Unlock the vault, running first-time setup when it does not exist yet.
fn open(path: &Path) -> Result<UnlockedVault, RdpctlError> {
    if !store::exists(path)? {
        eprintln!("No vault found at {}. Creating a new one.", path.display());
    }
    unlock(path, &mut TerminalPrompt::new())
}

fn connection_password() -> Result<String, RdpctlError> {
    let password = read_hidden("Connection password: ")?;
    Ok(password.expose_secret().to_string())
}

/// Prompt twice for a new master password. Never read from the environment.
fn new_master_password() -> Result<SecretString, RdpctlError> {
    let first = read_hidden("New master password: ")?;
    let second = read_hidden("Confirm master password: ")?;
    if first.expose_secret() != second.expose_secret() {
        return Err(RdpctlError::PasswordMismatch);
    }
    Ok(first)
}

/// Initialize the tracing subscriber with an env-filter on stderr.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rdpctl={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
