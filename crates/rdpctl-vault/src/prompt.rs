// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or RDPCTL_MASTER_PASSWORD.

use std::io::IsTerminal;

use rdpctl_core::RdpctlError;
use secrecy::SecretString;

/// The environment variable name for providing the master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "RDPCTL_MASTER_PASSWORD";

/// Where the unlock protocol gets passwords from.
///
/// The core performs no validation of the returned strings beyond
/// comparing the confirmation pair.
pub trait PasswordSource {
    /// Ask for one password.
    fn prompt_password(&mut self, label: &str) -> Result<SecretString, RdpctlError>;

    /// Ask for a new password and its confirmation.
    fn prompt_password_with_confirmation(
        &mut self,
    ) -> Result<(SecretString, SecretString), RdpctlError>;

    /// Called after a rejected password with the attempts still left.
    fn report_failure(&mut self, _remaining: u32) {}
}

/// Password source backed by the terminal.
///
/// `RDPCTL_MASTER_PASSWORD` takes priority for headless use; otherwise the
/// password is read with echo disabled. The environment value is offered
/// once: asking again means it was rejected, and a headless caller cannot
/// retry, so the second request fails with
/// [`RdpctlError::AuthenticationFailure`].
#[derive(Debug, Default)]
pub struct TerminalPrompt {
    env_password_used: bool,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordSource for TerminalPrompt {
    fn prompt_password(&mut self, label: &str) -> Result<SecretString, RdpctlError> {
        if let Some(password) = password_from_env() {
            if self.env_password_used {
                return Err(RdpctlError::AuthenticationFailure);
            }
            self.env_password_used = true;
            return Ok(password);
        }
        read_hidden(label)
    }

    fn prompt_password_with_confirmation(
        &mut self,
    ) -> Result<(SecretString, SecretString), RdpctlError> {
        // Env var does not need confirmation.
        if let Ok(value) = std::env::var(MASTER_PASSWORD_ENV_VAR)
            && !value.is_empty()
        {
            return Ok((SecretString::from(value.clone()), SecretString::from(value)));
        }
        let first = read_hidden("New master password: ")?;
        let second = read_hidden("Confirm master password: ")?;
        Ok((first, second))
    }

    fn report_failure(&mut self, remaining: u32) {
        if !self.env_password_used {
            eprintln!("Incorrect password. {remaining} attempts remaining.");
        }
    }
}

fn password_from_env() -> Option<SecretString> {
    std::env::var(MASTER_PASSWORD_ENV_VAR)
        .ok()
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Read one line from the terminal with echo disabled.
///
/// Never consults the environment, so it is also used for connection
/// passwords. Fails when stdin is not a terminal.
pub fn read_hidden(label: &str) -> Result<SecretString, RdpctlError> {
    if !std::io::stdin().is_terminal() {
        return Err(RdpctlError::Prompt(format!(
            "no terminal available. Set {MASTER_PASSWORD_ENV_VAR} or run interactively."
        )));
    }

    eprint!("{label}");
    let value = rpassword::read_password().map_err(|e| match e.kind() {
        std::io::ErrorKind::Interrupted | std::io::ErrorKind::UnexpectedEof => {
            RdpctlError::Cancelled
        }
        _ => RdpctlError::Prompt(format!("failed to read password: {e}")),
    })?;
    Ok(SecretString::from(value))
}
