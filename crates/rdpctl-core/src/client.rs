// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line arguments for the `xfreerdp` client.

use crate::profile::ConnectionProfile;

/// Masked form of a `/p:` argument.
pub const MASKED_PASSWORD_ARG: &str = "/p:********";

/// Build the client arguments for a profile.
///
/// Fixed flags come first, then host, user, optional domain and password,
/// then the profile's extra arguments in their stored order.
pub fn build_args(profile: &ConnectionProfile, password: Option<&str>) -> Vec<String> {
    let mut args = vec![
        "+clipboard".to_string(),
        "+dynamic-resolution".to_string(),
        format!("/v:{}", profile.host()),
        format!("/u:{}", profile.username()),
    ];

    if let Some(domain) = profile.domain() {
        args.push(format!("/d:{domain}"));
    }
    if let Some(password) = password.filter(|p| !p.is_empty()) {
        args.push(format!("/p:{password}"));
    }
    args.extend(profile.extra_args().iter().cloned());
    args
}

/// Copy of `args` safe to print or log: every `/p:` value is masked.
pub fn sanitize_args_for_display(args: &[String]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            if arg.starts_with("/p:") {
                MASKED_PASSWORD_ARG.to_string()
            } else {
                arg.clone()
            }
        })
        .collect()
}
