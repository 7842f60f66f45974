// SPDX-FileCopyrightText: 2026 rdpctl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for rdpctl.
//!
//! Holds the shared error type and the connection profile model that the
//! vault encrypts. Everything here is plain data; no cryptography or I/O.

pub mod client;
pub mod error;
pub mod profile;

pub use client::{build_args, sanitize_args_for_display};
pub use error::RdpctlError;
pub use profile::{
    mask_secret, parse_extra_args, ConnectionProfile, ProfileDraft, ProfileEdit, VaultDocument,
    FORMAT_VERSION,
};
