// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI arguments for the `handle` command.
//!
//! ```text
//! USAGE:
//! $ branchbot handle --event push --delivery $ID \
//!       --signature-256 "sha256=..." payload.json
//! $ cat payload.json | branchbot handle --event ping --delivery $ID \
//!       --signature "sha1=..." -
//! ```

use clap::Args;
use std::path::PathBuf;

/// Arguments for the `handle` command.
#[derive(Debug, Clone, Args)]
pub struct HandleArgs {
    /// Event name (`X-GitHub-Event`).
    #[arg(short = 'e', long = "event", value_name = "EVENT", env = "X_GITHUB_EVENT")]
    pub event: Option<String>,

    /// Delivery id (`X-GitHub-Delivery`).
    #[arg(short = 'd', long = "delivery", value_name = "ID", env = "X_GITHUB_DELIVERY")]
    pub delivery: Option<String>,

    /// HMAC-SHA1 signature (`X-Hub-Signature`).
    #[arg(long = "signature", value_name = "SIG", env = "X_HUB_SIGNATURE")]
    pub signature: Option<String>,

    /// HMAC-SHA256 signature (`X-Hub-Signature-256`).
    #[arg(long = "signature-256", value_name = "SIG", env = "X_HUB_SIGNATURE_256")]
    pub signature_256: Option<String>,

    /// JSON payload file, `-` reads standard input.
    #[arg(value_name = "PAYLOAD", default_value = "-")]
    pub payload: PathBuf,
}

impl HandleArgs {
    /// Whether the payload comes from standard input.
    #[must_use]
    pub fn reads_stdin(&self) -> bool {
        self.payload.as_os_str() == "-"
    }
}
