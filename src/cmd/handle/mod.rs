// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `handle` command: one webhook delivery from the command line.
//!
//! ```text
//! HandleArgs --> WebhookDelivery --> WebhookGate::handle --> "<status> <body>"
//!                                         |
//!                             BotContext::from_config(config)
//! ```
//!
//! The response is printed on stdout. The command fails when the status is
//! not 2xx, so callers can rely on the exit code.

use std::path::Path;

use anyhow::{Context, bail};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::cli::handle::HandleArgs;
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::{BotContext, Orchestrator};
use crate::webhook::{WebhookDelivery, WebhookGate, WebhookResponse};

#[cfg(test)]
mod tests;

/// Reads the payload from `path`, or from stdin when `stdin` is set.
///
/// # Errors
///
/// Returns an error if the payload cannot be read.
pub async fn read_payload(path: &Path, stdin: bool) -> Result<Vec<u8>> {
    if stdin {
        return read_body(tokio::io::stdin())
            .await
            .context("failed to read payload from stdin");
    }
    tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read payload from {}", path.display()))
}

/// Reads `reader` to the end.
///
/// # Errors
///
/// Returns the I/O error of the underlying reader.
pub async fn read_body<R: AsyncRead + Unpin>(mut reader: R) -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    reader.read_to_end(&mut body).await?;
    Ok(body)
}

/// Builds the delivery from arguments and an already read body.
#[must_use]
pub fn delivery_from_args(args: &HandleArgs, body: Vec<u8>) -> WebhookDelivery {
    WebhookDelivery {
        event: args.event.clone(),
        delivery_id: args.delivery.clone(),
        signature: args.signature.clone(),
        signature_256: args.signature_256.clone(),
        body,
    }
}

/// Wires the production gate from `config` and processes `delivery`.
///
/// # Errors
///
/// Returns an error if the collaborators cannot be built.
pub async fn handle_delivery(config: &Config, delivery: &WebhookDelivery) -> Result<WebhookResponse> {
    let ctx = BotContext::from_config(config).context("failed to set up bot context")?;
    let gate = WebhookGate::new(config.github.webhook_secret.clone(), Orchestrator::new(ctx));
    Ok(gate.handle(delivery).await)
}

/// Run the handle command.
///
/// # Errors
///
/// Returns an error if the payload cannot be read or the response status is
/// not 2xx.
pub async fn run_handle_command(args: &HandleArgs, config: &Config) -> Result<()> {
    let body = read_payload(&args.payload, args.reads_stdin()).await?;
    debug!(bytes = body.len(), "payload read");

    let delivery = delivery_from_args(args, body);
    let response = handle_delivery(config, &delivery).await?;
    println!("{} {}", response.status, response.body);

    if !response.is_success() {
        bail!("delivery failed with status {}", response.status);
    }
    Ok(())
}
