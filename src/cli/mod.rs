// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line interface using clap derive.
//!
//! # Command Structure
//!
//! ```text
//! branchbot [global options] <command>
//! version
//! options
//! inis
//! handle --event E --delivery D (--signature S | --signature-256 S) <PAYLOAD|->
//! ```

pub mod global;
pub mod handle;


use crate::cli::global::GlobalOptions;
use crate::cli::handle::HandleArgs;
use clap::{Parser, Subcommand};

/// Creates a branch for every pushed commit.
#[derive(Debug, Parser)]
#[command(
    name = "branchbot",
    author,
    version,
    about = "Creates a branch for every pushed commit",
    long_about = "branchbot Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Receives GitHub push deliveries, clones the repository, commits a\n\
                  marker line on a new branch named after the pushed commit and\n\
                  reports the outcome as a commit status.",
    after_help = "CONFIGURATION:\n\n\
                  Settings are layered: built-in defaults, then `branchbot.toml` in\n\
                  the current directory, then files given with --config, then\n\
                  BRANCHBOT_<SECTION>__<KEY> environment variables, then --set\n\
                  overrides and the logging flags."
)]
pub struct Cli {
    /// Global options shared by all commands
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Command to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Shows the version.
    Version,

    /// Lists all options and their resolved values.
    Options,

    /// Lists the configuration files in load order.
    Inis,

    /// Processes one webhook delivery.
    Handle(HandleArgs),
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or if help/version
/// information was requested.
pub fn try_parse() -> Result<Cli, clap::Error> {
    Cli::try_parse()
}
