// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |              options / inis / handle
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, env, --set layers |
//!              '-------------+-------------'
//!                            v
//!        webhook (HMAC gate) --> orchestrator (state machine)
//!                                  |       |        |        |
//!                                  v       v        v        v
//!                              workspace  git    mutate   status
//!                                        pipeline        (reqwest)
//!                                  ^
//!                     event (push payload), credentials
//!
//!   +-----------------------------------------+
//!   |  core      process runner               |
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod credentials;
pub mod error;
pub mod event;
pub mod git;
pub mod logging;
pub mod mutate;
pub mod orchestrator;
pub mod status;
pub mod webhook;
pub mod workspace;
