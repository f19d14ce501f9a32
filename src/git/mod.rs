// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!      GitPipeline (pipeline.rs)
//!   clone .. config .. fetch .. checkout .. branch
//!   .. mutate .. add .. commit .. push
//!              |
//!              v
//!      GitExecutor (backend)
//!              |
//!              v
//!      ShellGit --> git CLI
//! ```

pub mod backend;
pub mod pipeline;
