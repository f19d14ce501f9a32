// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git execution backend.
//!
//! ```text
//! GitPipeline
//!     |
//!     v
//! GitExecutor (trait)  --> ShellGit (git CLI via ProcessBuilder)
//!     |                    GIT_TERMINAL_PROMPT=0
//!     v                    GCM_INTERACTIVE=never
//! GitStepResult { command, exit_code, output, diagnostic_output, succeeded }
//! ```
//!
//! A non-zero exit is data, not an error: the executor only fails when git
//! cannot be spawned at all. Deciding what a failed step means is up to the
//! pipeline.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::core::process::redact_credentials;
use crate::error::{BotResult, ProcessError};

/// Outcome of a single git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitStepResult {
    /// Command line with credentials masked
    pub command: String,
    pub exit_code: i32,
    /// Captured stdout
    pub output: String,
    /// stderr, or stdout when stderr is empty; credentials masked
    pub diagnostic_output: String,
    pub succeeded: bool,
}

impl GitStepResult {
    /// Builds a result from raw process streams.
    #[must_use]
    pub fn from_streams(command: String, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let diagnostic = if stderr.trim().is_empty() {
            stdout
        } else {
            stderr
        };
        Self {
            command,
            exit_code,
            output: stdout.to_string(),
            diagnostic_output: redact_credentials(diagnostic.trim()).into_owned(),
            succeeded: exit_code == 0,
        }
    }
}

/// Runs one git command in a directory.
#[async_trait]
pub trait GitExecutor: Send + Sync {
    /// Run `git <args>` with `cwd` as working directory.
    ///
    /// # Errors
    ///
    /// Returns a `ProcessError` only if git could not be started.
    async fn git(&self, cwd: &Path, args: &[String]) -> BotResult<GitStepResult>;
}

/// Git CLI backend.
#[derive(Debug, Clone)]
pub struct ShellGit {
    program: PathBuf,
}

impl Default for ShellGit {
    fn default() -> Self {
        Self::new("git")
    }
}

impl ShellGit {
    /// Uses the given git executable.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolves `git` from PATH.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::ExecutableNotFound` if git is not installed.
    pub fn locate() -> Result<Self, ProcessError> {
        ProcessBuilder::find("git")
            .map(Self::new)
            .ok_or_else(|| ProcessError::ExecutableNotFound {
                name: "git".to_string(),
            })
    }

    /// Path of the git executable.
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    fn builder(&self, cwd: &Path, args: &[String]) -> ProcessBuilder {
        ProcessBuilder::new(&self.program)
            .name("git")
            .args(args)
            .cwd(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .flag(ProcessFlags::ALLOW_FAILURE)
            .capture_output()
    }
}

#[async_trait]
impl GitExecutor for ShellGit {
    async fn git(&self, cwd: &Path, args: &[String]) -> BotResult<GitStepResult> {
        let builder = self.builder(cwd, args);
        let command = builder.command_line();
        let output = builder.run().await?;
        Ok(GitStepResult::from_streams(
            command,
            output.exit_code(),
            output.stdout(),
            output.stderr(),
        ))
    }
}
