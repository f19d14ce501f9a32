// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ordered git steps of one run.
//!
//! ```text
//! Clone             git clone --depth N -- <url> <path>      (cwd: parent)
//! ConfigureIdentity git config user.name <name>
//!                   git config user.email <email>
//! Fetch             git fetch <remote> +<ref>
//! Checkout          git -c advice.detachedHead=false checkout -qf <commit>
//! Branch            git checkout -b <prefix><commit>
//! Mutate            FileMutator
//! Stage             git add --all
//! Commit            git commit --message "Update <marker> for <commit>"
//! Push              git push --set-upstream <remote> <branch>
//! ```
//!
//! The first failing step aborts the pipeline with a `GitStepError`.

use bon::Builder;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, trace};

use super::backend::GitExecutor;
use crate::error::{BotResult, GitStepError};
use crate::event::PushEvent;
use crate::mutate::FileMutator;
use crate::workspace::Workspace;

/// One step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineStep {
    Clone,
    ConfigureIdentity,
    Fetch,
    Checkout,
    Branch,
    Mutate,
    Stage,
    Commit,
    Push,
}

impl PipelineStep {
    /// All steps in execution order.
    pub const ALL: [Self; 9] = [
        Self::Clone,
        Self::ConfigureIdentity,
        Self::Fetch,
        Self::Checkout,
        Self::Branch,
        Self::Mutate,
        Self::Stage,
        Self::Commit,
        Self::Push,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Clone => "clone",
            Self::ConfigureIdentity => "configure identity",
            Self::Fetch => "fetch",
            Self::Checkout => "checkout",
            Self::Branch => "branch",
            Self::Mutate => "mutate",
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::Push => "push",
        }
    }
}

impl fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline parameters taken from configuration.
#[derive(Debug, Clone, Builder)]
pub struct PipelineSettings {
    #[builder(default = 50)]
    clone_depth: u32,
    #[builder(into, default = "origin".to_string())]
    remote: String,
    #[builder(into)]
    author_name: String,
    #[builder(into)]
    author_email: String,
    /// Named in the commit message
    #[builder(into, default = "README.md".to_string())]
    marker_file: String,
}

impl PipelineSettings {
    #[must_use]
    pub const fn clone_depth(&self) -> u32 {
        self.clone_depth
    }

    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    #[must_use]
    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    #[must_use]
    pub fn author_email(&self) -> &str {
        &self.author_email
    }

    #[must_use]
    pub fn marker_file(&self) -> &str {
        &self.marker_file
    }

    /// Commit message for `commit_id`.
    #[must_use]
    pub fn commit_message(&self, commit_id: &str) -> String {
        format!("Update {} for {commit_id}", self.marker_file)
    }
}

/// A git command line and where to run it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub cwd: PathBuf,
    pub args: Vec<String>,
}

impl Invocation {
    fn new<I, S>(cwd: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cwd: cwd.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Runs the git steps of one run against a workspace.
pub struct GitPipeline<'a> {
    git: &'a dyn GitExecutor,
    mutator: &'a dyn FileMutator,
    settings: &'a PipelineSettings,
}

impl<'a> GitPipeline<'a> {
    pub fn new(
        git: &'a dyn GitExecutor,
        mutator: &'a dyn FileMutator,
        settings: &'a PipelineSettings,
    ) -> Self {
        Self {
            git,
            mutator,
            settings,
        }
    }

    /// Git commands of `step`; empty for `Mutate`.
    ///
    /// `clone_url` is the URL actually cloned (credentials included).
    #[must_use]
    pub fn invocations(
        &self,
        step: PipelineStep,
        workspace: &Workspace,
        event: &PushEvent,
        clone_url: &str,
    ) -> Vec<Invocation> {
        let repo = workspace.path();
        let settings = self.settings;
        match step {
            PipelineStep::Clone => vec![Invocation::new(
                workspace.parent(),
                [
                    "clone".to_string(),
                    "--depth".to_string(),
                    settings.clone_depth().to_string(),
                    "--".to_string(),
                    clone_url.to_string(),
                    repo.to_string_lossy().into_owned(),
                ],
            )],
            PipelineStep::ConfigureIdentity => vec![
                Invocation::new(repo, ["config", "user.name", settings.author_name()]),
                Invocation::new(repo, ["config", "user.email", settings.author_email()]),
            ],
            PipelineStep::Fetch => vec![Invocation::new(
                repo,
                [
                    "fetch".to_string(),
                    settings.remote().to_string(),
                    format!("+{}", event.git_ref()),
                ],
            )],
            PipelineStep::Checkout => vec![Invocation::new(
                repo,
                [
                    "-c",
                    "advice.detachedHead=false",
                    "checkout",
                    "-qf",
                    event.commit_id(),
                ],
            )],
            PipelineStep::Branch => vec![Invocation::new(
                repo,
                ["checkout", "-b", workspace.branch_name()],
            )],
            PipelineStep::Mutate => Vec::new(),
            PipelineStep::Stage => vec![Invocation::new(repo, ["add", "--all"])],
            PipelineStep::Commit => vec![Invocation::new(
                repo,
                [
                    "commit".to_string(),
                    "--message".to_string(),
                    settings.commit_message(event.commit_id()),
                ],
            )],
            PipelineStep::Push => vec![Invocation::new(
                repo,
                [
                    "push",
                    "--set-upstream",
                    settings.remote(),
                    workspace.branch_name(),
                ],
            )],
        }
    }

    /// Runs a single step.
    ///
    /// # Errors
    ///
    /// Returns a `GitStepError` carrying the step's diagnostic output if any
    /// command of the step fails, or a `ProcessError` if git cannot start.
    pub async fn execute(
        &self,
        step: PipelineStep,
        workspace: &Workspace,
        event: &PushEvent,
        clone_url: &str,
    ) -> BotResult<()> {
        if step == PipelineStep::Mutate {
            self.mutator
                .mutate(workspace, event)
                .await
                .map_err(|e| GitStepError {
                    step,
                    command: self.mutator.describe(),
                    diagnostic: e.to_string(),
                })?;
            info!(step = %step, "step completed");
            return Ok(());
        }

        for invocation in self.invocations(step, workspace, event, clone_url) {
            let result = self.git.git(&invocation.cwd, &invocation.args).await?;
            if !result.output.trim().is_empty() {
                trace!(step = %step, output = %result.output.trim(), "step output");
            }
            if !result.succeeded {
                debug!(step = %step, exit_code = result.exit_code, cmd = %result.command, "step failed");
                return Err(GitStepError {
                    step,
                    command: result.command,
                    diagnostic: result.diagnostic_output,
                }
                .into());
            }
        }

        info!(step = %step, "step completed");
        Ok(())
    }

    /// Runs every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step.
    pub async fn run(&self, workspace: &Workspace, event: &PushEvent, clone_url: &str) -> BotResult<()> {
        for step in PipelineStep::ALL {
            self.execute(step, workspace, event, clone_url).await?;
        }
        Ok(())
    }
}
