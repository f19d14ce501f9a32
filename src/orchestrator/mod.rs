// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! End-to-end run of one push event.
//!
//! ```text
//! handle_delivery(event, body)
//!   event != push            --> Ignored(UnsupportedEvent)
//!   PushEvent::from_payload  --> ValidationError
//!   ref is own branch        --> Ignored(OwnBranch)
//!        |
//!        v
//! run(event)                       [span: run repo=.. commit=..]
//!   credentials.installation()     --> CredentialError (nothing touched yet)
//!   lock workspace                 --> WorkspaceError (no status yet)
//!   report pending                 (logged on failure)
//!   prepare workspace
//!   clone .. push                  GitPipeline, step by step
//!        |                  \
//!        | ok                \ error
//!        v                    v
//!   destroy workspace    join!(report failure, destroy workspace)
//!   report success       surface the error
//!        |
//!        v
//!   Completed { branch }
//! ```

pub mod state;

#[cfg(test)]
mod tests;

use bon::Builder;
use std::sync::Arc;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::Config;
use crate::credentials::{CredentialProvider, Installation, StaticTokenProvider};
use crate::error::BotResult;
use crate::event::PushEvent;
use crate::git::backend::{GitExecutor, ShellGit};
use crate::git::pipeline::{GitPipeline, PipelineSettings, PipelineStep};
use crate::mutate::{FileMutator, MarkerFileMutator};
use crate::status::{StatusState, StatusTemplate, StatusUpdate};
use crate::workspace::{Workspace, WorkspaceManager};

use state::{RunMachine, RunState};

/// Event name that triggers a run.
pub const PUSH_EVENT: &str = "push";

/// Why a delivery did not start a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Any event other than `push`.
    UnsupportedEvent(String),
    /// A push to a branch this bot created; carries the ref.
    OwnBranch(String),
}

/// Result of a delivery that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Ignored(IgnoreReason),
    Completed { branch: String },
}

/// Everything a run needs, passed explicitly.
#[derive(Builder)]
pub struct BotContext {
    settings: PipelineSettings,
    workspaces: WorkspaceManager,
    status: StatusTemplate,
    credentials: Arc<dyn CredentialProvider>,
    #[builder(default = Arc::new(ShellGit::default()) as Arc<dyn GitExecutor>)]
    git: Arc<dyn GitExecutor>,
    mutator: Arc<dyn FileMutator>,
}

impl BotContext {
    /// Wires the production collaborators from configuration.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialError` if the HTTP client cannot be built.
    pub fn from_config(config: &Config) -> BotResult<Self> {
        let credentials = StaticTokenProvider::new(
            &config.github.api_url,
            config.github.token.clone(),
            config.github.installations.clone(),
        )?;
        let git = ShellGit::locate().unwrap_or_default();

        Ok(Self::builder()
            .settings(
                PipelineSettings::builder()
                    .clone_depth(config.bot.clone_depth)
                    .remote(config.bot.remote.clone())
                    .author_name(config.bot.author_name.clone())
                    .author_email(config.bot.author_email.clone())
                    .marker_file(config.bot.marker_file.clone())
                    .build(),
            )
            .workspaces(WorkspaceManager::new(
                config.workspace.base_dir.clone(),
                config.bot.branch_prefix.clone(),
            ))
            .status(StatusTemplate {
                context: config.status.context.clone(),
                target_url: config.status.target_url.clone(),
            })
            .credentials(Arc::new(credentials))
            .git(Arc::new(git))
            .mutator(Arc::new(MarkerFileMutator::new(&config.bot.marker_file)))
            .build())
    }
}

/// Drives runs for push events.
pub struct Orchestrator {
    ctx: BotContext,
}

impl Orchestrator {
    #[must_use]
    pub const fn new(ctx: BotContext) -> Self {
        Self { ctx }
    }

    /// Handles one webhook delivery that already passed signature checks.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` for unusable payloads and the run's error
    /// otherwise.
    pub async fn handle_delivery(&self, event_name: &str, body: &[u8]) -> BotResult<RunOutcome> {
        if event_name != PUSH_EVENT {
            info!(event = %event_name, "ignoring event");
            return Ok(RunOutcome::Ignored(IgnoreReason::UnsupportedEvent(
                event_name.to_string(),
            )));
        }

        let event = PushEvent::from_payload(body)?;

        if event.is_own_branch(self.ctx.workspaces.branch_prefix()) {
            info!(git_ref = %event.git_ref(), "ignoring push to own branch");
            return Ok(RunOutcome::Ignored(IgnoreReason::OwnBranch(
                event.git_ref().to_string(),
            )));
        }

        self.run(&event).await
    }

    /// Runs the full pipeline for `event`.
    ///
    /// The workspace is removed on every path out of this function once it
    /// has been prepared, and exactly one of success or failure is reported.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialError` before anything is touched, a
    /// `WorkspaceError` if the workspace lock cannot be taken, or the error of
    /// the failing step after failure reporting and cleanup.
    pub async fn run(&self, event: &PushEvent) -> BotResult<RunOutcome> {
        let span = info_span!(
            "run",
            repo = %event.repository_full_name(),
            commit = %event.commit_id()
        );
        self.run_inner(event).instrument(span).await
    }

    async fn run_inner(&self, event: &PushEvent) -> BotResult<RunOutcome> {
        let installation = self
            .ctx
            .credentials
            .installation(event.installation_id())
            .await?;

        let _lock = self
            .ctx
            .workspaces
            .lock(event.repository_full_name())
            .await?;
        let mut machine = RunMachine::new();

        self.report(&installation, event, StatusState::Pending).await;
        machine.advance(RunState::PendingReported);

        let workspace = self
            .ctx
            .workspaces
            .locate(event.repository_full_name(), event.commit_id());

        match self.execute(&installation, event, &mut machine).await {
            Ok(()) => {
                self.destroy(&workspace).await;
                self.report(&installation, event, StatusState::Success).await;
                machine.advance(RunState::SuccessReported);
                machine.advance(RunState::Done);
                info!(branch = %workspace.branch_name(), "run completed");
                Ok(RunOutcome::Completed {
                    branch: workspace.branch_name().to_string(),
                })
            }
            Err(err) => {
                error!(error = %err, "run failed");
                tokio::join!(
                    self.report(&installation, event, StatusState::Failure),
                    self.destroy(&workspace),
                );
                machine.advance(RunState::FailureReported);
                machine.advance(RunState::CleanedUp);
                machine.advance(RunState::Done);
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        installation: &Installation,
        event: &PushEvent,
        machine: &mut RunMachine,
    ) -> BotResult<()> {
        let workspace = self
            .ctx
            .workspaces
            .prepare(event.repository_full_name(), event.commit_id())
            .await?;

        let clone_url = installation.authenticated_clone_url(event.clone_url());
        let pipeline = GitPipeline::new(
            self.ctx.git.as_ref(),
            self.ctx.mutator.as_ref(),
            &self.ctx.settings,
        );

        for step in PipelineStep::ALL {
            pipeline.execute(step, &workspace, event, &clone_url).await?;
            if let Some(next) = RunState::after_step(step) {
                machine.advance(next);
            }
        }
        Ok(())
    }

    async fn report(&self, installation: &Installation, event: &PushEvent, state: StatusState) {
        let update = StatusUpdate::for_event(event, state, &self.ctx.status);
        if let Err(e) = installation.reporter().report(&update).await {
            warn!(state = %state, error = %e, "failed to report commit status");
        }
    }

    async fn destroy(&self, workspace: &Workspace) {
        if let Err(e) = self.ctx.workspaces.destroy(workspace).await {
            warn!(error = %e, "failed to remove workspace");
        }
    }
}

impl From<BotContext> for Orchestrator {
    fn from(ctx: BotContext) -> Self {
        Self::new(ctx)
    }
}

