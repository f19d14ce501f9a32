// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for full runs against a local bare repository.
//!
//! Uses the real `git` binary; statuses are recorded in memory.

mod common;

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use branchbot::credentials::StaticTokenProvider;
use branchbot::error::StatusReportError;
use branchbot::event::PushEvent;
use branchbot::git::backend::ShellGit;
use branchbot::git::pipeline::{PipelineSettings, PipelineStep};
use branchbot::mutate::{FileMutator, MarkerFileMutator};
use branchbot::orchestrator::{BotContext, Orchestrator, RunOutcome};
use branchbot::status::{StatusReporter, StatusState, StatusTemplate, StatusUpdate};
use branchbot::workspace::{Workspace, WorkspaceManager};
use chrono::{DateTime, Local, TimeZone};
use common::Remote;

#[derive(Default)]
struct RecordingReporter {
    states: Mutex<Vec<StatusState>>,
}

#[async_trait]
impl StatusReporter for RecordingReporter {
    async fn report(&self, update: &StatusUpdate) -> Result<(), StatusReportError> {
        self.states.lock().expect("lock").push(update.state);
        Ok(())
    }
}

/// Leaves the working tree untouched.
struct NoopMutator;

#[async_trait]
impl FileMutator for NoopMutator {
    async fn mutate(&self, _workspace: &Workspace, _event: &PushEvent) -> std::io::Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "noop".to_string()
    }
}

fn first_clock() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
}

fn second_clock() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 1, 2, 3, 4, 6).unwrap()
}

fn orchestrator(
    remote: &Remote,
    mutator: Arc<dyn FileMutator>,
) -> (Orchestrator, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::default());
    let credentials = StaticTokenProvider::with_reporter(
        None,
        Vec::new(),
        Arc::clone(&reporter) as Arc<dyn StatusReporter>,
    );
    let ctx = BotContext::builder()
        .settings(
            PipelineSettings::builder()
                .author_name("autobot".to_string())
                .author_email("autobot@example.com".to_string())
                .build(),
        )
        .workspaces(WorkspaceManager::new(remote.workspaces_dir(), "autobot/"))
        .status(StatusTemplate {
            context: "autobot".to_string(),
            target_url: None,
        })
        .credentials(Arc::new(credentials))
        .git(Arc::new(ShellGit::default()))
        .mutator(mutator)
        .build();
    (Orchestrator::new(ctx), reporter)
}

fn marker() -> Arc<dyn FileMutator> {
    Arc::new(MarkerFileMutator::new("README.md").with_clock(first_clock))
}

fn states(reporter: &RecordingReporter) -> Vec<StatusState> {
    reporter.states.lock().expect("lock").clone()
}

#[tokio::test]
async fn pipeline_creates_branch_with_marker_commit() {
    let remote = Remote::seeded();
    let (orchestrator, reporter) = orchestrator(&remote, marker());

    let outcome = orchestrator
        .handle_delivery("push", &remote.push_payload(&remote.head))
        .await
        .expect("run should succeed");

    let branch = format!("autobot/{}", remote.head);
    assert_eq!(outcome, RunOutcome::Completed { branch: branch.clone() });
    assert!(remote.heads().lines().any(|r| r == format!("refs/heads/{branch}")));

    let readme = remote.show(&branch, "README.md");
    assert_eq!(
        readme,
        format!(
            "# hello\nUpdated at 2026-01-02 03:04:05 for commit {} of refs/heads/main",
            remote.head
        )
    );

    let message = common::git(&remote.bare, &["log", "-1", "--format=%s|%an", &branch]);
    assert_eq!(message, format!("Update README.md for {}|autobot", remote.head));

    assert_eq!(states(&reporter), vec![StatusState::Pending, StatusState::Success]);
    assert!(!remote.workspaces_dir().join("octo").join("hello").exists());
}

#[tokio::test]
async fn pipeline_unknown_commit_fails_at_checkout() {
    let remote = Remote::seeded();
    let (orchestrator, reporter) = orchestrator(&remote, marker());

    let err = orchestrator
        .handle_delivery("push", &remote.push_payload("deadbeefdeadbeef"))
        .await
        .expect_err("commit does not exist");

    let step = err.as_git_step().expect("git step error");
    assert_eq!(step.step, PipelineStep::Checkout);
    assert!(!step.diagnostic.is_empty());

    assert_eq!(states(&reporter), vec![StatusState::Pending, StatusState::Failure]);
    assert_eq!(remote.heads(), "refs/heads/main");
    assert!(!remote.workspaces_dir().join("octo").join("hello").exists());
}

#[tokio::test]
async fn pipeline_without_changes_fails_at_commit() {
    let remote = Remote::seeded();
    let (orchestrator, reporter) = orchestrator(&remote, Arc::new(NoopMutator));

    let err = orchestrator
        .handle_delivery("push", &remote.push_payload(&remote.head))
        .await
        .expect_err("nothing to commit");

    let step = err.as_git_step().expect("git step error");
    assert_eq!(step.step, PipelineStep::Commit);
    assert!(step.diagnostic.contains("nothing to commit"), "{}", step.diagnostic);

    assert_eq!(states(&reporter), vec![StatusState::Pending, StatusState::Failure]);
    assert_eq!(remote.heads(), "refs/heads/main");
}

#[tokio::test]
async fn pipeline_second_run_for_same_commit_fails_at_push() {
    let remote = Remote::seeded();
    let payload = remote.push_payload(&remote.head);

    let (first, _) = orchestrator(&remote, marker());
    first
        .handle_delivery("push", &payload)
        .await
        .expect("first run should succeed");

    let (second, reporter) = orchestrator(
        &remote,
        Arc::new(MarkerFileMutator::new("README.md").with_clock(second_clock)),
    );
    let err = second
        .handle_delivery("push", &payload)
        .await
        .expect_err("branch already exists upstream");

    assert_eq!(err.as_git_step().map(|e| e.step), Some(PipelineStep::Push));
    assert_eq!(states(&reporter), vec![StatusState::Pending, StatusState::Failure]);
    assert!(!remote.workspaces_dir().join("octo").join("hello").exists());
}

#[tokio::test]
async fn pipeline_ignores_push_to_own_branch() {
    let remote = Remote::seeded();
    let (orchestrator, reporter) = orchestrator(&remote, marker());

    let mut payload: serde_json::Value =
        serde_json::from_slice(&remote.push_payload(&remote.head)).expect("json");
    payload["ref"] = serde_json::Value::from(format!("refs/heads/autobot/{}", remote.head));

    let outcome = orchestrator
        .handle_delivery("push", &serde_json::to_vec(&payload).expect("json"))
        .await
        .expect("ignored");

    assert!(matches!(outcome, RunOutcome::Ignored(_)));
    assert!(states(&reporter).is_empty());
    assert!(!remote.workspaces_dir().exists());
}
