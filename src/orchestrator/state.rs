// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Run state machine.
//!
//! ```text
//! Idle -> PendingReported -> Cloned -> Prepared -> Mutated -> Committed
//!              |               |          |          |           |
//!              +---------------+----------+----------+-----------+--> FailureReported
//!                                                                          |
//! Pushed -> SuccessReported -> Done                        CleanedUp <----+
//!                                                              |
//!                                                              v
//!                                                             Done
//! ```

use std::fmt;
use tracing::debug;

use crate::git::pipeline::PipelineStep;

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    PendingReported,
    Cloned,
    /// Identity configured, commit checked out, branch created
    Prepared,
    Mutated,
    Committed,
    Pushed,
    SuccessReported,
    FailureReported,
    CleanedUp,
    Done,
}

impl RunState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PendingReported => "pending-reported",
            Self::Cloned => "cloned",
            Self::Prepared => "prepared",
            Self::Mutated => "mutated",
            Self::Committed => "committed",
            Self::Pushed => "pushed",
            Self::SuccessReported => "success-reported",
            Self::FailureReported => "failure-reported",
            Self::CleanedUp => "cleaned-up",
            Self::Done => "done",
        }
    }

    /// True while the pipeline is running and may still fail.
    #[must_use]
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            Self::PendingReported
                | Self::Cloned
                | Self::Prepared
                | Self::Mutated
                | Self::Committed
                | Self::Pushed
        )
    }

    /// Whether `self -> next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Idle, Self::PendingReported)
            | (Self::PendingReported, Self::Cloned)
            | (Self::Cloned, Self::Prepared)
            | (Self::Prepared, Self::Mutated)
            | (Self::Mutated, Self::Committed)
            | (Self::Committed, Self::Pushed)
            | (Self::Pushed, Self::SuccessReported)
            | (Self::SuccessReported | Self::CleanedUp, Self::Done)
            | (Self::FailureReported, Self::CleanedUp) => true,
            (from, Self::FailureReported) => from.is_in_flight(),
            _ => false,
        }
    }

    /// State reached once `step` has completed, if the step ends a phase.
    #[must_use]
    pub const fn after_step(step: PipelineStep) -> Option<Self> {
        match step {
            PipelineStep::Clone => Some(Self::Cloned),
            PipelineStep::Branch => Some(Self::Prepared),
            PipelineStep::Mutate => Some(Self::Mutated),
            PipelineStep::Commit => Some(Self::Committed),
            PipelineStep::Push => Some(Self::Pushed),
            PipelineStep::ConfigureIdentity
            | PipelineStep::Fetch
            | PipelineStep::Checkout
            | PipelineStep::Stage => None,
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records the transitions of one run.
#[derive(Debug, Clone)]
pub struct RunMachine {
    history: Vec<RunState>,
}

impl Default for RunMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl RunMachine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            history: vec![RunState::Idle],
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Idle)
    }

    /// Every state visited, starting with `Idle`.
    #[must_use]
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Moves to `next`. Illegal transitions panic in debug builds.
    pub fn advance(&mut self, next: RunState) {
        let current = self.state();
        debug_assert!(
            current.can_advance_to(next),
            "illegal run transition {current} -> {next}"
        );
        debug!(from = %current, to = %next, "run state");
        self.history.push(next);
    }
}
