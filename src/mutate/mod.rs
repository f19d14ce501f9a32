// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Content change applied before committing.
//!
//! ```text
//! <workspace>/<marker file>
//!   ...existing content...
//!   Updated at 2026-01-02 03:04:05 for commit abc123 of refs/heads/main
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::event::PushEvent;
use crate::workspace::Workspace;

/// Timestamp format of the marker line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Produces the working-tree change that the new branch commits.
#[async_trait]
pub trait FileMutator: Send + Sync {
    /// Applies the change inside `workspace`.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the change cannot be written.
    async fn mutate(&self, workspace: &Workspace, event: &PushEvent) -> std::io::Result<()>;

    /// Short description for logs and step diagnostics.
    fn describe(&self) -> String;
}

/// Appends a timestamped line to a file in the repository.
#[derive(Debug, Clone)]
pub struct MarkerFileMutator {
    relative_path: PathBuf,
    clock: fn() -> DateTime<Local>,
}

impl MarkerFileMutator {
    /// Marker file at `relative_path` (relative to the workspace root).
    pub fn new(relative_path: impl Into<PathBuf>) -> Self {
        Self {
            relative_path: relative_path.into(),
            clock: Local::now,
        }
    }

    /// Replaces the time source.
    #[must_use]
    pub const fn with_clock(mut self, clock: fn() -> DateTime<Local>) -> Self {
        self.clock = clock;
        self
    }

    /// The line appended for `event` at time `at`, without trailing newline.
    #[must_use]
    pub fn render_line(event: &PushEvent, at: DateTime<Local>) -> String {
        format!(
            "Updated at {} for commit {} of {}",
            at.format(TIMESTAMP_FORMAT),
            event.commit_id(),
            event.git_ref()
        )
    }
}

/// Fails if any existing component of `relative` below `root` is a symlink.
async fn refuse_symlinks(root: &Path, relative: &Path) -> std::io::Result<()> {
    let mut current = root.to_path_buf();
    for component in relative.components() {
        current.push(component);
        match tokio::fs::symlink_metadata(&current).await {
            Ok(meta) if meta.file_type().is_symlink() => {
                return Err(Error::new(
                    ErrorKind::InvalidInput,
                    format!("refusing to write through symlink '{}'", current.display()),
                ));
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

#[async_trait]
impl FileMutator for MarkerFileMutator {
    async fn mutate(&self, workspace: &Workspace, event: &PushEvent) -> std::io::Result<()> {
        refuse_symlinks(workspace.path(), &self.relative_path).await?;

        let path = workspace.path().join(&self.relative_path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let needs_newline = match tokio::fs::read(&path).await {
            Ok(existing) => existing.last().is_some_and(|&b| b != b'\n'),
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => return Err(e),
        };

        let mut content = String::new();
        if needs_newline {
            content.push('\n');
        }
        content.push_str(&Self::render_line(event, (self.clock)()));
        content.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        debug!(file = %path.display(), "marker line appended");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("append to {}", self.relative_path.display())
    }
}
