// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Ephemeral clone directories.
//!
//! ```text
//! base_dir/
//!   .locks/
//!     <owner>/
//!       <repo>.lock  <-- flock held for the whole run
//!   <owner>/
//!     <repo>/        <-- Workspace.path, one per run
//!
//! lock():    mkdir -p .locks/owner, open, flock(LOCK_EX)
//! prepare(): rm -rf path (missing is fine)
//!            mkdir -p parent
//! destroy(): rm -rf path (missing is fine)
//! ```
//!
//! The path depends only on the repository, so runs for the same repository
//! must not overlap. `lock` serializes them across threads and processes
//! sharing one base directory.

use std::fs::{File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{CleanupError, WorkspaceError};

/// Name of the branch created for `commit_id`.
#[must_use]
pub fn branch_name_for(branch_prefix: &str, commit_id: &str) -> String {
    format!("{branch_prefix}{commit_id}")
}

/// Handle to one run's working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    path: PathBuf,
    branch_name: String,
    repository: String,
}

impl Workspace {
    /// Directory the repository is cloned into.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory the clone command runs from.
    #[must_use]
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or(&self.path)
    }

    #[must_use]
    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    /// Repository full name (`owner/name`).
    #[must_use]
    pub fn repository(&self) -> &str {
        &self.repository
    }
}

/// Exclusive claim on one repository's workspace.
///
/// The lock is released when this value is dropped.
#[derive(Debug)]
pub struct WorkspaceLock {
    _file: File,
    path: PathBuf,
}

impl WorkspaceLock {
    /// Lock file backing this claim.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Creates and removes workspaces under a base directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    base_dir: PathBuf,
    branch_prefix: String,
}

impl WorkspaceManager {
    pub fn new(base_dir: impl Into<PathBuf>, branch_prefix: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            branch_prefix: branch_prefix.into(),
        }
    }

    #[must_use]
    pub fn branch_prefix(&self) -> &str {
        &self.branch_prefix
    }

    /// Computes the workspace for a repository and commit without touching disk.
    #[must_use]
    pub fn locate(&self, repository_full_name: &str, commit_id: &str) -> Workspace {
        let path = repository_full_name
            .split('/')
            .fold(self.base_dir.clone(), |path, segment| path.join(segment));
        Workspace {
            path,
            branch_name: branch_name_for(&self.branch_prefix, commit_id),
            repository: repository_full_name.to_string(),
        }
    }

    /// Waits until no other run, in this process or another, holds the
    /// workspace of `repository_full_name`.
    ///
    /// # Errors
    ///
    /// Returns a `WorkspaceError` if the lock file cannot be created or locked.
    pub async fn lock(&self, repository_full_name: &str) -> Result<WorkspaceLock, WorkspaceError> {
        let path = self.lock_path(repository_full_name);
        let target = path.clone();

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<File> {
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(false)
                .open(&target)?;
            fs2::FileExt::lock_exclusive(&file)?;
            Ok(file)
        })
        .await
        .map_err(std::io::Error::other)
        .and_then(|result| result)
        .map_err(|source| WorkspaceError {
            action: "lock workspace",
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "workspace locked");
        Ok(WorkspaceLock { _file: file, path })
    }

    fn lock_path(&self, repository_full_name: &str) -> PathBuf {
        let (owner, name) = repository_full_name
            .split_once('/')
            .unwrap_or(("", repository_full_name));
        self.base_dir
            .join(".locks")
            .join(owner)
            .join(format!("{name}.lock"))
    }

    /// Returns a clean workspace: leftovers from earlier runs are removed and
    /// the parent directory exists.
    ///
    /// # Errors
    ///
    /// Returns a `WorkspaceError` if the parent directory cannot be created.
    pub async fn prepare(
        &self,
        repository_full_name: &str,
        commit_id: &str,
    ) -> Result<Workspace, WorkspaceError> {
        let workspace = self.locate(repository_full_name, commit_id);

        match tokio::fs::remove_dir_all(workspace.path()).await {
            Ok(()) => debug!(path = %workspace.path().display(), "removed stale workspace"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            // the clone step reports whatever is really wrong with the path
            Err(e) => warn!(path = %workspace.path().display(), error = %e, "could not remove stale workspace"),
        }

        let parent = workspace.parent().to_path_buf();
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|source| WorkspaceError {
                action: "create workspace parent",
                path: parent,
                source,
            })?;

        debug!(path = %workspace.path().display(), branch = %workspace.branch_name(), "workspace prepared");
        Ok(workspace)
    }

    /// Removes the workspace directory and everything in it.
    ///
    /// # Errors
    ///
    /// Returns a `CleanupError` if the directory exists but cannot be removed.
    pub async fn destroy(&self, workspace: &Workspace) -> Result<(), CleanupError> {
        match tokio::fs::remove_dir_all(workspace.path()).await {
            Ok(()) => {
                debug!(path = %workspace.path().display(), "workspace removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(CleanupError {
                path: workspace.path().to_path_buf(),
                source,
            }),
        }
    }
}
