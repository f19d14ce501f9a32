// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared fixtures: a bare "remote" repository seeded with one commit.

#![allow(dead_code, unreachable_pub)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .current_dir(cwd)
        .args(["-c", "user.name=Seed", "-c", "user.email=seed@example.com"])
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=main"])
        .args(args)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A bare origin at `<temp>/origin.git` with `main` holding one commit.
pub struct Remote {
    pub temp: TempDir,
    pub bare: PathBuf,
    pub head: String,
}

impl Remote {
    pub fn seeded() -> Self {
        let temp = tempfile::tempdir().expect("failed to create temp dir");
        let bare = temp.path().join("origin.git");
        let seed = temp.path().join("seed");

        git(temp.path(), &["init", "--bare", "origin.git"]);
        git(temp.path(), &["init", "seed"]);
        std::fs::write(seed.join("README.md"), "# hello\n").expect("write README");
        git(&seed, &["add", "README.md"]);
        git(&seed, &["commit", "-m", "initial"]);
        git(&seed, &["branch", "-M", "main"]);
        git(&seed, &["push", bare.to_str().expect("utf-8 path"), "main"]);
        let head = git(&seed, &["rev-parse", "HEAD"]);

        Self { temp, bare, head }
    }

    pub fn clone_url(&self) -> String {
        format!("file://{}", self.bare.display())
    }

    pub fn workspaces_dir(&self) -> PathBuf {
        self.temp.path().join("work")
    }

    /// Branch refs of the bare repository, one per line.
    pub fn heads(&self) -> String {
        git(&self.bare, &["for-each-ref", "--format=%(refname)", "refs/heads"])
    }

    /// Contents of `path` at `rev` in the bare repository.
    pub fn show(&self, rev: &str, path: &str) -> String {
        git(&self.bare, &["show", &format!("{rev}:{path}")])
    }

    pub fn push_payload(&self, commit: &str) -> Vec<u8> {
        serde_json::to_vec(&serde_json::json!({
            "ref": "refs/heads/main",
            "installation": { "id": 77 },
            "head_commit": { "id": commit },
            "repository": {
                "full_name": "octo/hello",
                "name": "hello",
                "clone_url": self.clone_url(),
                "owner": { "name": "octo", "login": "octo" }
            }
        }))
        .expect("serialize payload")
    }
}
