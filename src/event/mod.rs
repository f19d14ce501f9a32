// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Push event parsing and validation.
//!
//! ```text
//! raw body (JSON)
//!     |  serde_json  --> MalformedPayload
//!     v
//! RawPush { ref, repository{..}, installation{id}, head_commit{id} }
//!     |  required fields --> MissingField
//!     |  shape checks    --> InvalidField
//!     v
//! PushEvent (immutable)
//! ```
//!
//! Every field that later ends up on a git command line, in a filesystem
//! path or in a status API URL is checked here, so nothing from the payload
//! can be read as a git option or leave the workspace base directory. Owner
//! and repository name are taken from the checked `full_name`.

use serde::Deserialize;

use crate::error::ValidationError;

#[derive(Debug, Deserialize)]
struct RawPush {
    #[serde(rename = "ref")]
    git_ref: Option<String>,
    repository: Option<RawRepository>,
    installation: Option<RawInstallation>,
    head_commit: Option<RawCommit>,
}

#[derive(Debug, Deserialize)]
struct RawRepository {
    full_name: Option<String>,
    clone_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawInstallation {
    id: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct RawCommit {
    id: Option<String>,
}

/// A validated push notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEvent {
    git_ref: String,
    repository_full_name: String,
    clone_url: String,
    commit_id: String,
    installation_id: u64,
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { field })
}

fn non_empty(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn invalid(field: &'static str, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidField {
        field,
        message: message.into(),
    }
}

fn validate_commit_id(id: &str) -> Result<(), ValidationError> {
    if !(4..=64).contains(&id.len()) || !id.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid("head_commit.id", format!("'{id}' is not a commit hash")));
    }
    Ok(())
}

fn validate_ref(git_ref: &str) -> Result<(), ValidationError> {
    if !git_ref.starts_with("refs/") {
        return Err(invalid("ref", format!("'{git_ref}' does not start with 'refs/'")));
    }
    if git_ref.bytes().any(|b| b.is_ascii_whitespace() || b.is_ascii_control()) {
        return Err(invalid("ref", "contains whitespace or control characters"));
    }
    Ok(())
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.starts_with('-')
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
}

fn validate_full_name(full_name: &str) -> Result<(), ValidationError> {
    let mut parts = full_name.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if is_safe_segment(owner) && is_safe_segment(name)
    );
    if valid {
        Ok(())
    } else {
        Err(invalid(
            "repository.full_name",
            format!("'{full_name}' is not of the form owner/name"),
        ))
    }
}

fn validate_clone_url(url: &str) -> Result<(), ValidationError> {
    if url.starts_with('-') || !url.contains("://") {
        return Err(invalid("repository.clone_url", format!("'{url}' is not a URL")));
    }
    Ok(())
}

impl PushEvent {
    /// Parses and validates a raw push payload.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if the body is not JSON of the expected
    /// shape, `MissingField` if a required field is absent, and
    /// `InvalidField` if a field would be unsafe to use.
    pub fn from_payload(body: &[u8]) -> Result<Self, ValidationError> {
        let raw: RawPush =
            serde_json::from_slice(body).map_err(|e| ValidationError::MalformedPayload {
                message: e.to_string(),
            })?;

        let repository = required(raw.repository, "repository")?;
        let installation_id = required(
            required(raw.installation, "installation")?.id,
            "installation.id",
        )?;
        let git_ref = non_empty(raw.git_ref, "ref")?;
        let commit_id = non_empty(required(raw.head_commit, "head_commit")?.id, "head_commit.id")?;

        let repository_full_name = non_empty(repository.full_name, "repository.full_name")?;
        let clone_url = non_empty(repository.clone_url, "repository.clone_url")?;

        validate_commit_id(&commit_id)?;
        validate_ref(&git_ref)?;
        validate_full_name(&repository_full_name)?;
        validate_clone_url(&clone_url)?;

        Ok(Self {
            git_ref,
            repository_full_name,
            clone_url,
            commit_id,
            installation_id,
        })
    }

    /// True if the push targets a branch this bot created itself.
    #[must_use]
    pub fn is_own_branch(&self, branch_prefix: &str) -> bool {
        self.git_ref
            .strip_prefix("refs/heads/")
            .is_some_and(|branch| branch.starts_with(branch_prefix))
    }

    #[must_use]
    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    #[must_use]
    pub fn repository_full_name(&self) -> &str {
        &self.repository_full_name
    }

    #[must_use]
    pub fn clone_url(&self) -> &str {
        &self.clone_url
    }

    /// Owner segment of the validated full name.
    #[must_use]
    pub fn owner(&self) -> &str {
        self.repository_full_name
            .split_once('/')
            .map_or("", |(owner, _)| owner)
    }

    /// Repository segment of the validated full name.
    #[must_use]
    pub fn repo_name(&self) -> &str {
        self.repository_full_name
            .split_once('/')
            .map_or("", |(_, name)| name)
    }

    #[must_use]
    pub fn commit_id(&self) -> &str {
        &self.commit_id
    }

    #[must_use]
    pub const fn installation_id(&self) -> u64 {
        self.installation_id
    }
}
