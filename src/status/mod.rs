// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Commit status reporting.
//!
//! ```text
//! Orchestrator
//!   | StatusUpdate { owner, repo, sha, state, context, description, target_url }
//!   v
//! StatusReporter (trait)
//!   |
//!   v
//! GithubStatusReporter
//!   POST {api_url}/repos/{owner}/{repo}/statuses/{sha}
//!   { "state", "context", "description", "target_url"? }
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::error::{CredentialError, StatusReportError};
use crate::event::PushEvent;

/// Commit status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Pending,
    Success,
    Failure,
}

impl StatusState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }

    /// Human-readable description posted with the state.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Pending => "Working on it!",
            Self::Success => "Victory!!!",
            Self::Failure => "Uh-oh!",
        }
    }
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Context and link shared by every status of a deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTemplate {
    pub context: String,
    pub target_url: Option<String>,
}

/// One commit status to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub owner: String,
    pub repo: String,
    pub commit_sha: String,
    pub state: StatusState,
    pub context: String,
    pub description: String,
    pub target_url: Option<String>,
}

impl StatusUpdate {
    /// Status for the head commit of `event`.
    #[must_use]
    pub fn for_event(event: &PushEvent, state: StatusState, template: &StatusTemplate) -> Self {
        Self {
            owner: event.owner().to_string(),
            repo: event.repo_name().to_string(),
            commit_sha: event.commit_id().to_string(),
            state,
            context: template.context.clone(),
            description: state.description().to_string(),
            target_url: template.target_url.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct StatusBody<'a> {
    state: StatusState,
    context: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_url: Option<&'a str>,
}

/// Posts commit statuses.
#[async_trait]
pub trait StatusReporter: Send + Sync {
    /// Posts `update`.
    ///
    /// # Errors
    ///
    /// Returns a `StatusReportError` if the request fails or is rejected.
    async fn report(&self, update: &StatusUpdate) -> Result<(), StatusReportError>;
}

/// Status reporter backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GithubStatusReporter {
    client: Client,
    api_url: String,
    token: Option<String>,
}

impl GithubStatusReporter {
    /// Creates a reporter for `api_url` (e.g. `https://api.github.com`).
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Client` if the HTTP client cannot be built.
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Result<Self, CredentialError> {
        let client = Client::builder()
            .user_agent(format!("branchbot/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CredentialError::Client)?;
        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Endpoint for `update`.
    #[must_use]
    pub fn status_url(&self, update: &StatusUpdate) -> String {
        format!(
            "{}/repos/{}/{}/statuses/{}",
            self.api_url, update.owner, update.repo, update.commit_sha
        )
    }
}

#[async_trait]
impl StatusReporter for GithubStatusReporter {
    async fn report(&self, update: &StatusUpdate) -> Result<(), StatusReportError> {
        let url = self.status_url(update);
        let body = StatusBody {
            state: update.state,
            context: &update.context,
            description: &update.description,
            target_url: update.target_url.as_deref(),
        };

        debug!(state = %update.state, sha = %update.commit_sha, "posting commit status");

        let mut request = self
            .client
            .post(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        let response = request
            .send()
            .await
            .map_err(|source| StatusReportError::Request {
                url: url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StatusReportError::HttpError { status, url, body });
        }

        Ok(())
    }
}
