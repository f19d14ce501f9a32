// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Installation credentials.
//!
//! ```text
//! installation id
//!      |
//!      v
//! CredentialProvider (trait) --> StaticTokenProvider (token from config)
//!      |
//!      v
//! Installation
//!   authenticated_clone_url()  https://x-access-token:<token>@host/...
//!   reporter                   Arc<dyn StatusReporter>
//! ```

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::error::{BotResult, CredentialError};
use crate::status::{GithubStatusReporter, StatusReporter};

/// Rewrites an `https://` clone URL to carry `token`.
///
/// Other schemes are returned unchanged.
#[must_use]
pub fn authenticated_clone_url(clone_url: &str, token: Option<&str>) -> String {
    match (token, clone_url.strip_prefix("https://")) {
        (Some(token), Some(rest)) if !token.is_empty() => {
            format!("https://x-access-token:{token}@{rest}")
        }
        _ => clone_url.to_string(),
    }
}

/// Access to one installation: clone credentials and a status client.
#[derive(Clone)]
pub struct Installation {
    token: Option<String>,
    reporter: Arc<dyn StatusReporter>,
}

impl fmt::Debug for Installation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installation")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish_non_exhaustive()
    }
}

impl Installation {
    pub fn new(token: Option<String>, reporter: Arc<dyn StatusReporter>) -> Self {
        Self { token, reporter }
    }

    /// Clone URL with this installation's token embedded.
    #[must_use]
    pub fn authenticated_clone_url(&self, clone_url: &str) -> String {
        authenticated_clone_url(clone_url, self.token.as_deref())
    }

    #[must_use]
    pub fn reporter(&self) -> &dyn StatusReporter {
        self.reporter.as_ref()
    }
}

/// Yields credentials for an installation.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Credentials for `installation_id`.
    ///
    /// # Errors
    ///
    /// Returns a `CredentialError` if the installation is unknown.
    async fn installation(&self, installation_id: u64) -> BotResult<Installation>;
}

/// Serves one configured token to every installation, or only to an
/// allow-list of installation ids when one is configured.
pub struct StaticTokenProvider {
    token: Option<String>,
    allowed: Vec<u64>,
    reporter: Arc<dyn StatusReporter>,
}

impl StaticTokenProvider {
    /// Provider posting statuses to `api_url` with `token`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Client` if the HTTP client cannot be built.
    pub fn new(
        api_url: &str,
        token: Option<String>,
        allowed: Vec<u64>,
    ) -> Result<Self, CredentialError> {
        let reporter = GithubStatusReporter::new(api_url, token.clone())?;
        Ok(Self::with_reporter(token, allowed, Arc::new(reporter)))
    }

    /// Provider using an existing reporter.
    pub fn with_reporter(
        token: Option<String>,
        allowed: Vec<u64>,
        reporter: Arc<dyn StatusReporter>,
    ) -> Self {
        Self {
            token,
            allowed,
            reporter,
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticTokenProvider {
    async fn installation(&self, installation_id: u64) -> BotResult<Installation> {
        if !self.allowed.is_empty() && !self.allowed.contains(&installation_id) {
            return Err(CredentialError::UnknownInstallation { installation_id }.into());
        }
        Ok(Installation::new(self.token.clone(), Arc::clone(&self.reporter)))
    }
}
