// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!              BotError (16 bytes)
//!                     |
//!   +------+------+------+------+------+------+
//!   |      |      |      |      |      |      |
//!   v      v      v      v      v      v      v
//! Valid  GitStep Wksp   Cred   Hook   Cfg    Proc
//!  Box    Box    Box    Box    Box    Box    Box
//!
//! Propagation:
//!   ValidationError   surfaced at once, no workspace touched
//!   GitStepError      failure status + cleanup, then surfaced verbatim
//!   StatusReportError logged only, never converted to BotError
//!   CleanupError      logged only, never converted to BotError
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::git::pipeline::PipelineStep;

/// Convenience alias for `anyhow::Result`.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`BotError`].
pub type BotResult<T> = std::result::Result<T, BotError>;

/// Top-level error type of a run.
///
/// All sub-errors are boxed to keep this enum two words wide.
#[derive(Debug, Error)]
pub enum BotError {
    /// The push payload is missing required fields or carries malformed ones.
    #[error("{0}")]
    Validation(#[from] Box<ValidationError>),

    /// A git pipeline step failed. Displays the step diagnostic verbatim.
    #[error("{0}")]
    GitStep(#[from] Box<GitStepError>),

    /// Preparing a workspace failed.
    #[error("workspace error: {0}")]
    Workspace(#[from] Box<WorkspaceError>),

    /// No credentials for the installation.
    #[error("credential error: {0}")]
    Credential(#[from] Box<CredentialError>),

    /// Webhook delivery rejected.
    #[error("webhook error: {0}")]
    Webhook(#[from] Box<WebhookError>),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(#[from] Box<ConfigError>),

    /// Process execution error.
    #[error("process error: {0}")]
    Process(#[from] Box<ProcessError>),
}

impl BotError {
    /// Returns the git step error if this is one.
    #[must_use]
    pub fn as_git_step(&self) -> Option<&GitStepError> {
        match self {
            Self::GitStep(err) => Some(err),
            _ => None,
        }
    }

    /// Returns true for payload validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

// --- From implementations for boxing ---

/// Macro to generate `From` implementations that box the source error.
macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for BotError {
                fn from(err: $error) -> Self {
                    BotError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    ValidationError => Validation,
    GitStepError => GitStep,
    WorkspaceError => Workspace,
    CredentialError => Credential,
    WebhookError => Webhook,
    ConfigError => Config,
    ProcessError => Process,
}

// --- Validation Errors ---

/// Push payload validation errors.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The body is not a JSON document of the expected shape.
    #[error("invalid body: {message}")]
    MalformedPayload { message: String },

    /// A required field is absent or null.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A field is present but unusable.
    #[error("invalid value for '{field}': {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

// --- Git Step Errors ---

/// A git pipeline step that did not succeed.
///
/// `diagnostic` is the raw tool output of the failing step.
#[derive(Debug, Error)]
#[error("{step} failed: {diagnostic}")]
pub struct GitStepError {
    pub step: PipelineStep,
    pub command: String,
    pub diagnostic: String,
}

// --- Status Report Errors ---

/// Commit-status API errors.
#[derive(Debug, Error)]
pub enum StatusReportError {
    /// Error from reqwest library.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP response.
    #[error("http error {status}: {url} ({body})")]
    HttpError {
        status: u16,
        url: String,
        body: String,
    },
}

// --- Cleanup Errors ---

/// Workspace removal errors.
#[derive(Debug, Error)]
#[error("failed to remove '{}': {source}", path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

// --- Workspace Errors ---

/// Workspace lock and preparation errors.
#[derive(Debug, Error)]
#[error("failed to {action} '{}': {source}", path.display())]
pub struct WorkspaceError {
    pub action: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

// --- Credential Errors ---

/// Credential provider errors.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// The provider has nothing for this installation.
    #[error("no credentials for installation {installation_id}")]
    UnknownInstallation { installation_id: u64 },

    /// The HTTP client could not be built.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

// --- Webhook Errors ---

/// Webhook delivery verification errors.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No webhook secret configured.
    #[error("Must provide a 'github.webhook_secret' setting")]
    MissingSecret,

    /// No signature header on the delivery.
    #[error("No X-Hub-Signature found on request")]
    MissingSignature,

    /// No event header on the delivery.
    #[error("No X-GitHub-Event found on request")]
    MissingEvent,

    /// No delivery id header on the delivery.
    #[error("No X-GitHub-Delivery found on request")]
    MissingDelivery,

    /// The signature header is not `sha1=<hex>` or `sha256=<hex>`.
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    /// The signature does not match the body.
    #[error("X-Hub-Signature incorrect. Github webhook token doesn't match")]
    SignatureMismatch,
}

impl WebhookError {
    /// HTTP status code for the rejection.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::MissingEvent => 422,
            _ => 401,
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration key.
    #[error("missing required config key '{key}' in section '[{section}]'")]
    MissingKey { section: String, key: String },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section '[{section}]': {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },
}

// --- Process Errors ---

/// Process execution errors.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Executable not found in PATH.
    #[error("executable not found: '{name}' (not in PATH)")]
    ExecutableNotFound { name: String },

    /// Failed to spawn process.
    #[error("failed to spawn process '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to wait on or read from a running process.
    #[error("failed to read output from process '{command}': {message}")]
    OutputError { command: String, message: String },
}
