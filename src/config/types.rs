// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration types for branchbot.
//!
//! # Config Structure
//!
//! ```text
//! Config
//!   [global]     log levels, log file, json output
//!   [workspace]  base_dir
//!   [bot]        branch_prefix, author, marker_file, clone_depth, remote
//!   [status]     context, target_url
//!   [github]     api_url, token, webhook_secret, installations
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::logging::{LogConfig, LogLevel};

/// Global configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Log level for console output (0-6).
    pub output_log_level: LogLevel,
    /// Log level for file output (0-6).
    pub file_log_level: LogLevel,
    /// Path to log file; no file logging when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    /// Emit console logs as JSON lines.
    pub json_logs: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            output_log_level: LogLevel::INFO,
            file_log_level: LogLevel::TRACE,
            log_file: None,
            json_logs: false,
        }
    }
}

impl GlobalConfig {
    /// Logging setup for these options.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::builder()
            .with_console_level(self.output_log_level)
            .with_file_level(self.file_log_level)
            .maybe_with_log_file(self.log_file.as_ref().map(|p| p.display().to_string()))
            .with_json(self.json_logs)
            .build()
    }
}

/// Where clones live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Base directory; each repository is cloned to `<base_dir>/<owner>/<repo>`.
    pub base_dir: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: std::env::temp_dir().join("branchbot"),
        }
    }
}

/// Branch and commit settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotConfig {
    /// Prefix of created branches; pushes to such branches are ignored.
    pub branch_prefix: String,
    pub author_name: String,
    pub author_email: String,
    /// File the marker line is appended to, relative to the repository root.
    pub marker_file: String,
    pub clone_depth: u32,
    pub remote: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            branch_prefix: "branchbot/".to_string(),
            author_name: "branchbot".to_string(),
            author_email: "branchbot@users.noreply.github.com".to_string(),
            marker_file: "README.md".to_string(),
            clone_depth: 50,
            remote: "origin".to_string(),
        }
    }
}

/// Commit status settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusConfig {
    pub context: String,
    /// Link attached to every status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            context: "branchbot".to_string(),
            target_url: None,
        }
    }
}

/// GitHub access.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GithubConfig {
    pub api_url: String,
    /// Installation access token used for cloning, pushing and statuses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Shared secret of the webhook signatures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    /// Installation ids served; empty serves all.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub installations: Vec<u64>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            webhook_secret: None,
            installations: Vec::new(),
        }
    }
}
