// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration management for branchbot.
//!
//! # Configuration Hierarchy
//!
//! ```text
//! Priority (low → high)
//! 1. defaults
//! 2. branchbot.toml (cwd, optional)
//! 3. --config files
//! 4. BRANCHBOT_* env vars
//! 5. --set overrides
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! BRANCHBOT_GITHUB__TOKEN=ghs_...        → github.token
//! BRANCHBOT_GITHUB__WEBHOOK_SECRET=...   → github.webhook_secret
//! BRANCHBOT_WORKSPACE__BASE_DIR=/srv/bot → workspace.base_dir
//! BRANCHBOT_BOT__BRANCH_PREFIX=autobot/  → bot.branch_prefix
//! ```

pub mod loader;
pub mod types;


use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::error::{ConfigError, Result};

use loader::ConfigLoader;
use types::{BotConfig, GithubConfig, GlobalConfig, StatusConfig, WorkspaceConfig};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "branchbot.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BRANCHBOT";

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub global: GlobalConfig,
    pub workspace: WorkspaceConfig,
    pub bot: BotConfig,
    pub status: StatusConfig,
    pub github: GithubConfig,
}

fn invalid(section: &str, key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    /// Create a new configuration builder.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use branchbot::config::Config;
    ///
    /// let config = Config::builder()
    ///     .add_toml_file_optional("branchbot.toml")
    ///     .with_env_prefix("BRANCHBOT")
    ///     .build()?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Load configuration from a single TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, contains invalid TOML, or
    /// does not match the `Config` structure.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::builder().add_toml_file(path).build()
    }

    /// Load configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is not valid TOML or does not match the
    /// `Config` structure.
    pub fn parse(content: &str) -> Result<Self> {
        Self::builder().add_toml_str(content).build()
    }

    /// Make paths absolute and validate values.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` describing the first invalid value.
    pub fn resolve_and_validate(&mut self) -> Result<()> {
        if self.workspace.base_dir.as_os_str().is_empty() {
            return Err(invalid("workspace", "base_dir", "must not be empty").into());
        }
        if self.workspace.base_dir.is_relative() {
            self.workspace.base_dir = std::env::current_dir()?.join(&self.workspace.base_dir);
        }

        let prefix = &self.bot.branch_prefix;
        if prefix.is_empty() {
            return Err(invalid("bot", "branch_prefix", "must not be empty").into());
        }
        if prefix.starts_with('-')
            || prefix.contains("..")
            || prefix
                .chars()
                .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
        {
            return Err(invalid(
                "bot",
                "branch_prefix",
                format!("'{prefix}' is not usable in a branch name"),
            )
            .into());
        }

        let marker = Path::new(&self.bot.marker_file);
        if self.bot.marker_file.is_empty()
            || !marker
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(invalid(
                "bot",
                "marker_file",
                format!(
                    "'{}' must be a path inside the repository",
                    self.bot.marker_file
                ),
            )
            .into());
        }

        if self.bot.clone_depth == 0 {
            return Err(invalid("bot", "clone_depth", "must be at least 1").into());
        }
        if self.bot.author_name.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                section: "bot".to_string(),
                key: "author_name".to_string(),
            }
            .into());
        }
        if self.bot.author_email.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                section: "bot".to_string(),
                key: "author_email".to_string(),
            }
            .into());
        }
        if self.bot.remote.is_empty() || self.bot.remote.starts_with('-') {
            return Err(invalid("bot", "remote", "must be a remote name").into());
        }
        if self.status.context.is_empty() {
            return Err(invalid("status", "context", "must not be empty").into());
        }

        Ok(())
    }

    /// Format configuration options for display.
    ///
    /// Secrets are shown as `[hidden]`. Output is ordered by key.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        self.format_global_options(&mut options);
        self.format_bot_options(&mut options);
        self.format_github_options(&mut options);

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);

        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }

    fn format_global_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert(
            "global.output_log_level".into(),
            self.global.output_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.file_log_level".into(),
            self.global.file_log_level.as_u8().to_string(),
        );
        options.insert(
            "global.log_file".into(),
            self.global
                .log_file
                .as_ref()
                .map_or_else(String::new, |p| p.display().to_string()),
        );
        options.insert("global.json_logs".into(), self.global.json_logs.to_string());
        options.insert(
            "workspace.base_dir".into(),
            self.workspace.base_dir.display().to_string(),
        );
    }

    fn format_bot_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("bot.branch_prefix".into(), self.bot.branch_prefix.clone());
        options.insert("bot.author_name".into(), self.bot.author_name.clone());
        options.insert("bot.author_email".into(), self.bot.author_email.clone());
        options.insert("bot.marker_file".into(), self.bot.marker_file.clone());
        options.insert("bot.clone_depth".into(), self.bot.clone_depth.to_string());
        options.insert("bot.remote".into(), self.bot.remote.clone());
        options.insert("status.context".into(), self.status.context.clone());
        if let Some(url) = &self.status.target_url {
            options.insert("status.target_url".into(), url.clone());
        }
    }

    fn format_github_options(&self, options: &mut BTreeMap<String, String>) {
        options.insert("github.api_url".into(), self.github.api_url.clone());
        if self.github.token.is_some() {
            options.insert("github.token".into(), "[hidden]".into());
        }
        if self.github.webhook_secret.is_some() {
            options.insert("github.webhook_secret".into(), "[hidden]".into());
        }
        if !self.github.installations.is_empty() {
            let ids: Vec<String> = self
                .github
                .installations
                .iter()
                .map(ToString::to_string)
                .collect();
            options.insert("github.installations".into(), ids.join(", "));
        }
    }
}
