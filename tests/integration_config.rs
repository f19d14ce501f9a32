// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration layering.

use branchbot::cli::Cli;
use branchbot::config::Config;
use branchbot::config::loader::ConfigLoader;
use clap::Parser;
use std::io::Write;
use tempfile::NamedTempFile;

fn toml_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp file");
    writeln!(file, "{content}").expect("failed to write temp file");
    file
}

#[test]
fn config_cli_overrides_win_over_files() {
    let file = toml_file(
        r#"
[global]
output_log_level = 2

[bot]
branch_prefix = "filebot/"
clone_depth = 5
"#,
    );
    let cli = Cli::try_parse_from([
        "branchbot",
        "--config",
        file.path().to_str().unwrap(),
        "-l",
        "4",
        "--set",
        "bot.branch_prefix=clibot/",
        "options",
    ])
    .unwrap();

    let mut loader = ConfigLoader::new();
    for path in &cli.global.configs {
        loader = loader.add_toml_file(path);
    }
    for (key, value) in cli.global.to_config_overrides().unwrap() {
        loader = loader.set(&key, value).unwrap();
    }
    let config = loader.build().unwrap();

    assert_eq!(config.bot.branch_prefix, "clibot/");
    assert_eq!(config.bot.clone_depth, 5);
    assert_eq!(config.global.output_log_level.as_u8(), 4);
    assert_eq!(config.global.file_log_level.as_u8(), 4);
}

#[test]
fn config_string_override_is_parsed_as_number() {
    let config = ConfigLoader::new()
        .set("bot.clone_depth", "12".to_string())
        .unwrap()
        .build()
        .unwrap();
    assert_eq!(config.bot.clone_depth, 12);
}

#[test]
fn config_from_file_validates() {
    let file = toml_file("[bot]\nmarker_file = \"../escape.md\"");
    let err = Config::from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("marker_file"), "{err}");
}

#[test]
fn config_options_listing_is_stable() {
    let config = Config::parse(
        r#"
[workspace]
base_dir = "/srv/branchbot"

[github]
token = "ghs_secret"
installations = [7]
"#,
    )
    .unwrap();

    let lines: Vec<String> = config
        .format_options()
        .into_iter()
        .filter(|line| !line.starts_with("global.log_file"))
        .collect();
    insta::assert_snapshot!(lines.join("\n"), @r"
    bot.author_email        = branchbot@users.noreply.github.com
    bot.author_name         = branchbot
    bot.branch_prefix       = branchbot/
    bot.clone_depth         = 50
    bot.marker_file         = README.md
    bot.remote              = origin
    github.api_url          = https://api.github.com
    github.installations    = 7
    github.token            = [hidden]
    global.file_log_level   = 5
    global.json_logs        = false
    global.output_log_level = 3
    status.context          = branchbot
    workspace.base_dir      = /srv/branchbot
    ");
}
