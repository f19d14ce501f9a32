// branchbot: per-commit branch automation
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Config --> Logging --> Command Dispatch
//!   Version | Options | Inis | Handle
//! ```

use std::process::ExitCode;

use branchbot::cli::global::GlobalOptions;
use branchbot::cli::{self, Command};
use branchbot::cmd::config::{run_inis_command, run_options_command};
use branchbot::cmd::handle::run_handle_command;
use branchbot::config::loader::ConfigLoader;
use branchbot::config::{CONFIG_FILE_NAME, Config, ENV_PREFIX};
use branchbot::logging::{LogGuard, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = cli::parse();

    let result = match &cli.command {
        Some(Command::Version) => {
            handle_version_command();
            Ok(())
        }
        Some(Command::Inis) => build_config_loader(&cli.global).map(|loader| {
            run_inis_command(&loader.format_loaded_files());
        }),
        Some(Command::Options) => {
            load_config(&cli.global).map(|config| run_options_command(&config))
        }
        Some(Command::Handle(args)) => match load_config(&cli.global) {
            Ok(config) => match start_logging(&config) {
                Ok(_log_guard) => run_handle_command(args, &config).await,
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        },
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            Err(anyhow::anyhow!("No command specified"))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn handle_version_command() {
    println!("{}", env!("CARGO_PKG_VERSION"));
}

fn start_logging(config: &Config) -> branchbot::error::Result<LogGuard> {
    init_logging(&config.global.log_config())
}

fn build_config_loader(global: &GlobalOptions) -> branchbot::error::Result<ConfigLoader> {
    let mut loader = ConfigLoader::new().add_toml_file_optional(CONFIG_FILE_NAME);
    for path in &global.configs {
        loader = loader.add_toml_file(path);
    }
    loader = loader.with_env_prefix(ENV_PREFIX);
    for (key, value) in global.to_config_overrides()? {
        loader = loader.set(&key, value)?;
    }
    Ok(loader)
}

fn load_config(global: &GlobalOptions) -> branchbot::error::Result<Config> {
    build_config_loader(global)?.build().map_err(|e| {
        eprintln!("Failed to load config: {e}");
        e
    })
}
