// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tsync - command-line front end for the tracker sync engine.
//!
//! # Main Components
//!
//! - [`Cli`] - clap definitions for the `tracksync` binary
//! - [`Config`] - the TOML file naming the tracker integration and database
//! - [`Error`] - error type wrapping [`ts_core::Error`]
//!
//! ```rust,ignore
//! use tsync::{Cli, Command, Config};
//!
//! let config = Config::load(Path::new("tracksync.toml"))?;
//! tsync::run(Cli { config: None, verbose: 0, command })?;
//! ```

mod cli;
mod commands;
mod display;
mod env;

pub mod config;
pub mod error;

pub use cli::{Cli, Command, MappingCommand, OutputArgs, OutputFormat};
pub use config::Config;
pub use error::{Error, Result};

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Execute a CLI command. This is the main entry point for library users
/// and provides a testable way to run commands without process execution.
pub fn run(cli: Cli) -> Result<()> {
    let path = config::resolve_config_path(cli.config);
    let config = Config::load(&path)?;
    match cli.command {
        Command::Sync {
            event,
            file,
            output,
        } => commands::sync::run(&config, &event, &file, output.output),
        Command::Mapping(cmd) => match cmd {
            MappingCommand::Show { reference, output } => {
                commands::mapping::show(&config, &reference, output.output)
            }
            MappingCommand::List => commands::mapping::list(&config),
            MappingCommand::Set {
                reference,
                field,
                value,
            } => commands::mapping::set(&config, &reference, &field, &value),
        },
        Command::Webhook { file } => commands::webhook::run(&config, &file),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
