// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

mod args;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use args::{OutputArgs, OutputFormat};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[derive(Parser, Debug)]
#[command(name = "tracksync")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mirror product features, requirements and releases into issue trackers")]
#[command(
    long_about = "Mirror product features, requirements and releases into issue trackers.\n\n\
    Supports Rally, Pivotal Tracker, Redmine and JIRA. Remote ids are recorded so later \
    events update the same objects."
)]
pub struct Cli {
    /// Config file (default: $TRACKSYNC_CONFIG or ./tracksync.toml)
    #[arg(short = 'c', long = "config", global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log more (-v debug, -vv trace)
    #[arg(short = 'v', long = "verbose", global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a product event against the configured tracker
    #[command(after_help = "\
Examples:
  tracksync sync create_feature prod-2.json     Mirror a new feature
  tracksync sync update_release r1.json -o json Push release changes, print JSON")]
    Sync {
        /// Event name (create_feature, update_requirement, create_release, ...)
        #[arg(value_parser = non_empty_string)]
        event: String,

        /// JSON snapshot of the entity ("-" reads stdin)
        file: PathBuf,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Inspect or repair stored remote mappings
    #[command(subcommand)]
    Mapping(MappingCommand),

    /// Post a JSON payload to the audit webhook
    Webhook {
        /// JSON payload ("-" reads stdin)
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum MappingCommand {
    /// Print the stored fields of a reference
    Show {
        #[arg(value_parser = non_empty_string)]
        reference: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List every mapped reference for the configured tracker
    List,

    /// Store a field by hand
    Set {
        #[arg(value_parser = non_empty_string)]
        reference: String,

        #[arg(value_parser = non_empty_string)]
        field: String,

        value: String,
    },
}

#[cfg(test)]
#[path = "../cli_tests/mod.rs"]
mod tests;
