// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Command-line configuration.
//!
//! Configuration is stored in a TOML file (default `tracksync.toml`) and
//! includes:
//! - `database`: where remote mappings are stored (default: state directory)
//! - `request_timeout_secs`: ceiling for every tracker call
//! - `webhook_url`: optional audit webhook
//! - `[integration]`: the tracker integration itself

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ts_core::IntegrationConfig;

use crate::env;
use crate::error::{Error, Result};

pub const DEFAULT_CONFIG_FILE: &str = "tracksync.toml";
const DB_FILE_NAME: &str = "mappings.db";
const STATE_DIR_NAME: &str = "tracksync";

/// Contents of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Mapping database path, relative to the config file or absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,
    /// Timeout for each tracker request in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    pub integration: IntegrationConfig,
}

fn default_request_timeout_secs() -> u64 {
    ts_trackers::DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Loads and validates the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ConfigNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        let mut config = Self::parse(&content)?;
        if let (Some(db), Some(dir)) = (&config.database, path.parent()) {
            if db.is_relative() {
                config.database = Some(dir.join(db));
            }
        }
        tracing::debug!(path = %path.display(), system = %config.integration.system, "loaded config");
        Ok(config)
    }

    /// Parses and validates configuration text.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.request_timeout_secs == 0 {
            return Err(Error::Config("request_timeout_secs must be positive".into()));
        }
        config.integration.validate()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Mapping database location.
    pub fn db_path(&self) -> PathBuf {
        match &self.database {
            Some(path) => path.clone(),
            None => tracksync_state_dir().join(DB_FILE_NAME),
        }
    }
}

/// Config file to load: the `--config` flag, then `TRACKSYNC_CONFIG`, then
/// `tracksync.toml` in the working directory.
pub fn resolve_config_path(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(env::config_path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Directory for state shared across runs.
pub fn tracksync_state_dir() -> PathBuf {
    state_dir_from(env::state_dir(), env::xdg_state_home(), dirs::home_dir())
}

fn state_dir_from(
    explicit: Option<PathBuf>,
    xdg_state_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    if let Some(dir) = xdg_state_home {
        return dir.join(STATE_DIR_NAME);
    }
    home.map(|h| h.join(".local/state").join(STATE_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".local/state").join(STATE_DIR_NAME))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
