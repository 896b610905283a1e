// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors reported by the `tracksync` command line.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ts_core::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("config file not found: {0}\n  hint: pass --config <path> or set TRACKSYNC_CONFIG")]
    ConfigNotFound(String),

    #[error("no audit webhook configured\n  hint: set webhook_url in the config file")]
    WebhookNotConfigured,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Returns true when re-running the same command later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Core(e) if e.is_retryable())
    }
}

/// A specialized Result type for tsync operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
