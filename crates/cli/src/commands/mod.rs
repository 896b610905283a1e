// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod mapping;
pub mod sync;
pub mod webhook;

use std::io::Read;
use std::path::Path;

use ts_core::{RemoteMappingStore, SqliteFieldStorage};

use crate::config::Config;
use crate::error::Result;

/// Reads a command input file; `-` reads stdin.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Opens the SQLite field storage named by the config.
pub fn open_storage(config: &Config) -> Result<SqliteFieldStorage> {
    let path = config.db_path();
    tracing::debug!(path = %path.display(), "opening mapping database");
    Ok(SqliteFieldStorage::open(&path)?)
}

/// Opens the mapping store for the configured tracker.
pub fn open_store(config: &Config) -> Result<RemoteMappingStore> {
    let storage = open_storage(config)?;
    Ok(RemoteMappingStore::new(
        Box::new(storage),
        config.integration.system.service_name(),
    ))
}

#[cfg(test)]
#[path = "mod_tests.rs"]
pub mod testing;
