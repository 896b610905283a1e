// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// Redmine on a port nothing listens on.
pub const UNREACHABLE_REDMINE: &str = r#"
database = "mappings.db"
request_timeout_secs = 2

[integration]
system = "redmine"
project = "7"
server_url = "http://127.0.0.1:9"

[integration.credentials]
api_key = "123456"
"#;

pub fn tracksync() -> Command {
    let mut cmd = cargo_bin_cmd!("tracksync");
    cmd.env_remove("TRACKSYNC_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// A temp directory holding `tracksync.toml` with the given content.
pub fn with_config(content: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("tracksync.toml"), content).unwrap();
    temp
}

/// Writes a JSON file into the temp directory and returns its path.
pub fn write_json(temp: &TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

pub fn feature_json() -> serde_json::Value {
    serde_json::json!({
        "reference": "PROD-2",
        "kind": "feature",
        "name": "Feature with attachments",
        "description": {"body": "<p>Send me</p>"}
    })
}
