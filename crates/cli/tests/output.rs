// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

mod common;
use common::*;

#[test]
fn version_flag() {
    tracksync()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn help_lists_commands() {
    tracksync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sync"))
        .stdout(predicate::str::contains("mapping"))
        .stdout(predicate::str::contains("webhook"));
}

#[test]
fn missing_config_explains_where_to_look() {
    let temp = TempDir::new().unwrap();
    tracksync()
        .args(["mapping", "list"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: config file not found: tracksync.toml"))
        .stderr(predicate::str::contains("TRACKSYNC_CONFIG"));
}

#[test]
fn config_from_environment() {
    let temp = with_config(UNREACHABLE_REDMINE);
    let elsewhere = TempDir::new().unwrap();
    tracksync()
        .env("TRACKSYNC_CONFIG", temp.path().join("tracksync.toml"))
        .args(["mapping", "list"])
        .current_dir(elsewhere.path())
        .assert()
        .success()
        .stdout("No mappings\n");
}

#[test]
fn invalid_config_is_reported() {
    let temp = with_config("[integration]\nsystem = \"trello\"\nproject = \"1\"\n");
    tracksync()
        .args(["mapping", "list"])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}
