// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::mapping::RemoteMappingStore;
use tempfile::TempDir;

#[test]
fn store_and_load_fields() {
    let db = SqliteFieldStorage::open_in_memory().unwrap();
    db.store_field("PROD-2", "jira", "id", "10009").unwrap();
    db.store_field("PROD-2", "jira", "key", "DEMO-10").unwrap();

    let rows = db.load_fields("PROD-2", "jira").unwrap();
    assert_eq!(
        rows,
        vec![
            ("id".to_string(), "10009".to_string()),
            ("key".to_string(), "DEMO-10".to_string()),
        ]
    );
}

#[test]
fn store_field_upserts() {
    let db = SqliteFieldStorage::open_in_memory().unwrap();
    db.store_field("PROD-2", "rally", "formatted_id", "F1").unwrap();
    db.store_field("PROD-2", "rally", "formatted_id", "F2").unwrap();

    let rows = db.load_fields("PROD-2", "rally").unwrap();
    assert_eq!(rows, vec![("formatted_id".to_string(), "F2".to_string())]);
}

#[test]
fn load_fields_filters_by_system() {
    let db = SqliteFieldStorage::open_in_memory().unwrap();
    db.store_field("PROD-2", "jira", "id", "10009").unwrap();
    assert!(db.load_fields("PROD-2", "redmine_issues").unwrap().is_empty());
}

#[test]
fn references_lists_distinct_sorted() {
    let db = SqliteFieldStorage::open_in_memory().unwrap();
    db.store_field("PROD-3", "jira", "id", "2").unwrap();
    db.store_field("PROD-2", "jira", "id", "1").unwrap();
    db.store_field("PROD-2", "jira", "key", "DEMO-1").unwrap();
    db.store_field("PROD-9", "rally", "id", "9").unwrap();

    assert_eq!(db.references("jira").unwrap(), vec!["PROD-2", "PROD-3"]);
}

#[test]
fn open_creates_parent_dirs_and_persists() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("mappings.db");

    {
        let db = SqliteFieldStorage::open(&path).unwrap();
        db.store_field("PROD-2", "jira", "id", "10009").unwrap();
    }

    let store = RemoteMappingStore::new(Box::new(SqliteFieldStorage::open(&path).unwrap()), "jira");
    assert_eq!(store.remote_id("PROD-2").unwrap().as_deref(), Some("10009"));
}
