// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;

fn mapping() -> RemoteMapping {
    let mut mapping = RemoteMapping::new("PROD-2", "jira");
    for (field, value) in [
        ("id", "10009"),
        ("key", "DEMO-10"),
        ("url", "https://tracker.example.com/browse/DEMO-10"),
    ] {
        mapping.fields.insert(field.into(), value.into());
    }
    mapping
}

#[test]
fn test_text_output() {
    let text = format_mapping(&mapping(), OutputFormat::Text).unwrap();
    assert_eq!(
        text,
        "PROD-2 -> jira #10009 (DEMO-10)\n    id: 10009\n    key: DEMO-10\n    url: https://tracker.example.com/browse/DEMO-10"
    );
}

#[test]
fn test_text_output_without_key() {
    let mut mapping = RemoteMapping::new("PROD-R-1", "redmine_issues");
    mapping.fields.insert("id".into(), "3".into());
    let text = format_mapping(&mapping, OutputFormat::Text).unwrap();
    assert_eq!(text, "PROD-R-1 -> redmine_issues #3\n    id: 3");
}

#[test]
fn test_json_output() {
    let json = format_mapping(&mapping(), OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["reference"], "PROD-2");
    assert_eq!(value["system"], "jira");
    assert_eq!(value["fields"]["key"], "DEMO-10");
}
