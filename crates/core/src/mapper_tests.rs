// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::{DefaultField, ElementType, HierarchyShape, TrackerSystem};
use crate::entity::EntityKind;
use crate::remote::NoUserDirectory;
use crate::test_helpers::{requirement, MockTracker, MockUsers};
use serde_json::json;
use yare::parameterized;

fn config() -> IntegrationConfig {
    IntegrationConfig::new(TrackerSystem::PivotalTracker, "99")
}

#[parameterized(
    new = { Some("new"), "feature" },
    improvement = { Some("improvement"), "feature" },
    bug_fix = { Some("bug_fix"), "bug" },
    research = { Some("research"), "chore" },
    other = { Some("other"), "feature" },
    absent = { None, "feature" },
    unknown = { Some("chore"), "feature" },
)]
fn kind_maps_to_story_type(label: Option<&str>, expected: &str) {
    let config = config();
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let mut entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Typed");
    entity.feature_kind = label.map(str::to_string);

    assert_eq!(mapper.fields(&entity, None, None).story_type.as_str(), expected);
}

#[test]
fn computed_fields_override_defaults() {
    let mut config = config();
    config.feature_default_fields = vec![
        DefaultField {
            field: "name".into(),
            value: json!("Default name"),
        },
        DefaultField {
            field: "ScheduleState".into(),
            value: json!("Defined"),
        },
    ];
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let tracker = MockTracker::new();
    let entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Real name");

    let payload = mapper.map(&tracker, &entity, None, None);
    assert_eq!(payload.get("name"), Some(&json!("Real name")));
    assert_eq!(payload.get("ScheduleState"), Some(&json!("Defined")));
}

#[test]
fn later_defaults_win_over_earlier_ones() {
    let mut config = config();
    config.requirement_default_fields = vec![
        DefaultField {
            field: "Priority".into(),
            value: json!("Low"),
        },
        DefaultField {
            field: "Priority".into(),
            value: json!("High"),
        },
    ];
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let payload = mapper.map(&MockTracker::new(), &requirement("PROD-2-1", "Child"), None, None);
    assert_eq!(payload.get("Priority"), Some(&json!("High")));
}

#[test]
fn defaults_are_per_kind() {
    let mut config = config();
    config.requirement_default_fields = vec![DefaultField {
        field: "Estimate".into(),
        value: json!(3),
    }];
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let feature = LocalEntity::new("PROD-2", EntityKind::Feature, "Feature");

    let payload = mapper.map(&MockTracker::new(), &feature, None, None);
    assert!(!payload.contains("Estimate"));
}

#[test]
fn owner_prefers_assignee() {
    let config = config();
    let users = MockUsers::new()
        .with_user("assignee@example.com", "u-1")
        .with_user("creator@example.com", "u-2");
    let mapper = FieldMapper::new(&config, &users);
    let mut entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Owned");
    entity.assignee_email = Some("assignee@example.com".into());
    entity.creator_email = Some("creator@example.com".into());

    assert_eq!(mapper.fields(&entity, None, None).owner.as_deref(), Some("u-1"));
}

#[test]
fn owner_falls_back_to_creator() {
    let config = config();
    let users = MockUsers::new().with_user("creator@example.com", "u-2");
    let mapper = FieldMapper::new(&config, &users);
    let mut entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Owned");
    entity.assignee_email = Some("unknown@example.com".into());
    entity.creator_email = Some("creator@example.com".into());

    assert_eq!(mapper.fields(&entity, None, None).owner.as_deref(), Some("u-2"));
}

#[test]
fn owner_lookup_failure_omits_owner() {
    let config = config();
    let users = MockUsers::new().with_broken("assignee@example.com");
    let mapper = FieldMapper::new(&config, &users);
    let mut entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Owned");
    entity.assignee_email = Some("assignee@example.com".into());

    let payload = mapper.map(&MockTracker::new(), &entity, None, None);
    assert!(!payload.contains("owner"));
}

#[test]
fn parent_link_uses_configured_hierarchy() {
    let mut config = config();
    config.hierarchy = HierarchyShape {
        feature: ElementType::Portfolio("Feature".into()),
        requirement: ElementType::UserStory,
    };
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let payload = mapper.map(&MockTracker::new(), &requirement("PROD-2-1", "Child"), Some("1001"), None);

    assert_eq!(payload.get("PortfolioItem"), Some(&json!("1001")));
    assert!(!payload.contains("Parent"));
}

#[test]
fn element_follows_entity_kind() {
    let mut config = config();
    config.hierarchy.feature = ElementType::Portfolio("Epic".into());
    let mapper = FieldMapper::new(&config, &NoUserDirectory);

    let feature = LocalEntity::new("PROD-2", EntityKind::Feature, "Feature");
    let release = LocalEntity::new("PROD-R-1", EntityKind::Release, "1.0");
    assert_eq!(
        mapper.fields(&feature, None, None).element,
        Some(ElementType::Portfolio("Epic".into()))
    );
    assert_eq!(mapper.fields(&release, None, None).element, None);
}

#[test]
fn release_only_present_when_given() {
    let config = config();
    let mapper = FieldMapper::new(&config, &NoUserDirectory);
    let entity = LocalEntity::new("PROD-2", EntityKind::Feature, "Feature").with_release("PROD-R-1");

    let without = mapper.map(&MockTracker::new(), &entity, None, None);
    assert!(!without.contains("release"));
    let with = mapper.map(&MockTracker::new(), &entity, None, Some("77"));
    assert_eq!(with.get("release"), Some(&json!("77")));
}
