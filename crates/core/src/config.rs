// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Per-integration settings.
//!
//! An [`IntegrationConfig`] describes one link between a product and a
//! tracker project: which tracker, where, with which credentials, and how
//! local entities are shaped on the remote side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::EntityKind;
use crate::error::{Error, Result};
use crate::mapper::ParentField;

/// Trackers an integration can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerSystem {
    Rally,
    PivotalTracker,
    Redmine,
    Jira,
}

impl TrackerSystem {
    /// Service name under which mappings are recorded.
    pub fn service_name(&self) -> &'static str {
        match self {
            TrackerSystem::Rally => "rally",
            TrackerSystem::PivotalTracker => "pivotal_tracker",
            TrackerSystem::Redmine => "redmine_issues",
            TrackerSystem::Jira => "jira",
        }
    }
}

impl fmt::Display for TrackerSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.service_name())
    }
}

impl FromStr for TrackerSystem {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "rally" => Ok(TrackerSystem::Rally),
            "pivotal_tracker" | "pivotal" => Ok(TrackerSystem::PivotalTracker),
            "redmine" | "redmine_issues" => Ok(TrackerSystem::Redmine),
            "jira" => Ok(TrackerSystem::Jira),
            _ => Err(Error::Config(format!(
                "unknown tracker '{s}'\n  hint: valid trackers are: rally, pivotal_tracker, redmine, jira"
            ))),
        }
    }
}

/// Remote element type a local entity kind is mirrored as.
///
/// `UserStory` is the leaf-style story; any other name is a portfolio-level
/// container (`Feature`, `Initiative`, `Epic`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementType {
    UserStory,
    Portfolio(String),
}

impl ElementType {
    pub fn is_story(&self) -> bool {
        matches!(self, ElementType::UserStory)
    }

    pub fn name(&self) -> &str {
        match self {
            ElementType::UserStory => "UserStory",
            ElementType::Portfolio(name) => name,
        }
    }
}

impl From<String> for ElementType {
    fn from(s: String) -> Self {
        if s.eq_ignore_ascii_case("userstory") || s.eq_ignore_ascii_case("story") {
            ElementType::UserStory
        } else {
            ElementType::Portfolio(s)
        }
    }
}

impl From<ElementType> for String {
    fn from(e: ElementType) -> Self {
        e.name().to_string()
    }
}

/// How features and requirements are placed in the remote hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyShape {
    pub feature: ElementType,
    pub requirement: ElementType,
}

impl Default for HierarchyShape {
    fn default() -> Self {
        HierarchyShape {
            feature: ElementType::UserStory,
            requirement: ElementType::UserStory,
        }
    }
}

impl HierarchyShape {
    /// The element type used for a local entity kind. Releases have no
    /// element type of their own.
    pub fn element_for(&self, kind: EntityKind) -> Option<&ElementType> {
        match kind {
            EntityKind::Feature => Some(&self.feature),
            EntityKind::Requirement => Some(&self.requirement),
            EntityKind::Release => None,
        }
    }

    /// Field that links a requirement to its feature.
    ///
    /// Only a story placed under a portfolio item crosses the boundary and
    /// uses `PortfolioItem`; every other combination uses `Parent`.
    pub fn parent_field(&self) -> ParentField {
        if !self.feature.is_story() && self.requirement.is_story() {
            ParentField::PortfolioItem
        } else {
            ParentField::Parent
        }
    }
}

/// One configured `{field, value}` override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultField {
    pub field: String,
    pub value: serde_json::Value,
}

/// Tracker credentials. Secrets are redacted from `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

fn default_true() -> bool {
    true
}

/// Settings of one integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationConfig {
    pub system: TrackerSystem,
    /// Base URL of the tracker (API root for JIRA and Redmine).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    /// Remote project id or key.
    pub project: String,
    /// Rally workspace; ignored by other trackers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
    /// Identifier of this integration on the product side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration_id: Option<String>,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub hierarchy: HierarchyShape,
    /// When false, release fields are never sent and versions are not mirrored.
    #[serde(default = "default_true")]
    pub send_releases: bool,
    /// JIRA issue type ids per entity kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirement_issue_type: Option<String>,
    #[serde(default)]
    pub feature_default_fields: Vec<DefaultField>,
    #[serde(default)]
    pub requirement_default_fields: Vec<DefaultField>,
    #[serde(default)]
    pub release_default_fields: Vec<DefaultField>,
}

impl IntegrationConfig {
    /// Creates a config with everything but the target left at defaults.
    pub fn new(system: TrackerSystem, project: impl Into<String>) -> Self {
        IntegrationConfig {
            system,
            server_url: None,
            project: project.into(),
            workspace: None,
            integration_id: None,
            credentials: Credentials::default(),
            hierarchy: HierarchyShape::default(),
            send_releases: true,
            feature_issue_type: None,
            requirement_issue_type: None,
            feature_default_fields: Vec::new(),
            requirement_default_fields: Vec::new(),
            release_default_fields: Vec::new(),
        }
    }

    /// Default field overrides for an entity kind, in configured order.
    pub fn default_fields(&self, kind: EntityKind) -> &[DefaultField] {
        match kind {
            EntityKind::Feature => &self.feature_default_fields,
            EntityKind::Requirement => &self.requirement_default_fields,
            EntityKind::Release => &self.release_default_fields,
        }
    }

    /// Server URL without a trailing slash.
    pub fn server_url(&self) -> Result<&str> {
        self.server_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::Config(format!("{} requires server_url", self.system)))
    }

    /// Checks settings every tracker depends on.
    pub fn validate(&self) -> Result<()> {
        if self.project.trim().is_empty() {
            return Err(Error::Config("project cannot be empty".into()));
        }
        match self.system {
            TrackerSystem::Redmine | TrackerSystem::Jira => {
                self.server_url()?;
            }
            TrackerSystem::Rally if self.workspace.is_none() => {
                return Err(Error::Config("rally requires workspace".into()));
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
