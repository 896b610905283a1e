// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Local entity snapshots handed to the sync engine.
//!
//! A [`LocalEntity`] is an immutable view of a feature, requirement, or
//! release as it exists in the product-management system at the moment an
//! event is processed.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::attachments::AttachmentKey;
use crate::error::{Error, Result};

/// What a local entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Feature,
    Requirement,
    Release,
}

impl EntityKind {
    /// Returns the string representation used in storage and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Feature => "feature",
            EntityKind::Requirement => "requirement",
            EntityKind::Release => "release",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "feature" => Ok(EntityKind::Feature),
            "requirement" => Ok(EntityKind::Requirement),
            "release" => Ok(EntityKind::Release),
            _ => Err(Error::InvalidKind(s.to_string())),
        }
    }
}

/// The product-side classification of a feature.
///
/// Unlike [`EntityKind`], unknown labels are not an error: they fall into
/// [`FeatureKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    New,
    Improvement,
    BugFix,
    Research,
    Other,
}

impl FeatureKind {
    /// Classifies a raw label. Absent and unrecognized labels become `Other`.
    pub fn from_label(label: Option<&str>) -> Self {
        match label.map(str::to_lowercase).as_deref() {
            Some("new") => FeatureKind::New,
            Some("improvement") => FeatureKind::Improvement,
            Some("bug_fix") => FeatureKind::BugFix,
            Some("research") => FeatureKind::Research,
            _ => FeatureKind::Other,
        }
    }
}

/// A file attached to a local entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Where the content store serves the bytes from.
    pub download_url: String,
}

impl Attachment {
    pub fn key(&self) -> AttachmentKey {
        AttachmentKey::new(&self.file_name, self.file_size)
    }

    /// Content type to declare on upload.
    pub fn content_type_or_default(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

/// Rich-text description with its embedded attachments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

/// Snapshot of a feature, requirement, or release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalEntity {
    /// Stable reference such as `PROD-2` or `PROD-2-1`.
    pub reference: String,
    pub kind: EntityKind,
    pub name: String,
    #[serde(default)]
    pub description: Description,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Raw classification label (`new`, `bug_fix`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Reference of the release this entity is scheduled in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requirements: Vec<LocalEntity>,
}

impl LocalEntity {
    /// Creates a bare entity with only the required fields set.
    pub fn new(reference: impl Into<String>, kind: EntityKind, name: impl Into<String>) -> Self {
        LocalEntity {
            reference: reference.into(),
            kind,
            name: name.into(),
            description: Description::default(),
            attachments: Vec::new(),
            feature_kind: None,
            parent: None,
            release: None,
            assignee_email: None,
            creator_email: None,
            start_date: None,
            due_date: None,
            created_at: None,
            requirements: Vec::new(),
        }
    }

    /// Sets the description body (builder pattern).
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.description.body = body.into();
        self
    }

    /// Adds an attachment (builder pattern).
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Sets the release reference (builder pattern).
    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = Some(release.into());
        self
    }

    /// Sets the feature classification label (builder pattern).
    pub fn with_feature_kind(mut self, label: impl Into<String>) -> Self {
        self.feature_kind = Some(label.into());
        self
    }

    /// Adds a child requirement (builder pattern).
    pub fn with_requirement(mut self, requirement: LocalEntity) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn classification(&self) -> FeatureKind {
        FeatureKind::from_label(self.feature_kind.as_deref())
    }

    /// True when the entity owns no requirements locally.
    pub fn has_no_requirements(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Candidate emails for the remote owner, assignee first.
    pub fn owner_emails(&self) -> impl Iterator<Item = &str> {
        self.assignee_email
            .as_deref()
            .into_iter()
            .chain(self.creator_email.as_deref())
            .filter(|email| !email.trim().is_empty())
    }

    /// The attachments to mirror: the entity's own followed by the
    /// description's, with repeated (name, size) pairs dropped.
    pub fn attachment_set(&self) -> Vec<&Attachment> {
        let mut seen = HashSet::new();
        self.attachments
            .iter()
            .chain(self.description.attachments.iter())
            .filter(|a| seen.insert(a.key()))
            .collect()
    }

    /// Checks the structural rules a snapshot must satisfy before syncing.
    pub fn validate(&self) -> Result<()> {
        if self.reference.trim().is_empty() {
            return Err(Error::InvalidEntity("reference cannot be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidEntity(format!(
                "{} {} has an empty name",
                self.kind, self.reference
            )));
        }
        if self.kind == EntityKind::Release && !self.requirements.is_empty() {
            return Err(Error::InvalidEntity(format!(
                "release {} cannot own requirements",
                self.reference
            )));
        }
        for child in &self.requirements {
            if child.kind != EntityKind::Requirement {
                return Err(Error::InvalidEntity(format!(
                    "{} lists {} {} as a requirement",
                    self.reference, child.kind, child.reference
                )));
            }
            child.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "entity_tests.rs"]
mod tests;
