// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Translation of local entities into tracker payloads.
//!
//! Mapping happens in two steps. [`FieldMapper::fields`] computes a
//! tracker-neutral [`MappedFields`] record; the tracker renders that record
//! with its own attribute names, and the result is laid over the configured
//! default fields so computed attributes always win.

use chrono::{DateTime, NaiveDate, Utc};
use std::fmt;

use crate::config::{ElementType, IntegrationConfig};
use crate::entity::{FeatureKind, LocalEntity};
use crate::remote::{RemotePayload, Tracker, UserDirectory};

/// Remote work type for trackers that distinguish story, bug, and chore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryType {
    Feature,
    Bug,
    Chore,
}

impl StoryType {
    pub fn for_kind(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::New | FeatureKind::Improvement => StoryType::Feature,
            FeatureKind::BugFix => StoryType::Bug,
            FeatureKind::Research => StoryType::Chore,
            FeatureKind::Other => StoryType::Feature,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoryType::Feature => "feature",
            StoryType::Bug => "bug",
            StoryType::Chore => "chore",
        }
    }
}

impl fmt::Display for StoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Attribute that links a requirement to its feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentField {
    Parent,
    PortfolioItem,
}

impl ParentField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParentField::Parent => "Parent",
            ParentField::PortfolioItem => "PortfolioItem",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentLink {
    pub field: ParentField,
    pub remote_id: String,
}

/// Tracker-neutral attributes computed for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedFields {
    pub reference: String,
    pub name: String,
    pub description: String,
    pub project: String,
    pub workspace: Option<String>,
    pub integration_id: Option<String>,
    pub owner: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
    pub story_type: StoryType,
    /// Remote element type from the hierarchy shape (none for releases).
    pub element: Option<ElementType>,
    pub parent: Option<ParentLink>,
    /// Remote release id, present only when it is safe to send.
    pub release: Option<String>,
}

/// Builds payloads for one integration.
pub struct FieldMapper<'a> {
    config: &'a IntegrationConfig,
    users: &'a dyn UserDirectory,
}

impl<'a> FieldMapper<'a> {
    pub fn new(config: &'a IntegrationConfig, users: &'a dyn UserDirectory) -> Self {
        FieldMapper { config, users }
    }

    /// Computes the tracker-neutral fields.
    pub fn fields(
        &self,
        entity: &LocalEntity,
        parent_remote_id: Option<&str>,
        release_id: Option<&str>,
    ) -> MappedFields {
        MappedFields {
            reference: entity.reference.clone(),
            name: entity.name.clone(),
            description: entity.description.body.clone(),
            project: self.config.project.clone(),
            workspace: self.config.workspace.clone(),
            integration_id: self.config.integration_id.clone(),
            owner: self.resolve_owner(entity),
            start_date: entity.start_date,
            due_date: entity.due_date,
            created_at: entity.created_at,
            story_type: StoryType::for_kind(entity.classification()),
            element: self.config.hierarchy.element_for(entity.kind).cloned(),
            parent: parent_remote_id.map(|id| ParentLink {
                field: self.config.hierarchy.parent_field(),
                remote_id: id.to_string(),
            }),
            release: release_id.map(str::to_string),
        }
    }

    /// Builds the full payload: defaults first, rendered fields on top.
    pub fn map(
        &self,
        tracker: &dyn Tracker,
        entity: &LocalEntity,
        parent_remote_id: Option<&str>,
        release_id: Option<&str>,
    ) -> RemotePayload {
        let fields = self.fields(entity, parent_remote_id, release_id);
        let mut payload = RemotePayload::from_defaults(self.config.default_fields(entity.kind));
        payload.overlay(tracker.render(entity.kind, &fields));
        payload
    }

    /// First owner email the directory knows. Lookup failures are logged and skipped.
    fn resolve_owner(&self, entity: &LocalEntity) -> Option<String> {
        for email in entity.owner_emails() {
            match self.users.resolve_user_id(email) {
                Ok(Some(id)) => return Some(id),
                Ok(None) => {
                    tracing::debug!(reference = %entity.reference, email, "no remote user for email");
                }
                Err(e) => {
                    tracing::warn!(reference = %entity.reference, email, error = %e, "owner lookup failed");
                }
            }
        }
        None
    }
}

#[cfg(test)]
#[path = "mapper_tests.rs"]
mod tests;
