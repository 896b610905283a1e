// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Collaborators the sync engine talks to.
//!
//! The engine never speaks HTTP itself. Each tracker adapter implements
//! [`Tracker`]; attachment bytes come from a [`ContentFetcher`]; owners are
//! resolved through a [`UserDirectory`]. All of them are injected at
//! construction time so tests can substitute recording mocks.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

use crate::attachments::RemoteAttachment;
use crate::config::DefaultField;
use crate::entity::{Attachment, EntityKind};
use crate::error::Result;
use crate::mapper::MappedFields;
use crate::mapping::ID_FIELD;

/// Attribute map sent as (part of) a tracker request body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemotePayload(Map<String, Value>);

impl RemotePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a payload from configured default fields; later entries win.
    pub fn from_defaults(defaults: &[DefaultField]) -> Self {
        let mut payload = Self::new();
        for default in defaults {
            payload.insert(default.field.clone(), default.value.clone());
        }
        payload
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(field.into(), value.into());
    }

    /// Inserts only when a value is present.
    pub fn insert_opt<V: Into<Value>>(&mut self, field: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(field, value);
        }
    }

    /// Copies every attribute of `other` over this payload.
    pub fn overlay(&mut self, other: RemotePayload) {
        self.0.extend(other.0);
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Wraps the attributes under a single envelope key (`{"issue": {...}}`).
    pub fn wrapped(self, envelope: &str) -> Value {
        let mut outer = Map::new();
        outer.insert(envelope.to_string(), self.into_value());
        Value::Object(outer)
    }
}

impl fmt::Display for RemotePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

/// What a tracker adapter supports beyond plain create/update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Children must be explicitly related to their parent after creation.
    pub linking: bool,
    /// Remote objects can have children the product side does not know about.
    pub discovers_children: bool,
    /// Release ids can be checked for existence before they are sent.
    pub verifies_releases: bool,
}

/// Identifying fields returned by a successful create.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedObject {
    pub fields: BTreeMap<String, String>,
    /// Fields of a release the tracker assigned while creating, if it reports one.
    pub release: Option<BTreeMap<String, String>>,
}

impl CreatedObject {
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(ID_FIELD.to_string(), id.into());
        CreatedObject {
            fields,
            release: None,
        }
    }

    /// Adds an identifying field (builder pattern).
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    /// Records a release echoed back by the tracker (builder pattern).
    pub fn with_release(mut self, fields: BTreeMap<String, String>) -> Self {
        self.release = Some(fields);
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.fields
            .get(ID_FIELD)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }
}

/// A tracker adapter.
///
/// Every method issues at most the calls needed for that one operation and
/// maps non-success responses to [`Error::RemoteRejected`] or
/// [`Error::RemoteUnavailable`].
///
/// [`Error::RemoteRejected`]: crate::Error::RemoteRejected
/// [`Error::RemoteUnavailable`]: crate::Error::RemoteUnavailable
pub trait Tracker: Send + Sync {
    /// Service name mappings are recorded under.
    fn system(&self) -> &str;

    fn capabilities(&self) -> Capabilities;

    /// Renders computed fields using this tracker's attribute names.
    fn render(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload;

    fn create(&self, kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject>;

    /// Updates the object. Returns identifying fields that changed (usually none).
    fn update(
        &self,
        kind: EntityKind,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<BTreeMap<String, String>>;

    fn list_attachments(&self, kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>>;

    fn upload_attachment(
        &self,
        kind: EntityKind,
        remote_id: &str,
        attachment: &Attachment,
        content: Vec<u8>,
    ) -> Result<()>;

    /// Number of remote children under an object.
    fn child_count(&self, _kind: EntityKind, _remote_id: &str) -> Result<usize> {
        Ok(0)
    }

    fn release_exists(&self, _remote_release_id: &str) -> Result<bool> {
        Ok(true)
    }

    /// Relates a freshly created child to its parent.
    fn link(&self, _child_id: &str, _parent_id: &str) -> Result<()> {
        Ok(())
    }
}

/// Retrieves attachment content from the product's content store.
pub trait ContentFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Resolves product-side emails to tracker user ids.
pub trait UserDirectory: Send + Sync {
    fn resolve_user_id(&self, email: &str) -> Result<Option<String>>;
}

/// Directory for trackers without user assignment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoUserDirectory;

impl UserDirectory for NoUserDirectory {
    fn resolve_user_id(&self, _email: &str) -> Result<Option<String>> {
        Ok(None)
    }
}
