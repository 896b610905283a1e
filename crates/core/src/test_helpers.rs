// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test doubles for engine, mapper, and reconciler tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use crate::attachments::RemoteAttachment;
use crate::entity::{Attachment, EntityKind, LocalEntity};
use crate::error::{Error, Result};
use crate::mapper::MappedFields;
use crate::remote::{
    Capabilities, ContentFetcher, CreatedObject, RemotePayload, Tracker, UserDirectory,
};

/// A call observed by [`MockTracker`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create { kind: EntityKind, payload: RemotePayload },
    Update { kind: EntityKind, id: String, payload: RemotePayload },
    ListAttachments { id: String },
    Upload { id: String, file_name: String, bytes: usize },
    ChildCount { id: String },
    ReleaseExists { id: String },
    Link { child: String, parent: String },
}

#[derive(Default)]
struct MockState {
    calls: Vec<Call>,
    next_id: u32,
    attachments: HashMap<String, Vec<RemoteAttachment>>,
    children: HashMap<String, usize>,
    releases: HashSet<String>,
    fail_create: Option<u16>,
    fail_update: Option<u16>,
    fail_upload: HashSet<String>,
    fail_child_count: bool,
    created_release: Option<BTreeMap<String, String>>,
}

/// In-memory tracker that records every call.
///
/// Created objects get ids `100`, `101`, ... with keys `DEMO-1`, `DEMO-2`, ...
/// Uploaded files appear in later attachment listings.
pub struct MockTracker {
    capabilities: Capabilities,
    state: Mutex<MockState>,
}

impl MockTracker {
    pub fn new() -> Self {
        Self::with_capabilities(Capabilities::default())
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        MockTracker {
            capabilities,
            state: Mutex::new(MockState {
                next_id: 100,
                ..MockState::default()
            }),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn creates(&self) -> usize {
        self.count(|c| matches!(c, Call::Create { .. }))
    }

    pub fn updates(&self) -> usize {
        self.count(|c| matches!(c, Call::Update { .. }))
    }

    /// File names uploaded, in call order.
    pub fn uploads(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload { file_name, .. } => Some(file_name),
                _ => None,
            })
            .collect()
    }

    /// Payloads of create calls, in call order.
    pub fn created_payloads(&self) -> Vec<RemotePayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn updated_payloads(&self) -> Vec<RemotePayload> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Update { payload, .. } => Some(payload),
                _ => None,
            })
            .collect()
    }

    pub fn seed_attachment(&self, id: &str, file_name: &str, size: u64) {
        self.state
            .lock()
            .unwrap()
            .attachments
            .entry(id.to_string())
            .or_default()
            .push(RemoteAttachment::new(file_name, size));
    }

    pub fn set_children(&self, id: &str, count: usize) {
        self.state.lock().unwrap().children.insert(id.to_string(), count);
    }

    pub fn add_release(&self, id: &str) {
        self.state.lock().unwrap().releases.insert(id.to_string());
    }

    pub fn fail_create_with(&self, status: u16) {
        self.state.lock().unwrap().fail_create = Some(status);
    }

    pub fn fail_update_with(&self, status: u16) {
        self.state.lock().unwrap().fail_update = Some(status);
    }

    pub fn fail_upload_of(&self, file_name: &str) {
        self.state.lock().unwrap().fail_upload.insert(file_name.to_string());
    }

    pub fn fail_child_count(&self) {
        self.state.lock().unwrap().fail_child_count = true;
    }

    pub fn echo_release(&self, fields: &[(&str, &str)]) {
        self.state.lock().unwrap().created_release = Some(
            fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn rejected(status: u16) -> Error {
    if status >= 500 {
        Error::RemoteUnavailable {
            status: Some(status),
            message: "mock outage".into(),
        }
    } else {
        Error::RemoteRejected {
            status,
            message: "mock rejection".into(),
        }
    }
}

impl Tracker for MockTracker {
    fn system(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn render(&self, _kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        payload.insert("name", fields.name.clone());
        payload.insert("description", fields.description.clone());
        payload.insert("project", fields.project.clone());
        payload.insert("story_type", fields.story_type.as_str());
        payload.insert_opt("owner", fields.owner.clone());
        payload.insert_opt("release", fields.release.clone());
        if let Some(parent) = &fields.parent {
            payload.insert(parent.field.as_str(), parent.remote_id.clone());
        }
        payload
    }

    fn create(&self, kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject> {
        self.record(Call::Create {
            kind,
            payload: payload.clone(),
        });
        let mut state = self.state.lock().unwrap();
        if let Some(status) = state.fail_create {
            return Err(rejected(status));
        }
        let id = state.next_id;
        state.next_id += 1;
        let n = id - 99;
        let mut created = CreatedObject::new(id.to_string())
            .with_field("key", format!("DEMO-{n}"))
            .with_field("url", format!("https://tracker.example.com/browse/DEMO-{n}"));
        if let Some(release) = state.created_release.clone() {
            created = created.with_release(release);
        }
        Ok(created)
    }

    fn update(
        &self,
        kind: EntityKind,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<BTreeMap<String, String>> {
        self.record(Call::Update {
            kind,
            id: remote_id.to_string(),
            payload: payload.clone(),
        });
        match self.state.lock().unwrap().fail_update {
            Some(status) => Err(rejected(status)),
            None => Ok(BTreeMap::new()),
        }
    }

    fn list_attachments(&self, _kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>> {
        self.record(Call::ListAttachments {
            id: remote_id.to_string(),
        });
        Ok(self
            .state
            .lock()
            .unwrap()
            .attachments
            .get(remote_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upload_attachment(
        &self,
        _kind: EntityKind,
        remote_id: &str,
        attachment: &Attachment,
        content: Vec<u8>,
    ) -> Result<()> {
        self.record(Call::Upload {
            id: remote_id.to_string(),
            file_name: attachment.file_name.clone(),
            bytes: content.len(),
        });
        let mut state = self.state.lock().unwrap();
        if state.fail_upload.contains(&attachment.file_name) {
            return Err(rejected(413));
        }
        state
            .attachments
            .entry(remote_id.to_string())
            .or_default()
            .push(RemoteAttachment::new(
                attachment.file_name.clone(),
                attachment.file_size,
            ));
        Ok(())
    }

    fn child_count(&self, _kind: EntityKind, remote_id: &str) -> Result<usize> {
        self.record(Call::ChildCount {
            id: remote_id.to_string(),
        });
        let state = self.state.lock().unwrap();
        if state.fail_child_count {
            return Err(rejected(503));
        }
        Ok(state.children.get(remote_id).copied().unwrap_or(0))
    }

    fn release_exists(&self, remote_release_id: &str) -> Result<bool> {
        self.record(Call::ReleaseExists {
            id: remote_release_id.to_string(),
        });
        Ok(self.state.lock().unwrap().releases.contains(remote_release_id))
    }

    fn link(&self, child_id: &str, parent_id: &str) -> Result<()> {
        self.record(Call::Link {
            child: child_id.to_string(),
            parent: parent_id.to_string(),
        });
        Ok(())
    }
}

/// Content fetcher returning `size` bytes of `x` per URL, or failing for
/// URLs registered with [`MockFetcher::fail`].
#[derive(Default)]
pub struct MockFetcher {
    failing: Mutex<HashSet<String>>,
    fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, url: &str) {
        self.failing.lock().unwrap().insert(url.to_string());
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

impl ContentFetcher for MockFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.fetched.lock().unwrap().push(url.to_string());
        if self.failing.lock().unwrap().contains(url) {
            return Err(Error::RemoteUnavailable {
                status: Some(404),
                message: format!("{url} not found"),
            });
        }
        Ok(url.as_bytes().to_vec())
    }
}

/// Directory over a fixed email → id table; `broken` emails error out.
#[derive(Default)]
pub struct MockUsers {
    users: HashMap<String, String>,
    broken: HashSet<String>,
}

impl MockUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, email: &str, id: &str) -> Self {
        self.users.insert(email.to_string(), id.to_string());
        self
    }

    pub fn with_broken(mut self, email: &str) -> Self {
        self.broken.insert(email.to_string());
        self
    }
}

impl UserDirectory for MockUsers {
    fn resolve_user_id(&self, email: &str) -> Result<Option<String>> {
        if self.broken.contains(email) {
            return Err(Error::RemoteUnavailable {
                status: None,
                message: "directory timed out".into(),
            });
        }
        Ok(self.users.get(email).cloned())
    }
}

pub fn attachment(name: &str, size: u64) -> Attachment {
    Attachment {
        file_name: name.to_string(),
        file_size: size,
        content_type: Some("image/png".into()),
        download_url: format!("https://attachments.example.com/{name}"),
    }
}

/// `PROD-2` with Belgium.png(6) and France.png(6), no requirements.
pub fn prod_2() -> LocalEntity {
    LocalEntity::new("PROD-2", EntityKind::Feature, "Feature with attachments")
        .with_body("<p>Send me to the tracker</p>")
        .with_attachment(attachment("Belgium.png", 6))
        .with_attachment(attachment("France.png", 6))
}

pub fn requirement(reference: &str, name: &str) -> LocalEntity {
    LocalEntity::new(reference, EntityKind::Requirement, name)
}
