// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Redmine REST API.
//!
//! Features and requirements become issues (requirements through
//! `parent_issue_id`), releases become project versions. Attachments go
//! through `/uploads.json`: the raw bytes first, then the returned token is
//! attached to the issue.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use ts_core::{
    Attachment, Capabilities, CreatedObject, EntityKind, Error, IntegrationConfig, MappedFields,
    RemoteAttachment, RemotePayload, Result, StoryType, Tracker,
};

use crate::http::{id_string, process_response, required_id, RemoteTransport, Request};

pub const SERVICE_NAME: &str = "redmine_issues";

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Redmine tracker id for a story type: 1 bug, 2 feature, 3 support.
pub fn tracker_id(story_type: StoryType) -> u32 {
    match story_type {
        StoryType::Bug => 1,
        StoryType::Feature => 2,
        StoryType::Chore => 3,
    }
}

pub struct Redmine {
    transport: Arc<dyn RemoteTransport>,
    server: String,
    project: String,
    auth: Vec<(String, String)>,
}

impl Redmine {
    pub fn new(config: &IntegrationConfig, transport: Arc<dyn RemoteTransport>) -> Result<Self> {
        let server = config.server_url()?.to_string();
        let auth = config
            .credentials
            .api_key
            .iter()
            .map(|key| (API_KEY_HEADER.to_string(), key.clone()))
            .collect();
        Ok(Redmine {
            transport,
            server,
            project: config.project.clone(),
            auth,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.server)
    }

    fn send(&self, request: Request, success: &[u16]) -> Result<Value> {
        let response = self.transport.send(request.headers(&self.auth))?;
        process_response(&response, success)
    }

    fn version_fields(&self, version: &Value) -> Option<BTreeMap<String, String>> {
        let id = version.get("id").and_then(id_string)?;
        let mut fields = BTreeMap::new();
        if let Some(name) = version.get("name").and_then(Value::as_str) {
            fields.insert("name".to_string(), name.to_string());
        }
        fields.insert("url".to_string(), self.url(&format!("versions/{id}")));
        fields.insert("id".to_string(), id);
        Some(fields)
    }
}

impl Tracker for Redmine {
    fn system(&self) -> &str {
        SERVICE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn render(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        if kind == EntityKind::Release {
            payload.insert("name", fields.name.clone());
            payload.insert_opt("effective_date", fields.due_date.map(|d| d.to_string()));
            return payload;
        }

        payload.insert("project_id", fields.project.clone());
        payload.insert("tracker_id", tracker_id(fields.story_type));
        payload.insert("subject", fields.name.clone());
        payload.insert("description", fields.description.clone());
        payload.insert_opt("start_date", fields.start_date.map(|d| d.to_string()));
        payload.insert_opt("due_date", fields.due_date.map(|d| d.to_string()));
        payload.insert_opt("parent_issue_id", fields.parent.as_ref().map(|p| p.remote_id.clone()));
        payload.insert_opt("fixed_version_id", fields.release.clone());
        payload
    }

    fn create(&self, kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject> {
        if kind == EntityKind::Release {
            let document = self.send(
                Request::post(self.url(&format!("projects/{}/versions.json", self.project)))
                    .json(payload.clone().wrapped("version")),
                &[201],
            )?;
            let id = required_id(&document, "/version/id", SERVICE_NAME)?;
            let mut created =
                CreatedObject::new(id.clone()).with_field("url", self.url(&format!("versions/{id}")));
            if let Some(name) = document.pointer("/version/name").and_then(Value::as_str) {
                created = created.with_field("name", name);
            }
            return Ok(created);
        }

        let document = self.send(
            Request::post(self.url(&format!("projects/{}/issues.json", self.project)))
                .json(payload.clone().wrapped("issue")),
            &[201],
        )?;
        let id = required_id(&document, "/issue/id", SERVICE_NAME)?;
        let mut created =
            CreatedObject::new(id.clone()).with_field("url", self.url(&format!("issues/{id}")));
        if let Some(subject) = document.pointer("/issue/subject").and_then(Value::as_str) {
            created = created.with_field("name", subject);
        }
        if let Some(release) = document
            .pointer("/issue/fixed_version")
            .and_then(|v| self.version_fields(v))
        {
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
        let (path, envelope) = match kind {
            EntityKind::Release => (format!("versions/{remote_id}.json"), "version"),
            _ => (format!("issues/{remote_id}.json"), "issue"),
        };
        self.send(
            Request::put(self.url(&path)).json(payload.clone().wrapped(envelope)),
            &[200, 204],
        )?;
        Ok(BTreeMap::new())
    }

    fn list_attachments(&self, _kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>> {
        let document = self.send(
            Request::get(self.url(&format!("issues/{remote_id}.json")))
                .query("include", "attachments"),
            &[200],
        )?;
        let listed = document
            .pointer("/issue/attachments")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|a| {
                        let name = a.get("filename")?.as_str()?;
                        let size = a.get("filesize")?.as_u64()?;
                        Some(RemoteAttachment::new(name, size))
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(listed)
    }

    fn upload_attachment(
        &self,
        _kind: EntityKind,
        remote_id: &str,
        attachment: &Attachment,
        content: Vec<u8>,
    ) -> Result<()> {
        let upload = self.send(
            Request::post(self.url("uploads.json"))
                .query("filename", attachment.file_name.clone())
                .raw("application/octet-stream", content),
            &[201],
        )?;
        let token = upload
            .pointer("/upload/token")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                Error::CorruptedData(format!("{SERVICE_NAME} upload returned no token: {upload}"))
            })?;

        let body = json!({
            "issue": {
                "uploads": [{
                    "token": token,
                    "filename": attachment.file_name,
                    "content_type": attachment.content_type_or_default(),
                }]
            }
        });
        self.send(
            Request::put(self.url(&format!("issues/{remote_id}.json"))).json(body),
            &[200, 204],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "redmine_tests.rs"]
mod tests;
