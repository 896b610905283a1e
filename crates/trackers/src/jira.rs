// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! JIRA REST API v2.
//!
//! Features and requirements become issues, releases become versions.
//! Requirements are tied to their feature with a `Relates` issue link after
//! creation.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use ts_core::{
    Attachment, Capabilities, CreatedObject, EntityKind, IntegrationConfig, MappedFields,
    RemoteAttachment, RemotePayload, Result, Tracker,
};

use crate::http::{basic_auth, process_response, required_id, RemoteTransport, Request};

pub const SERVICE_NAME: &str = "jira";

const LINK_TYPE: &str = "Relates";

pub struct Jira {
    transport: Arc<dyn RemoteTransport>,
    server: String,
    project: String,
    feature_issue_type: Option<String>,
    requirement_issue_type: Option<String>,
    auth: Vec<(String, String)>,
}

impl Jira {
    pub fn new(config: &IntegrationConfig, transport: Arc<dyn RemoteTransport>) -> Result<Self> {
        let server = config.server_url()?.to_string();
        let mut auth = Vec::new();
        if let (Some(user), Some(password)) = (
            config.credentials.username.as_deref(),
            config.credentials.password.as_deref(),
        ) {
            auth.push(("Authorization".to_string(), basic_auth(user, password)));
        }
        Ok(Jira {
            transport,
            server,
            project: config.project.clone(),
            feature_issue_type: config.feature_issue_type.clone(),
            requirement_issue_type: config.requirement_issue_type.clone(),
            auth,
        })
    }

    fn api(&self, path: &str) -> String {
        format!("{}/rest/api/2/{path}", self.server)
    }

    fn send(&self, request: Request, success: &[u16]) -> Result<Value> {
        let response = self.transport.send(request.headers(&self.auth))?;
        process_response(&response, success)
    }

    fn issue_type(&self, kind: EntityKind) -> Value {
        let configured = match kind {
            EntityKind::Requirement => self.requirement_issue_type.as_deref(),
            _ => self.feature_issue_type.as_deref(),
        };
        match configured {
            Some(id) => json!({ "id": id }),
            None => json!({ "name": "Story" }),
        }
    }

    fn render_issue(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        payload.insert("project", json!({ "key": fields.project }));
        payload.insert("summary", fields.name.clone());
        payload.insert("description", fields.description.clone());
        payload.insert("issuetype", self.issue_type(kind));
        payload.insert_opt("duedate", fields.due_date.map(|d| d.to_string()));
        if let Some(release) = &fields.release {
            payload.insert("fixVersions", json!([{ "id": release }]));
        }
        payload
    }

    fn render_version(&self, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        payload.insert("name", fields.name.clone());
        payload.insert("project", fields.project.clone());
        payload.insert_opt("releaseDate", fields.due_date.map(|d| d.to_string()));
        payload.insert("released", false);
        payload
    }
}

impl Tracker for Jira {
    fn system(&self) -> &str {
        SERVICE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            linking: true,
            ..Capabilities::default()
        }
    }

    fn render(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        match kind {
            EntityKind::Release => self.render_version(fields),
            _ => self.render_issue(kind, fields),
        }
    }

    fn create(&self, kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject> {
        if kind == EntityKind::Release {
            let body = payload.clone().into_value();
            let version = self.send(Request::post(self.api("version")).json(body), &[201])?;
            let id = required_id(&version, "/id", SERVICE_NAME)?;
            let mut created = CreatedObject::new(id.clone()).with_field(
                "url",
                format!(
                    "{}/browse/{}/fixforversion/{id}",
                    self.server, self.project
                ),
            );
            if let Some(name) = version.get("name").and_then(Value::as_str) {
                created = created.with_field("name", name);
            }
            return Ok(created);
        }

        let body = payload.clone().wrapped("fields");
        let issue = self.send(Request::post(self.api("issue")).json(body), &[201])?;
        let id = required_id(&issue, "/id", SERVICE_NAME)?;
        let key = required_id(&issue, "/key", SERVICE_NAME)?;
        Ok(CreatedObject::new(id)
            .with_field("url", format!("{}/browse/{key}", self.server))
            .with_field("key", key))
    }

    fn update(
        &self,
        kind: EntityKind,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<BTreeMap<String, String>> {
        if kind == EntityKind::Release {
            let mut body = payload.clone();
            body.insert("id", remote_id);
            self.send(
                Request::put(self.api(&format!("version/{remote_id}"))).json(body.into_value()),
                &[200],
            )?;
        } else {
            self.send(
                Request::put(self.api(&format!("issue/{remote_id}")))
                    .json(payload.clone().wrapped("fields")),
                &[200, 204],
            )?;
        }
        Ok(BTreeMap::new())
    }

    fn list_attachments(&self, _kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>> {
        let issue = self.send(
            Request::get(self.api(&format!("issue/{remote_id}"))).query("fields", "attachment"),
            &[200],
        )?;
        let listed = issue
            .pointer("/fields/attachment")
            .and_then(Value::as_array)
            .map(|list| {
                list.iter()
                    .filter_map(|a| {
                        let name = a.get("filename")?.as_str()?;
                        let size = a.get("size")?.as_u64()?;
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
        let request = Request::post(self.api(&format!("issue/{remote_id}/attachments")))
            .header("X-Atlassian-Token", "no-check")
            .multipart(
                "file",
                &attachment.file_name,
                attachment.content_type_or_default(),
                &content,
            );
        self.send(request, &[200])?;
        Ok(())
    }

    fn link(&self, child_id: &str, parent_id: &str) -> Result<()> {
        let body = json!({
            "type": { "name": LINK_TYPE },
            "outwardIssue": { "id": child_id },
            "inwardIssue": { "id": parent_id },
        });
        self.send(Request::post(self.api("issueLink")).json(body), &[200, 201])?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "jira_tests.rs"]
mod tests;
