// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Pivotal Tracker API v5.
//!
//! Every entity becomes a story; releases are stories of type `release`.
//! Pivotal has no story hierarchy, so requirements carry a
//! `Requirement of #<parent>.` line in their description instead. Files
//! live on story comments: the bytes are uploaded to the project first and
//! the returned upload is attached through a new comment.

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};
use ts_core::{
    Attachment, Capabilities, CreatedObject, EntityKind, IntegrationConfig, MappedFields,
    RemoteAttachment, RemotePayload, Result, Tracker,
};

use crate::http::{process_response, required_id, RemoteTransport, Request};

pub const SERVICE_NAME: &str = "pivotal_tracker";

const DEFAULT_API_URL: &str = "https://www.pivotaltracker.com/services/v5";
const TOKEN_HEADER: &str = "X-TrackerToken";

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(?i)<br\s*/?>|</p>|</div>|</li>|</h[1-6]>") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });
static TAG: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"<[^>]*>") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});
static BLANK_LINES: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"\n{3,}") {
    Ok(re) => re,
    Err(_) => unreachable!("static regex pattern"),
});

/// Converts an HTML description to plain text.
pub fn html_to_plain(html: &str) -> String {
    let text = LINE_BREAK.replace_all(html, "\n");
    let text = TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(text.trim(), "\n\n").into_owned()
}

/// Appends the parent reference Pivotal uses in place of a hierarchy.
pub fn append_link(body: String, parent_id: Option<&str>) -> String {
    match parent_id {
        Some(id) => format!("{body}\n\nRequirement of #{id}."),
        None => body,
    }
}

pub struct PivotalTracker {
    transport: Arc<dyn RemoteTransport>,
    api: String,
    project: String,
    auth: Vec<(String, String)>,
}

impl PivotalTracker {
    pub fn new(config: &IntegrationConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        let api = config
            .server_url()
            .map(str::to_string)
            .unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let auth = config
            .credentials
            .api_key
            .iter()
            .map(|token| (TOKEN_HEADER.to_string(), token.clone()))
            .collect();
        PivotalTracker {
            transport,
            api,
            project: config.project.clone(),
            auth,
        }
    }

    fn project_url(&self, path: &str) -> String {
        format!("{}/projects/{}/{path}", self.api, self.project)
    }

    fn send(&self, request: Request, success: &[u16]) -> Result<Value> {
        let response = self.transport.send(request.headers(&self.auth))?;
        process_response(&response, success)
    }
}

impl Tracker for PivotalTracker {
    fn system(&self) -> &str {
        SERVICE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    fn render(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        payload.insert("name", fields.name.clone());
        let parent = fields.parent.as_ref().map(|p| p.remote_id.as_str());
        payload.insert(
            "description",
            append_link(html_to_plain(&fields.description), parent),
        );
        if kind == EntityKind::Release {
            payload.insert("story_type", "release");
            payload.insert_opt("deadline", fields.due_date.map(|d| d.to_string()));
        } else {
            payload.insert("story_type", fields.story_type.as_str());
        }
        payload.insert_opt("created_at", fields.created_at.map(|t| t.to_rfc3339()));
        payload.insert("external_id", fields.reference.clone());
        if let Some(integration) = &fields.integration_id {
            match integration.parse::<u64>() {
                Ok(id) => payload.insert("integration_id", id),
                Err(_) => payload.insert("integration_id", integration.clone()),
            }
        }
        payload
    }

    fn create(&self, _kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject> {
        let story = self.send(
            Request::post(self.project_url("stories")).json(payload.clone().into_value()),
            &[200],
        )?;
        let id = required_id(&story, "/id", SERVICE_NAME)?;
        let mut created = CreatedObject::new(id);
        if let Some(url) = story.get("url").and_then(Value::as_str) {
            created = created.with_field("url", url);
        }
        Ok(created)
    }

    fn update(
        &self,
        _kind: EntityKind,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<BTreeMap<String, String>> {
        // Creation time is fixed once the story exists.
        let mut body = payload.clone().into_value();
        if let Some(map) = body.as_object_mut() {
            map.remove("created_at");
        }
        self.send(
            Request::put(self.project_url(&format!("stories/{remote_id}"))).json(body),
            &[200],
        )?;
        Ok(BTreeMap::new())
    }

    fn list_attachments(&self, _kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>> {
        let comments = self.send(
            Request::get(self.project_url(&format!("stories/{remote_id}/comments")))
                .query("fields", "file_attachments"),
            &[200],
        )?;
        let listed = comments
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|comment| comment.get("file_attachments").and_then(Value::as_array))
            .flatten()
            .filter_map(|a| {
                let name = a.get("filename")?.as_str()?;
                let size = a.get("size")?.as_u64()?;
                Some(RemoteAttachment::new(name, size))
            })
            .collect();
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
            Request::post(self.project_url("uploads")).multipart(
                "file",
                &attachment.file_name,
                attachment.content_type_or_default(),
                &content,
            ),
            &[200],
        )?;
        self.send(
            Request::post(self.project_url(&format!("stories/{remote_id}/comments")))
                .json(json!({ "file_attachments": [upload] })),
            &[200],
        )?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "pivotal_tests.rs"]
mod tests;
