// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Rally Web Services API v2.0.
//!
//! Features and requirements map to user stories (hierarchical
//! requirements) or portfolio items, as chosen by the integration's
//! hierarchy shape. Rally reports most failures inside a 200 response
//! (`CreateResult.Errors` / `OperationResult.Errors`), so every write checks
//! the envelope as well as the status.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use serde_json::{json, Value};
use ts_core::{
    Attachment, Capabilities, CreatedObject, ElementType, EntityKind, Error, HierarchyShape,
    IntegrationConfig, MappedFields, RemoteAttachment, RemotePayload, Result, Tracker,
    UserDirectory,
};

use crate::http::{basic_auth, id_string, process_response, required_id, RemoteTransport, Request};

pub const SERVICE_NAME: &str = "rally";

const DEFAULT_SERVER: &str = "https://rally1.rallydev.com";
const API_PATH: &str = "slm/webservice/v2.0";
const API_KEY_HEADER: &str = "ZSESSIONID";

/// Where an entity lives in Rally's type system.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RallyType {
    Story,
    Portfolio(String),
    Release,
}

impl RallyType {
    fn of(kind: EntityKind, hierarchy: &HierarchyShape) -> Self {
        match hierarchy.element_for(kind) {
            None => RallyType::Release,
            Some(ElementType::UserStory) => RallyType::Story,
            Some(ElementType::Portfolio(name)) => RallyType::Portfolio(name.clone()),
        }
    }

    /// Request envelope key.
    fn envelope(&self) -> &str {
        match self {
            RallyType::Story => "HierarchicalRequirement",
            RallyType::Portfolio(name) => name,
            RallyType::Release => "Release",
        }
    }

    /// Typed path used for reads, writes and artifact references.
    fn object_path(&self, id: &str) -> String {
        match self {
            RallyType::Story => format!("hierarchicalrequirement/{id}"),
            RallyType::Portfolio(name) => format!("portfolioitem/{}/{id}", name.to_lowercase()),
            RallyType::Release => format!("release/{id}"),
        }
    }

    fn create_path(&self) -> String {
        match self {
            RallyType::Story => "hierarchicalrequirement/create".to_string(),
            RallyType::Portfolio(name) => format!("portfolioitem/{}/create", name.to_lowercase()),
            RallyType::Release => "release/create".to_string(),
        }
    }

    /// Collection path; portfolio collections are untyped.
    fn collection_path(&self, id: &str, collection: &str) -> String {
        match self {
            RallyType::Portfolio(_) => format!("portfolioitem/{id}/{collection}"),
            other => format!("{}/{collection}", other.object_path(id)),
        }
    }

    fn detail_path(&self, id: &str) -> String {
        match self {
            RallyType::Story => format!("userstory/{id}"),
            RallyType::Portfolio(name) => format!("portfolioitem/{}/{id}", name.to_lowercase()),
            RallyType::Release => format!("release/{id}"),
        }
    }
}

pub struct Rally {
    transport: Arc<dyn RemoteTransport>,
    server: String,
    project: String,
    workspace: Option<String>,
    hierarchy: HierarchyShape,
    auth: Vec<(String, String)>,
}

impl Rally {
    pub fn new(config: &IntegrationConfig, transport: Arc<dyn RemoteTransport>) -> Self {
        let server = config
            .server_url()
            .map(str::to_string)
            .unwrap_or_else(|_| DEFAULT_SERVER.to_string());
        let credentials = &config.credentials;
        let auth = match (&credentials.api_key, &credentials.username, &credentials.password) {
            (Some(key), _, _) => vec![(API_KEY_HEADER.to_string(), key.clone())],
            (None, Some(user), Some(password)) => {
                vec![("Authorization".to_string(), basic_auth(user, password))]
            }
            _ => Vec::new(),
        };
        Rally {
            transport,
            server,
            project: config.project.clone(),
            workspace: config.workspace.clone(),
            hierarchy: config.hierarchy.clone(),
            auth,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/{API_PATH}/{path}", self.server)
    }

    fn rally_type(&self, kind: EntityKind) -> RallyType {
        RallyType::of(kind, &self.hierarchy)
    }

    /// Link a person opens in the Rally web UI.
    fn human_url(&self, rally_type: &RallyType, id: &str) -> String {
        format!(
            "{}/#/{}d/detail/{}",
            self.server,
            self.project,
            rally_type.detail_path(id)
        )
    }

    fn send(&self, request: Request, success: &[u16]) -> Result<Value> {
        let response = self.transport.send(request.headers(&self.auth))?;
        let document = process_response(&response, success)?;
        check_envelope(&document, response.status)?;
        Ok(document)
    }

    fn query_results(&self, path: &str) -> Result<Vec<Value>> {
        let document = self.send(Request::get(self.api(path)), &[200])?;
        Ok(document
            .pointer("/QueryResult/Results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    fn create_object(&self, envelope: &str, path: &str, body: Value) -> Result<Value> {
        let document = self.send(
            Request::put(self.api(path)).json(json!({ envelope: body })),
            &[200, 201],
        )?;
        document
            .pointer("/CreateResult/Object")
            .cloned()
            .ok_or_else(|| {
                Error::CorruptedData(format!("{SERVICE_NAME} create returned no object: {document}"))
            })
    }
}

/// Turns errors Rally reports inside a result envelope into a rejection.
fn check_envelope(document: &Value, status: u16) -> Result<()> {
    for envelope in ["CreateResult", "OperationResult", "QueryResult"] {
        let errors: Vec<&str> = document
            .pointer(&format!("/{envelope}/Errors"))
            .and_then(Value::as_array)
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if !errors.is_empty() {
            return Err(Error::RemoteRejected {
                status,
                message: errors.join("; "),
            });
        }
    }
    Ok(())
}

/// Rally object ids are numeric; send them as numbers when they parse.
fn object_id(id: &str) -> Value {
    id.parse::<u64>().map(Value::from).unwrap_or_else(|_| Value::from(id))
}

impl Tracker for Rally {
    fn system(&self) -> &str {
        SERVICE_NAME
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            discovers_children: true,
            verifies_releases: true,
            ..Capabilities::default()
        }
    }

    fn render(&self, kind: EntityKind, fields: &MappedFields) -> RemotePayload {
        let mut payload = RemotePayload::new();
        payload.insert("Name", fields.name.clone());
        payload.insert("Project", fields.project.clone());
        payload.insert_opt("Workspace", fields.workspace.clone());

        if kind == EntityKind::Release {
            payload.insert("Notes", fields.description.clone());
            payload.insert_opt("ReleaseStartDate", fields.start_date.map(|d| d.to_string()));
            payload.insert_opt("ReleaseDate", fields.due_date.map(|d| d.to_string()));
            return payload;
        }

        payload.insert("Description", fields.description.clone());
        payload.insert_opt("Owner", fields.owner.as_ref().map(|id| format!("/user/{id}")));
        if let Some(ElementType::Portfolio(_)) = &fields.element {
            payload.insert_opt("PlannedStartDate", fields.start_date.map(|d| d.to_string()));
            payload.insert_opt("PlannedEndDate", fields.due_date.map(|d| d.to_string()));
        }
        if let Some(parent) = &fields.parent {
            payload.insert(parent.field.as_str(), object_id(&parent.remote_id));
        }
        if let Some(release) = &fields.release {
            payload.insert("Release", object_id(release));
        }
        payload
    }

    fn create(&self, kind: EntityKind, payload: &RemotePayload) -> Result<CreatedObject> {
        let rally_type = self.rally_type(kind);
        let object = self.create_object(
            rally_type.envelope(),
            &rally_type.create_path(),
            payload.clone().into_value(),
        )?;
        let id = required_id(&object, "/ObjectID", SERVICE_NAME)?;
        let mut created = CreatedObject::new(id.clone())
            .with_field("url", self.human_url(&rally_type, &id));
        if let Some(formatted) = object.get("FormattedID").and_then(Value::as_str) {
            created = created.with_field("formatted_id", formatted);
        }
        Ok(created)
    }

    fn update(
        &self,
        kind: EntityKind,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<BTreeMap<String, String>> {
        let rally_type = self.rally_type(kind);
        let document = self.send(
            Request::post(self.api(&rally_type.object_path(remote_id)))
                .json(payload.clone().wrapped(rally_type.envelope())),
            &[200, 201],
        )?;
        // A renumbered artifact reports its new FormattedID.
        let mut changed = BTreeMap::new();
        if let Some(formatted) = document
            .pointer("/OperationResult/Object/FormattedID")
            .and_then(Value::as_str)
        {
            changed.insert("formatted_id".to_string(), formatted.to_string());
        }
        Ok(changed)
    }

    fn list_attachments(&self, kind: EntityKind, remote_id: &str) -> Result<Vec<RemoteAttachment>> {
        let path = self.rally_type(kind).collection_path(remote_id, "Attachments");
        Ok(self
            .query_results(&path)?
            .iter()
            .filter_map(|a| {
                let name = a.get("Name")?.as_str()?;
                let size = a.get("Size")?.as_u64()?;
                Some(RemoteAttachment::new(name, size))
            })
            .collect())
    }

    fn upload_attachment(
        &self,
        kind: EntityKind,
        remote_id: &str,
        attachment: &Attachment,
        content: Vec<u8>,
    ) -> Result<()> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&content);

        let mut content_body = json!({ "Content": encoded });
        if let Some(workspace) = &self.workspace {
            content_body["Workspace"] = Value::from(workspace.as_str());
        }
        let stored = self.create_object("AttachmentContent", "attachmentcontent/create", content_body)?;
        let content_id = required_id(&stored, "/ObjectID", SERVICE_NAME)?;

        let mut attachment_body = json!({
            "Artifact": format!("/{}", self.rally_type(kind).object_path(remote_id)),
            "Content": format!("/attachmentcontent/{content_id}"),
            "Name": attachment.file_name,
            "ContentType": attachment.content_type_or_default(),
            // Reconciliation compares against the declared size.
            "Size": attachment.file_size,
        });
        if let Some(workspace) = &self.workspace {
            attachment_body["Workspace"] = Value::from(workspace.as_str());
        }
        self.create_object("Attachment", "attachment/create", attachment_body)?;
        Ok(())
    }

    fn child_count(&self, kind: EntityKind, remote_id: &str) -> Result<usize> {
        let path = self.rally_type(kind).collection_path(remote_id, "Children");
        Ok(self.query_results(&path)?.len())
    }

    fn release_exists(&self, remote_release_id: &str) -> Result<bool> {
        let response = self.transport.send(
            Request::get(self.api(&RallyType::Release.object_path(remote_release_id)))
                .headers(&self.auth),
        )?;
        if response.status == 404 {
            return Ok(false);
        }
        let document = process_response(&response, &[200])?;
        check_envelope(&document, response.status)?;
        Ok(document.get("Release").is_some_and(|r| !r.is_null()))
    }
}

impl UserDirectory for Rally {
    fn resolve_user_id(&self, email: &str) -> Result<Option<String>> {
        let document = self.send(
            Request::get(self.api("user"))
                .query("query", format!("(EmailAddress = \"{email}\")"))
                .query("fetch", "ObjectID"),
            &[200],
        )?;
        Ok(document
            .pointer("/QueryResult/Results/0/ObjectID")
            .and_then(id_string))
    }
}

#[cfg(test)]
#[path = "rally_tests.rs"]
mod tests;
