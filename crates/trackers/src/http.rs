// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP plumbing shared by the tracker adapters.
//!
//! Adapters build [`Request`]s and hand them to a [`RemoteTransport`]. The
//! transport only fails when no response arrived at all; status handling
//! happens in [`process_response`] so every tracker categorizes failures
//! the same way.

use std::borrow::Cow;
use std::io::Read;
use std::time::Duration;

use base64::Engine as _;
use serde_json::Value;
use ts_core::{Error, Result};

/// Default ceiling for tracker CRUD calls.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest response excerpt carried in an error message.
const MAX_ERROR_BODY: usize = 500;

const MULTIPART_BOUNDARY: &str = "----tracksync-7c1d9e04b3f2a8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(Value),
    Raw { content_type: String, data: Vec<u8> },
}

/// One outgoing call.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Request {
            method,
            url: url.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::Post, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::Put, url)
    }

    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn headers(mut self, headers: &[(String, String)]) -> Self {
        self.headers.extend_from_slice(headers);
        self
    }

    pub fn query(mut self, name: &str, value: impl Into<String>) -> Self {
        self.query.push((name.to_string(), value.into()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Body::Json(body);
        self
    }

    pub fn raw(mut self, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.body = Body::Raw {
            content_type: content_type.into(),
            data,
        };
        self
    }

    /// Attaches a single-file `multipart/form-data` body.
    pub fn multipart(self, field: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        let mut body = Vec::with_capacity(data.len() + 256);
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{field}\"; filename=\"{}\"\r\n",
                file_name.replace('"', "%22")
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
        self.raw(
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            body,
        )
    }

    /// Value of the first header with this name (case-insensitive).
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The JSON body, if this request carries one.
    pub fn json_body(&self) -> Option<&Value> {
        match &self.body {
            Body::Json(value) => Some(value),
            _ => None,
        }
    }
}

/// Status and raw body of a completed call.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Response {
            status,
            body: body.into(),
        }
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

/// Sends requests to a tracker.
///
/// Implementations return `Ok` for every response that arrived, whatever
/// its status, and [`Error::RemoteUnavailable`] for connection failures and
/// timeouts.
pub trait RemoteTransport: Send + Sync {
    fn send(&self, request: Request) -> Result<Response>;
}

/// Transport backed by a `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
    headers: Vec<(String, String)>,
}

impl UreqTransport {
    /// Creates a transport whose calls give up after `timeout`.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("tracksync/", env!("CARGO_PKG_VERSION")))
            .build();
        UreqTransport {
            agent,
            headers: Vec::new(),
        }
        .with_header("Accept", "application/json")
    }

    /// Adds a header sent with every request (builder pattern).
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl RemoteTransport for UreqTransport {
    fn send(&self, request: Request) -> Result<Response> {
        tracing::debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let mut call = self.agent.request(request.method.as_str(), &request.url);
        for (name, value) in self.headers.iter().chain(request.headers.iter()) {
            call = call.set(name, value);
        }
        for (name, value) in &request.query {
            call = call.query(name, value);
        }

        let result = match &request.body {
            Body::Empty => call.call(),
            Body::Json(value) => call
                .set("Content-Type", "application/json")
                .send_bytes(&serde_json::to_vec(value)?),
            Body::Raw { content_type, data } => {
                call.set("Content-Type", content_type).send_bytes(data)
            }
        };

        match result {
            Ok(response) | Err(ureq::Error::Status(_, response)) => {
                let status = response.status();
                let mut body = Vec::new();
                // The agent deadline also covers the body; a stall here is a timeout.
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| Error::RemoteUnavailable {
                        status: None,
                        message: format!("{} {}: {e}", request.method.as_str(), request.url),
                    })?;
                tracing::debug!(status, url = %request.url, "received response");
                Ok(Response { status, body })
            }
            Err(ureq::Error::Transport(e)) => Err(Error::RemoteUnavailable {
                status: None,
                message: format!("{} {}: {e}", request.method.as_str(), request.url),
            }),
        }
    }
}

/// `Authorization` header value for HTTP basic auth.
pub fn basic_auth(username: &str, password: &str) -> String {
    let token = base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}

/// Checks the status against the accepted codes.
///
/// 4xx becomes [`Error::RemoteRejected`] carrying the tracker's structured
/// error messages; anything else unexpected becomes
/// [`Error::RemoteUnavailable`].
pub fn expect_status(response: &Response, success: &[u16]) -> Result<()> {
    if success.contains(&response.status) {
        return Ok(());
    }
    if (400..500).contains(&response.status) {
        return Err(Error::RemoteRejected {
            status: response.status,
            message: remote_error_message(&response.body),
        });
    }
    Err(Error::RemoteUnavailable {
        status: Some(response.status),
        message: format!("unexpected response: {}", excerpt(&response.text())),
    })
}

/// Checks the status and parses the body. Bodies shorter than two bytes
/// parse as `null`.
pub fn process_response(response: &Response, success: &[u16]) -> Result<Value> {
    expect_status(response, success)?;
    if response.body.len() < 2 {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// Renders a JSON string or number as an identifier.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a required identifier at a JSON pointer.
pub fn required_id(document: &Value, pointer: &str, system: &str) -> Result<String> {
    document
        .pointer(pointer)
        .and_then(id_string)
        .ok_or_else(|| {
            Error::CorruptedData(format!("{system} response has no {pointer}: {document}"))
        })
}

/// Joins every structured error field a tracker reported, or falls back to
/// the raw body.
pub fn remote_error_message(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body).trim().to_string();
    let Ok(document) = serde_json::from_slice::<Value>(body) else {
        return if text.is_empty() {
            "no response body".to_string()
        } else {
            excerpt(&text)
        };
    };

    let mut messages = Vec::new();
    collect_messages(&document, &mut messages);
    if messages.is_empty() {
        excerpt(&text)
    } else {
        messages.join("; ")
    }
}

fn collect_messages(document: &Value, out: &mut Vec<String>) {
    // JIRA: {"errorMessages": [...], "errors": {"field": "message"}}
    // Redmine: {"errors": ["..."]}
    if let Some(list) = document.get("errorMessages").and_then(Value::as_array) {
        out.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
    }
    match document.get("errors") {
        Some(Value::Array(list)) => {
            out.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
        Some(Value::Object(fields)) => {
            for (field, message) in fields {
                if let Some(message) = message.as_str() {
                    out.push(format!("{field}: {message}"));
                }
            }
        }
        _ => {}
    }

    // Pivotal Tracker
    let pivotal: Vec<&str> = ["code", "error", "general_problem", "possible_fix"]
        .iter()
        .filter_map(|key| document.get(*key).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .collect();
    if !pivotal.is_empty() {
        out.push(pivotal.join(" "));
    }

    // Rally wraps everything in a result envelope.
    for envelope in ["OperationResult", "CreateResult", "QueryResult"] {
        if let Some(list) = document
            .get(envelope)
            .and_then(|r| r.get("Errors"))
            .and_then(Value::as_array)
        {
            out.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() <= MAX_ERROR_BODY {
        return text.to_string();
    }
    let cut: String = text.chars().take(MAX_ERROR_BODY).collect();
    format!("{cut}...")
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
