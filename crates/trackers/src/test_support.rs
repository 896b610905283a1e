// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted transport for adapter tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use ts_core::{
    Attachment, EntityKind, Error, IntegrationConfig, LocalEntity, NoUserDirectory, RemoteMapping,
    RemoteMappingStore, Result, SyncEngine, Tracker,
};

use crate::content::HttpContentFetcher;
use crate::http::{RemoteTransport, Request, Response};

/// Replies with queued responses in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Response>>>,
    requests: Mutex<Vec<Request>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, status: u16, body: Value) -> &Self {
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Response::new(status, body)));
        self
    }

    pub fn respond_raw(&self, status: u16, body: &str) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Response::new(status, body.as_bytes().to_vec())));
        self
    }

    pub fn time_out(&self) -> &Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(Error::RemoteUnavailable {
                status: None,
                message: "timed out".into(),
            }));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request(&self, index: usize) -> Request {
        self.requests()[index].clone()
    }
}

impl RemoteTransport for MockTransport {
    fn send(&self, request: Request) -> Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses.lock().unwrap().pop_front().unwrap_or_else(|| {
            Err(Error::RemoteUnavailable {
                status: None,
                message: format!("no response queued for {}", request.url),
            })
        })
    }
}

pub fn png(name: &str, size: u64) -> Attachment {
    Attachment {
        file_name: name.to_string(),
        file_size: size,
        content_type: Some("image/png".into()),
        download_url: format!("https://attachments.example.com/{name}"),
    }
}

pub fn with_server(mut config: IntegrationConfig, url: &str) -> IntegrationConfig {
    config.server_url = Some(url.to_string());
    config
}

/// `PROD-2` with Belgium.png(6) and France.png(6).
pub fn prod_2() -> LocalEntity {
    LocalEntity::new("PROD-2", EntityKind::Feature, "Feature with attachments")
        .with_body("<p>Send me to the tracker</p>")
        .with_attachment(png("Belgium.png", 6))
        .with_attachment(png("France.png", 6))
}

/// Runs one event through a real engine wired to `tracker` and `transport`.
pub fn run(
    tracker: &dyn Tracker,
    transport: &Arc<MockTransport>,
    store: &RemoteMappingStore,
    config: &IntegrationConfig,
    event: &str,
    entity: &LocalEntity,
) -> Result<RemoteMapping> {
    let fetcher = HttpContentFetcher::new(transport.clone());
    let engine = SyncEngine::new(tracker, store, &fetcher, &NoUserDirectory, config);
    engine.handle(event.parse()?, entity)
}
