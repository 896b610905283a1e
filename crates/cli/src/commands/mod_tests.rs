// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

//! Test infrastructure for command testing without a network.
//!
//! `TestContext` wraps a Redmine config whose database lives in a temp
//! directory, the mapping store opened from it, and a transport that
//! replays queued responses.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tempfile::TempDir;
use ts_core::{RemoteMappingStore, TrackerSystem};
use ts_trackers::{RemoteTransport, Request, Response};

use crate::config::Config;

use super::open_store;

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Response>>,
    requests: Mutex<Vec<Request>>,
}

impl ScriptedTransport {
    pub fn respond(&self, status: u16, body: Value) -> &Self {
        let body = if body.is_null() {
            Vec::new()
        } else {
            serde_json::to_vec(&body).unwrap()
        };
        self.responses
            .lock()
            .unwrap()
            .push_back(Response::new(status, body));
        self
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }
}

impl RemoteTransport for ScriptedTransport {
    fn send(&self, request: Request) -> ts_core::Result<Response> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ts_core::Error::RemoteUnavailable {
                status: None,
                message: format!("connection refused: {}", request.url),
            })
    }
}

/// Config, store and transport for one test.
pub struct TestContext {
    pub config: Config,
    pub store: RemoteMappingStore,
    pub transport: Arc<ScriptedTransport>,
    _temp_dir: TempDir, // Keep alive for duration of test
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut config = Config::parse(
            r#"
            [integration]
            system = "redmine"
            project = "7"
            server_url = "http://redmine.test"

            [integration.credentials]
            api_key = "123456"
            "#,
        )
        .unwrap();
        config.database = Some(temp_dir.path().join("mappings.db"));
        assert_eq!(config.integration.system, TrackerSystem::Redmine);
        let store = open_store(&config).unwrap();
        TestContext {
            config,
            store,
            transport: Arc::new(ScriptedTransport::default()),
            _temp_dir: temp_dir,
        }
    }

    pub fn transport(&self) -> Arc<dyn RemoteTransport> {
        self.transport.clone()
    }
}
