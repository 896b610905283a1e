// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Audit webhook: forwards event payloads to an operator-supplied URL.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use ts_core::{Error, Result};

use crate::http::{expect_status, RemoteTransport, Request, UreqTransport};

/// Webhook calls give up sooner than tracker calls.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

pub struct AuditWebhook {
    transport: Arc<dyn RemoteTransport>,
    url: String,
}

impl AuditWebhook {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_transport(url, Arc::new(UreqTransport::new(WEBHOOK_TIMEOUT)))
    }

    pub fn with_transport(url: impl Into<String>, transport: Arc<dyn RemoteTransport>) -> Result<Self> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!("webhook url must be http(s): {url:?}")));
        }
        Ok(AuditWebhook { transport, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Posts `payload` as JSON. Any 2xx counts as delivered.
    pub fn post(&self, payload: &Value) -> Result<()> {
        let response = self
            .transport
            .send(Request::post(&self.url).json(payload.clone()))?;
        let success: Vec<u16> = (200..300).collect();
        expect_status(&response, &success)?;
        tracing::info!(url = %self.url, status = response.status, "webhook delivered");
        Ok(())
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
