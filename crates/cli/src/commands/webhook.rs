// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;

use serde_json::Value;
use ts_trackers::AuditWebhook;

use crate::config::Config;
use crate::error::{Error, Result};

use super::read_input;

pub fn run(config: &Config, file: &Path) -> Result<()> {
    let url = config
        .webhook_url
        .as_deref()
        .ok_or(Error::WebhookNotConfigured)?;
    let payload: Value = serde_json::from_str(&read_input(file)?)?;
    run_impl(&AuditWebhook::new(url)?, &payload)?;
    println!("Delivered to {url}");
    Ok(())
}

pub(crate) fn run_impl(webhook: &AuditWebhook, payload: &Value) -> Result<()> {
    Ok(webhook.post(payload)?)
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
