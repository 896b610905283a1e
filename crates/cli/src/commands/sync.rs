// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::Path;
use std::sync::Arc;

use serde_json::json;
use ts_core::{LocalEntity, RemoteMapping, RemoteMappingStore, SyncEngine, SyncEvent};
use ts_trackers::{AuditWebhook, HttpContentFetcher, RemoteTransport, UreqTransport};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_mapping;
use crate::error::Result;

use super::{open_store, read_input};

pub fn run(config: &Config, event: &str, file: &Path, output: OutputFormat) -> Result<()> {
    let entity: LocalEntity = serde_json::from_str(&read_input(file)?)?;
    let store = open_store(config)?;
    let transport: Arc<dyn RemoteTransport> = Arc::new(UreqTransport::new(config.request_timeout()));

    let mapping = run_impl(config, &store, transport, event, &entity)?;
    if let Some(url) = &config.webhook_url {
        notify(AuditWebhook::new(url.as_str()), event, &mapping);
    }
    println!("{}", format_mapping(&mapping, output)?);
    Ok(())
}

/// Internal implementation that accepts the store and transport for testing.
pub(crate) fn run_impl(
    config: &Config,
    store: &RemoteMappingStore,
    transport: Arc<dyn RemoteTransport>,
    event: &str,
    entity: &LocalEntity,
) -> Result<RemoteMapping> {
    let event: SyncEvent = event.parse()?;
    let connection = ts_trackers::connect(&config.integration, transport.clone())?;
    let fetcher = HttpContentFetcher::new(transport);
    let engine = SyncEngine::new(
        connection.tracker.as_ref(),
        store,
        &fetcher,
        connection.users.as_ref(),
        &config.integration,
    );
    Ok(engine.handle(event, entity)?)
}

/// Reports a finished sync to the audit webhook. Delivery failures are
/// logged; the sync itself already succeeded.
pub(crate) fn notify(webhook: ts_core::Result<AuditWebhook>, event: &str, mapping: &RemoteMapping) {
    let payload = json!({
        "event": event,
        "reference": mapping.reference,
        "system": mapping.system,
        "fields": mapping.fields,
    });
    if let Err(e) = webhook.and_then(|w| w.post(&payload)) {
        tracing::warn!(reference = %mapping.reference, error = %e, "audit webhook failed");
    }
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
