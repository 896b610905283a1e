// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ts-trackers: HTTP adapters for the trackers the sync engine mirrors into.
//!
//! Each adapter implements [`ts_core::Tracker`] over a [`RemoteTransport`],
//! so tests can script responses without a network. [`connect`] picks the
//! adapter for an [`IntegrationConfig`].

use std::sync::Arc;

use ts_core::{IntegrationConfig, NoUserDirectory, Result, Tracker, TrackerSystem, UserDirectory};

pub mod content;
pub mod http;
pub mod jira;
pub mod pivotal;
pub mod rally;
pub mod redmine;
pub mod webhook;

#[cfg(test)]
mod test_support;

pub use content::HttpContentFetcher;
pub use http::{RemoteTransport, Request, Response, UreqTransport, DEFAULT_TIMEOUT};
pub use jira::Jira;
pub use pivotal::PivotalTracker;
pub use rally::Rally;
pub use redmine::Redmine;
pub use webhook::{AuditWebhook, WEBHOOK_TIMEOUT};

/// A configured adapter and the directory used to resolve owners.
pub struct Connection {
    pub tracker: Arc<dyn Tracker>,
    pub users: Arc<dyn UserDirectory>,
}

/// Builds the adapter for `config.system`.
pub fn connect(config: &IntegrationConfig, transport: Arc<dyn RemoteTransport>) -> Result<Connection> {
    config.validate()?;
    let connection = match config.system {
        TrackerSystem::Rally => {
            let rally = Arc::new(Rally::new(config, transport));
            Connection {
                tracker: rally.clone(),
                users: rally,
            }
        }
        TrackerSystem::PivotalTracker => without_users(Arc::new(PivotalTracker::new(config, transport))),
        TrackerSystem::Redmine => without_users(Arc::new(Redmine::new(config, transport)?)),
        TrackerSystem::Jira => without_users(Arc::new(Jira::new(config, transport)?)),
    };
    tracing::debug!(system = connection.tracker.system(), project = %config.project, "connected");
    Ok(connection)
}

fn without_users(tracker: Arc<dyn Tracker>) -> Connection {
    Connection {
        tracker,
        users: Arc::new(NoUserDirectory),
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
