// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! One-way attachment reconciliation.
//!
//! Attachments are compared by file name and byte size only. A same-named,
//! same-sized file with different content is treated as already present.
//! Nothing on the remote side is ever deleted or replaced.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::entity::{Attachment, EntityKind};
use crate::error::{Error, Result};
use crate::remote::{ContentFetcher, Tracker};

/// Identity used to decide whether two attachments are the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttachmentKey {
    pub file_name: String,
    pub file_size: u64,
}

impl AttachmentKey {
    pub fn new(file_name: &str, file_size: u64) -> Self {
        AttachmentKey {
            file_name: file_name.to_string(),
            file_size,
        }
    }
}

/// An attachment as listed by the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAttachment {
    pub file_name: String,
    pub file_size: u64,
}

impl RemoteAttachment {
    pub fn new(file_name: impl Into<String>, file_size: u64) -> Self {
        RemoteAttachment {
            file_name: file_name.into(),
            file_size,
        }
    }

    pub fn key(&self) -> AttachmentKey {
        AttachmentKey::new(&self.file_name, self.file_size)
    }
}

/// Local attachments missing from the remote listing, in local order.
/// Repeated local entries are returned once.
pub fn pending_uploads<'e>(
    local: &[&'e Attachment],
    remote: &[RemoteAttachment],
) -> Vec<&'e Attachment> {
    let mut present: HashSet<AttachmentKey> = remote.iter().map(RemoteAttachment::key).collect();
    local
        .iter()
        .copied()
        .filter(|attachment| {
            let fresh = present.insert(attachment.key());
            tracing::debug!(
                file_name = %attachment.file_name,
                file_size = attachment.file_size,
                matched = !fresh,
                "attachment match"
            );
            fresh
        })
        .collect()
}

/// Uploads the local attachments a remote object does not have yet.
pub struct AttachmentReconciler<'a> {
    tracker: &'a dyn Tracker,
    fetcher: &'a dyn ContentFetcher,
}

impl<'a> AttachmentReconciler<'a> {
    pub fn new(tracker: &'a dyn Tracker, fetcher: &'a dyn ContentFetcher) -> Self {
        AttachmentReconciler { tracker, fetcher }
    }

    /// Uploads `local − remote` and returns how many files were sent.
    ///
    /// Stops at the first failure; files uploaded before it stay in place,
    /// so running again against a fresh listing sends only the remainder.
    pub fn reconcile(
        &self,
        kind: EntityKind,
        remote_id: &str,
        local: &[&Attachment],
        remote: &[RemoteAttachment],
    ) -> Result<usize> {
        let pending = pending_uploads(local, remote);
        if pending.is_empty() {
            tracing::debug!(remote_id, "attachments already in sync");
            return Ok(0);
        }

        for attachment in &pending {
            self.upload(kind, remote_id, attachment)
                .map_err(|e| Error::AttachmentUpload {
                    file_name: attachment.file_name.clone(),
                    source: Box::new(e),
                })?;
            tracing::info!(remote_id, file_name = %attachment.file_name, "uploaded attachment");
        }
        Ok(pending.len())
    }

    fn upload(&self, kind: EntityKind, remote_id: &str, attachment: &Attachment) -> Result<()> {
        let content = self.fetcher.fetch(&attachment.download_url)?;
        self.tracker
            .upload_attachment(kind, remote_id, attachment, content)
    }
}

#[cfg(test)]
#[path = "attachments_tests.rs"]
mod tests;
