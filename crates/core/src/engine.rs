// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Entity synchronization.
//!
//! ```text
//! event ──► SyncEngine ──► RemoteMappingStore (create or update?)
//!               │
//!               ├──► FieldMapper ──► Tracker::render
//!               ├──► Tracker::create / Tracker::update
//!               ├──► RemoteMappingStore::put_all (after create)
//!               ├──► AttachmentReconciler
//!               └──► requirements, one at a time, with the parent's remote id
//! ```
//!
//! A failed create or update aborts the entity: its attachments and
//! children are skipped. Work that already succeeded, including siblings
//! synced earlier, is never rolled back.

use std::borrow::Cow;

use crate::attachments::{AttachmentReconciler, RemoteAttachment};
use crate::config::IntegrationConfig;
use crate::entity::{EntityKind, LocalEntity};
use crate::error::{Error, Result};
use crate::event::{Action, SyncEvent};
use crate::mapper::FieldMapper;
use crate::mapping::{RemoteMapping, RemoteMappingStore};
use crate::remote::{ContentFetcher, RemotePayload, Tracker, UserDirectory};

/// Mirrors local entities into one tracker.
pub struct SyncEngine<'a> {
    tracker: &'a dyn Tracker,
    store: &'a RemoteMappingStore,
    mapper: FieldMapper<'a>,
    reconciler: AttachmentReconciler<'a>,
    config: &'a IntegrationConfig,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        tracker: &'a dyn Tracker,
        store: &'a RemoteMappingStore,
        fetcher: &'a dyn ContentFetcher,
        users: &'a dyn UserDirectory,
        config: &'a IntegrationConfig,
    ) -> Self {
        SyncEngine {
            tracker,
            store,
            mapper: FieldMapper::new(config, users),
            reconciler: AttachmentReconciler::new(tracker, fetcher),
            config,
        }
    }

    /// Processes one product event.
    ///
    /// `update_*` events never create: without a stored id they fail with
    /// [`Error::MappingNotFound`].
    pub fn handle(&self, event: SyncEvent, entity: &LocalEntity) -> Result<RemoteMapping> {
        if event.kind != entity.kind {
            return Err(Error::InvalidEntity(format!(
                "{event} received for {} {}",
                entity.kind, entity.reference
            )));
        }
        if event.kind == EntityKind::Release && !self.config.send_releases {
            return Err(Error::Config(format!(
                "{} is configured not to receive releases",
                self.tracker.system()
            )));
        }
        if event.action == Action::Update && self.store.remote_id(&entity.reference)?.is_none() {
            return Err(Error::MappingNotFound {
                reference: entity.reference.clone(),
                system: self.tracker.system().to_string(),
            });
        }

        let parent_remote_id = match (&entity.kind, &entity.parent) {
            (EntityKind::Requirement, Some(parent)) => self.store.remote_id(parent)?,
            _ => None,
        };
        tracing::info!(%event, reference = %entity.reference, system = self.tracker.system(), "handling event");
        self.sync(entity, parent_remote_id.as_deref())
    }

    /// Creates or updates the remote counterpart of `entity`, reconciles its
    /// attachments, then recurses into its requirements.
    pub fn sync(
        &self,
        entity: &LocalEntity,
        parent_remote_id: Option<&str>,
    ) -> Result<RemoteMapping> {
        entity.validate()?;
        self.sync_entity(entity, parent_remote_id)
    }

    fn sync_entity(
        &self,
        entity: &LocalEntity,
        parent_remote_id: Option<&str>,
    ) -> Result<RemoteMapping> {
        let existing = self.store.get(&entity.reference)?;
        let existing_id = existing
            .as_ref()
            .and_then(|m| m.id())
            .map(str::to_string);

        let release_id = self.release_for(entity, existing_id.as_deref())?;
        let payload = self
            .mapper
            .map(self.tracker, entity, parent_remote_id, release_id.as_deref());
        tracing::debug!(reference = %entity.reference, %payload, "mapped payload");

        let (mapping, created) = match (existing, existing_id) {
            (Some(mapping), Some(id)) => (self.update_remote(entity, mapping, &id, &payload)?, false),
            _ => (self.create_remote(entity, &payload)?, true),
        };
        let remote_id = mapping
            .id()
            .ok_or_else(|| {
                Error::CorruptedData(format!("mapping for {} has no id", entity.reference))
            })?
            .to_string();

        if created {
            if let Some(parent_id) = parent_remote_id {
                if self.tracker.capabilities().linking {
                    self.tracker.link(&remote_id, parent_id)?;
                    tracing::debug!(child = %remote_id, parent = parent_id, "linked to parent");
                }
            }
        }

        if entity.kind != EntityKind::Release {
            // A fresh object has nothing attached yet.
            let listing = if created {
                Vec::new()
            } else {
                self.tracker.list_attachments(entity.kind, &remote_id)?
            };
            self.reconcile(entity, &remote_id, &listing)?;
        }

        for requirement in &entity.requirements {
            let child = inherit_from_parent(entity, requirement);
            self.sync_entity(&child, Some(&remote_id))?;
        }

        Ok(mapping)
    }

    fn create_remote(&self, entity: &LocalEntity, payload: &RemotePayload) -> Result<RemoteMapping> {
        let created = self
            .tracker
            .create(entity.kind, payload)
            .inspect_err(|e| {
                tracing::error!(reference = %entity.reference, system = self.tracker.system(), error = %e, "create failed");
            })?;
        if created.id().is_none() {
            return Err(Error::CorruptedData(format!(
                "{} returned no id for {}",
                self.tracker.system(),
                entity.reference
            )));
        }

        let mapping = self.store.put_all(&entity.reference, &created.fields)?;
        if let (Some(release), Some(fields)) = (&entity.release, &created.release) {
            self.store.put_all(release, fields)?;
        }
        tracing::info!(
            reference = %entity.reference,
            system = self.tracker.system(),
            remote_id = mapping.id().unwrap_or_default(),
            "created remote {}",
            entity.kind
        );
        Ok(mapping)
    }

    fn update_remote(
        &self,
        entity: &LocalEntity,
        mapping: RemoteMapping,
        remote_id: &str,
        payload: &RemotePayload,
    ) -> Result<RemoteMapping> {
        let changed = self
            .tracker
            .update(entity.kind, remote_id, payload)
            .inspect_err(|e| {
                tracing::error!(reference = %entity.reference, system = self.tracker.system(), remote_id, error = %e, "update failed");
            })?;
        tracing::info!(
            reference = %entity.reference,
            system = self.tracker.system(),
            remote_id,
            "updated remote {}",
            entity.kind
        );
        if changed.is_empty() {
            return Ok(mapping);
        }
        self.store.put_all(&entity.reference, &changed)
    }

    fn reconcile(
        &self,
        entity: &LocalEntity,
        remote_id: &str,
        listing: &[RemoteAttachment],
    ) -> Result<usize> {
        let local = entity.attachment_set();
        let uploaded = self
            .reconciler
            .reconcile(entity.kind, remote_id, &local, listing)?;
        if uploaded > 0 {
            tracing::info!(reference = %entity.reference, uploaded, "reconciled attachments");
        }
        Ok(uploaded)
    }

    /// The remote release id to send, or `None` when sending it could make
    /// the tracker reject the payload.
    fn release_for(&self, entity: &LocalEntity, remote_id: Option<&str>) -> Result<Option<String>> {
        if !self.config.send_releases || entity.kind == EntityKind::Release {
            return Ok(None);
        }
        let Some(release_ref) = entity.release.as_deref() else {
            return Ok(None);
        };
        if !entity.has_no_requirements() {
            tracing::debug!(reference = %entity.reference, "not a leaf, omitting release");
            return Ok(None);
        }

        let capabilities = self.tracker.capabilities();
        if let (true, Some(id)) = (capabilities.discovers_children, remote_id) {
            match self.tracker.child_count(entity.kind, id) {
                Ok(0) => {}
                Ok(count) => {
                    tracing::debug!(reference = %entity.reference, count, "remote children present, omitting release");
                    return Ok(None);
                }
                Err(e) => {
                    tracing::warn!(reference = %entity.reference, error = %e, "child lookup failed, omitting release");
                    return Ok(None);
                }
            }
        }

        let Some(release_id) = self.store.remote_id(release_ref)? else {
            tracing::debug!(reference = %entity.reference, release = release_ref, "release not mirrored, omitting");
            return Ok(None);
        };
        if capabilities.verifies_releases {
            match self.tracker.release_exists(&release_id) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::warn!(release = release_ref, %release_id, "release no longer exists remotely, omitting");
                    return Ok(None);
                }
                Err(e) => {
                    tracing::warn!(release = release_ref, error = %e, "release lookup failed, omitting");
                    return Ok(None);
                }
            }
        }
        Ok(Some(release_id))
    }
}

/// Fills in what a requirement takes from its feature when it has no value
/// of its own: parent reference, release, and classification.
fn inherit_from_parent<'e>(parent: &LocalEntity, child: &'e LocalEntity) -> Cow<'e, LocalEntity> {
    let needs_parent = child.parent.is_none();
    let needs_release = child.release.is_none() && parent.release.is_some();
    let needs_kind = child.feature_kind.is_none() && parent.feature_kind.is_some();
    if !(needs_parent || needs_release || needs_kind) {
        return Cow::Borrowed(child);
    }

    let mut owned = child.clone();
    if needs_parent {
        owned.parent = Some(parent.reference.clone());
    }
    if needs_release {
        owned.release = parent.release.clone();
    }
    if needs_kind {
        owned.feature_kind = parent.feature_kind.clone();
    }
    Cow::Owned(owned)
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
