// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! ts-core: sync engine shared by every tracker integration.
//!
//! This crate holds the local entity model, the remote mapping store, field
//! mapping, attachment reconciliation, and the engine that drives a
//! [`Tracker`] implementation. HTTP-backed trackers live in `ts-trackers`.

pub mod attachments;
pub mod config;
pub mod db;
pub mod engine;
pub mod entity;
pub mod error;
pub mod event;
pub mod mapper;
pub mod mapping;
pub mod remote;

#[cfg(test)]
mod test_helpers;

pub use attachments::{AttachmentKey, AttachmentReconciler, RemoteAttachment};
pub use config::{
    Credentials, DefaultField, ElementType, HierarchyShape, IntegrationConfig, TrackerSystem,
};
pub use db::SqliteFieldStorage;
pub use engine::SyncEngine;
pub use entity::{Attachment, Description, EntityKind, FeatureKind, LocalEntity};
pub use error::{Error, Result};
pub use event::{Action, SyncEvent};
pub use mapper::{FieldMapper, MappedFields, ParentField, ParentLink, StoryType};
pub use mapping::{FieldStorage, MemoryFieldStorage, RemoteMapping, RemoteMappingStore};
pub use remote::{
    Capabilities, ContentFetcher, CreatedObject, NoUserDirectory, RemotePayload, Tracker,
    UserDirectory,
};
