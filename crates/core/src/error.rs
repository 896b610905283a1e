// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for ts-core operations.

use thiserror::Error;

/// All possible errors that can occur while syncing entities to a tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// The tracker refused the request (4xx). Retrying the same request will not help.
    #[error("remote rejected request (status {status}): {message}")]
    RemoteRejected { status: u16, message: String },

    /// The tracker could not be reached, timed out, or failed on its side.
    #[error("remote unavailable{}: {message}\n  hint: retry the event once the tracker is reachable", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    RemoteUnavailable { status: Option<u16>, message: String },

    #[error("no {system} mapping for {reference}\n  hint: the entity must be created in {system} before it can be updated")]
    MappingNotFound { reference: String, system: String },

    #[error("failed to upload attachment '{file_name}': {source}")]
    AttachmentUpload {
        file_name: String,
        #[source]
        source: Box<Error>,
    },

    #[error("invalid entity: {0}")]
    InvalidEntity(String),

    #[error("invalid entity kind: '{0}'\n  hint: valid kinds are: feature, requirement, release")]
    InvalidKind(String),

    #[error("invalid event: '{0}'\n  hint: valid events are: create_feature, update_feature, create_requirement, update_requirement, create_release, update_release")]
    InvalidEvent(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Returns true when the caller may retry the whole event later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::RemoteUnavailable { .. } => true,
            Error::AttachmentUpload { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Returns the remote HTTP status carried by this error, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Error::RemoteRejected { status, .. } => Some(*status),
            Error::RemoteUnavailable { status, .. } => *status,
            Error::AttachmentUpload { source, .. } => source.remote_status(),
            _ => None,
        }
    }
}

/// A specialized Result type for ts-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
