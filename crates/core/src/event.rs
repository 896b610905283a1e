// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound product events (`create_feature`, `update_release`, ...).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::entity::EntityKind;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Mirror the entity; an existing mapping turns this into an update.
    Create,
    /// Push changes to an entity that must already be mirrored.
    Update,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Update => "update",
        }
    }
}

/// An event name split into its action and entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncEvent {
    pub action: Action,
    pub kind: EntityKind,
}

impl SyncEvent {
    pub fn new(action: Action, kind: EntityKind) -> Self {
        SyncEvent { action, kind }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.action.as_str(), self.kind)
    }
}

impl FromStr for SyncEvent {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_lowercase();
        let (action, kind) = lower
            .split_once('_')
            .ok_or_else(|| Error::InvalidEvent(s.to_string()))?;
        let action = match action {
            "create" => Action::Create,
            "update" => Action::Update,
            _ => return Err(Error::InvalidEvent(s.to_string())),
        };
        let kind = kind
            .parse::<EntityKind>()
            .map_err(|_| Error::InvalidEvent(s.to_string()))?;
        Ok(SyncEvent { action, kind })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
