// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Remote mappings: which remote object mirrors a local entity.
//!
//! The host system stores integration fields as plain key-value rows keyed
//! by (reference, system, field). [`RemoteMappingStore`] wraps any
//! [`FieldStorage`] with reference-keyed semantics for one remote system.
//! It provides no transactions and no locking.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Field holding the remote object id.
pub const ID_FIELD: &str = "id";
/// Field holding the human URL of the remote object.
pub const URL_FIELD: &str = "url";
/// Human-facing key field names, in lookup order.
pub const KEY_FIELDS: [&str; 2] = ["key", "formatted_id"];

/// All stored fields for one (reference, system) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteMapping {
    pub reference: String,
    pub system: String,
    pub fields: BTreeMap<String, String>,
}

impl RemoteMapping {
    pub fn new(reference: impl Into<String>, system: impl Into<String>) -> Self {
        RemoteMapping {
            reference: reference.into(),
            system: system.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// The remote object id. Its presence decides create vs. update.
    pub fn id(&self) -> Option<&str> {
        self.field(ID_FIELD).filter(|id| !id.is_empty())
    }

    /// The human-facing key (`DEMO-10`, `US123`), if the tracker has one.
    pub fn key(&self) -> Option<&str> {
        KEY_FIELDS.iter().find_map(|name| self.field(name))
    }

    pub fn url(&self) -> Option<&str> {
        self.field(URL_FIELD)
    }
}

/// The host's integration-field API.
pub trait FieldStorage: Send + Sync {
    /// All (field, value) rows stored for a reference and system.
    fn load_fields(&self, reference: &str, system: &str) -> Result<Vec<(String, String)>>;

    /// Adds a row or overwrites the value of an existing one.
    fn store_field(&self, reference: &str, system: &str, field: &str, value: &str) -> Result<()>;
}

/// In-process field storage.
#[derive(Debug, Default)]
pub struct MemoryFieldStorage {
    rows: Mutex<BTreeMap<(String, String, String), String>>,
}

impl MemoryFieldStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, BTreeMap<(String, String, String), String>>> {
        self.rows
            .lock()
            .map_err(|_| Error::CorruptedData("field storage lock poisoned".into()))
    }
}

impl FieldStorage for MemoryFieldStorage {
    fn load_fields(&self, reference: &str, system: &str) -> Result<Vec<(String, String)>> {
        let rows = self.lock()?;
        Ok(rows
            .iter()
            .filter(|((r, s, _), _)| r == reference && s == system)
            .map(|((_, _, field), value)| (field.clone(), value.clone()))
            .collect())
    }

    fn store_field(&self, reference: &str, system: &str, field: &str, value: &str) -> Result<()> {
        self.lock()?.insert(
            (reference.to_string(), system.to_string(), field.to_string()),
            value.to_string(),
        );
        Ok(())
    }
}

/// Reference-keyed mapping access for one remote system.
pub struct RemoteMappingStore {
    storage: Box<dyn FieldStorage>,
    system: String,
}

impl RemoteMappingStore {
    pub fn new(storage: Box<dyn FieldStorage>, system: impl Into<String>) -> Self {
        RemoteMappingStore {
            storage,
            system: system.into(),
        }
    }

    /// A store over fresh in-memory storage.
    pub fn in_memory(system: impl Into<String>) -> Self {
        Self::new(Box::new(MemoryFieldStorage::new()), system)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    /// Returns the mapping for a reference, or `None` if no field was ever stored.
    pub fn get(&self, reference: &str) -> Result<Option<RemoteMapping>> {
        let rows = self.storage.load_fields(reference, &self.system)?;
        if rows.is_empty() {
            return Ok(None);
        }
        let mut mapping = RemoteMapping::new(reference, self.system.clone());
        mapping.fields.extend(rows);
        Ok(Some(mapping))
    }

    /// Stores one field row.
    pub fn put(&self, reference: &str, field: &str, value: &str) -> Result<()> {
        tracing::debug!(reference, system = %self.system, field, value, "storing mapping field");
        self.storage
            .store_field(reference, &self.system, field, value)
    }

    /// Stores every field and returns the resulting mapping.
    pub fn put_all(
        &self,
        reference: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<RemoteMapping> {
        for (field, value) in fields {
            self.put(reference, field, value)?;
        }
        self.get(reference)?.ok_or_else(|| {
            Error::CorruptedData(format!(
                "mapping for {reference} missing right after it was stored"
            ))
        })
    }

    /// Shortcut for the stored remote id.
    pub fn remote_id(&self, reference: &str) -> Result<Option<String>> {
        Ok(self
            .get(reference)?
            .and_then(|m| m.id().map(str::to_string)))
    }
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
