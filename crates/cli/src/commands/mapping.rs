// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ts_core::{RemoteMappingStore, SqliteFieldStorage};

use crate::cli::OutputFormat;
use crate::config::Config;
use crate::display::format_mapping;
use crate::error::Result;

use super::{open_storage, open_store};

pub fn show(config: &Config, reference: &str, output: OutputFormat) -> Result<()> {
    let store = open_store(config)?;
    match show_impl(&store, reference, output)? {
        Some(text) => println!("{text}"),
        None => println!("No {} mapping for {}", store.system(), reference),
    }
    Ok(())
}

pub(crate) fn show_impl(
    store: &RemoteMappingStore,
    reference: &str,
    output: OutputFormat,
) -> Result<Option<String>> {
    store
        .get(reference)?
        .map(|mapping| format_mapping(&mapping, output))
        .transpose()
}

pub fn list(config: &Config) -> Result<()> {
    let storage = open_storage(config)?;
    let references = list_impl(&storage, config.integration.system.service_name())?;
    if references.is_empty() {
        println!("No mappings");
    }
    for reference in references {
        println!("{reference}");
    }
    Ok(())
}

pub(crate) fn list_impl(storage: &SqliteFieldStorage, system: &str) -> Result<Vec<String>> {
    Ok(storage.references(system)?)
}

pub fn set(config: &Config, reference: &str, field: &str, value: &str) -> Result<()> {
    let store = open_store(config)?;
    set_impl(&store, reference, field, value)?;
    println!("Set {field} of {reference} in {}", store.system());
    Ok(())
}

pub(crate) fn set_impl(
    store: &RemoteMappingStore,
    reference: &str,
    field: &str,
    value: &str,
) -> Result<()> {
    store.put(reference, field, value)?;
    tracing::info!(reference, field, system = store.system(), "mapping field set by hand");
    Ok(())
}

#[cfg(test)]
#[path = "mapping_tests.rs"]
mod tests;
