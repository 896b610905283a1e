// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use ts_core::RemoteMapping;

use crate::cli::OutputFormat;
use crate::error::Result;

/// Renders a mapping for stdout.
///
/// Text output puts the reference, id and key on the first line and the
/// remaining fields below it, one per line.
pub fn format_mapping(mapping: &RemoteMapping, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(mapping)?),
        OutputFormat::Text => Ok(format_mapping_text(mapping)),
    }
}

fn format_mapping_text(mapping: &RemoteMapping) -> String {
    let mut head = format!("{} -> {}", mapping.reference, mapping.system);
    if let Some(id) = mapping.id() {
        head.push_str(&format!(" #{id}"));
    }
    if let Some(key) = mapping.key() {
        head.push_str(&format!(" ({key})"));
    }

    let mut lines = vec![head];
    for (field, value) in &mapping.fields {
        lines.push(format!("    {field}: {value}"));
    }
    lines.join("\n")
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
