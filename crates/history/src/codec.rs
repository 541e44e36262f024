// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Loading and serializing history blobs.
//!
//! Two encodings carry the same document:
//!
//! - plain JSON, as produced by [`to_json`];
//! - the dashboard script `window.BENCHMARK_DATA = { ... }`, as produced by
//!   [`to_data_js`].
//!
//! [`parse`] accepts either.

use crate::error::{HistoryError, Result};
use crate::model::Dataset;
use std::path::Path;
use tracing::debug;

/// Assignment prefix of the dashboard data script.
pub const DATA_JS_PREFIX: &str = "window.BENCHMARK_DATA = ";

const DATA_JS_BINDING: &str = "window.BENCHMARK_DATA";

/// On-disk encoding of a history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain JSON document.
    Json,
    /// `window.BENCHMARK_DATA = ...` script.
    DataJs,
}

impl Format {
    /// Pick the encoding from a file extension; `.js` means the script form.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        match path.as_ref().extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("js") => Format::DataJs,
            _ => Format::Json,
        }
    }
}

/// Parse a history blob. All or nothing: any schema mismatch fails the
/// whole parse with [`HistoryError::MalformedData`].
pub fn parse(blob: &str) -> Result<Dataset> {
    let json = strip_script(blob)?;
    let dataset: Dataset = serde_json::from_str(json)?;
    debug!(
        suites = dataset.entries.len(),
        runs = dataset.run_count(),
        "parsed benchmark history"
    );
    Ok(dataset)
}

/// Serialize as pretty-printed JSON.
///
/// Non-finite bench values are refused: JSON would carry them as `null`,
/// which [`parse`] rejects, leaving the file unreadable.
pub fn to_json(dataset: &Dataset) -> Result<String> {
    ensure_finite(dataset)?;
    Ok(serde_json::to_string_pretty(dataset)?)
}

fn ensure_finite(dataset: &Dataset) -> Result<()> {
    for (suite, runs) in &dataset.entries {
        for entry in runs {
            if let Some(bench) = entry.benches.iter().find(|b| !b.value.is_finite()) {
                return Err(HistoryError::MalformedData(format!(
                    "bench {} in suite {} (commit {}) has a non-finite value",
                    bench.name, suite, entry.commit.id
                )));
            }
        }
    }
    Ok(())
}

/// Serialize as the dashboard data script.
pub fn to_data_js(dataset: &Dataset) -> Result<String> {
    Ok(format!("{}{}", DATA_JS_PREFIX, to_json(dataset)?))
}

/// Serialize in the given encoding.
pub fn encode(dataset: &Dataset, format: Format) -> Result<String> {
    match format {
        Format::Json => to_json(dataset),
        Format::DataJs => to_data_js(dataset),
    }
}

fn strip_script(blob: &str) -> Result<&str> {
    let trimmed = blob.trim_start_matches('\u{feff}').trim();
    let Some(rest) = trimmed.strip_prefix(DATA_JS_BINDING) else {
        return Ok(trimmed);
    };
    let rest = rest.trim_start().strip_prefix('=').ok_or_else(|| {
        HistoryError::MalformedData(format!("expected '=' after {}", DATA_JS_BINDING))
    })?;
    Ok(rest.trim().trim_end_matches(';').trim_end())
}
