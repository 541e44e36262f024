// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! I/O operations for history files.
//!
//! This module reads and writes whole history documents. The encoding is
//! chosen by file extension, see [`Format::from_path`].

use crate::codec::{self, Format};
use crate::error::{HistoryError, Result};
use crate::markdown;
use crate::model::Dataset;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Default location of the dashboard data file.
pub const DEFAULT_DATA_FILE: &str = "dev/bench/data.js";

/// Read and parse a history file.
pub fn read_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| HistoryError::io(path, e))?;
    debug!(path = %path.display(), bytes = content.len(), "read benchmark history");
    codec::parse(&content)
}

/// Read a history file, or start an empty history if it does not exist yet.
pub fn read_or_init(path: impl AsRef<Path>, repo_url: &str) -> Result<Dataset> {
    let path = path.as_ref();
    if path.exists() {
        read_dataset(path)
    } else {
        info!(path = %path.display(), "no benchmark history yet, starting a new one");
        Ok(Dataset::new(repo_url))
    }
}

/// Serialize the whole history and replace the file contents.
///
/// Parent directories are created as needed.
pub fn write_dataset(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    let content = codec::encode(dataset, Format::from_path(path))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| HistoryError::io(parent, e))?;
    }
    fs::write(path, content).map_err(|e| HistoryError::io(path, e))?;
    debug!(path = %path.display(), runs = dataset.run_count(), "wrote benchmark history");
    Ok(())
}

/// Write the markdown trend report.
pub fn write_report(path: impl AsRef<Path>, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, markdown::trend_report(dataset)).map_err(|e| HistoryError::io(path, e))
}
