// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the benchmark history store.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading, transforming or saving a dataset.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// The blob does not match the history schema (missing key, wrong type,
    /// non-array where an array is expected).
    #[error("Malformed benchmark data: {0}")]
    MalformedData(String),

    /// Reading or writing a history file failed.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The requested suite does not exist in the dataset.
    #[error("Unknown suite: {0}")]
    UnknownSuite(String),
}

impl From<serde_json::Error> for HistoryError {
    fn from(err: serde_json::Error) -> Self {
        HistoryError::MalformedData(err.to_string())
    }
}

impl HistoryError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HistoryError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error reports a schema mismatch.
    pub fn is_malformed(&self) -> bool {
        matches!(self, HistoryError::MalformedData(_))
    }
}

/// Result type for history operations.
pub type Result<T> = std::result::Result<T, HistoryError>;
