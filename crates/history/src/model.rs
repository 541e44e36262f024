// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark history data model.
//!
//! The shape mirrors the dashboard data file field for field, so that a
//! load followed by a save reproduces the same document. Field declaration
//! order is the serialization order.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The whole history: every suite and its chronological runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    /// Epoch milliseconds of the last write.
    pub last_update: u64,
    /// Repository the benchmarks were collected from.
    pub repo_url: String,
    /// Suite name to runs, oldest first.
    pub entries: IndexMap<String, Vec<Entry>>,
}

/// One benchmark run tied to a commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub commit: Commit,
    /// Epoch milliseconds when the run was recorded.
    pub date: u64,
    /// Tool that produced the measurements, e.g. `pytest`.
    pub tool: String,
    pub benches: Vec<Bench>,
}

/// Commit metadata as reported by the hosting service's push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub author: CommitUser,
    pub committer: CommitUser,
    pub distinct: bool,
    pub id: String,
    pub message: String,
    /// ISO-8601 timestamp, kept verbatim.
    pub timestamp: String,
    pub tree_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitUser {
    pub email: String,
    pub name: String,
    pub username: String,
}

/// One measured metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bench {
    pub name: String,
    pub value: f64,
    pub unit: String,
    /// Free-form spread annotation, e.g. `stddev: 1.01`.
    pub range: String,
    /// Free-form annotation.
    pub extra: String,
}

impl Bench {
    /// Create a bench with empty annotations.
    pub fn new(name: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
            range: String::new(),
            extra: String::new(),
        }
    }

    /// Set the range annotation.
    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        self.range = range.into();
        self
    }

    /// Set the extra annotation.
    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

impl Commit {
    /// Parse the commit timestamp, if it is valid RFC 3339.
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        DateTime::parse_from_rfc3339(&self.timestamp).ok()
    }

    /// First seven characters of the commit id.
    pub fn short_id(&self) -> &str {
        short_commit_id(&self.id)
    }
}

impl Entry {
    /// Create a new entry.
    pub fn new(commit: Commit, date: u64, tool: impl Into<String>, benches: Vec<Bench>) -> Self {
        Self {
            commit,
            date,
            tool: tool.into(),
            benches,
        }
    }

    /// Run date as a UTC timestamp.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        millis_to_utc(self.date)
    }

    /// Look up a bench by name.
    pub fn bench(&self, name: &str) -> Option<&Bench> {
        self.benches.iter().find(|b| b.name == name)
    }
}

impl Dataset {
    /// Create an empty dataset for a repository.
    pub fn new(repo_url: impl Into<String>) -> Self {
        Self {
            last_update: 0,
            repo_url: repo_url.into(),
            entries: IndexMap::new(),
        }
    }

    /// Runs recorded for a suite, oldest first.
    pub fn suite(&self, name: &str) -> Option<&[Entry]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Suite names in file order.
    pub fn suite_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Most recent run of a suite.
    pub fn latest(&self, suite: &str) -> Option<&Entry> {
        self.entries.get(suite).and_then(|runs| runs.last())
    }

    /// Total number of runs across all suites.
    pub fn run_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Append a run to a suite in place, creating the suite if absent.
    pub fn push(&mut self, suite: impl Into<String>, entry: Entry) {
        let suite = suite.into();
        debug!(suite = %suite, commit = %entry.commit.id, date = entry.date, "appending entry");
        self.entries.entry(suite).or_default().push(entry);
    }

    /// Record the time of the latest write.
    pub fn touch(&mut self, epoch_ms: u64) {
        self.last_update = epoch_ms;
    }
}

/// Return a new dataset with `entry` appended to `suite`.
///
/// Existing runs are left untouched and keep their order. Appending the
/// same entry twice records it twice.
pub fn append(dataset: &Dataset, suite: &str, entry: Entry) -> Dataset {
    let mut next = dataset.clone();
    next.push(suite, entry);
    next
}

/// First seven characters of a commit id.
pub fn short_commit_id(id: &str) -> &str {
    match id.char_indices().nth(7) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

/// Epoch milliseconds as a UTC timestamp; `None` when out of range.
pub fn millis_to_utc(ms: u64) -> Option<DateTime<Utc>> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default()
}
