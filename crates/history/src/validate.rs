// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Invariant checks on a loaded history.
//!
//! A history that parses is always usable; the checks here only flag runs
//! that would plot wrongly on a trend chart. Nothing is rejected.

use crate::model::Dataset;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// A broken invariant within one suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    /// A run is dated before the run preceding it.
    DateRegression {
        suite: String,
        index: usize,
        previous: u64,
        date: u64,
    },
    /// The same commit id was recorded more than once.
    DuplicateCommit {
        suite: String,
        index: usize,
        id: String,
    },
    /// The commit timestamp is not RFC 3339.
    InvalidTimestamp {
        suite: String,
        index: usize,
        timestamp: String,
    },
    /// A bench value is NaN or infinite.
    NonFiniteValue {
        suite: String,
        index: usize,
        bench: String,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DateRegression {
                suite,
                index,
                previous,
                date,
            } => write!(
                f,
                "{}[{}]: date {} is earlier than previous run {}",
                suite, index, date, previous
            ),
            Violation::DuplicateCommit { suite, index, id } => {
                write!(f, "{}[{}]: commit {} already recorded", suite, index, id)
            }
            Violation::InvalidTimestamp {
                suite,
                index,
                timestamp,
            } => write!(
                f,
                "{}[{}]: commit timestamp {:?} is not RFC 3339",
                suite, index, timestamp
            ),
            Violation::NonFiniteValue {
                suite,
                index,
                bench,
            } => write!(f, "{}[{}]: bench {} has a non-finite value", suite, index, bench),
        }
    }
}

/// Check every suite and return the violations found, in file order.
pub fn validate(dataset: &Dataset) -> Vec<Violation> {
    let mut violations = Vec::new();

    for (suite, runs) in &dataset.entries {
        let mut seen = HashSet::new();
        let mut previous: Option<u64> = None;

        for (index, entry) in runs.iter().enumerate() {
            if let Some(prev) = previous {
                if entry.date < prev {
                    violations.push(Violation::DateRegression {
                        suite: suite.clone(),
                        index,
                        previous: prev,
                        date: entry.date,
                    });
                }
            }
            previous = Some(entry.date);

            if !seen.insert(entry.commit.id.as_str()) {
                violations.push(Violation::DuplicateCommit {
                    suite: suite.clone(),
                    index,
                    id: entry.commit.id.clone(),
                });
            }

            if entry.commit.parsed_timestamp().is_none() {
                violations.push(Violation::InvalidTimestamp {
                    suite: suite.clone(),
                    index,
                    timestamp: entry.commit.timestamp.clone(),
                });
            }

            for bench in entry.benches.iter().filter(|b| !b.value.is_finite()) {
                violations.push(Violation::NonFiniteValue {
                    suite: suite.clone(),
                    index,
                    bench: bench.name.clone(),
                });
            }
        }
    }

    for violation in &violations {
        warn!(%violation, "benchmark history invariant violated");
    }

    violations
}
