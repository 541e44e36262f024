// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Regression detection between two runs of a suite.
//!
//! Benches are matched by name. Whether a larger value is good or bad is
//! derived from the unit: time units are smaller-is-better, everything
//! else (throughput, ops/sec, ...) is bigger-is-better.
//!
//! # Example
//!
//! ```no_run
//! use bench_history::{io, DEFAULT_ALERT_THRESHOLD};
//!
//! let dataset = io::read_dataset("dev/bench/data.js")?;
//! if let Some(cmp) = dataset.compare_latest("my suite", DEFAULT_ALERT_THRESHOLD)? {
//!     for bench in cmp.regressions() {
//!         println!("{} got slower: {:?}", bench.name, bench.ratio);
//!     }
//! }
//! # Ok::<(), bench_history::HistoryError>(())
//! ```

use crate::error::{HistoryError, Result};
use crate::model::{Dataset, Entry};
use serde::Serialize;

/// Ratio past which a bench counts as regressed (200%).
pub const DEFAULT_ALERT_THRESHOLD: f64 = 2.0;

const TIME_UNITS: &[&str] = &["sec", "s", "ms", "us", "µs", "ns", "ns/iter"];

/// Which way a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    SmallerIsBetter,
    BiggerIsBetter,
}

impl Direction {
    /// Derive the direction from a bench unit.
    pub fn for_unit(unit: &str) -> Self {
        let unit = unit.trim();
        if TIME_UNITS.iter().any(|u| unit.eq_ignore_ascii_case(u)) {
            Direction::SmallerIsBetter
        } else {
            Direction::BiggerIsBetter
        }
    }
}

/// Comparison of one bench across two runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchComparison {
    pub name: String,
    pub unit: String,
    pub previous: f64,
    pub current: f64,
    pub direction: Direction,
    /// Worse value over better value; above 1.0 means the bench got worse.
    /// `None` when the divisor is zero.
    pub ratio: Option<f64>,
    pub regressed: bool,
}

/// Comparison of two runs of the same suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub previous_commit: String,
    pub current_commit: String,
    pub threshold: f64,
    pub benches: Vec<BenchComparison>,
}

impl Comparison {
    /// Benches whose ratio exceeds the threshold.
    pub fn regressions(&self) -> impl Iterator<Item = &BenchComparison> {
        self.benches.iter().filter(|b| b.regressed)
    }

    /// Whether any bench regressed.
    pub fn has_regression(&self) -> bool {
        self.benches.iter().any(|b| b.regressed)
    }
}

/// Compare `current` against `previous`. Benches missing from `previous`
/// are skipped.
pub fn compare(previous: &Entry, current: &Entry, threshold: f64) -> Comparison {
    let benches = current
        .benches
        .iter()
        .filter_map(|bench| {
            let prev = previous.bench(&bench.name)?;
            let direction = Direction::for_unit(&bench.unit);
            let (worse, better) = match direction {
                Direction::SmallerIsBetter => (bench.value, prev.value),
                Direction::BiggerIsBetter => (prev.value, bench.value),
            };
            let ratio = (better != 0.0).then(|| worse / better);
            Some(BenchComparison {
                name: bench.name.clone(),
                unit: bench.unit.clone(),
                previous: prev.value,
                current: bench.value,
                direction,
                ratio,
                regressed: ratio.map_or(false, |r| r > threshold),
            })
        })
        .collect();

    Comparison {
        previous_commit: previous.commit.id.clone(),
        current_commit: current.commit.id.clone(),
        threshold,
        benches,
    }
}

impl Dataset {
    /// Compare the last two runs of a suite. `Ok(None)` when the suite has
    /// fewer than two runs.
    pub fn compare_latest(&self, suite: &str, threshold: f64) -> Result<Option<Comparison>> {
        let runs = self
            .suite(suite)
            .ok_or_else(|| HistoryError::UnknownSuite(suite.to_string()))?;
        Ok(match runs {
            [.., previous, current] => Some(compare(previous, current, threshold)),
            _ => None,
        })
    }
}
