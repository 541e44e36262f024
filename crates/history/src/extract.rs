// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Conversion of benchmark tool output into [`Bench`] records.

use crate::error::Result;
use crate::model::Bench;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct PytestReport {
    benchmarks: Vec<PytestBenchmark>,
}

#[derive(Debug, Deserialize)]
struct PytestBenchmark {
    fullname: String,
    stats: PytestStats,
}

#[derive(Debug, Deserialize)]
struct PytestStats {
    mean: f64,
    stddev: f64,
    rounds: u64,
}

/// Convert a pytest-benchmark JSON report (`--benchmark-json`).
///
/// Each benchmark becomes one bench valued at its mean, in seconds.
pub fn pytest(json: &str) -> Result<Vec<Bench>> {
    let report: PytestReport = serde_json::from_str(json)?;
    Ok(report
        .benchmarks
        .into_iter()
        .map(|b| {
            let PytestStats {
                mean,
                stddev,
                rounds,
            } = b.stats;
            Bench::new(b.fullname, mean, "sec")
                .with_range(format!("stddev: {}", stddev))
                .with_extra(format!("mean: {} sec\nrounds: {}", mean, rounds))
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct CustomBench {
    name: String,
    value: f64,
    unit: String,
    #[serde(default)]
    range: String,
    #[serde(default)]
    extra: String,
}

/// Parse a JSON array of benches written by a custom harness.
///
/// `range` and `extra` may be omitted and default to empty strings.
pub fn custom(json: &str) -> Result<Vec<Bench>> {
    let benches: Vec<CustomBench> = serde_json::from_str(json)?;
    Ok(benches
        .into_iter()
        .map(|b| {
            Bench::new(b.name, b.value, b.unit)
                .with_range(b.range)
                .with_extra(b.extra)
        })
        .collect())
}
