// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Markdown output generation for benchmark history.
//!
//! This module renders the trend of every bench across a suite's runs and
//! the previous/current table used in CI comments.

use crate::compare::{Comparison, Direction};
use crate::model::{millis_to_utc, short_commit_id, Dataset, Entry};
use indexmap::IndexMap;
use std::fmt::Write;

/// Generate a markdown trend report covering every suite.
pub fn trend_report(dataset: &Dataset) -> String {
    let mut output = String::new();

    writeln!(output, "# Benchmark History").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "Repository: {}", dataset.repo_url).unwrap();
    writeln!(output, "Last update: {}", format_millis(dataset.last_update)).unwrap();
    writeln!(output).unwrap();

    for (suite, runs) in &dataset.entries {
        writeln!(output, "## {}", escape(suite)).unwrap();
        writeln!(output).unwrap();

        for (name, unit) in bench_names(runs) {
            writeln!(output, "### {} ({})", escape(name), escape(unit)).unwrap();
            writeln!(output).unwrap();
            writeln!(output, "| Commit | Date | Value | Range |").unwrap();
            writeln!(output, "|--------|------|-------|-------|").unwrap();

            for entry in runs {
                let Some(bench) = entry.bench(name) else {
                    continue;
                };
                writeln!(
                    output,
                    "| [{}]({}) | {} | {} | {} |",
                    entry.commit.short_id(),
                    entry.commit.url,
                    format_millis(entry.date),
                    bench.value,
                    escape(&bench.range)
                )
                .unwrap();
            }
            writeln!(output).unwrap();
        }
    }

    writeln!(output, "---").unwrap();
    writeln!(
        output,
        "Total suites: {}, total runs: {}",
        dataset.entries.len(),
        dataset.run_count()
    )
    .unwrap();

    output
}

/// Generate the previous/current comparison table for one suite.
pub fn comparison_table(suite: &str, comparison: &Comparison) -> String {
    let mut output = String::new();

    writeln!(output, "# {}", escape(suite)).unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "| Benchmark | Previous ({}) | Current ({}) | Ratio |",
        short_commit_id(&comparison.previous_commit),
        short_commit_id(&comparison.current_commit)
    )
    .unwrap();
    writeln!(output, "|-----------|----------|---------|-------|").unwrap();

    for bench in &comparison.benches {
        let ratio = match bench.ratio {
            Some(r) => format!("{:.2}", r),
            None => "n/a".to_string(),
        };
        let marker = if bench.regressed { " :warning:" } else { "" };
        writeln!(
            output,
            "| {} | {} {} | {} {} | {}{} |",
            escape(&bench.name),
            bench.previous,
            escape(&bench.unit),
            bench.current,
            escape(&bench.unit),
            ratio,
            marker
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    let regressions = comparison.regressions().count();
    if regressions > 0 {
        writeln!(
            output,
            "**{} benchmark(s) exceeded the alert threshold of {:.0}%.**",
            regressions,
            comparison.threshold * 100.0
        )
        .unwrap();
    } else {
        writeln!(output, "No regressions beyond {:.0}%.", comparison.threshold * 100.0).unwrap();
    }

    output
}

/// Direction label shown next to a ratio.
pub fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::SmallerIsBetter => "smaller is better",
        Direction::BiggerIsBetter => "bigger is better",
    }
}

/// Bench names in first-seen order, with the unit of their first sighting.
fn bench_names(runs: &[Entry]) -> IndexMap<&str, &str> {
    let mut names = IndexMap::new();
    for bench in runs.iter().flat_map(|e| &e.benches) {
        names.entry(bench.name.as_str()).or_insert(bench.unit.as_str());
    }
    names
}

fn format_millis(ms: u64) -> String {
    millis_to_utc(ms)
        .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace('\n', "<br>")
}
