// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI for the benchmark history store.
//!
//! Each invocation performs one read-modify-write cycle on the history
//! file and exits.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod logging;

use anyhow::{bail, Context, Result};
use bench_history::{
    append, extract, io, markdown, now_millis, validate, Bench, Commit, Dataset, Entry,
};
use clap::{ArgGroup, Parser, Subcommand};
use colored::Colorize;
use crate::config::HistoryConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Benchmark history CLI.
#[derive(Parser, Debug)]
#[command(name = "bench-history")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (defaults to ./bench-history.toml if present).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// History file override.
    #[arg(short, long, global = true, env = "BENCH_HISTORY_DATA_FILE")]
    pub data: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append one benchmark run to a suite and write the history back.
    #[command(group(ArgGroup::new("results").required(true).args(["pytest", "benches"])))]
    Append {
        /// Suite to append to; created if absent.
        #[arg(short, long)]
        suite: String,

        /// JSON file with the commit metadata (push payload `head_commit`).
        #[arg(long)]
        commit: PathBuf,

        /// pytest-benchmark JSON report.
        #[arg(long)]
        pytest: Option<PathBuf>,

        /// JSON array of `{name, value, unit, range?, extra?}` benches.
        #[arg(long)]
        benches: Option<PathBuf>,

        /// Tool identifier (defaults to the configured tool).
        #[arg(long)]
        tool: Option<String>,

        /// Run date in epoch milliseconds (defaults to now).
        #[arg(long)]
        date: Option<u64>,
    },

    /// List suites with their run counts.
    Show,

    /// Render the markdown trend report.
    Report {
        /// Write to a file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the last two runs of a suite.
    Compare {
        /// Suite to compare.
        #[arg(short, long)]
        suite: String,

        /// Alert threshold ratio (defaults to the configured one).
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// Check the history for out-of-order dates, duplicate commits and
    /// malformed values.
    Validate,
}

/// Run the CLI with the process arguments.
///
/// # Returns
///
/// Returns `Ok(())` on success, or an error if the command fails.
pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = HistoryConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(data) = cli.data {
        config.data_file = data;
    }
    logging::init(&config.log_level);

    execute(cli.command, &config)
}

/// Execute a parsed command against the resolved configuration.
pub fn execute(command: Commands, config: &HistoryConfig) -> Result<()> {
    match command {
        Commands::Append {
            suite,
            commit: commit_path,
            pytest,
            benches,
            tool,
            date,
        } => {
            let commit: Commit = serde_json::from_str(&read_input(&commit_path)?)
                .with_context(|| format!("parsing commit metadata {}", commit_path.display()))?;
            let benches = load_benches(pytest.as_deref(), benches.as_deref())?;
            let entry = Entry::new(
                commit,
                date.unwrap_or_else(now_millis),
                tool.unwrap_or_else(|| config.tool.clone()),
                benches,
            );

            let dataset = io::read_or_init(&config.data_file, &config.repo_url)
                .with_context(|| format!("loading {}", config.data_file.display()))?;
            let mut next = append(&dataset, &suite, entry);
            next.touch(now_millis());
            validate(&next);

            io::write_dataset(&config.data_file, &next)
                .with_context(|| format!("writing {}", config.data_file.display()))?;
            info!(
                suite = %suite,
                runs = next.suite(&suite).map_or(0, <[Entry]>::len),
                path = %config.data_file.display(),
                "appended benchmark run"
            );

            if let Some(comparison) = next.compare_latest(&suite, config.alert_threshold)? {
                println!("{}", markdown::comparison_table(&suite, &comparison));
                if comparison.has_regression() {
                    warn!(suite = %suite, "performance regression detected");
                    if config.fail_on_alert {
                        bail!("performance regression in suite '{}'", suite);
                    }
                }
            }
            Ok(())
        }

        Commands::Show => {
            let dataset = load(config)?;
            println!("{} {}", "Repository:".bold(), dataset.repo_url);
            for (suite, runs) in &dataset.entries {
                let latest = runs
                    .last()
                    .and_then(Entry::recorded_at)
                    .map(|ts| ts.to_rfc3339())
                    .unwrap_or_else(|| "-".to_string());
                println!("  {} ({} runs, latest {})", suite.bold(), runs.len(), latest);
            }
            println!("Total runs: {}", dataset.run_count());
            Ok(())
        }

        Commands::Report { output } => {
            let dataset = load(config)?;
            match output {
                Some(path) => {
                    io::write_report(&path, &dataset)
                        .with_context(|| format!("writing report {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => print!("{}", markdown::trend_report(&dataset)),
            }
            Ok(())
        }

        Commands::Compare { suite, threshold } => {
            let dataset = load(config)?;
            let threshold = threshold.unwrap_or(config.alert_threshold);
            let Some(comparison) = dataset.compare_latest(&suite, threshold)? else {
                println!("Suite '{}' has fewer than two runs, nothing to compare", suite);
                return Ok(());
            };

            println!("{}", markdown::comparison_table(&suite, &comparison));
            for bench in comparison.regressions() {
                println!(
                    "{} {} ({})",
                    "REGRESSION".red().bold(),
                    bench.name,
                    markdown::direction_label(bench.direction)
                );
            }
            if comparison.has_regression() {
                bail!("performance regression in suite '{}'", suite);
            }
            println!("{}", "No regressions".green());
            Ok(())
        }

        Commands::Validate => {
            let dataset = load(config)?;
            let violations = validate(&dataset);
            if violations.is_empty() {
                println!("{}", "History is valid".green());
                return Ok(());
            }
            for violation in &violations {
                println!("{} {}", "-".red(), violation);
            }
            bail!("{} invariant violation(s) found", violations.len());
        }
    }
}

fn load(config: &HistoryConfig) -> Result<Dataset> {
    io::read_dataset(&config.data_file)
        .with_context(|| format!("loading {}", config.data_file.display()))
}

fn read_input(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn load_benches(pytest: Option<&Path>, benches: Option<&Path>) -> Result<Vec<Bench>> {
    match (pytest, benches) {
        (Some(path), _) => extract::pytest(&read_input(path)?)
            .with_context(|| format!("parsing pytest-benchmark report {}", path.display())),
        (None, Some(path)) => extract::custom(&read_input(path)?)
            .with_context(|| format!("parsing benches {}", path.display())),
        (None, None) => bail!("either --pytest or --benches is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const COMMIT: &str = r#"{
        "author": {"email": "dev@example.com", "name": "Dev", "username": "dev"},
        "committer": {"email": "noreply@github.com", "name": "GitHub", "username": "web-flow"},
        "distinct": true,
        "id": "COMMIT_ID",
        "message": "Tune parser",
        "timestamp": "2020-04-13T14:00:00+03:00",
        "tree_id": "13d755e4b99fc6e61ee6d690f3f5426e4b56543c",
        "url": "https://github.com/example/repo/commit/COMMIT_ID"
    }"#;

    fn test_config(dir: &Path) -> HistoryConfig {
        HistoryConfig {
            data_file: dir.join("dev/bench/data.js"),
            repo_url: "https://github.com/example/repo".to_string(),
            tool: "customSmallerIsBetter".to_string(),
            alert_threshold: 2.0,
            fail_on_alert: true,
            log_level: "info".to_string(),
        }
    }

    fn append_run(dir: &Path, config: &HistoryConfig, id: &str, value: f64, date: u64) -> Result<()> {
        let commit = dir.join(format!("{}.commit.json", id));
        fs::write(&commit, COMMIT.replace("COMMIT_ID", id)).unwrap();
        let benches = dir.join(format!("{}.benches.json", id));
        fs::write(
            &benches,
            format!(r#"[{{"name": "parse", "value": {}, "unit": "ms"}}]"#, value),
        )
        .unwrap();

        execute(
            Commands::Append {
                suite: "parser".to_string(),
                commit,
                pytest: None,
                benches: Some(benches),
                tool: None,
                date: Some(date),
            },
            config,
        )
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_append_requires_results() {
        let err = Cli::try_parse_from(["bench-history", "append", "-s", "x", "--commit", "c.json"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_parse_compare_with_global_data() {
        let cli = Cli::try_parse_from([
            "bench-history",
            "compare",
            "--suite",
            "parser",
            "--threshold",
            "1.5",
            "--data",
            "history.json",
        ])
        .unwrap();
        assert_eq!(cli.data, Some(PathBuf::from("history.json")));
        assert!(matches!(
            cli.command,
            Commands::Compare { ref suite, threshold: Some(t) } if suite == "parser" && t == 1.5
        ));
    }

    #[test]
    fn test_append_then_compare() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        append_run(dir.path(), &config, "aaaaaaaaaa", 10.0, 1000).unwrap();
        append_run(dir.path(), &config, "bbbbbbbbbb", 12.0, 2000).unwrap();

        let dataset = io::read_dataset(&config.data_file).unwrap();
        assert_eq!(dataset.repo_url, "https://github.com/example/repo");
        let runs = dataset.suite("parser").unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].commit.id, "aaaaaaaaaa");
        assert_eq!(runs[1].tool, "customSmallerIsBetter");
        assert!(dataset.last_update > 0);

        execute(
            Commands::Compare {
                suite: "parser".to_string(),
                threshold: None,
            },
            &config,
        )
        .unwrap();
        execute(Commands::Validate, &config).unwrap();
    }

    #[test]
    fn test_append_fails_on_regression_but_keeps_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        append_run(dir.path(), &config, "aaaaaaaaaa", 10.0, 1000).unwrap();
        let err = append_run(dir.path(), &config, "bbbbbbbbbb", 50.0, 2000).unwrap_err();
        assert!(err.to_string().contains("regression"));

        let dataset = io::read_dataset(&config.data_file).unwrap();
        assert_eq!(dataset.suite("parser").unwrap().len(), 2);
    }

    #[test]
    fn test_validate_reports_out_of_order_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        append_run(dir.path(), &config, "aaaaaaaaaa", 10.0, 2000).unwrap();
        append_run(dir.path(), &config, "bbbbbbbbbb", 10.0, 1000).unwrap();

        let err = execute(Commands::Validate, &config).unwrap_err();
        assert!(err.to_string().contains("1 invariant violation"));
    }

    #[test]
    fn test_malformed_history_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        fs::create_dir_all(config.data_file.parent().unwrap()).unwrap();
        fs::write(&config.data_file, r#"{"lastUpdate": 1, "repoUrl": "x"}"#).unwrap();

        let err = execute(Commands::Show, &config).unwrap_err();
        let source = err.downcast_ref::<bench_history::HistoryError>().unwrap();
        assert!(source.is_malformed());
    }

    #[test]
    fn test_append_pytest_report() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let commit = dir.path().join("commit.json");
        fs::write(&commit, COMMIT.replace("COMMIT_ID", "cccccccccc")).unwrap();
        let report = dir.path().join("pytest.json");
        fs::write(
            &report,
            r#"{"benchmarks": [{
                "fullname": ".github/scripts/benchmark.py::test_analyze_ssl31",
                "stats": {"mean": 79.5458430449168, "stddev": 1.0138541082600396, "rounds": 3}
            }]}"#,
        )
        .unwrap();

        execute(
            Commands::Append {
                suite: "ssl".to_string(),
                commit,
                pytest: Some(report),
                benches: None,
                tool: Some("pytest".to_string()),
                date: Some(1586774044892),
            },
            &config,
        )
        .unwrap();

        let dataset = io::read_dataset(&config.data_file).unwrap();
        let entry = dataset.latest("ssl").unwrap();
        assert_eq!(entry.tool, "pytest");
        assert_eq!(entry.date, 1586774044892);
        let bench = &entry.benches[0];
        assert_eq!(bench.name, ".github/scripts/benchmark.py::test_analyze_ssl31");
        assert_eq!(bench.value, 79.5458430449168);
        assert_eq!(bench.unit, "sec");
        assert_eq!(bench.range, "stddev: 1.0138541082600396");
        assert_eq!(bench.extra, "mean: 79.5458430449168 sec\nrounds: 3");
    }

    #[test]
    fn test_report_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        append_run(dir.path(), &config, "aaaaaaaaaa", 10.0, 1000).unwrap();

        let output = dir.path().join("report.md");
        execute(
            Commands::Report {
                output: Some(output.clone()),
            },
            &config,
        )
        .unwrap();
        assert!(fs::read_to_string(output).unwrap().contains("### parse (ms)"));
    }
}
