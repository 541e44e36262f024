// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Layered configuration for the CLI.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults;
//! 2. `bench-history.{toml,yaml,json}` in the working directory, or the
//!    file given with `--config`;
//! 3. `BENCH_HISTORY_*` environment variables, e.g.
//!    `BENCH_HISTORY_DATA_FILE=dev/bench/data.js`.

use bench_history::io::DEFAULT_DATA_FILE;
use bench_history::DEFAULT_ALERT_THRESHOLD;
use ::config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "BENCH_HISTORY";

/// Base name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "bench-history";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryConfig {
    /// History file to read and update.
    pub data_file: PathBuf,
    /// Repository URL recorded when a new history is created.
    pub repo_url: String,
    /// Tool identifier recorded on appended runs.
    pub tool: String,
    /// Ratio past which a bench counts as regressed.
    pub alert_threshold: f64,
    /// Fail `append` when the new run regresses.
    pub fail_on_alert: bool,
    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl HistoryConfig {
    /// Load configuration, optionally from an explicit file which must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::with_name(CONFIG_FILE_NAME).required(false),
        };

        Config::builder()
            .set_default("data_file", DEFAULT_DATA_FILE)?
            .set_default("repo_url", "")?
            .set_default("tool", "pytest")?
            .set_default("alert_threshold", DEFAULT_ALERT_THRESHOLD)?
            .set_default("fail_on_alert", false)?
            .set_default("log_level", "info")?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    // Loading reads the process environment; tests touching it run one at a time.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn load_locked(path: &Path) -> Result<HistoryConfig, ConfigError> {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        HistoryConfig::load(Some(path))
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
data_file = "bench/history.json"
repo_url = "https://github.com/example/repo"
alert_threshold = 1.5
fail_on_alert = true
"#,
        )
        .unwrap();

        let config = load_locked(&path).unwrap();
        assert_eq!(config.data_file, PathBuf::from("bench/history.json"));
        assert_eq!(config.repo_url, "https://github.com/example/repo");
        assert_eq!(config.alert_threshold, 1.5);
        assert!(config.fail_on_alert);
        // Untouched keys keep their defaults.
        assert_eq!(config.tool, "pytest");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_locked(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_wrong_type_in_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "fail_on_alert = \"sometimes\"\n").unwrap();
        assert!(load_locked(&path).is_err());
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layered.toml");
        fs::write(&path, "alert_threshold = 1.5\ntool = \"cargo\"\n").unwrap();

        let config = {
            let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
            std::env::set_var("BENCH_HISTORY_ALERT_THRESHOLD", "3.5");
            std::env::set_var("BENCH_HISTORY_DATA_FILE", "ci/history.json");
            let loaded = HistoryConfig::load(Some(&path));
            std::env::remove_var("BENCH_HISTORY_ALERT_THRESHOLD");
            std::env::remove_var("BENCH_HISTORY_DATA_FILE");
            loaded.unwrap()
        };

        assert_eq!(config.alert_threshold, 3.5);
        assert_eq!(config.data_file, PathBuf::from("ci/history.json"));
        // File value survives where no variable is set.
        assert_eq!(config.tool, "cargo");
        assert!(!config.fail_on_alert);
    }
}
