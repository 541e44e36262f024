// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Append-only benchmark history for continuous benchmarking dashboards.
//!
//! A history file maps suite names to the chronological list of benchmark
//! runs recorded for them. Each CI run loads the file, appends one run and
//! writes the whole document back.
//!
//! # Quick Start
//!
//! ```no_run
//! use bench_history::{append, io, now_millis};
//!
//! # fn entry() -> bench_history::Entry { unimplemented!() }
//! let dataset = io::read_dataset("dev/bench/data.js")?;
//! let mut next = append(&dataset, "my suite", entry());
//! next.touch(now_millis());
//! io::write_dataset("dev/bench/data.js", &next)?;
//! # Ok::<(), bench_history::HistoryError>(())
//! ```
//!
//! # Modules
//!
//! - [`model`] - The `Dataset`, `Entry`, `Commit` and `Bench` types
//! - [`codec`] - Parsing and serializing JSON and `data.js` blobs
//! - [`io`] - Reading and writing history files
//! - [`validate`] - Invariant checks on a loaded history
//! - [`compare`] - Regression detection between two runs
//! - [`extract`] - Conversion of tool output into benches
//! - [`markdown`] - Markdown report generation

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod error;
pub mod extract;
pub mod io;
pub mod markdown;
pub mod model;
pub mod validate;

pub use codec::{parse, to_data_js, to_json, Format};
pub use compare::{compare, BenchComparison, Comparison, Direction, DEFAULT_ALERT_THRESHOLD};
pub use error::{HistoryError, Result};
pub use model::{append, now_millis, Bench, Commit, CommitUser, Dataset, Entry};
pub use validate::{validate, Violation};
