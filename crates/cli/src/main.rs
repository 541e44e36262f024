// Copyright 2025 Bench History Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark history CLI entry point.

fn main() {
    if let Err(e) = bench_history_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
