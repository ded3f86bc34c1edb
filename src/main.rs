//! Main entry point for the `mdu` CLI application.
//!
//! `mdu` prints the allocated-block total of every path it is given, like
//! `du -s`, using a pool of worker threads to walk directory trees.
//!
//! # Responsibilities
//! - Parses CLI arguments via [`clap`] using the [`Args`] struct
//! - Installs the `tracing` subscriber for internal logging
//! - Delegates traversal to [`mdu::engine::run`]
//! - Renders totals to the terminal or a CSV file
//! - Turns the first OS error seen during the scan into the exit status
//!
//! # Flags of Interest
//! - `-j N`: Number of worker threads (default 1)
//! - `--human-readable`: Print bytes with SI units instead of blocks
//! - `--output FILE`: Write CSV instead of terminal lines
//! - `--profile`: Print timing and traversal counters

use anyhow::{Context, Result};
use clap::Parser;
use mdu::metrics::{ProfileData, print_profile_summary, rss_after_phase, save_stats_json};
use mdu::utils::exit_status;
use mdu::{Args, ScanReport, engine, output, time_phase};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_env("MDU_LOG").unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("mdu=debug,warn")
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Outputs the results either to a CSV file or the terminal.
fn output_results(report: &ScanReport, args: &Args) -> Result<()> {
    match &args.output {
        Some(path) => {
            output::render_csv(&report.totals, Some(path.as_path()))?;
            eprintln!("Output saved to: {}", path.display());
            Ok(())
        }
        None => output::render_terminal(&report.totals, args.human_readable),
    }
}

fn run(args: &Args) -> Result<u8> {
    let mut profile = ProfileData::new();
    profile.workers = args.workers();

    let (report, timing) = time_phase!("scan", {
        engine::run(args.paths.iter().cloned(), args.workers())
    });
    let report = report.context("Failed to run disk usage scan")?;
    profile.add_phase(timing);

    let (rendered, timing) = time_phase!("render", { output_results(&report, args) });
    rendered?;
    profile.add_phase(timing);

    if args.profile {
        profile.stats = report.stats;
        profile.memory_peak = rss_after_phase();
        print_profile_summary(&profile);
        if let Some(path) = &args.output {
            let stats_path = save_stats_json(path, &profile)?;
            eprintln!("Performance stats saved to: {}", stats_path.display());
        }
    }

    debug!(first_error = ?report.first_error, "scan finished");
    Ok(exit_status(report.first_error))
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(&args) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            eprintln!("mdu: {:#}", err);
            ExitCode::FAILURE
        }
    }
}
