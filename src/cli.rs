//! CLI interface definitions for the `mdu` application.
//!
//! This module defines command-line arguments using [`clap`] and exposes
//! [`Args`], the struct parsed from CLI inputs. It is the only configuration
//! surface: there is no config file.
//!
//! # Example
//!
//! ```bash
//! mdu -j 8 /usr/share /var/log --human-readable
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the `mdu` disk usage calculator.
///
/// # Examples
///
/// ```rust
/// use mdu::Args;
/// use clap::Parser;
///
/// let args = Args::parse_from(["mdu", "-j", "4", "/tmp"]);
/// assert_eq!(args.jobs, 4);
/// ```
#[derive(Parser, Debug)]
#[command(name = "mdu", author = "Sam Green", version, about)]
pub struct Args {
    /// Files or directories to summarize (defaults to the current directory)
    #[arg(value_name = "PATH", default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Number of worker threads
    #[arg(short = 'j', long = "jobs", value_name = "THREADS", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub jobs: u32,

    /// Print sizes in human-readable bytes instead of 512-byte blocks
    #[arg(long, default_value_t = false)]
    pub human_readable: bool,

    /// Write totals to a CSV file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print timing and traversal statistics after the results
    #[arg(long, default_value_t = false)]
    pub profile: bool,

    /// Enable debug logging (overridden by MDU_LOG)
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    /// Worker count as a `usize` for the engine.
    pub fn workers(&self) -> usize {
        self.jobs as usize
    }
}
