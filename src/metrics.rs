//! Scan statistics and profiling utilities for `mdu`.
//!
//! This module provides:
//! - [`ScanStats`] - Lock-free counters bumped by workers while they run
//! - [`PhaseTimer`] - A wrapper around `Instant` for timing different phases
//! - [`rss_after_phase`] - Optional memory usage tracking using `sysinfo`
//! - [`ProfileData`] - Structured data for performance metrics
//! - [`print_profile_summary`] - Terminal output for profiling results
//! - [`save_stats_json`] - JSON output for scripting integration
//!
//! # Usage
//!
//! ```rust
//! use mdu::metrics::{PhaseTimer, rss_after_phase, ProfileData};
//!
//! let mut profile = ProfileData::new();
//! let timer = PhaseTimer::new("scan");
//!
//! // ... do work ...
//!
//! profile.add_phase(timer.finish());
//! profile.memory_peak = rss_after_phase();
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use sysinfo::System;

/// Counters shared by every worker of one run.
///
/// All updates are `Relaxed`: the counters are diagnostics only and are read
/// after the workers have been joined.
#[derive(Debug, Default)]
pub struct ScanStats {
    /// Paths run through the directory expander
    pub paths_expanded: AtomicU64,

    /// Directories successfully opened and listed
    pub dirs_listed: AtomicU64,

    /// Regular files charged directly (seed files)
    pub files_counted: AtomicU64,

    /// Entries seen while listing directories
    pub entries_seen: AtomicU64,

    /// Subdirectories pushed onto a work stack
    pub dirs_pushed: AtomicU64,

    /// Per-path failures
    pub errors: AtomicU64,

    /// Times a worker parked on a wake signal
    pub waits: AtomicU64,
}

impl ScanStats {
    pub(crate) fn record_expansion(&self) {
        self.paths_expanded.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_listing(&self, entries: u64) {
        self.dirs_listed.fetch_add(1, Ordering::Relaxed);
        self.entries_seen.fetch_add(entries, Ordering::Relaxed);
    }

    pub(crate) fn record_file(&self) {
        self.files_counted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_push(&self) {
        self.dirs_pushed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    /// Copies the current counter values.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            paths_expanded: self.paths_expanded.load(Ordering::Relaxed),
            dirs_listed: self.dirs_listed.load(Ordering::Relaxed),
            files_counted: self.files_counted.load(Ordering::Relaxed),
            entries_seen: self.entries_seen.load(Ordering::Relaxed),
            dirs_pushed: self.dirs_pushed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
        }
    }
}

/// Plain copy of [`ScanStats`] taken at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub paths_expanded: u64,
    pub dirs_listed: u64,
    pub files_counted: u64,
    pub entries_seen: u64,
    pub dirs_pushed: u64,
    pub errors: u64,
    pub waits: u64,
}

/// A timer for measuring the duration of a specific phase or operation.
#[derive(Debug, Clone)]
pub struct PhaseTimer {
    /// The name of the phase being timed
    pub name: String,
    /// The start time of the phase
    pub start: Instant,
}

impl PhaseTimer {
    /// Creates a new timer and starts timing the specified phase.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    /// Finishes timing the phase and returns the elapsed duration.
    pub fn finish(self) -> PhaseResult {
        PhaseResult {
            name: self.name,
            duration: self.start.elapsed(),
        }
    }
}

/// The result of a completed phase timing operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseResult {
    /// The name of the phase that was timed
    pub name: String,
    /// The duration of the phase
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// Custom serialization for Duration to make it human-readable in JSON
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Profiling data for a complete run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileData {
    /// Timing results for each phase of the run
    pub phases: Vec<PhaseResult>,
    /// Peak memory usage in bytes (if available)
    pub memory_peak: Option<u64>,
    /// Worker count the scan ran with
    pub workers: usize,
    /// Counters collected by the workers
    pub stats: StatsSnapshot,
}

impl ProfileData {
    /// Creates a new empty profile data structure.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a completed phase result to the profile.
    pub fn add_phase(&mut self, phase: PhaseResult) {
        self.phases.push(phase);
    }

    /// Gets the total duration of all phases combined.
    pub fn total_duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

/// Measures the current process's RSS (Resident Set Size) memory usage.
///
/// # Returns
/// The current RSS memory usage in bytes, or `None` if the information
/// is not available on this platform.
pub fn rss_after_phase() -> Option<u64> {
    let mut system = System::new();
    let pid = sysinfo::get_current_pid().ok()?;
    system.refresh_process(pid);
    system.process(pid).map(|process| process.memory())
}

/// Prints a formatted profile summary to stderr.
///
/// # Example Output
/// ```text
/// Scan phase timings
///   scan               150 ms
///   render               1 ms
/// Workers:          8
/// Paths expanded:   1204
/// Dirs listed:      1200
/// Entries seen:     18230
/// Worker waits:     37
/// Errors:           0
/// Memory peak:      4.2 MB
/// ```
pub fn print_profile_summary(profile: &ProfileData) {
    eprintln!("\nScan phase timings");

    for phase in &profile.phases {
        eprintln!("  {:<15} {:>7} ms", phase.name, phase.duration.as_millis());
    }

    let stats = &profile.stats;
    eprintln!("Workers:          {}", profile.workers);
    eprintln!("Paths expanded:   {}", stats.paths_expanded);
    eprintln!("Dirs listed:      {}", stats.dirs_listed);
    eprintln!("Entries seen:     {}", stats.entries_seen);
    eprintln!("Worker waits:     {}", stats.waits);
    eprintln!("Errors:           {}", stats.errors);

    if let Some(memory_peak) = profile.memory_peak {
        let memory_mb = memory_peak as f64 / (1024.0 * 1024.0);
        eprintln!("Memory peak:      {:.1} MB", memory_mb);
    }
}

/// Saves profiling statistics to `stats.json` next to `output_path`.
///
/// # Returns
/// The path of the written file.
pub fn save_stats_json(output_path: &Path, profile: &ProfileData) -> anyhow::Result<std::path::PathBuf> {
    let stats_path = output_path.with_file_name("stats.json");

    let stats = serde_json::json!({
        "scan_phases": profile.phases,
        "total_duration_ms": profile.total_duration().as_millis(),
        "memory_peak_bytes": profile.memory_peak,
        "workers": profile.workers,
        "counters": profile.stats,
        "timestamp": chrono::Utc::now().to_rfc3339()
    });

    std::fs::write(&stats_path, serde_json::to_string_pretty(&stats)?)?;
    Ok(stats_path)
}

/// Times a block of code, returning `(result, PhaseResult)`.
///
/// ```rust
/// use mdu::time_phase;
///
/// let (result, timing) = time_phase!("scan", { 42 });
/// assert_eq!(result, 42);
/// assert_eq!(timing.name, "scan");
/// ```
#[macro_export]
macro_rules! time_phase {
    ($name:expr, $code:block) => {{
        let timer = $crate::metrics::PhaseTimer::new($name);
        let result = $code;
        let timing = timer.finish();
        (result, timing)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_phase_timer() {
        let timer = PhaseTimer::new("test_phase");
        thread::sleep(Duration::from_millis(10));
        let result = timer.finish();

        assert_eq!(result.name, "test_phase");
        assert!(result.duration.as_millis() >= 10);
    }

    #[test]
    fn test_profile_total_duration() {
        let mut profile = ProfileData::new();
        profile.add_phase(PhaseResult {
            name: "scan".to_string(),
            duration: Duration::from_millis(100),
        });
        profile.add_phase(PhaseResult {
            name: "render".to_string(),
            duration: Duration::from_millis(200),
        });

        assert_eq!(profile.phases.len(), 2);
        assert_eq!(profile.total_duration(), Duration::from_millis(300));
    }

    #[test]
    fn test_scan_stats_snapshot() {
        let stats = ScanStats::default();
        stats.record_expansion();
        stats.record_expansion();
        stats.record_listing(5);
        stats.record_push();
        stats.record_error();
        stats.record_wait();
        stats.record_file();

        let snap = stats.snapshot();
        assert_eq!(snap.paths_expanded, 2);
        assert_eq!(snap.dirs_listed, 1);
        assert_eq!(snap.entries_seen, 5);
        assert_eq!(snap.dirs_pushed, 1);
        assert_eq!(snap.errors, 1);
        assert_eq!(snap.waits, 1);
        assert_eq!(snap.files_counted, 1);
    }

    #[test]
    fn test_save_stats_json() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut profile = ProfileData::new();
        profile.workers = 4;
        profile.stats.dirs_listed = 3;

        let written = save_stats_json(&temp.path().join("totals.csv"), &profile).unwrap();
        assert_eq!(written, temp.path().join("stats.json"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(written).unwrap()).unwrap();
        assert_eq!(json["workers"], 4);
        assert_eq!(json["counters"]["dirs_listed"], 3);
    }

    #[test]
    fn test_time_phase_macro() {
        let (result, timing) = time_phase!("test_macro", {
            thread::sleep(Duration::from_millis(5));
            42
        });

        assert_eq!(result, 42);
        assert_eq!(timing.name, "test_macro");
        assert!(timing.duration.as_millis() >= 5);
    }
}
