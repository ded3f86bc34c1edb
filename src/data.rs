//! Data structures passed between the engine and its callers.
//!
//! This module defines the units of work the engine schedules and the
//! per-root results it hands back to the reporting layer.

use crate::metrics::StatsSnapshot;
use crate::utils::blocks_to_bytes;
use std::path::PathBuf;

/// A pending path on a root's work stack.
///
/// # Fields
/// * `path` - The full path to expand
/// * `is_seed` - True only for the literal root path the scan started from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub path: PathBuf,
    pub is_seed: bool,
}

impl WorkItem {
    /// The starting entry of a root.
    pub fn seed(path: PathBuf) -> Self {
        Self {
            path,
            is_seed: true,
        }
    }

    /// A directory discovered while expanding its parent.
    pub fn child(path: PathBuf) -> Self {
        Self {
            path,
            is_seed: false,
        }
    }
}

/// Classification of a path from a symlink-aware stat.
///
/// # Variants
/// * `File` - A regular file
/// * `Dir` - A directory
/// * `Other` - Symlinks, fifos, sockets and devices; never followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
    Other,
}

/// Final allocated-block total for one root.
///
/// # Fields
/// * `path` - The root path exactly as it was supplied
/// * `blocks` - Sum of `st_blocks` (512-byte units) over the root's tree
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RootTotal {
    pub path: PathBuf,
    pub blocks: i64,
}

impl RootTotal {
    /// Allocated size in bytes.
    pub fn bytes(&self) -> u64 {
        blocks_to_bytes(self.blocks)
    }
}

/// Everything a finished run hands to the reporting layer.
///
/// # Fields
/// * `totals` - One entry per root, in input order
/// * `first_error` - OS error code of the first failure seen by any worker
/// * `stats` - Counters collected while the workers ran
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub totals: Vec<RootTotal>,
    pub first_error: Option<i32>,
    pub stats: StatsSnapshot,
}

impl ScanReport {
    /// True when no worker observed a per-path failure.
    pub fn is_clean(&self) -> bool {
        self.first_error.is_none()
    }
}
