//! Error types for mdu
//!
//! Two families live here:
//! - [`ScanError`]: a single path could not be examined. Always non-fatal;
//!   the run carries on and the OS code is folded into the report.
//! - [`EngineError`]: the engine itself could not run to completion.
//!
//! [`ErrorSlot`] keeps the OS code of the first per-path failure of a run.

use parking_lot::Mutex;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to examine one path during traversal.
#[derive(Error, Debug)]
pub enum ScanError {
    /// `lstat` failed: the path vanished or became unreadable
    #[error("cannot access '{}': {}", .path.display(), describe(.source))]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A directory could not be opened for listing
    #[error("{}", open_dir_message(.path, .source))]
    OpenDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Listing stopped part way through a directory
    #[error("error reading directory '{}': {}", .path.display(), describe(.source))]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn open_dir_message(path: &Path, source: &io::Error) -> String {
    let verb = if source.raw_os_error() == Some(libc::EACCES) {
        "read"
    } else {
        "open"
    };
    format!("cannot {} directory '{}': {}", verb, path.display(), describe(source))
}

/// The OS description of `source` without the trailing ` (os error N)`.
fn describe(source: &io::Error) -> String {
    let text = source.to_string();
    match source.raw_os_error() {
        Some(code) => match text.strip_suffix(&format!(" (os error {})", code)) {
            Some(bare) => bare.to_string(),
            None => text,
        },
        None => text,
    }
}

impl ScanError {
    /// The path the failure is about.
    pub fn path(&self) -> &Path {
        match self {
            ScanError::Stat { path, .. }
            | ScanError::OpenDir { path, .. }
            | ScanError::ReadDir { path, .. } => path,
        }
    }

    /// OS error code used for the process exit status.
    ///
    /// Errors that carry no OS code are reported as `EIO`.
    pub fn raw_os_error(&self) -> i32 {
        let source = match self {
            ScanError::Stat { source, .. }
            | ScanError::OpenDir { source, .. }
            | ScanError::ReadDir { source, .. } => source,
        };
        source.raw_os_error().unwrap_or(libc::EIO)
    }
}

/// Holds the first OS error code observed by any worker.
///
/// The first writer wins; later records are ignored.
#[derive(Debug, Default)]
pub struct ErrorSlot {
    first: Mutex<Option<i32>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `code` unless an earlier code is already held.
    ///
    /// Returns true when this call set the slot.
    pub fn record(&self, code: i32) -> bool {
        let mut first = self.first.lock();
        if first.is_some() {
            return false;
        }
        *first = Some(code);
        true
    }

    pub fn get(&self) -> Option<i32> {
        *self.first.lock()
    }
}

/// Failure of the engine as a whole.
#[derive(Error, Debug)]
pub enum EngineError {
    /// No root paths were supplied
    #[error("no root paths given")]
    NoRoots,

    /// A worker count of zero was requested
    #[error("worker count must be at least 1")]
    NoWorkers,

    /// The OS refused to start a worker thread
    #[error("failed to spawn worker {id}: {source}")]
    Spawn {
        id: usize,
        #[source]
        source: io::Error,
    },

    /// A worker thread panicked before finishing
    #[error("worker {id} panicked: {message}")]
    WorkerPanicked { id: usize, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denied_message_names_directory() {
        let err = ScanError::OpenDir {
            path: PathBuf::from("/root/secret"),
            source: io::Error::from_raw_os_error(libc::EACCES),
        };
        assert_eq!(
            err.to_string(),
            "cannot read directory '/root/secret': Permission denied"
        );
        assert_eq!(err.raw_os_error(), libc::EACCES);
    }

    #[test]
    fn test_other_open_failure_keeps_os_message() {
        let err = ScanError::OpenDir {
            path: PathBuf::from("/tmp/x"),
            source: io::Error::from_raw_os_error(libc::EMFILE),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("cannot open directory '/tmp/x': "));
        assert!(!msg.contains("os error"));
        assert_eq!(err.raw_os_error(), libc::EMFILE);
    }

    #[test]
    fn test_messages_share_one_style() {
        let stat = ScanError::Stat {
            path: PathBuf::from("a"),
            source: io::Error::from_raw_os_error(libc::EACCES),
        };
        let open = ScanError::OpenDir {
            path: PathBuf::from("a"),
            source: io::Error::from_raw_os_error(libc::EACCES),
        };
        let read = ScanError::ReadDir {
            path: PathBuf::from("a"),
            source: io::Error::from_raw_os_error(libc::EIO),
        };

        assert_eq!(stat.to_string(), "cannot access 'a': Permission denied");
        assert_eq!(open.to_string(), "cannot read directory 'a': Permission denied");
        assert!(!read.to_string().contains("os error"));
    }

    #[test]
    fn test_describe_keeps_custom_messages() {
        let custom = io::Error::new(io::ErrorKind::Other, "synthetic");
        assert_eq!(describe(&custom), "synthetic");
    }

    #[test]
    fn test_stat_error_code_and_path() {
        let err = ScanError::Stat {
            path: PathBuf::from("/gone"),
            source: io::Error::from_raw_os_error(libc::ENOENT),
        };
        assert_eq!(err.raw_os_error(), libc::ENOENT);
        assert_eq!(err.path(), Path::new("/gone"));
        assert_eq!(err.to_string(), "cannot access '/gone': No such file or directory");
    }

    #[test]
    fn test_error_slot_first_writer_wins() {
        let slot = ErrorSlot::new();
        assert_eq!(slot.get(), None);
        assert!(slot.record(libc::EACCES));
        assert!(!slot.record(libc::ENOENT));
        assert_eq!(slot.get(), Some(libc::EACCES));
    }

    #[test]
    fn test_error_slot_under_contention() {
        let slot = std::sync::Arc::new(ErrorSlot::new());
        let handles: Vec<_> = (1..=8)
            .map(|code| {
                let slot = std::sync::Arc::clone(&slot);
                std::thread::spawn(move || slot.record(code))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(winners, 1);
        assert!(slot.get().is_some());
    }

    #[test]
    fn test_error_without_os_code_maps_to_eio() {
        let err = ScanError::ReadDir {
            path: PathBuf::from("/d"),
            source: io::Error::new(io::ErrorKind::Other, "synthetic"),
        };
        assert_eq!(err.raw_os_error(), libc::EIO);
    }
}
