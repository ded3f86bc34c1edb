//! Utility functions for the `mdu` disk usage tool.
//!
//! This module provides:
//! - Symlink-aware classification and block counts via `libc::lstat`
//! - Block to byte conversion
//! - Exit status selection from the first recorded OS error
//!
//! Block counts are the raw `st_blocks` values, always in 512-byte units
//! regardless of the filesystem's own block size.

use crate::data::EntryKind;
use libc::{S_IFDIR, S_IFMT, S_IFREG, lstat as libc_lstat, stat};
use std::ffi::CString;
use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/// Size in bytes of one `st_blocks` unit.
pub const BLOCK_SIZE: u64 = 512;

/// The two facts the engine needs from a stat call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatInfo {
    pub kind: EntryKind,
    pub blocks: i64,
}

/// Stats `path` without following a trailing symbolic link.
///
/// # Arguments
/// * `path` - The file or directory path to examine
///
/// # Returns
/// * `io::Result<StatInfo>` - The entry kind and its allocated 512-byte blocks
///
/// # Errors
/// Returns the OS error reported by `lstat`, or `InvalidInput` when the path
/// contains an interior NUL byte.
pub fn lstat(path: &Path) -> io::Result<StatInfo> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // Use MaybeUninit to avoid undefined behavior with zeroed stat struct
    let mut stat_buf = std::mem::MaybeUninit::<stat>::uninit();
    let result = unsafe { libc_lstat(c_path.as_ptr(), stat_buf.as_mut_ptr()) };

    if result != 0 {
        return Err(io::Error::last_os_error());
    }

    let stat_buf = unsafe { stat_buf.assume_init() };
    let kind = match stat_buf.st_mode & S_IFMT {
        S_IFDIR => EntryKind::Dir,
        S_IFREG => EntryKind::File,
        _ => EntryKind::Other,
    };

    Ok(StatInfo {
        kind,
        blocks: stat_buf.st_blocks as i64,
    })
}

/// Converts a count of 512-byte blocks to bytes. Negative counts clamp to 0.
pub fn blocks_to_bytes(blocks: i64) -> u64 {
    u64::try_from(blocks).unwrap_or(0) * BLOCK_SIZE
}

/// Maps the first recorded OS error to a process exit status.
///
/// `None` is success. Codes that truncate to 0 in 8 bits still report failure.
pub fn exit_status(first_error: Option<i32>) -> u8 {
    match first_error {
        None => 0,
        Some(code) => match (code & 0xff) as u8 {
            0 => 1,
            status => status,
        },
    }
}
