//! The directory expander.
//!
//! [`expand`] consumes one claimed path of a root and charges its blocks:
//!
//! - a seed entry is charged its own blocks, whatever its kind;
//! - a directory is listed, every entry's own blocks go into a local
//!   subtotal, and subdirectories are pushed back onto the root's stack;
//! - a directory discovered as a child is never charged for itself here,
//!   its parent's subtotal already covered it.
//!
//! Every failure is local to the path it concerns. It is printed as a
//! diagnostic, folded into the run's [`ErrorSlot`], and traversal moves on.

use crate::data::EntryKind;
use crate::error::{ErrorSlot, ScanError};
use crate::metrics::ScanStats;
use crate::root::{ExpansionGuard, RootTask};
use crate::utils::lstat;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Expands the path held by `claim` into its root's total and work stack.
pub fn expand(claim: &ExpansionGuard<'_>, errors: &ErrorSlot, stats: &ScanStats) {
    let root = claim.root();
    let item = claim.item();
    stats.record_expansion();

    let info = match lstat(&item.path) {
        Ok(info) => info,
        Err(source) => {
            report(
                ScanError::Stat {
                    path: item.path.clone(),
                    source,
                },
                errors,
                stats,
            );
            return;
        }
    };

    if item.is_seed {
        root.add_blocks(info.blocks);
        if info.kind == EntryKind::File {
            stats.record_file();
        }
    }

    if info.kind != EntryKind::Dir {
        return;
    }

    let listing = match fs::read_dir(&item.path) {
        Ok(listing) => listing,
        Err(source) => {
            report(
                ScanError::OpenDir {
                    path: item.path.clone(),
                    source,
                },
                errors,
                stats,
            );
            return;
        }
    };

    let mut subtotal: i64 = 0;
    let mut seen: u64 = 0;

    for entry in listing {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                report(
                    ScanError::ReadDir {
                        path: item.path.clone(),
                        source,
                    },
                    errors,
                    stats,
                );
                break;
            }
        };
        seen += 1;

        if let Some(blocks) = visit_entry(root, entry.path(), errors, stats) {
            subtotal += blocks;
        }
    }

    root.add_blocks(subtotal);
    stats.record_listing(seen);
}

/// Stats one listed entry and queues it when it is a directory.
///
/// Returns the entry's own blocks, or `None` when it could not be stat'ed;
/// such an entry contributes nothing to the subtotal.
fn visit_entry(
    root: &RootTask,
    child: PathBuf,
    errors: &ErrorSlot,
    stats: &ScanStats,
) -> Option<i64> {
    let info = match lstat(&child) {
        Ok(info) => info,
        Err(source) => {
            report(ScanError::Stat { path: child, source }, errors, stats);
            return None;
        }
    };

    if info.kind == EntryKind::Dir {
        root.push_child(child);
        stats.record_push();
    }
    Some(info.blocks)
}

/// Emits the diagnostic for `err` and folds its OS code into the run.
fn report(err: ScanError, errors: &ErrorSlot, stats: &ScanStats) {
    let code = err.raw_os_error();
    eprintln!("mdu: {}", err);
    debug!(path = %err.path().display(), code, "path failed");
    errors.record(code);
    stats.record_error();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::MetadataExt;
    use std::path::Path;
    use tempfile::TempDir;

    fn blocks(path: &Path) -> i64 {
        fs::symlink_metadata(path).unwrap().blocks() as i64
    }

    #[test]
    fn test_seed_file_is_charged() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("big.bin");
        fs::write(&file, vec![1u8; 64 * 1024]).unwrap();

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, file.clone());
        let claim = root.next_item(&stats).unwrap();
        expand(&claim, &errors, &stats);
        drop(claim);

        assert_eq!(root.total_blocks(), blocks(&file));
        assert_eq!(root.pending(), 0);
        assert_eq!(stats.snapshot().files_counted, 1);
        assert_eq!(errors.get(), None);
    }

    #[test]
    fn test_directory_listing_pushes_only_subdirectories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::create_dir(dir.join("sub_a")).unwrap();
        fs::create_dir(dir.join("sub_b")).unwrap();
        fs::write(dir.join("file.txt"), "content").unwrap();

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, dir.to_path_buf());
        let claim = root.next_item(&stats).unwrap();
        expand(&claim, &errors, &stats);
        drop(claim);

        let expected = blocks(dir)
            + blocks(&dir.join("sub_a"))
            + blocks(&dir.join("sub_b"))
            + blocks(&dir.join("file.txt"));
        assert_eq!(root.total_blocks(), expected);
        assert_eq!(root.pending(), 2);

        let snap = stats.snapshot();
        assert_eq!(snap.dirs_pushed, 2);
        assert_eq!(snap.entries_seen, 3);
    }

    #[test]
    fn test_child_directory_not_charged_for_itself() {
        let temp = TempDir::new().unwrap();
        let sub = temp.path().join("sub");
        fs::create_dir(&sub).unwrap();
        fs::write(sub.join("leaf"), "x").unwrap();

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, temp.path().to_path_buf());
        {
            // Stand in for the seed's expansion: queue the child only.
            let _seed = root.next_item(&stats).unwrap();
            root.push_child(sub.clone());
        }

        let claim = root.next_item(&stats).unwrap();
        assert!(!claim.item().is_seed);
        expand(&claim, &errors, &stats);
        drop(claim);

        assert_eq!(root.total_blocks(), blocks(&sub.join("leaf")));
    }

    #[test]
    fn test_missing_seed_records_enoent() {
        let temp = TempDir::new().unwrap();
        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, temp.path().join("nope"));
        let claim = root.next_item(&stats).unwrap();
        expand(&claim, &errors, &stats);
        drop(claim);

        assert_eq!(root.total_blocks(), 0);
        assert_eq!(errors.get(), Some(libc::ENOENT));
        assert_eq!(stats.snapshot().errors, 1);
    }

    #[test]
    fn test_symlink_seed_is_a_leaf() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("target");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("payload"), vec![0u8; 32 * 1024]).unwrap();
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, link.clone());
        let claim = root.next_item(&stats).unwrap();
        expand(&claim, &errors, &stats);
        drop(claim);

        assert_eq!(root.total_blocks(), blocks(&link));
        assert_eq!(root.pending(), 0);
        assert_eq!(errors.get(), None);
    }

    #[test]
    fn test_unstatable_entry_adds_nothing_and_listing_continues() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        fs::write(dir.join("before"), vec![1u8; 12_000]).unwrap();
        fs::write(dir.join("after"), vec![2u8; 20_000]).unwrap();
        fs::create_dir(dir.join("sub")).unwrap();

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, dir.to_path_buf());
        let _seed = root.next_item(&stats).unwrap();

        let mut subtotal = 0;
        for name in ["before", "vanished", "sub", "after"] {
            if let Some(b) = visit_entry(&root, dir.join(name), &errors, &stats) {
                subtotal += b;
            }
        }

        assert_eq!(
            subtotal,
            blocks(&dir.join("before")) + blocks(&dir.join("sub")) + blocks(&dir.join("after"))
        );
        assert_eq!(errors.get(), Some(libc::ENOENT));
        assert_eq!(stats.snapshot().errors, 1);
        assert_eq!(stats.snapshot().dirs_pushed, 1);
        assert_eq!(root.pending(), 1);
    }

    #[test]
    fn test_directory_vanishing_mid_traversal() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        let doomed = dir.join("doomed");
        let kept = dir.join("kept");
        fs::create_dir(&doomed).unwrap();
        fs::create_dir(&kept).unwrap();
        fs::write(doomed.join("lost"), vec![3u8; 16_000]).unwrap();
        fs::write(kept.join("leaf"), vec![4u8; 24_000]).unwrap();

        // What the seed's own listing would have charged.
        let seed_charge = blocks(dir) + blocks(&doomed) + blocks(&kept);

        let (errors, stats) = (ErrorSlot::new(), ScanStats::default());
        let root = RootTask::new(0, dir.to_path_buf());
        {
            // Both children are queued; one is removed before any worker
            // claims it.
            let _seed = root.next_item(&stats).unwrap();
            root.add_blocks(seed_charge);
            root.push_child(kept.clone());
            root.push_child(doomed.clone());
        }
        fs::remove_dir_all(&doomed).unwrap();

        while let Some(claim) = root.next_item(&stats) {
            expand(&claim, &errors, &stats);
        }

        assert_eq!(errors.get(), Some(libc::ENOENT));
        assert_eq!(stats.snapshot().errors, 1);
        assert_eq!(root.active_workers(), 0);
        assert_eq!(root.pending(), 0);
        assert_eq!(root.total_blocks(), seed_charge + blocks(&kept.join("leaf")));
    }
}
