//! Per-root shared state and the activity tracker.
//!
//! Each root owns three independently locked resources:
//!
//! - the *schedule*: its [`WorkStack`] together with the count of workers
//!   currently expanding one of its paths,
//! - the *wake signal*: a condition variable paired with the schedule lock,
//! - the *total*: the allocated-block accumulator.
//!
//! Keeping the stack and the active count under one lock is what makes the
//! termination check sound. A worker claims an item by popping it and
//! incrementing the active count in the same critical section, so no other
//! worker can ever observe "stack empty, nobody active" while an item is in
//! flight between the two. A root is exhausted exactly when that conjunction
//! holds, because only an active worker can push new work.
//!
//! Waiting workers are released by a push (one unit of work, one waiter) or
//! by the last active worker leaving an empty root (everyone).

use crate::data::WorkItem;
use crate::metrics::ScanStats;
use crate::stack::WorkStack;
use parking_lot::{Condvar, Mutex};
use std::path::{Path, PathBuf};
use tracing::trace;

/// Pending work and the number of workers that may still produce more.
#[derive(Debug)]
struct Schedule {
    stack: WorkStack,
    active: usize,
}

/// All mutable state belonging to one root path.
#[derive(Debug)]
pub struct RootTask {
    index: usize,
    path: PathBuf,
    schedule: Mutex<Schedule>,
    wake: Condvar,
    total: Mutex<i64>,
}

impl RootTask {
    /// Creates the task for root number `index` with its seed entry queued.
    pub fn new(index: usize, path: PathBuf) -> Self {
        let seed = WorkItem::seed(path.clone());
        Self {
            index,
            path,
            schedule: Mutex::new(Schedule {
                stack: WorkStack::seeded(seed),
                active: 0,
            }),
            wake: Condvar::new(),
            total: Mutex::new(0),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Claims the next item for expansion, blocking while the root is idle
    /// but not yet provably finished.
    ///
    /// Returns `None` once the stack is empty and no worker is expanding a
    /// path of this root; after that no item will ever appear again.
    pub fn next_item(&self, stats: &ScanStats) -> Option<ExpansionGuard<'_>> {
        let mut schedule = self.schedule.lock();
        loop {
            if let Ok(item) = schedule.stack.pop() {
                schedule.active += 1;
                return Some(ExpansionGuard { root: self, item });
            }
            if schedule.active == 0 {
                trace!(root = self.index, "root exhausted");
                return None;
            }
            stats.record_wait();
            self.wake.wait(&mut schedule);
        }
    }

    /// Queues a subdirectory discovered by an active worker and wakes one
    /// waiter.
    ///
    /// Callers must hold an [`ExpansionGuard`] for this root, which keeps the
    /// active count above zero for as long as the push can happen.
    pub fn push_child(&self, path: PathBuf) {
        self.schedule.lock().stack.push(WorkItem::child(path));
        self.wake.notify_one();
    }

    /// Adds `blocks` to the root's running total.
    pub fn add_blocks(&self, blocks: i64) {
        *self.total.lock() += blocks;
    }

    /// The accumulated total. Only meaningful once the root is exhausted.
    pub fn total_blocks(&self) -> i64 {
        *self.total.lock()
    }

    /// Current number of workers inside the expander for this root.
    #[cfg(test)]
    pub(crate) fn active_workers(&self) -> usize {
        self.schedule.lock().active
    }

    /// Number of items waiting on the stack.
    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.schedule.lock().stack.len()
    }

    fn finish_expansion(&self) {
        let mut schedule = self.schedule.lock();
        schedule.active -= 1;
        if schedule.active == 0 && schedule.stack.is_empty() {
            drop(schedule);
            self.wake.notify_all();
        }
    }
}

/// An item claimed from a root's stack.
///
/// While the guard lives the root counts one more active worker. Dropping
/// it, including while unwinding from a panic, releases that claim.
#[derive(Debug)]
pub struct ExpansionGuard<'a> {
    root: &'a RootTask,
    item: WorkItem,
}

impl ExpansionGuard<'_> {
    pub fn item(&self) -> &WorkItem {
        &self.item
    }

    pub fn root(&self) -> &RootTask {
        self.root
    }
}

impl Drop for ExpansionGuard<'_> {
    fn drop(&mut self) {
        self.root.finish_expansion();
    }
}
