//! Per-root LIFO of pending work.
//!
//! A [`WorkStack`] holds the directories that have been discovered under one
//! root but not yet expanded. It carries no locking of its own: the owning
//! [`RootTask`](crate::root::RootTask) keeps it behind the same mutex as the
//! root's activity count, so every push, pop and emptiness check is atomic
//! with respect to the termination check.

use crate::data::WorkItem;
use thiserror::Error;

/// Returned by [`WorkStack::pop`] when nothing is left to pop.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("work stack is empty")]
pub struct EmptyStack;

/// Last-in, first-out sequence of work items.
///
/// Children pushed while expanding a directory are popped before siblings
/// that were discovered earlier, giving a depth-first traversal order.
#[derive(Debug, Default)]
pub struct WorkStack {
    items: Vec<WorkItem>,
}

impl WorkStack {
    /// Creates a stack holding a single seed item.
    pub fn seeded(item: WorkItem) -> Self {
        Self { items: vec![item] }
    }

    /// Appends `item` on top of the stack.
    pub fn push(&mut self, item: WorkItem) {
        self.items.push(item);
    }

    /// Removes and returns the most recently pushed item.
    ///
    /// # Errors
    /// Returns [`EmptyStack`] when the stack holds no items.
    pub fn pop(&mut self) -> Result<WorkItem, EmptyStack> {
        self.items.pop().ok_or(EmptyStack)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }
}
