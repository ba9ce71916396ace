//! `PendingBuffer` — ordered, deduplicating staging area for mutations that
//! must wait for a tick-end barrier.
//!
//! # Why this exists
//!
//! Two kinds of mutation are raised while a universe is iterating its ready
//! set: behaviors whose enabled flag toggled, and agents that requested a
//! state transition.  Applying either immediately would mutate a collection
//! that is being iterated, or let a behavior observe another agent's state
//! change mid-tick.  Every universe therefore stages them here and merges the
//! buffer once the tick's rescheduling pass is finished.
//!
//! Entries keep first-insertion order, and pushing an entry that is already
//! staged is a no-op.  Membership is tracked in an `FxHashSet` (ids are small
//! integers, so SipHash would be wasted work).

use std::hash::Hash;

use rustc_hash::FxHashSet;

/// Insertion-ordered set of staged items, drained at a barrier.
#[derive(Debug, Clone)]
pub struct PendingBuffer<T: Copy + Eq + Hash> {
    order:   Vec<T>,
    members: FxHashSet<T>,
}

impl<T: Copy + Eq + Hash> PendingBuffer<T> {
    pub fn new() -> Self {
        Self { order: Vec::new(), members: FxHashSet::default() }
    }

    /// Stage `item`.  Returns `true` if it was not already staged.
    pub fn push(&mut self, item: T) -> bool {
        if self.members.insert(item) {
            self.order.push(item);
            true
        } else {
            false
        }
    }

    /// Take every staged item in insertion order, leaving the buffer empty.
    ///
    /// Returns an owned `Vec` so callers can push follow-up mutations into
    /// the same buffer while processing the drained batch.
    pub fn take(&mut self) -> Vec<T> {
        self.members.clear();
        std::mem::take(&mut self.order)
    }

    pub fn clear(&mut self) {
        self.members.clear();
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

}

impl<T: Copy + Eq + Hash> Default for PendingBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}
