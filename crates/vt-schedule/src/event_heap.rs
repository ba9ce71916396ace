//! `EventHeap` — min-heap of due times for the event-driven heap policies.
//!
//! Entries are `(time, behavior, generation)`.  Ordering compares the time
//! only (IEEE total order), so behaviors due at the same instant pop in
//! whatever order the binary heap yields them.  That order is unspecified and
//! callers must not rely on it.
//!
//! Removal is lazy: instead of searching the heap when a behavior is
//! disabled or rescheduled, the caller supplies a liveness predicate and stale
//! entries are discarded when they reach the top.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use vt_core::{BehaviorId, SimTime};

#[derive(Copy, Clone, Debug)]
struct Entry {
    time:       SimTime,
    behavior:   BehaviorId,
    generation: u32,
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    // Reversed: `BinaryHeap` is a max-heap.
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time)
    }
}

#[derive(Default)]
pub struct EventHeap {
    heap: BinaryHeap<Entry>,
}

impl EventHeap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `behavior` at `time` under schedule `generation`.
    pub fn push(&mut self, behavior: BehaviorId, time: SimTime, generation: u32) {
        self.heap.push(Entry { time, behavior, generation });
    }

    /// Earliest live due time, discarding stale entries on the way.
    ///
    /// `is_live(behavior, generation)` must return `false` for entries whose
    /// behavior has since been disabled or rescheduled.
    pub fn peek_time(&mut self, mut is_live: impl FnMut(BehaviorId, u32) -> bool) -> Option<SimTime> {
        while let Some(top) = self.heap.peek() {
            if is_live(top.behavior, top.generation) {
                return Some(top.time);
            }
            self.heap.pop();
        }
        None
    }

    /// Pop every live entry due at or before `time`.
    ///
    /// The returned ready set is a snapshot: entries pushed after this call
    /// are not part of it even if they are due at the same instant.
    pub fn pop_due(
        &mut self,
        time:        SimTime,
        mut is_live: impl FnMut(BehaviorId, u32) -> bool,
    ) -> Vec<BehaviorId> {
        let mut ready = Vec::new();
        while let Some(top) = self.heap.peek() {
            if top.time.total_cmp(&time) == Ordering::Greater {
                break;
            }
            let Some(entry) = self.heap.pop() else { break };
            if is_live(entry.behavior, entry.generation) {
                ready.push(entry.behavior);
            }
        }
        ready
    }

    /// Drop every stale entry now.  O(n).
    pub fn retain(&mut self, mut is_live: impl FnMut(BehaviorId, u32) -> bool) {
        self.heap.retain(|e| is_live(e.behavior, e.generation));
    }

    /// Number of queued entries, stale ones included.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn clear(&mut self) {
        self.heap.clear();
    }
}
