//! `TickBuckets` — sparse per-tick behavior queue for the fixed-tick policy.
//!
//! # Why this exists
//!
//! The fixed-tick policy advances exactly one integer tick per step, and most
//! ticks of a long window hold only a few due behaviors (or none).  A dense
//! array with one queue per tick of the window would cost memory proportional
//! to the window length and would have no slot for a behavior due past the
//! end.
//!
//! `TickBuckets` keeps only the ticks that have at least one entry.  Each step
//! drains exactly one tick; an entry due beyond the window is parked in
//! [`Tick::BEYOND`][vt_core::Tick::BEYOND] and never drained.
//!
//! # Performance note
//!
//! `BTreeMap` gives O(log W) insert and O(log W) drain where W = number of
//! distinct ticks currently enqueued.  Sorting by [`OrderKey`] happens once
//! per drained bucket.

use std::collections::BTreeMap;

use vt_core::{BehaviorId, Tick};

use crate::OrderKey;

/// One queued behavior.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BucketEntry {
    pub key:        OrderKey,
    pub behavior:   BehaviorId,
    pub generation: u32,
}

/// A map from ticks to the behaviors due in that tick.
#[derive(Default)]
pub struct TickBuckets {
    inner: BTreeMap<Tick, Vec<BucketEntry>>,
    /// Cached total entry count for O(1) `len()`.
    total: usize,
}

impl TickBuckets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `entry` in `tick`.
    pub fn push(&mut self, tick: Tick, entry: BucketEntry) {
        self.inner.entry(tick).or_default().push(entry);
        self.total += 1;
    }

    /// Remove and return every entry of `tick`, ordered entries first by
    /// ascending order value, unordered entries last in insertion order.
    ///
    /// Returns `None` if nothing is queued for that tick.
    pub fn drain_tick(&mut self, tick: Tick) -> Option<Vec<BucketEntry>> {
        let mut entries = self.inner.remove(&tick)?;
        self.total -= entries.len();
        entries.sort_by_key(|e| e.key);
        Some(entries)
    }

    /// Remove `behavior` from `tick`.  Returns `true` if it was queued there.
    pub fn remove(&mut self, tick: Tick, behavior: BehaviorId) -> bool {
        let Some(bucket) = self.inner.get_mut(&tick) else {
            return false;
        };
        let before = bucket.len();
        bucket.retain(|e| e.behavior != behavior);
        let removed = before - bucket.len();
        if bucket.is_empty() {
            self.inner.remove(&tick);
        }
        self.total -= removed;
        removed > 0
    }

    /// `true` if any entry is queued in a tick earlier than `tick`.
    pub fn has_entries_before(&self, tick: Tick) -> bool {
        self.inner.range(..tick).next().is_some()
    }

    /// Total number of entries across all ticks.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn clear(&mut self) {
        self.inner.clear();
        self.total = 0;
    }
}
