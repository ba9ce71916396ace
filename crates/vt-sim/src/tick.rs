//! Bucketed fixed-tick scheduler with explicit intra-tick order.

use tracing::trace;
use vt_core::{BehaviorId, SimRng, Tick};
use vt_schedule::{BucketEntry, OrderKey, TickBuckets};

use crate::{Due, SimResult, TransitionCapable, Universe, UniverseCore};

/// Time-stepped universe: each step is exactly one integer tick.
///
/// A behavior due at `t` is queued in tick `ceil(t - start)`; step `k` runs
/// tick `k` at `now = start + k`, whether or not anything is queued there.
/// Within a tick, ordered behaviors run first by ascending order value and
/// unordered behaviors run after all of them.
///
/// Ticks are stored sparsely.  A behavior due past the end of the window is
/// parked in a bucket no step reaches, so it is kept but never run.
/// Initial-state seeds are applied but never move the clock.
pub struct TickUniverse {
    core:       UniverseCore,
    buckets:    TickBuckets,
    step_index: u64,
    ready:      Vec<BehaviorId>,
}

impl TickUniverse {
    pub fn new(rng: SimRng) -> Self {
        Self {
            core:       UniverseCore::new(rng, true),
            buckets:    TickBuckets::new(),
            step_index: 0,
            ready:      Vec::new(),
        }
    }

    /// Index of the next tick to run.
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Number of queued entries across all ticks.
    pub fn queued(&self) -> usize {
        self.buckets.len()
    }

    /// Queue `due` in its tick.  Entries past the window end are parked in
    /// `Tick::BEYOND` and never run.
    fn enqueue(&mut self, due: Due) {
        let tick = self.core.window().bucket_of(due.time);
        self.buckets.push(tick, BucketEntry {
            key:        OrderKey::from(due.order),
            behavior:   due.behavior,
            generation: due.generation,
        });
    }

    /// Merge staged enable/disable changes, moving each behavior out of the
    /// tick it was queued in.
    fn apply_changes(&mut self) {
        let window = self.core.window();
        for change in self.core.merge_changed() {
            if let Some(time) = change.previous.time() {
                self.buckets.remove(window.bucket_of(time), change.behavior);
            }
            if let Some(due) = change.due {
                self.enqueue(due);
            }
        }
    }

    /// `true` once the step index has passed the last tick of the window.
    fn past_window(&self) -> bool {
        self.step_index as f64 > self.core.window().duration().floor()
    }
}

impl Default for TickUniverse {
    fn default() -> Self {
        Self::new(SimRng::default())
    }
}

impl Universe for TickUniverse {
    fn core(&self) -> &UniverseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UniverseCore {
        &mut self.core
    }

    fn policy_name(&self) -> &'static str {
        "ordered-tick"
    }

    fn clear_schedule(&mut self) {
        self.buckets.clear();
        self.ready.clear();
        self.step_index = 0;
    }

    fn step(&mut self) -> SimResult<()> {
        self.core.begin_step();
        for due in self.core.onboard(false)? {
            self.enqueue(due);
        }
        self.apply_changes();

        if self.buckets.is_empty() {
            self.core.exhausted();
            return Ok(());
        }
        if self.past_window() || !self.buckets.has_entries_before(Tick::BEYOND) {
            self.core.boundary_reached();
            return Ok(());
        }

        let tick = Tick(self.step_index);
        let now = self.core.window().time_of(tick);
        self.core.advance_to(now);

        self.ready.clear();
        if let Some(entries) = self.buckets.drain_tick(tick) {
            let core = &self.core;
            self.ready.extend(
                entries
                    .into_iter()
                    .filter(|e| core.is_live(e.behavior, e.generation))
                    .map(|e| e.behavior),
            );
        }

        for &id in &self.ready {
            self.core.perform(id)?;
        }
        self.core.flush_transitions()?;

        let ready = std::mem::take(&mut self.ready);
        for &id in &ready {
            if let Some(due) = self.core.reschedule(id) {
                self.enqueue(due);
            }
        }
        self.ready = ready;
        self.apply_changes();

        trace!(%tick, %now, ran = self.ready.len(), queued = self.buckets.len(), "tick step");
        self.step_index += 1;
        Ok(())
    }
}

impl TransitionCapable for TickUniverse {}
