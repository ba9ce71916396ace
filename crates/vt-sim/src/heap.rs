//! Heap-based event schedulers, with and without state transitions.

use std::marker::PhantomData;

use tracing::trace;
use vt_core::{BehaviorId, SimRng};
use vt_schedule::EventHeap;

use crate::{Due, SimResult, TransitionCapable, Universe, UniverseCore};

/// Compile-time choice of whether a [`HeapUniverse`] implements the
/// state-transition protocol.
pub trait TransitionMode: 'static {
    const SUPPORTED: bool;
    const POLICY: &'static str;
}

/// Transition requests are a fatal error.  Initial-state seeds are still
/// applied, since they are forced rather than requested.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoTransitions;

impl TransitionMode for NoTransitions {
    const SUPPORTED: bool = false;
    const POLICY: &'static str = "heap";
}

/// Transition requests are deferred and flushed once per step.
#[derive(Copy, Clone, Debug, Default)]
pub struct DeferredTransitions;

impl TransitionMode for DeferredTransitions {
    const SUPPORTED: bool = true;
    const POLICY: &'static str = "heap+transitions";
}

/// Heap universe without transition support.
pub type EventUniverse = HeapUniverse<NoTransitions>;

/// Heap universe with deferred transitions.
pub type TransitionUniverse = HeapUniverse<DeferredTransitions>;

/// Event-driven universe backed by a binary min-heap of due times.
///
/// Each step pops every entry due at the earliest time and runs them.  Ties
/// come out in heap order, which is unspecified.  Entries for disabled or
/// rescheduled behaviors are left in the heap and skipped when they surface.
pub struct HeapUniverse<M: TransitionMode> {
    core:  UniverseCore,
    heap:  EventHeap,
    _mode: PhantomData<M>,
}

impl<M: TransitionMode> HeapUniverse<M> {
    pub fn new(rng: SimRng) -> Self {
        Self { core: UniverseCore::new(rng, M::SUPPORTED), heap: EventHeap::new(), _mode: PhantomData }
    }

    fn enqueue(&mut self, due: Due) {
        self.heap.push(due.behavior, due.time, due.generation);
    }

    /// Rebuild the heap once stale entries dominate it.
    fn compact(&mut self) {
        if self.heap.len() > 2 * self.core.behavior_count() + 64 {
            let core = &self.core;
            self.heap.retain(|b, g| core.is_live(b, g));
        }
    }
}

impl<M: TransitionMode> Default for HeapUniverse<M> {
    fn default() -> Self {
        Self::new(SimRng::default())
    }
}

impl<M: TransitionMode> Universe for HeapUniverse<M> {
    fn core(&self) -> &UniverseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UniverseCore {
        &mut self.core
    }

    fn policy_name(&self) -> &'static str {
        M::POLICY
    }

    fn clear_schedule(&mut self) {
        self.heap.clear();
    }

    fn step(&mut self) -> SimResult<()> {
        self.core.begin_step();
        for due in self.core.onboard(true)? {
            self.enqueue(due);
        }
        for change in self.core.merge_changed() {
            if let Some(due) = change.due {
                self.enqueue(due);
            }
        }

        let core = &self.core;
        let next = self.heap.peek_time(|b, g| core.is_live(b, g));
        let Some(now) = self.core.admit(next) else {
            return Ok(());
        };

        let core = &self.core;
        let ready: Vec<BehaviorId> = self.heap.pop_due(now, |b, g| core.is_live(b, g));
        for &id in &ready {
            self.core.perform(id)?;
        }
        self.core.flush_transitions()?;
        for &id in &ready {
            if let Some(due) = self.core.reschedule(id) {
                self.enqueue(due);
            }
        }
        for change in self.core.merge_changed() {
            if let Some(due) = change.due {
                self.enqueue(due);
            }
        }
        self.compact();

        trace!(%now, ran = ready.len(), queued = self.heap.len(), policy = M::POLICY, "heap step");
        Ok(())
    }
}

impl TransitionCapable for HeapUniverse<DeferredTransitions> {}
