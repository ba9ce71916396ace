//! Linear-scan event scheduler.

use tracing::trace;
use vt_core::{BehaviorId, Scheduled, SimRng, SimTime};

use crate::{SimResult, TransitionCapable, Universe, UniverseCore};

/// Event-driven universe that scans every behavior each step.
///
/// Each step finds the minimum due time among enabled behaviors in O(n) and
/// runs every behavior tied at that minimum, in unspecified order.  Simple
/// and allocation-light; prefer a heap universe for large populations.
/// Supports deferred state transitions.
pub struct LinearUniverse {
    core:  UniverseCore,
    ready: Vec<BehaviorId>,
}

impl LinearUniverse {
    pub fn new(rng: SimRng) -> Self {
        Self { core: UniverseCore::new(rng, true), ready: Vec::new() }
    }

    /// Collect the behaviors tied at the earliest due time.
    fn scan(&mut self) -> Option<SimTime> {
        self.ready.clear();
        let store = self.core.store();
        let mut soonest: Option<SimTime> = None;
        for id in store.all_behavior_ids() {
            let Some(slot) = store.slot(id) else { continue };
            let Scheduled::At(t) = slot.scheduled() else { continue };
            if !slot.is_enabled() {
                continue;
            }
            match soonest {
                Some(s) if t > s => {}
                Some(s) if t == s => self.ready.push(id),
                _ => {
                    self.ready.clear();
                    self.ready.push(id);
                    soonest = Some(t);
                }
            }
        }
        soonest
    }
}

impl Default for LinearUniverse {
    fn default() -> Self {
        Self::new(SimRng::default())
    }
}

impl Universe for LinearUniverse {
    fn core(&self) -> &UniverseCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut UniverseCore {
        &mut self.core
    }

    fn policy_name(&self) -> &'static str {
        "linear-scan"
    }

    fn clear_schedule(&mut self) {
        self.ready.clear();
    }

    fn step(&mut self) -> SimResult<()> {
        self.core.begin_step();
        // Schedules live in the slots themselves; nothing to enqueue.
        self.core.onboard(true)?;
        self.core.merge_changed();

        let next = self.scan();
        let Some(now) = self.core.admit(next) else {
            return Ok(());
        };

        for &id in &self.ready {
            self.core.perform(id)?;
        }
        self.core.flush_transitions()?;
        for &id in &self.ready {
            self.core.reschedule(id);
        }
        self.core.merge_changed();

        trace!(%now, ran = self.ready.len(), "linear step");
        Ok(())
    }
}

impl TransitionCapable for LinearUniverse {}
