//! `UniverseCore` — the state and bookkeeping every scheduling policy shares.
//!
//! A policy owns one `UniverseCore` plus its own ready-set structure (a scan,
//! a heap or tick buckets).  The core implements everything that is the same
//! across policies: registration, the onboarding protocol for new agents, the
//! deferred transition flush, the changed-behavior merge, performing a
//! behavior and the termination bookkeeping.

use tracing::{debug, info, trace};
use vt_agent::{Agent, AgentRecord, AgentStore, BehaviorError, Staging, StateTime};
use vt_core::{AgentId, BehaviorId, PendingBuffer, Scheduled, SimRng, SimTime, StateId, TimeWindow};
use vt_schedule::reschedule_in;

use crate::{SimError, SimResult};

// ── Counters ──────────────────────────────────────────────────────────────────

/// Cumulative counters of one run.  Zeroed by `reset_simulation`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Behaviors performed since the last reset.
    pub behaviors_performed: u64,
    /// Behaviors performed by the most recent step.
    pub step_behaviors:      u64,
    /// State transitions applied (flushed or seeded) since the last reset.
    pub state_transitions:   u64,
    /// Calls to `step` since the last reset.
    pub steps:               u64,
}

// ── Scheduling results handed to policies ─────────────────────────────────────

/// A behavior that was just rescheduled to a finite time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Due {
    pub behavior:   BehaviorId,
    pub time:       SimTime,
    pub generation: u32,
    pub order:      Option<i32>,
}

/// One merged entry of the changed-behavior buffer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Change {
    pub behavior: BehaviorId,
    /// The schedule the behavior had before the merge (possibly still queued).
    pub previous: Scheduled,
    /// The new schedule, if the behavior is enabled and made progress.
    pub due:      Option<Due>,
}

// ── UniverseCore ──────────────────────────────────────────────────────────────

pub struct UniverseCore {
    window:               TimeWindow,
    now:                  SimTime,
    stopped:              bool,
    done:                 bool,
    stats:                RunStats,
    store:                AgentStore,
    new_agents:           Vec<AgentId>,
    changed:              PendingBuffer<BehaviorId>,
    transitions:          PendingBuffer<AgentId>,
    rng:                  SimRng,
    supports_transitions: bool,
    onboarded_once:       bool,
    behavior_count:       usize,
}

impl UniverseCore {
    /// `supports_transitions` is fixed for the lifetime of the universe.
    pub fn new(rng: SimRng, supports_transitions: bool) -> Self {
        let window = TimeWindow::default();
        Self {
            window,
            now: window.start,
            stopped: false,
            done: false,
            stats: RunStats::default(),
            store: AgentStore::new(),
            new_agents: Vec::new(),
            changed: PendingBuffer::new(),
            transitions: PendingBuffer::new(),
            rng,
            supports_transitions,
            onboarded_once: false,
            behavior_count: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn window(&self) -> TimeWindow {
        self.window
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn census(&self) -> usize {
        self.store.len()
    }

    pub fn behavior_count(&self) -> usize {
        self.behavior_count
    }

    pub fn store(&self) -> &AgentStore {
        &self.store
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentRecord> {
        self.store.record(id)
    }

    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub fn supports_transitions(&self) -> bool {
        self.supports_transitions
    }

    /// `true` if a queue entry for `behavior` made under `generation` is
    /// still the behavior's current, enabled schedule.
    pub fn is_live(&self, behavior: BehaviorId, generation: u32) -> bool {
        self.store
            .slot(behavior)
            .is_some_and(|s| s.is_enabled() && s.generation() == generation)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Clear everything for a fresh run over `window` and hand back every
    /// registered agent, unregistered, in registration order.
    ///
    /// The random source is re-seeded with its original seed so reruns are
    /// reproducible.
    pub fn reset(&mut self, window: TimeWindow) -> SimResult<Vec<Agent>> {
        window.validate()?;
        let evicted = self.store.drain();
        self.window         = window;
        self.now            = window.start;
        self.stopped        = false;
        self.done           = false;
        self.stats          = RunStats::default();
        self.onboarded_once = false;
        self.behavior_count = 0;
        self.new_agents.clear();
        self.changed.clear();
        self.transitions.clear();
        self.rng = SimRng::new(self.rng.seed());
        debug!(%window, evicted = evicted.len(), "universe reset");
        Ok(evicted)
    }

    /// Register `agent`; it is onboarded at the start of the next step.
    pub fn add_agent(&mut self, agent: Agent) -> SimResult<AgentId> {
        let behaviors = agent.behavior_count();
        let id = self.store.insert(agent).map_err(|e| match e {
            BehaviorError::AlreadyRegistered { name, .. } => SimError::AgentAlreadyRegistered { name },
            other => SimError::Config(other.to_string()),
        })?;
        self.new_agents.push(id);
        self.behavior_count += behaviors;
        trace!(agent = %id, behaviors, "agent registered");
        Ok(id)
    }

    /// Start of every step: zero the per-step counter.
    pub fn begin_step(&mut self) {
        self.stats.step_behaviors = 0;
        self.stats.steps += 1;
    }

    // ── Onboarding ────────────────────────────────────────────────────────

    /// Onboard every agent registered since the last step.
    ///
    /// 1. Clear each new agent's state fields and run its `on_reset` hook.
    /// 2. Apply all initial-state seeds across the new agents in time order
    ///    as forced transitions.  Forced transitions bypass the deferred
    ///    protocol, so every policy applies them.  With
    ///    `rewind_to_seed`, the first onboarding of a run moves `now` back to
    ///    the earliest seed if it precedes it.
    /// 3. Reset every behavior and reschedule it from `now`.
    ///
    /// Returns the behaviors that received a finite due time.
    pub fn onboard(&mut self, rewind_to_seed: bool) -> SimResult<Vec<Due>> {
        if self.new_agents.is_empty() {
            return Ok(Vec::new());
        }
        let new_agents = std::mem::take(&mut self.new_agents);

        for &agent in &new_agents {
            self.store.reset_agent(agent).map_err(|_| SimError::UnknownAgent(agent))?;
        }

        self.apply_seeds(&new_agents, rewind_to_seed)?;

        let mut due = Vec::new();
        for &agent in &new_agents {
            self.store.reset_behaviors(agent);
            let slots = self.store.record(agent).map_or(0, |r| r.slots().len());
            for slot in 0..slots as u16 {
                if let Some(d) = self.reschedule(BehaviorId::new(agent, slot)) {
                    due.push(d);
                }
            }
        }
        self.onboarded_once = true;
        debug!(agents = new_agents.len(), scheduled = due.len(), now = %self.now, "onboarded new agents");
        Ok(due)
    }

    fn apply_seeds(&mut self, new_agents: &[AgentId], rewind_to_seed: bool) -> SimResult<()> {
        let mut seeds: Vec<(AgentId, StateTime)> = new_agents
            .iter()
            .filter_map(|&a| self.store.record(a)?.initial_state().map(|s| (a, s)))
            .collect();
        if seeds.is_empty() {
            return Ok(());
        }

        seeds.sort_by(|a, b| a.1.time().total_cmp(&b.1.time()));
        if rewind_to_seed && !self.onboarded_once {
            let earliest = seeds[0].1.time();
            if earliest < self.now {
                debug!(from = %self.now, to = %earliest, "moving clock back to earliest initial state");
                self.now = earliest;
            }
        }

        for (agent, seed) in seeds {
            let Some(record) = self.store.record_mut(agent) else { continue };
            let (old, new) = record.force_state(seed.state());
            self.stats.state_transitions += 1;
            self.notify_state_changed(agent, old, new)?;
        }
        Ok(())
    }

    // ── Per-tick operations ───────────────────────────────────────────────

    /// Reschedule `behavior` from `now`.  Returns its new due time, or `None`
    /// if it is (now) disabled or unknown.
    pub fn reschedule(&mut self, behavior: BehaviorId) -> Option<Due> {
        match reschedule_in(&mut self.store, behavior, self.now)? {
            Scheduled::At(time) => {
                let slot = self.store.slot(behavior)?;
                Some(Due { behavior, time, generation: slot.generation(), order: slot.order() })
            }
            Scheduled::Never => None,
        }
    }

    /// Perform `behavior` at `now`.
    ///
    /// A transition request refused for lack of support is fatal even if the
    /// behavior swallowed the error it got back.
    pub fn perform(&mut self, behavior: BehaviorId) -> SimResult<()> {
        let now = self.now;
        let (store, staging) = self.split();
        let out = store.perform(behavior, now, staging);
        if out.transition_rejected {
            return Err(SimError::UnsupportedTransition { agent: behavior.agent });
        }
        if let Err(source) = out.result {
            debug!(%behavior, label = store.label(behavior), %source, "behavior failed");
            return Err(SimError::Behavior { behavior, source });
        }
        self.stats.step_behaviors      += 1;
        self.stats.behaviors_performed += 1;
        Ok(())
    }

    /// Apply every pending transition: `current = next`, hook, counter.
    ///
    /// Hooks may request further transitions; those wait for the next flush.
    pub fn flush_transitions(&mut self) -> SimResult<usize> {
        if !self.supports_transitions {
            return Ok(0);
        }
        let mut applied = 0;
        for agent in self.transitions.take() {
            let Some((old, new)) = self.store.record_mut(agent).and_then(|r| r.transition_to_next())
            else {
                continue;
            };
            applied += 1;
            self.stats.state_transitions += 1;
            self.notify_state_changed(agent, old, new)?;
        }
        if applied > 0 {
            trace!(applied, now = %self.now, "flushed state transitions");
        }
        Ok(applied)
    }

    /// Reschedule every behavior staged as changed since the last merge.
    pub fn merge_changed(&mut self) -> Vec<Change> {
        let staged = self.changed.take();
        let mut merged = Vec::with_capacity(staged.len());
        for behavior in staged {
            let Some(previous) = self.store.slot(behavior).map(|s| s.scheduled()) else { continue };
            let due = self.reschedule(behavior);
            merged.push(Change { behavior, previous, due });
        }
        merged
    }

    fn notify_state_changed(&mut self, agent: AgentId, old: StateId, new: StateId) -> SimResult<()> {
        let now = self.now;
        let (store, staging) = self.split();
        let out = store.notify_state_changed(agent, old, new, now, staging);
        if out.transition_rejected {
            return Err(SimError::UnsupportedTransition { agent });
        }
        out.result.map_err(|source| SimError::Hook { agent, source })
    }

    fn split(&mut self) -> (&mut AgentStore, Staging<'_>) {
        let transitions = self.supports_transitions.then_some(&mut self.transitions);
        let staging = Staging { changed: &mut self.changed, transitions, rng: &mut self.rng };
        (&mut self.store, staging)
    }

    // ── Requests from outside a behavior ──────────────────────────────────

    pub fn behavior_changed(&mut self, behavior: BehaviorId) -> SimResult<()> {
        if self.store.slot(behavior).is_none() {
            return Err(SimError::UnknownBehavior(behavior));
        }
        self.changed.push(behavior);
        Ok(())
    }

    pub fn set_behavior_enabled(&mut self, behavior: BehaviorId, enabled: bool) -> SimResult<()> {
        let slot = self.store.slot_mut(behavior).ok_or(SimError::UnknownBehavior(behavior))?;
        if slot.set_enabled(enabled) {
            self.changed.push(behavior);
        }
        Ok(())
    }

    pub fn request_next_state(&mut self, agent: AgentId, state: StateId) -> SimResult<()> {
        if !self.supports_transitions {
            return Err(SimError::UnsupportedTransition { agent });
        }
        let record = self.store.record_mut(agent).ok_or(SimError::UnknownAgent(agent))?;
        let queue = record
            .request_next_state(state)
            .map_err(|_| SimError::UnknownState { agent, state })?;
        if queue {
            self.transitions.push(agent);
        }
        Ok(())
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// Nothing left to schedule: the run is done.
    pub fn exhausted(&mut self) {
        info!(now = %self.now, "no more scheduled behaviors");
        self.done = true;
    }

    /// The next due time lies past the window: the run is done.  The clock
    /// stays where it is.
    pub fn boundary_reached(&mut self) {
        info!(now = %self.now, end = %self.window.end, "simulation end time boundary reached");
        self.done = true;
    }

    pub fn advance_to(&mut self, time: SimTime) {
        self.now = time;
    }

    /// Accept `next` as the time of this step, or finish the run.
    pub fn admit(&mut self, next: Option<SimTime>) -> Option<SimTime> {
        match next {
            None => {
                self.exhausted();
                None
            }
            Some(t) if t > self.window.end => {
                self.boundary_reached();
                None
            }
            Some(t) => {
                self.advance_to(t);
                Some(t)
            }
        }
    }
}
