//! The `Universe` trait — the scheduler contract every policy implements.

use vt_agent::{Agent, AgentRecord};
use vt_core::{AgentId, BehaviorId, SimRng, SimTime, StateId, TimeWindow};

use crate::{RunStats, SimResult, UniverseCore};

/// A scheduler: advances virtual time and executes due behaviors under one
/// scheduling policy.
///
/// Implementors provide [`step`][Self::step] (the policy) and
/// [`clear_schedule`][Self::clear_schedule] (dropping their own queues) and
/// expose their [`UniverseCore`]; every other operation has a provided
/// implementation on top of the core.
///
/// The trait is object safe so agent factories and the scenario driver can
/// work with `&mut dyn Universe`.
///
/// # Lifecycle
///
/// ```text
/// reset_simulation(window)   evict agents, zero counters, now = start
/// add_agent(..)*             register; onboarded at the next step
/// run() | step_to(t) | step()
/// ```
pub trait Universe {
    fn core(&self) -> &UniverseCore;

    fn core_mut(&mut self) -> &mut UniverseCore;

    /// Short policy name for log output.
    fn policy_name(&self) -> &'static str;

    /// Advance by one unit of logical progress: onboard new agents, select
    /// and perform the ready set, flush deferred transitions, reschedule.
    fn step(&mut self) -> SimResult<()>;

    /// Drop every entry of the policy's own ready-set structure.
    fn clear_schedule(&mut self);

    // ── Provided ──────────────────────────────────────────────────────────

    fn supports_transitions(&self) -> bool {
        self.core().supports_transitions()
    }

    /// Clear all scheduler state for a fresh run over `window`.
    ///
    /// Returns the agents that were registered, unregistered and in
    /// registration order, so the caller can reuse them.
    fn reset_simulation(&mut self, window: TimeWindow) -> SimResult<Vec<Agent>> {
        let evicted = self.core_mut().reset(window)?;
        self.clear_schedule();
        Ok(evicted)
    }

    /// Register `agent`.  Its behaviors join the schedule at the next step.
    fn add_agent(&mut self, agent: Agent) -> SimResult<AgentId> {
        self.core_mut().add_agent(agent)
    }

    /// Step until stopped or done.
    fn run(&mut self) -> SimResult<()> {
        while !self.is_stopped() && !self.is_done() {
            self.step()?;
        }
        Ok(())
    }

    /// Step while `now <= time` and neither stopped nor done.
    fn step_to(&mut self, time: SimTime) -> SimResult<()> {
        while self.now() <= time && !self.is_stopped() && !self.is_done() {
            self.step()?;
        }
        Ok(())
    }

    /// Notify the universe that `behavior`'s enabled flag changed outside the
    /// reschedule path.  Buffered until the end of the current (or next) step.
    fn behavior_changed(&mut self, behavior: BehaviorId) -> SimResult<()> {
        self.core_mut().behavior_changed(behavior)
    }

    /// Set `behavior`'s enabled flag, notifying the universe if it changed.
    fn set_behavior_enabled(&mut self, behavior: BehaviorId, enabled: bool) -> SimResult<()> {
        self.core_mut().set_behavior_enabled(behavior, enabled)
    }

    /// Ask for `agent` to move to `state` at the next flush.
    ///
    /// Fails with [`SimError::UnsupportedTransition`][crate::SimError::UnsupportedTransition]
    /// on universes without transition support.
    fn request_next_state(&mut self, agent: AgentId, state: StateId) -> SimResult<()> {
        self.core_mut().request_next_state(agent, state)
    }

    fn set_stopped(&mut self, stopped: bool) {
        self.core_mut().set_stopped(stopped);
    }

    fn is_stopped(&self) -> bool {
        self.core().is_stopped()
    }

    fn is_done(&self) -> bool {
        self.core().is_done()
    }

    fn now(&self) -> SimTime {
        self.core().now()
    }

    fn window(&self) -> TimeWindow {
        self.core().window()
    }

    /// Number of registered agents.
    fn census(&self) -> usize {
        self.core().census()
    }

    fn stats(&self) -> RunStats {
        self.core().stats()
    }

    fn agent(&self, id: AgentId) -> Option<&AgentRecord> {
        self.core().agent(id)
    }

    fn rng_mut(&mut self) -> &mut SimRng {
        self.core_mut().rng_mut()
    }
}

/// Marker for universes that implement the deferred state-transition
/// protocol.  Generic code that needs transitions can bound on it instead of
/// checking [`Universe::supports_transitions`] at run time.
pub trait TransitionCapable: Universe {}
