//! Per-agent lifecycle hooks.

use vt_core::{AgentId, StateId};

use crate::{AgentRecord, BehaviorResult, SimContext, StateTime};

/// Customization points on an agent, as opposed to on one of its behaviors.
///
/// Both methods have no-op defaults; most agents use [`NoHooks`].
pub trait AgentHooks: 'static {
    /// Called when the agent is onboarded, after its state fields have been
    /// cleared and before any seeding or scheduling.  Use `setup` to pick an
    /// initial state and reset per-run fields held by the hooks themselves.
    fn on_reset(&mut self, _setup: &mut AgentSetup<'_>) {}

    /// Called whenever the agent's current state changes, either by a flushed
    /// transition or by initial-state seeding.
    fn on_state_changed(
        &mut self,
        _ctx: &mut SimContext<'_>,
        _old: StateId,
        _new: StateId,
    ) -> BehaviorResult<()> {
        Ok(())
    }
}

/// Hooks that do nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoHooks;

impl AgentHooks for NoHooks {}

// ── AgentSetup ────────────────────────────────────────────────────────────────

/// Restricted view of an agent's record handed to [`AgentHooks::on_reset`].
pub struct AgentSetup<'a> {
    record: &'a mut AgentRecord,
}

impl<'a> AgentSetup<'a> {
    pub(crate) fn new(record: &'a mut AgentRecord) -> Self {
        Self { record }
    }

    pub fn id(&self) -> Option<AgentId> {
        self.record.id()
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.record.state_named(name)
    }

    /// Replace the initial-state seed.  Returns `false` (and keeps the old
    /// seed) if `seed` is invalid or names a state this agent does not own.
    pub fn set_initial_state(&mut self, seed: StateTime) -> bool {
        self.record.set_initial_state(seed)
    }

    pub fn clear_initial_state(&mut self) {
        self.record.clear_initial_state();
    }
}
