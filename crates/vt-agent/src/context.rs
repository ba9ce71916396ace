//! What a running behavior (or state-change hook) can see and request.

use vt_core::{AgentId, BehaviorId, PendingBuffer, SimRng, SimTime, StateId};

use crate::{AgentRecord, BehaviorError, BehaviorResult};

/// Mutable view of the universe handed to [`Behavior::perform`][crate::Behavior::perform]
/// and [`AgentHooks::on_state_changed`][crate::AgentHooks::on_state_changed].
///
/// A `SimContext` is built by the universe for a single callback.  It borrows
/// every agent record (other agents are visible read-only; only the calling
/// agent can request its own transitions) together with the universe's two
/// pending buffers, so a behavior can only mutate scheduling state through the
/// request methods below.
///
/// # Lifetimes
///
/// All borrows live for one callback.  The calling behavior's own logic is
/// borrowed separately by the store, which is why the records and the logic
/// are kept apart.
pub struct SimContext<'a> {
    now:         SimTime,
    agent:       AgentId,
    records:     &'a mut [AgentRecord],
    changed:     &'a mut PendingBuffer<BehaviorId>,
    transitions: Option<&'a mut PendingBuffer<AgentId>>,
    rng:         &'a mut SimRng,
    rejected:    bool,
}

impl<'a> SimContext<'a> {
    /// Build a context for one callback by `agent`.
    ///
    /// Pass `transitions: None` for universes that do not implement the
    /// transition protocol; requests then fail with
    /// [`BehaviorError::TransitionsUnsupported`].
    pub fn new(
        now:         SimTime,
        agent:       AgentId,
        records:     &'a mut [AgentRecord],
        changed:     &'a mut PendingBuffer<BehaviorId>,
        transitions: Option<&'a mut PendingBuffer<AgentId>>,
        rng:         &'a mut SimRng,
    ) -> Self {
        Self { now, agent, records, changed, transitions, rng, rejected: false }
    }

    #[inline]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The agent this callback belongs to.
    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    /// The calling agent's record.
    pub fn me(&self) -> &AgentRecord {
        &self.records[self.agent.index()]
    }

    pub fn record(&self, agent: AgentId) -> Option<&AgentRecord> {
        self.records.get(agent.index())
    }

    pub fn agent_count(&self) -> usize {
        self.records.len()
    }

    pub fn current_state(&self) -> StateId {
        self.me().current_state()
    }

    /// Current state of any agent.  Transitions requested this tick are not
    /// visible here until the end-of-tick flush.
    pub fn state_of(&self, agent: AgentId) -> Option<StateId> {
        self.record(agent).map(AgentRecord::current_state)
    }

    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.me().state_named(name)
    }

    /// Ask to move the calling agent to `state` at the end of this tick.
    ///
    /// Repeated requests before the flush collapse into one transition to the
    /// last requested state.
    pub fn request_next_state(&mut self, state: StateId) -> BehaviorResult<()> {
        let Some(transitions) = self.transitions.as_deref_mut() else {
            self.rejected = true;
            return Err(BehaviorError::TransitionsUnsupported { agent: self.agent });
        };
        let record = &mut self.records[self.agent.index()];
        if record.request_next_state(state)? {
            transitions.push(self.agent);
        }
        Ok(())
    }

    /// Id of the calling agent's behavior in `slot`.
    pub fn behavior(&self, slot: u16) -> BehaviorId {
        BehaviorId::new(self.agent, slot)
    }

    pub fn is_enabled(&self, id: BehaviorId) -> Option<bool> {
        self.record(id.agent)?.slot(id.slot).map(|s| s.is_enabled())
    }

    /// Enable or disable any behavior.  The change takes effect after the
    /// current tick's rescheduling pass; the running ready set is unaffected.
    pub fn set_enabled(&mut self, id: BehaviorId, enabled: bool) -> BehaviorResult<()> {
        let slot = self
            .records
            .get_mut(id.agent.index())
            .and_then(|r| r.slot_mut(id.slot))
            .ok_or(BehaviorError::UnknownBehavior(id))?;
        if slot.set_enabled(enabled) {
            self.changed.push(id);
        }
        Ok(())
    }

    pub fn rng(&mut self) -> &mut SimRng {
        self.rng
    }

    /// `true` if a transition request was refused because the universe does
    /// not support transitions.  Checked by the universe after the callback so
    /// the failure is fatal even when the error was swallowed.
    pub fn transition_rejected(&self) -> bool {
        self.rejected
    }
}
