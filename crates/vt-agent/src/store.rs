//! `AgentStore` — registered agents, split into records and logic.
//!
//! # Why two vectors?
//!
//! Performing a behavior needs `&mut` to that behavior (its own state) and
//! `&mut` to every agent record (so the context can queue transitions and
//! toggle slots) at the same time.  Rust's borrow checker forbids this if an
//! agent's behaviors and its record live in one struct behind one `Vec`.
//! Keeping records and logic in parallel vectors resolves the conflict:
//!
//! ```ignore
//! let behavior = &mut self.logic[agent].behaviors[slot];
//! let mut ctx  = SimContext::new(now, id, &mut self.records, ...);
//! behavior.perform(&mut ctx)
//! ```
//!
//! Both vectors always have the same length; `AgentId` indexes both.

use vt_core::{AgentId, BehaviorId, PendingBuffer, SimRng, SimTime, StateId};

use crate::{
    Agent, AgentLogic, AgentRecord, Behavior, BehaviorError, BehaviorResult, BehaviorSlot,
    SimContext, hooks::AgentSetup,
};

/// The result of running one callback through the store.
#[derive(Debug)]
pub struct PerformOutcome {
    pub result:              BehaviorResult<()>,
    /// The callback attempted a transition the universe does not support,
    /// whether or not it propagated the error.
    pub transition_rejected: bool,
}

/// The mutable state a callback may touch besides the records.
pub struct Staging<'a> {
    pub changed:     &'a mut PendingBuffer<BehaviorId>,
    pub transitions: Option<&'a mut PendingBuffer<AgentId>>,
    pub rng:         &'a mut SimRng,
}

#[derive(Default)]
pub struct AgentStore {
    records: Vec<AgentRecord>,
    logic:   Vec<AgentLogic>,
}

impl AgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterator over all `AgentId`s in ascending index order.
    pub fn agent_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        (0..self.records.len() as u32).map(AgentId)
    }

    /// Register `agent` and return its id.
    pub fn insert(&mut self, agent: Agent) -> BehaviorResult<AgentId> {
        let id = AgentId(self.records.len() as u32);
        let (mut record, logic) = agent.into_parts();
        record.register(id)?;
        self.records.push(record);
        self.logic.push(logic);
        Ok(id)
    }

    /// Remove every agent, unregistered, in id order.
    pub fn drain(&mut self) -> Vec<Agent> {
        self.records
            .drain(..)
            .zip(self.logic.drain(..))
            .map(|(mut record, logic)| {
                record.unregister();
                Agent::from_parts(record, logic)
            })
            .collect()
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    pub fn record(&self, agent: AgentId) -> Option<&AgentRecord> {
        self.records.get(agent.index())
    }

    pub fn record_mut(&mut self, agent: AgentId) -> Option<&mut AgentRecord> {
        self.records.get_mut(agent.index())
    }

    pub fn slot(&self, id: BehaviorId) -> Option<&BehaviorSlot> {
        self.record(id.agent)?.slot(id.slot)
    }

    pub fn slot_mut(&mut self, id: BehaviorId) -> Option<&mut BehaviorSlot> {
        self.record_mut(id.agent)?.slot_mut(id.slot)
    }

    /// Every behavior of `agent`, in slot order.
    pub fn behavior_ids(&self, agent: AgentId) -> impl Iterator<Item = BehaviorId> + '_ {
        let n = self.record(agent).map_or(0, |r| r.slots().len());
        (0..n as u16).map(move |slot| BehaviorId::new(agent, slot))
    }

    /// Every behavior of every agent, agent-major.
    pub fn all_behavior_ids(&self) -> impl Iterator<Item = BehaviorId> + '_ {
        self.agent_ids().flat_map(|a| self.behavior_ids(a))
    }

    /// Label of the behavior in `id`, for log output.
    pub fn label(&self, id: BehaviorId) -> &str {
        self.logic
            .get(id.agent.index())
            .and_then(|l| l.behaviors.get(id.slot_index()))
            .map_or("<unknown>", |b| b.label())
    }

    /// The slot and behavior of `id`, borrowed together for rescheduling.
    pub fn schedule_parts(&mut self, id: BehaviorId) -> Option<(&mut BehaviorSlot, &dyn Behavior)> {
        let behavior = self.logic.get(id.agent.index())?.behaviors.get(id.slot_index())?;
        let slot     = self.records.get_mut(id.agent.index())?.slot_mut(id.slot)?;
        Some((slot, behavior.as_ref()))
    }

    // ── Onboarding ────────────────────────────────────────────────────────

    /// Clear `agent`'s state fields and run its `on_reset` hook.
    pub fn reset_agent(&mut self, agent: AgentId) -> BehaviorResult<()> {
        let record = self
            .records
            .get_mut(agent.index())
            .ok_or(BehaviorError::UnknownAgent(agent))?;
        record.init();
        let hooks = &mut self.logic[agent.index()].hooks;
        hooks.on_reset(&mut AgentSetup::new(record));
        Ok(())
    }

    /// Reset every behavior of `agent`: user `reset()`, then enabled and
    /// unscheduled.
    pub fn reset_behaviors(&mut self, agent: AgentId) {
        let (Some(record), Some(logic)) =
            (self.records.get_mut(agent.index()), self.logic.get_mut(agent.index()))
        else {
            return;
        };
        for (slot, behavior) in record.slots_mut().iter_mut().zip(logic.behaviors.iter_mut()) {
            behavior.reset();
            slot.reset();
        }
    }

    // ── Callbacks ─────────────────────────────────────────────────────────

    /// Run behavior `id` at `now`.
    pub fn perform(&mut self, id: BehaviorId, now: SimTime, staging: Staging<'_>) -> PerformOutcome {
        let Some(behavior) = self
            .logic
            .get_mut(id.agent.index())
            .and_then(|l| l.behaviors.get_mut(id.slot_index()))
        else {
            return PerformOutcome {
                result:              Err(BehaviorError::UnknownBehavior(id)),
                transition_rejected: false,
            };
        };
        let mut ctx = SimContext::new(
            now,
            id.agent,
            &mut self.records,
            staging.changed,
            staging.transitions,
            staging.rng,
        );
        let result = behavior.perform(&mut ctx);
        PerformOutcome { result, transition_rejected: ctx.transition_rejected() }
    }

    /// Invoke `agent`'s `on_state_changed` hook.
    pub fn notify_state_changed(
        &mut self,
        agent:   AgentId,
        old:     StateId,
        new:     StateId,
        now:     SimTime,
        staging: Staging<'_>,
    ) -> PerformOutcome {
        let Some(logic) = self.logic.get_mut(agent.index()) else {
            return PerformOutcome {
                result:              Err(BehaviorError::UnknownAgent(agent)),
                transition_rejected: false,
            };
        };
        let mut ctx = SimContext::new(
            now,
            agent,
            &mut self.records,
            staging.changed,
            staging.transitions,
            staging.rng,
        );
        let result = logic.hooks.on_state_changed(&mut ctx, old, new);
        PerformOutcome { result, transition_rejected: ctx.transition_rejected() }
    }
}
