//! Named agent states and initial-state seeds.

use std::fmt;

use vt_core::{AgentId, SimTime, StateId};

/// A named state belonging to exactly one agent.
///
/// Names are for logging and traceability only: two states with the same
/// name are still distinct states, and nothing deduplicates them.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    name:  String,
    owner: AgentId,
}

impl AgentState {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), owner: AgentId::INVALID }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning agent, or `AgentId::INVALID` until the agent is registered.
    pub fn owner(&self) -> AgentId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: AgentId) {
        self.owner = owner;
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.owner == AgentId::INVALID {
            write!(f, "[{}]", self.name)
        } else {
            write!(f, "[{}: {}]", self.owner, self.name)
        }
    }
}

// ── StateTime ─────────────────────────────────────────────────────────────────

/// An immutable `(state, time)` pair used only to seed an agent's initial
/// state when it is onboarded.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct StateTime {
    state: StateId,
    time:  SimTime,
}

impl StateTime {
    pub fn new(state: StateId, time: impl Into<SimTime>) -> Self {
        Self { state, time: time.into() }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// `true` if the state is defined and the time is non-negative.
    ///
    /// A `NaN` time is invalid.  Whether the state belongs to a particular
    /// agent is checked separately when the seed is attached to it.
    pub fn is_valid(&self) -> bool {
        !self.state.is_undefined() && self.time >= SimTime::ZERO
    }
}

impl fmt::Display for StateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} : {}]", self.state, self.time)
    }
}
