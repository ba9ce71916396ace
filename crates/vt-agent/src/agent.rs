//! `Agent` and its two storage halves.
//!
//! Users build an [`Agent`] outside any universe, wiring in states and
//! behaviors through the `add_*` methods.  Registration moves it into an
//! [`AgentStore`][crate::AgentStore], where it is kept as an [`AgentRecord`]
//! (data) plus an [`AgentLogic`] (trait objects).

use std::fmt;

use tracing::warn;
use vt_core::{AgentId, Scheduled, StateId};

use crate::{AgentHooks, AgentState, Behavior, BehaviorError, BehaviorResult, NoHooks, StateTime};

// ── BehaviorSlot ──────────────────────────────────────────────────────────────

/// Scheduling bookkeeping for one behavior.
///
/// `scheduled` is only meaningful immediately after a reschedule; it is a
/// cache of the last result, not a promise.  `generation` is bumped on every
/// reschedule so queue entries made for an older schedule can be recognized
/// as stale and skipped.
#[derive(Clone, Debug, PartialEq)]
pub struct BehaviorSlot {
    enabled:    bool,
    scheduled:  Scheduled,
    order:      Option<i32>,
    generation: u32,
}

impl BehaviorSlot {
    pub fn new(order: Option<i32>) -> Self {
        Self { enabled: true, scheduled: Scheduled::Never, order, generation: 0 }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn scheduled(&self) -> Scheduled {
        self.scheduled
    }

    /// Intra-tick priority for the bucketed policy.  `None` = unordered.
    #[inline]
    pub fn order(&self) -> Option<i32> {
        self.order
    }

    #[inline]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Set the enabled flag.  Returns `true` if it changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        let changed = self.enabled != enabled;
        self.enabled = enabled;
        changed
    }

    /// Store a reschedule result and invalidate older queue entries.
    pub fn assign(&mut self, scheduled: Scheduled) {
        self.scheduled  = scheduled;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Back to enabled and unscheduled, as at onboarding.
    pub fn reset(&mut self) {
        self.enabled = true;
        self.assign(Scheduled::Never);
    }
}

// ── AgentRecord ───────────────────────────────────────────────────────────────

/// The data half of an agent.
#[derive(Clone, Debug)]
pub struct AgentRecord {
    name:               String,
    id:                 Option<AgentId>,
    current_state:      StateId,
    next_state:         StateId,
    transition_pending: bool,
    states:             Vec<AgentState>,
    slots:              Vec<BehaviorSlot>,
    initial:            Option<StateTime>,
}

impl AgentRecord {
    fn new(name: String) -> Self {
        Self {
            name,
            id:                 None,
            current_state:      StateId::UNDEFINED,
            next_state:         StateId::UNDEFINED,
            transition_pending: false,
            states:             Vec::new(),
            slots:              Vec::new(),
            initial:            None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The id assigned at registration, or `None` while unregistered.
    pub fn id(&self) -> Option<AgentId> {
        self.id
    }

    fn id_or_invalid(&self) -> AgentId {
        self.id.unwrap_or(AgentId::INVALID)
    }

    pub fn current_state(&self) -> StateId {
        self.current_state
    }

    /// The requested next state, if a transition is pending.
    pub fn next_state(&self) -> Option<StateId> {
        self.transition_pending.then_some(self.next_state)
    }

    pub fn is_transition_pending(&self) -> bool {
        self.transition_pending
    }

    pub fn states(&self) -> &[AgentState] {
        &self.states
    }

    pub fn state(&self, state: StateId) -> Option<&AgentState> {
        self.states.get(state.index())
    }

    /// Name of `state`, or `"UNDEFINED"`.
    pub fn state_name(&self, state: StateId) -> &str {
        self.state(state).map_or("UNDEFINED", AgentState::name)
    }

    /// First state with the given name.
    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.states
            .iter()
            .position(|s| s.name() == name)
            .map(|i| StateId(i as u16))
    }

    pub fn owns_state(&self, state: StateId) -> bool {
        !state.is_undefined() && state.index() < self.states.len()
    }

    pub fn slots(&self) -> &[BehaviorSlot] {
        &self.slots
    }

    pub fn slot(&self, slot: u16) -> Option<&BehaviorSlot> {
        self.slots.get(slot as usize)
    }

    pub fn slot_mut(&mut self, slot: u16) -> Option<&mut BehaviorSlot> {
        self.slots.get_mut(slot as usize)
    }

    pub(crate) fn slots_mut(&mut self) -> &mut [BehaviorSlot] {
        &mut self.slots
    }

    pub fn initial_state(&self) -> Option<StateTime> {
        self.initial
    }

    /// Attach an initial-state seed.  Invalid seeds are warned about and
    /// ignored; the previous seed (if any) is kept.
    pub fn set_initial_state(&mut self, seed: StateTime) -> bool {
        if !seed.is_valid() || !self.owns_state(seed.state()) {
            warn!(agent = %self.name, %seed, "ignoring invalid initial state");
            return false;
        }
        self.initial = Some(seed);
        true
    }

    pub fn clear_initial_state(&mut self) {
        self.initial = None;
    }

    // ── Registration ──────────────────────────────────────────────────────

    /// Bind this record to `id`.  Fails if it is already bound.
    pub fn register(&mut self, id: AgentId) -> BehaviorResult<()> {
        if let Some(existing) = self.id {
            return Err(BehaviorError::AlreadyRegistered { name: self.name.clone(), id: existing });
        }
        self.id = Some(id);
        for state in &mut self.states {
            state.set_owner(id);
        }
        Ok(())
    }

    pub fn unregister(&mut self) {
        self.id = None;
        for state in &mut self.states {
            state.set_owner(AgentId::INVALID);
        }
    }

    // ── State machine ─────────────────────────────────────────────────────

    /// Clear the state fields for a fresh onboarding.
    pub fn init(&mut self) {
        self.current_state      = StateId::UNDEFINED;
        self.next_state         = StateId::UNDEFINED;
        self.transition_pending = false;
    }

    /// Record a request to move to `state` at the next flush.
    ///
    /// Returns `Ok(true)` if the agent must now be queued for the flush,
    /// `Ok(false)` if the request was absorbed (same as the current state, or
    /// a transition was already pending; the later request wins).
    pub fn request_next_state(&mut self, state: StateId) -> BehaviorResult<bool> {
        if !self.owns_state(state) {
            return Err(BehaviorError::UnknownState { agent: self.id_or_invalid(), state });
        }
        if state == self.current_state {
            return Ok(false);
        }
        self.next_state = state;
        if self.transition_pending {
            return Ok(false);
        }
        self.transition_pending = true;
        Ok(true)
    }

    /// Apply the pending transition.  Returns `(old, new)` if one was pending.
    pub fn transition_to_next(&mut self) -> Option<(StateId, StateId)> {
        if !self.transition_pending {
            return None;
        }
        let old = self.current_state;
        self.current_state      = self.next_state;
        self.transition_pending = false;
        Some((old, self.current_state))
    }

    /// Immediately set the current state, bypassing the pending machinery.
    pub fn force_state(&mut self, state: StateId) -> (StateId, StateId) {
        let old = self.current_state;
        self.current_state = state;
        (old, state)
    }
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// The logic half of an agent: one boxed behavior per slot, plus hooks.
pub struct AgentLogic {
    pub behaviors: Vec<Box<dyn Behavior>>,
    pub hooks:     Box<dyn AgentHooks>,
}

/// An independent actor: identity, states, behaviors.
///
/// ```rust,ignore
/// let mut agent = Agent::new("walker");
/// let idle = agent.add_state("idle");
/// agent.add_behavior(Walk::default());
/// agent.set_initial_state(StateTime::new(idle, 0.0));
/// universe.add_agent(agent)?;
/// ```
pub struct Agent {
    record: AgentRecord,
    logic:  AgentLogic,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            record: AgentRecord::new(name.into()),
            logic:  AgentLogic { behaviors: Vec::new(), hooks: Box::new(NoHooks) },
        }
    }

    pub fn with_hooks(mut self, hooks: impl AgentHooks) -> Self {
        self.logic.hooks = Box::new(hooks);
        self
    }

    pub fn name(&self) -> &str {
        self.record.name()
    }

    pub fn record(&self) -> &AgentRecord {
        &self.record
    }

    /// Add a state owned by this agent.
    ///
    /// # Panics
    /// If the agent already has `u16::MAX - 1` states.
    pub fn add_state(&mut self, name: impl Into<String>) -> StateId {
        let id = StateId::try_from(self.record.states.len())
            .ok()
            .filter(|id| !id.is_undefined());
        let Some(id) = id else {
            panic!("agent {:?} has too many states", self.record.name);
        };
        let mut state = AgentState::new(name);
        if let Some(owner) = self.record.id {
            state.set_owner(owner);
        }
        self.record.states.push(state);
        id
    }

    /// Add an unordered behavior.  Returns its slot index.
    pub fn add_behavior(&mut self, behavior: impl Behavior) -> u16 {
        self.push_behavior(Box::new(behavior), None)
    }

    /// Add a behavior with an intra-tick order (lower runs first).
    pub fn add_ordered_behavior(&mut self, behavior: impl Behavior, order: i32) -> u16 {
        self.push_behavior(Box::new(behavior), Some(order))
    }

    /// Add an already boxed behavior.
    ///
    /// # Panics
    /// If the agent already has `u16::MAX` behaviors.
    pub fn push_behavior(&mut self, behavior: Box<dyn Behavior>, order: Option<i32>) -> u16 {
        let Ok(slot) = u16::try_from(self.logic.behaviors.len()) else {
            panic!("agent {:?} has too many behaviors", self.record.name);
        };
        self.logic.behaviors.push(behavior);
        self.record.slots.push(BehaviorSlot::new(order));
        slot
    }

    pub fn behavior_count(&self) -> usize {
        self.logic.behaviors.len()
    }

    pub fn state_named(&self, name: &str) -> Option<StateId> {
        self.record.state_named(name)
    }

    /// See [`AgentRecord::set_initial_state`].
    pub fn set_initial_state(&mut self, seed: StateTime) -> bool {
        self.record.set_initial_state(seed)
    }

    pub fn into_parts(self) -> (AgentRecord, AgentLogic) {
        (self.record, self.logic)
    }

    pub fn from_parts(record: AgentRecord, logic: AgentLogic) -> Self {
        Self { record, logic }
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("record", &self.record)
            .field("behaviors", &self.logic.behaviors.len())
            .finish()
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.record.name, self.record.state_name(self.record.current_state))
    }
}
