//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys, pending
//! buffer entries and sorted collection elements without ceremony.
//!
//! `AgentId` is an index into a universe's agent store and is only assigned
//! at registration.  `StateId` is *agent-relative*: it indexes the owning
//! agent's state list, so an agent can only ever name its own states.
//! `BehaviorId` pairs the owning `AgentId` with the behavior's slot in that
//! agent.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID": the inner type's `MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in a universe's agent store.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a state within its owning agent's state list.
    pub struct StateId(u16);
}

impl StateId {
    /// The state every agent holds before it is seeded or transitions.
    pub const UNDEFINED: StateId = StateId::INVALID;

    #[inline]
    pub fn is_undefined(self) -> bool {
        self == Self::UNDEFINED
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AgentId({})", self.0)
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_undefined() {
            f.write_str("StateId(UNDEFINED)")
        } else {
            write!(f, "StateId({})", self.0)
        }
    }
}

// ── BehaviorId ────────────────────────────────────────────────────────────────

/// A behavior's address: owning agent plus slot index within that agent.
///
/// The agent half is a non-owning back-reference; it is only a lookup key
/// into the store that holds the agent.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BehaviorId {
    pub agent: AgentId,
    pub slot:  u16,
}

impl BehaviorId {
    #[inline]
    pub const fn new(agent: AgentId, slot: u16) -> Self {
        Self { agent, slot }
    }

    #[inline(always)]
    pub fn slot_index(self) -> usize {
        self.slot as usize
    }
}

impl fmt::Display for BehaviorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BehaviorId({}.{})", self.agent.0, self.slot)
    }
}
