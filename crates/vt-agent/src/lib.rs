//! `vt-agent` — agents, behaviors and the context they run in.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                          |
//! |--------------|-------------------------------------------------------------------|
//! | [`agent`]    | `Agent` (user-built), `AgentRecord`, `AgentLogic`, `BehaviorSlot` |
//! | [`state`]    | `AgentState`, `StateTime`                                         |
//! | [`behavior`] | `Behavior` trait                                                  |
//! | [`hooks`]    | `AgentHooks` trait, `AgentSetup`, `NoHooks`                       |
//! | [`context`]  | `SimContext<'a>` — what a running behavior may see and request    |
//! | [`store`]    | `AgentStore` (records + logic, split for borrowing)               |
//! | [`error`]    | `BehaviorError`, `BehaviorResult<T>`                              |
//!
//! # Ownership model
//!
//! An [`Agent`] exclusively owns its behaviors and states.  While it is
//! registered with a universe it lives in an [`AgentStore`] split into two
//! halves: the data half ([`AgentRecord`]: name, states, state fields and
//! behavior slots) and the logic half ([`AgentLogic`]: the boxed behaviors and
//! hooks).  A running behavior holds `&mut` to its own logic while its
//! [`SimContext`] holds `&mut` to the records: two disjoint borrows.
//!
//! Back-references (behavior → agent, state → agent) are plain ids.

pub mod agent;
pub mod behavior;
pub mod context;
pub mod error;
pub mod hooks;
pub mod state;
pub mod store;


pub use agent::{Agent, AgentLogic, AgentRecord, BehaviorSlot};
pub use behavior::Behavior;
pub use context::SimContext;
pub use error::{BehaviorError, BehaviorResult};
pub use hooks::{AgentHooks, AgentSetup, NoHooks};
pub use state::{AgentState, StateTime};
pub use store::{AgentStore, PerformOutcome, Staging};
