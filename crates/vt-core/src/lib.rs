//! `vt-core` — foundational types for the `rust_vt` scheduling kernel.
//!
//! This crate is a dependency of every other `vt-*` crate.  It intentionally
//! has no `vt-*` dependencies and minimal external ones (`rand`, `rustc-hash`
//! and `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `StateId`, `BehaviorId`                    |
//! | [`time`]        | `SimTime`, `Scheduled`, `Tick`, `TimeWindow`          |
//! | [`rng`]         | `SimRng` (injected per universe)                      |
//! | [`pending`]     | `PendingBuffer<T>` — deduplicating tick-end buffer    |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to time and window types.   |

pub mod error;
pub mod ids;
pub mod pending;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use ids::{AgentId, BehaviorId, StateId};
pub use pending::PendingBuffer;
pub use rng::SimRng;
pub use time::{Scheduled, SimTime, Tick, TimeWindow};
