//! `vt-sim` — universes (schedulers) and the scenario driver.
//!
//! # Scheduling policies
//!
//! | Universe                | Ready-set structure       | Transitions | Tie order            |
//! |-------------------------|---------------------------|-------------|----------------------|
//! | [`LinearUniverse`]      | scan of every behavior    | yes         | unspecified          |
//! | [`EventUniverse`]       | binary min-heap           | no (fatal)  | unspecified          |
//! | [`TransitionUniverse`]  | binary min-heap           | yes         | unspecified          |
//! | [`TickUniverse`]        | sparse integer-tick map   | yes         | ordered, then rest   |
//!
//! # One step
//!
//! ```text
//! ① Onboard   — agents added since the last step: init state, on_reset hook,
//!               apply initial-state seeds, reset + schedule every behavior.
//! ② Merge     — reschedule behaviors whose enabled flag changed.
//! ③ Select    — the earliest due time (or the next tick).  Nothing left, or
//!               past the window end → done, clock untouched.
//! ④ Perform   — every ready behavior at `now`.  Transition requests are
//!               buffered, not applied.
//! ⑤ Flush     — apply buffered transitions, one on_state_changed per agent.
//! ⑥ Resched   — every performed behavior from `now`, then merge changes
//!               raised during ④ and ⑤.
//! ```
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use vt_sim::{NoopObserver, ScenarioBuilder, TickUniverse};
//!
//! let mut scenario = ScenarioBuilder::new()
//!     .window(0.0, 100.0)
//!     .universe(TickUniverse::default())
//!     .agent(agent)
//!     .build()?;
//! let report = scenario.execute(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod heap;
pub mod kernel;
pub mod linear;
pub mod observer;
pub mod report;
pub mod scenario;
pub mod tick;
pub mod universe;
pub mod user_objects;

#[cfg(test)]
mod tests;

pub use builder::ScenarioBuilder;
pub use error::{SimError, SimResult};
pub use heap::{DeferredTransitions, EventUniverse, HeapUniverse, NoTransitions, TransitionMode, TransitionUniverse};
pub use kernel::{Change, Due, RunStats, UniverseCore};
pub use linear::LinearUniverse;
pub use observer::{NoopObserver, RunObserver};
pub use report::RunReport;
pub use scenario::{AgentFactory, Scenario, ScenarioConfig};
pub use tick::TickUniverse;
pub use universe::{TransitionCapable, Universe};
pub use user_objects::UserObjects;
