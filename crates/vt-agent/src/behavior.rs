//! The `Behavior` trait — the main extension point for user code.

use vt_core::SimTime;

use crate::{BehaviorResult, SimContext};

/// A schedulable activity of an agent.
///
/// A behavior answers two questions: *when should I run next?*
/// ([`next_time`][Self::next_time]) and *what do I do when I run?*
/// ([`perform`][Self::perform]).  Enabled/scheduled bookkeeping lives in the
/// owning agent's [`BehaviorSlot`][crate::BehaviorSlot], not in the behavior,
/// so implementations only hold their own application state.
///
/// # Caller obligations
///
/// `next_time` must be a pure function of `now` and the behavior's own state:
/// a universe may evaluate it more than once for the same `now`.  Returning a
/// time `<= now` (or a non-finite time) disables the behavior.
///
/// # Example
///
/// ```rust,ignore
/// struct Tick10 { count: u32 }
///
/// impl Behavior for Tick10 {
///     fn next_time(&self, now: SimTime) -> SimTime { now + 10.0 }
///
///     fn perform(&mut self, _ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
///         self.count += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Behavior: 'static {
    /// The next time at which this behavior wants to run, given `now`.
    fn next_time(&self, now: SimTime) -> SimTime;

    /// Run the behavior.
    ///
    /// `ctx` exposes the current time, the agent graph and the universe's
    /// mutation requests (state transitions, enabling/disabling behaviors).
    /// An `Err` aborts the run.
    fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()>;

    /// Clear per-run state.  Called once when the owning agent is onboarded,
    /// before the first scheduling pass.
    ///
    /// Default: nothing to clear.
    fn reset(&mut self) {}

    /// Human-readable label used in log output.
    fn label(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
