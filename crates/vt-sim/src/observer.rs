//! Run observer trait for progress reporting and run control.

use std::ops::ControlFlow;

use vt_core::SimTime;

use crate::RunReport;

/// Callbacks invoked by [`Scenario::execute`][crate::Scenario::execute] at
/// key points of a run.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.  An observer is never required for a run
/// to be correct.
///
/// # Example — stop after a time budget
///
/// ```rust,ignore
/// struct StopAt(SimTime);
///
/// impl RunObserver for StopAt {
///     fn on_step_end(&mut self, now: SimTime, _ran: u64) -> ControlFlow<()> {
///         if now >= self.0 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
///     }
/// }
/// ```
pub trait RunObserver {
    /// Called once the universe is populated, before the first step.
    fn on_run_start(&mut self, _now: SimTime, _census: usize) {}

    /// Called after every step.
    ///
    /// `step_behaviors` is the number of behaviors the step performed.
    /// Returning `Break` stops the universe; the run can be continued with
    /// [`Scenario::resume`][crate::Scenario::resume].
    fn on_step_end(&mut self, _now: SimTime, _step_behaviors: u64) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    /// Called once after the run stops or finishes.
    fn on_run_end(&mut self, _report: &RunReport) {}
}

/// A [`RunObserver`] that does nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}
