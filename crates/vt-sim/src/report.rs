//! `RunReport` — what a scenario run did.

use std::time::Duration;

use vt_core::SimTime;

use crate::Universe;

/// Counters and timings of one run, captured when it stops or finishes.
#[derive(Clone, Debug, PartialEq)]
pub struct RunReport {
    pub policy:              &'static str,
    pub start:               SimTime,
    pub end:                 SimTime,
    pub census:              usize,
    pub behaviors_performed: u64,
    pub state_transitions:   u64,
    pub steps:               u64,
    pub wall:                Duration,
    pub done:                bool,
    pub stopped:             bool,
}

impl RunReport {
    pub fn capture(universe: &dyn Universe, wall: Duration) -> Self {
        let stats = universe.stats();
        Self {
            policy: universe.policy_name(),
            start: universe.window().start,
            end: universe.now(),
            census: universe.census(),
            behaviors_performed: stats.behaviors_performed,
            state_transitions: stats.state_transitions,
            steps: stats.steps,
            wall,
            done: universe.is_done(),
            stopped: universe.is_stopped(),
        }
    }

    /// Virtual time covered by the run.
    pub fn virtual_elapsed(&self) -> f64 {
        self.end - self.start
    }

    /// Behaviors performed per wall-clock millisecond.  `None` if the run
    /// took less than a millisecond.
    pub fn behavior_rate_per_ms(&self) -> Option<f64> {
        let ms = self.wall.as_millis();
        (ms > 0).then(|| self.behaviors_performed as f64 / ms as f64)
    }

    /// Virtual time as a percentage of wall time (virtual units read as
    /// seconds).  `None` if the run took less than a millisecond.
    pub fn virtual_wall_percent(&self) -> Option<f64> {
        let ms = self.wall.as_millis();
        (ms > 0).then(|| 100.0 * 1000.0 * self.virtual_elapsed() / ms as f64)
    }
}
