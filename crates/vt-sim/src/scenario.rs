//! The run driver: populate a universe, run it, report.

use std::ops::ControlFlow;
use std::time::Instant;

use tracing::{debug, error, info};
use vt_agent::Agent;
use vt_core::{CoreResult, TimeWindow};

use crate::{RunObserver, RunReport, SimError, SimResult, Universe, UserObjects};

// ── AgentFactory ──────────────────────────────────────────────────────────────

/// A collaborator that populates a universe with agents.
///
/// Called once per run, after the scenario's direct agents were added.  A
/// factory may add a different population on every call.
///
/// Any `FnMut(&mut dyn Universe) -> SimResult<()>` closure is a factory.
pub trait AgentFactory {
    fn populate(&mut self, universe: &mut dyn Universe) -> SimResult<()>;

    /// Populate with read access to the scenario's user objects.  The
    /// scenario always calls this; the default ignores the objects.
    fn populate_with(&mut self, universe: &mut dyn Universe, _objects: &UserObjects) -> SimResult<()> {
        self.populate(universe)
    }

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

impl<F> AgentFactory for F
where
    F: FnMut(&mut dyn Universe) -> SimResult<()>,
{
    fn populate(&mut self, universe: &mut dyn Universe) -> SimResult<()> {
        self(universe)
    }
}

// ── ScenarioConfig ────────────────────────────────────────────────────────────

/// The recognized scenario options.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioConfig {
    pub start_time: f64,
    pub end_time:   f64,
}

impl ScenarioConfig {
    pub fn new(start_time: f64, end_time: f64) -> Self {
        Self { start_time, end_time }
    }

    pub fn window(&self) -> CoreResult<TimeWindow> {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self { start_time: 0.0, end_time: 0.0 }
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

/// Wires a population into a universe and drives it to completion.
///
/// Direct agents are added first, in registration order, then every factory
/// in order.  Direct agents are moved into the universe for the run and
/// reclaimed from it at the next [`execute`][Self::execute], so the same
/// scenario can be executed repeatedly.
///
/// Create via [`ScenarioBuilder`][crate::ScenarioBuilder].
pub struct Scenario {
    pub(crate) config:    ScenarioConfig,
    pub(crate) universe:  Box<dyn Universe>,
    pub(crate) agents:    Vec<Agent>,
    pub(crate) factories: Vec<Box<dyn AgentFactory>>,
    pub(crate) objects:   UserObjects,
    /// Direct agents currently inside the universe (they hold ids `0..lent`).
    pub(crate) lent:      usize,
}

impl Scenario {
    pub fn config(&self) -> &ScenarioConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ScenarioConfig) {
        self.config = config;
    }

    pub fn universe(&self) -> &dyn Universe {
        self.universe.as_ref()
    }

    pub fn universe_mut(&mut self) -> &mut dyn Universe {
        self.universe.as_mut()
    }

    /// Add a direct agent for subsequent runs.
    pub fn add_agent(&mut self, agent: Agent) {
        self.agents.push(agent);
    }

    /// Direct agents held by the scenario or lent to the universe.
    pub fn direct_agent_count(&self) -> usize {
        self.agents.len() + self.lent
    }

    pub fn add_factory(&mut self, factory: impl AgentFactory + 'static) {
        self.factories.push(Box::new(factory));
    }

    /// Replace all factories with `factory`.
    pub fn set_factory(&mut self, factory: impl AgentFactory + 'static) {
        self.factories.clear();
        self.add_factory(factory);
    }

    /// Store a named value for factories to read while populating.
    pub fn set_user_object<T: 'static>(&mut self, name: impl Into<String>, value: T) {
        self.objects.insert(name, value);
    }

    pub fn user_object<T: 'static>(&self, name: &str) -> Option<&T> {
        self.objects.get(name)
    }

    pub fn user_objects(&self) -> &UserObjects {
        &self.objects
    }

    pub fn user_objects_mut(&mut self) -> &mut UserObjects {
        &mut self.objects
    }

    /// Reset the universe, populate it and run it until it stops or is done.
    ///
    /// Any failure aborts the run: it is logged and returned as
    /// [`SimError::RunAborted`].  The next call starts from a clean reset.
    pub fn execute(&mut self, observer: &mut dyn RunObserver) -> SimResult<RunReport> {
        self.try_execute(observer).map_err(abort)
    }

    /// Continue a run that an observer (or `set_stopped`) stopped.
    pub fn resume(&mut self, observer: &mut dyn RunObserver) -> SimResult<RunReport> {
        self.universe.set_stopped(false);
        info!(now = %self.universe.now(), "simulation run resumed");
        self.drive(observer).map_err(abort)
    }

    fn try_execute(&mut self, observer: &mut dyn RunObserver) -> SimResult<RunReport> {
        let window  = self.config.window()?;
        let evicted = self.universe.reset_simulation(window)?;
        self.reclaim(evicted);
        info!(
            now = %self.universe.now(),
            policy = self.universe.policy_name(),
            "simulation run started"
        );

        self.populate()?;
        observer.on_run_start(self.universe.now(), self.universe.census());
        self.drive(observer)
    }

    /// Take back the direct agents lent to the universe for the previous run.
    fn reclaim(&mut self, evicted: Vec<Agent>) {
        if self.lent == 0 {
            return;
        }
        let mut direct: Vec<Agent> = evicted.into_iter().take(self.lent).collect();
        direct.append(&mut self.agents);
        self.agents = direct;
        self.lent   = 0;
    }

    fn populate(&mut self) -> SimResult<()> {
        debug!(factories = self.factories.len(), "populating universe");

        let before = self.universe.census();
        // A direct agent already registered elsewhere stays with the scenario.
        if let Some(taken) = self.agents.iter().find(|a| a.record().id().is_some()) {
            return Err(SimError::AgentAlreadyRegistered { name: taken.name().to_owned() });
        }
        let mut direct = std::mem::take(&mut self.agents).into_iter();
        for agent in direct.by_ref() {
            if let Err(e) = self.universe.add_agent(agent) {
                self.agents.extend(direct);
                return Err(e);
            }
            self.lent += 1;
        }
        debug!(before, after = self.universe.census(), "added direct agents");

        for factory in &mut self.factories {
            let before = self.universe.census();
            let populated = factory.populate_with(self.universe.as_mut(), &self.objects);
            populated.map_err(|e| SimError::Factory {
                factory: factory.name().to_owned(),
                source:  Box::new(e),
            })?;
            debug!(
                factory = factory.name(),
                before,
                after = self.universe.census(),
                "factory populated universe"
            );
        }
        debug!(census = self.universe.census(), "population complete");
        Ok(())
    }

    fn drive(&mut self, observer: &mut dyn RunObserver) -> SimResult<RunReport> {
        let wall = Instant::now();
        let universe = self.universe.as_mut();
        while !universe.is_stopped() && !universe.is_done() {
            universe.step()?;
            let flow = observer.on_step_end(universe.now(), universe.stats().step_behaviors);
            if let ControlFlow::Break(()) = flow {
                universe.set_stopped(true);
            }
        }
        let report = RunReport::capture(universe, wall.elapsed());
        log_report(&report);
        observer.on_run_end(&report);
        Ok(report)
    }
}

fn abort(e: SimError) -> SimError {
    error!(error = %e, "simulation exiting with error");
    SimError::RunAborted(Box::new(e))
}

fn log_report(report: &RunReport) {
    info!(now = %report.end, stopped = report.stopped, "simulation run ended");
    info!(census = report.census, "after run, universe contains agents");
    info!(
        behaviors = report.behaviors_performed,
        transitions = report.state_transitions,
        steps = report.steps,
        "performed behaviors"
    );
    info!(
        virtual_elapsed = report.virtual_elapsed(),
        wall_ms = report.wall.as_millis() as u64,
        "elapsed time"
    );
    if let (Some(rate), Some(percent)) = (report.behavior_rate_per_ms(), report.virtual_wall_percent()) {
        info!(behaviors_per_ms = rate, virtual_wall_percent = percent, "simulation rate");
    }
}
