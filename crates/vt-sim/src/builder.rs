//! Fluent builder for constructing a [`Scenario`].

use vt_agent::Agent;

use crate::{AgentFactory, Scenario, ScenarioConfig, SimError, SimResult, Universe, UserObjects};

/// Fluent builder for [`Scenario`].
///
/// # Required inputs
///
/// - a universe, via [`.universe(u)`][Self::universe]
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                      |
/// |-----------------------|------------------------------|
/// | `.window(start, end)` | `[0, 0]`                     |
/// | `.config(c)`          | `ScenarioConfig::default()`  |
/// | `.agent(a)`           | no direct agents             |
/// | `.factory(f)`         | no factories                 |
/// | `.user_object(n, v)`  | no user objects              |
///
/// # Example
///
/// ```rust,ignore
/// let mut scenario = ScenarioBuilder::new()
///     .window(0.0, 100.0)
///     .universe(TickUniverse::default())
///     .agent(walker)
///     .factory(|u: &mut dyn Universe| { u.add_agent(make_crowd())?; Ok(()) })
///     .build()?;
/// let report = scenario.execute(&mut NoopObserver)?;
/// ```
#[derive(Default)]
pub struct ScenarioBuilder {
    config:    ScenarioConfig,
    universe:  Option<Box<dyn Universe>>,
    agents:    Vec<Agent>,
    factories: Vec<Box<dyn AgentFactory>>,
    objects:   UserObjects,
}

impl ScenarioBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: ScenarioConfig) -> Self {
        self.config = config;
        self
    }

    /// Shorthand for `.config(ScenarioConfig::new(start, end))`.
    pub fn window(mut self, start_time: f64, end_time: f64) -> Self {
        self.config = ScenarioConfig::new(start_time, end_time);
        self
    }

    pub fn universe(mut self, universe: impl Universe + 'static) -> Self {
        self.universe = Some(Box::new(universe));
        self
    }

    /// Add a direct agent.  Direct agents are registered before any factory
    /// runs, in the order they were added here.
    pub fn agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn agents(mut self, agents: impl IntoIterator<Item = Agent>) -> Self {
        self.agents.extend(agents);
        self
    }

    pub fn factory(mut self, factory: impl AgentFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    /// Store a named value that factories can read while populating.
    pub fn user_object<T: 'static>(mut self, name: impl Into<String>, value: T) -> Self {
        self.objects.insert(name, value);
        self
    }

    /// Validate inputs and return a ready-to-execute [`Scenario`].
    pub fn build(self) -> SimResult<Scenario> {
        let universe = self
            .universe
            .ok_or_else(|| SimError::Config("scenario has no universe".into()))?;
        self.config.window()?;

        Ok(Scenario {
            config:    self.config,
            universe,
            agents:    self.agents,
            factories: self.factories,
            objects:   self.objects,
            lent:      0,
        })
    }
}
