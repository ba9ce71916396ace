//! stepping — a small fixed-tick run showing intra-tick ordering and
//! deferred state transitions.
//!
//! Three households step through a daily routine on a one-unit tick.  Each
//! runs five ordered phases per day plus one unordered errand, and moves
//! between `home`, `out` and `asleep` through transitions that only take
//! effect once the whole tick has run.
//!
//! Run with `RUST_LOG=debug` for per-step output.

use std::ops::ControlFlow;

use anyhow::Result;
use tracing::info;

use vt_agent::{Agent, AgentHooks, AgentSetup, Behavior, BehaviorResult, SimContext, StateTime};
use vt_core::{SimRng, SimTime, StateId};
use vt_sim::{
    AgentFactory, RunObserver, RunReport, ScenarioBuilder, SimError, SimResult, TickUniverse,
    Universe, UserObjects,
};

// ── Constants ─────────────────────────────────────────────────────────────────

const HOUSEHOLDS: usize = 3;
const SEED:       u64   = 42;
const DAY:        f64   = 24.0;
const DAYS:       f64   = 3.0;

/// `(phase, offset into the day, state requested when it runs)`.
const PHASES: [(&str, f64, Option<&str>); 5] = [
    ("wake",  7.0,  Some("home")),
    ("leave", 8.0,  Some("out")),
    ("lunch", 12.0, None),
    ("back",  17.0, Some("home")),
    ("sleep", 22.0, Some("asleep")),
];

// ── Behaviors ─────────────────────────────────────────────────────────────────

/// One daily phase: runs at `offset` every day.
struct Phase {
    name:   &'static str,
    offset: f64,
    target: Option<&'static str>,
}

impl Behavior for Phase {
    fn next_time(&self, now: SimTime) -> SimTime {
        let day = (now.as_f64() / DAY).floor();
        let today = day * DAY + self.offset;
        if today > now.as_f64() { SimTime(today) } else { SimTime(today + DAY) }
    }

    fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
        if let Some(target) = self.target.and_then(|t| ctx.state_named(t)) {
            ctx.request_next_state(target)?;
        }
        Ok(())
    }

    fn label(&self) -> &str {
        self.name
    }
}

/// Runs on a jittered interval while the household is out.
struct Errand {
    mean: f64,
    done: u32,
}

impl Behavior for Errand {
    fn next_time(&self, now: SimTime) -> SimTime {
        now + self.mean
    }

    fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
        let out = ctx.state_named("out");
        if Some(ctx.current_state()) == out && ctx.rng().gen_bool(0.5) {
            self.done += 1;
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.done = 0;
    }
}

// ── Hooks ─────────────────────────────────────────────────────────────────────

struct Household;

impl AgentHooks for Household {
    fn on_reset(&mut self, setup: &mut AgentSetup<'_>) {
        if let Some(asleep) = setup.state_named("asleep") {
            setup.set_initial_state(StateTime::new(asleep, 0.0));
        }
    }

    fn on_state_changed(
        &mut self,
        ctx: &mut SimContext<'_>,
        old: StateId,
        new: StateId,
    ) -> BehaviorResult<()> {
        let me = ctx.me();
        tracing::debug!(
            agent = me.name(),
            from = me.state_name(old),
            to = me.state_name(new),
            now = %ctx.now(),
            "state changed"
        );
        Ok(())
    }
}

fn household(i: usize) -> Agent {
    let mut agent = Agent::new(format!("household-{i}")).with_hooks(Household);
    for state in ["home", "out", "asleep"] {
        agent.add_state(state);
    }
    for (order, &(name, offset, target)) in PHASES.iter().enumerate() {
        agent.add_ordered_behavior(Phase { name, offset, target }, order as i32 + 1);
    }
    agent.add_behavior(Errand { mean: 3.0 + i as f64, done: 0 });
    agent
}

/// Adds the number of households named by the `households` user object.
struct Households;

impl AgentFactory for Households {
    fn populate(&mut self, universe: &mut dyn Universe) -> SimResult<()> {
        self.populate_with(universe, &UserObjects::new())
    }

    fn populate_with(&mut self, universe: &mut dyn Universe, objects: &UserObjects) -> SimResult<()> {
        let count = objects
            .get::<usize>("households")
            .ok_or_else(|| SimError::Config("missing `households` user object".into()))?;
        for i in 0..*count {
            universe.add_agent(household(i))?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "households"
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    busiest: (u64, SimTime),
}

impl RunObserver for Progress {
    fn on_run_start(&mut self, now: SimTime, census: usize) {
        info!(%now, census, "households ready");
    }

    fn on_step_end(&mut self, now: SimTime, step_behaviors: u64) -> ControlFlow<()> {
        if step_behaviors > self.busiest.0 {
            self.busiest = (step_behaviors, now);
        }
        ControlFlow::Continue(())
    }

    fn on_run_end(&mut self, report: &RunReport) {
        info!(
            behaviors = report.behaviors_performed,
            transitions = report.state_transitions,
            busiest_tick = %self.busiest.1,
            busiest_count = self.busiest.0,
            "routine finished"
        );
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut scenario = ScenarioBuilder::new()
        .window(0.0, DAYS * DAY)
        .universe(TickUniverse::new(SimRng::new(SEED)))
        .user_object("households", HOUSEHOLDS)
        .factory(Households)
        .build()?;

    let report = scenario.execute(&mut Progress::default())?;

    for i in 0..scenario.universe().census() {
        let id = vt_core::AgentId(i as u32);
        if let Some(record) = scenario.universe().agent(id) {
            info!(
                agent = record.name(),
                state = record.state_name(record.current_state()),
                "final state"
            );
        }
    }
    info!(
        policy = report.policy,
        steps = report.steps,
        wall_ms = report.wall.as_millis() as u64,
        "done"
    );
    Ok(())
}
