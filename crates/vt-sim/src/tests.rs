//! Integration tests for vt-sim.

#[cfg(test)]
mod helpers {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use vt_agent::{Agent, AgentHooks, Behavior, BehaviorResult, SimContext};
    use vt_core::{AgentId, SimTime, StateId};

    pub type Hits = Rc<Cell<u32>>;
    pub type Log<T> = Rc<RefCell<Vec<T>>>;

    /// Runs every `period`.
    pub struct Ticker {
        pub period: f64,
        pub hits:   Hits,
    }

    impl Behavior for Ticker {
        fn next_time(&self, now: SimTime) -> SimTime {
            now + self.period
        }

        fn perform(&mut self, _ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            self.hits.set(self.hits.get() + 1);
            Ok(())
        }
    }

    pub fn ticker(name: &str, period: f64) -> (Agent, Hits) {
        let hits = Hits::default();
        let mut agent = Agent::new(name);
        agent.add_behavior(Ticker { period, hits: hits.clone() });
        (agent, hits)
    }

    /// Always answers the time held in `at`.
    pub struct AtTime {
        pub at:   Rc<Cell<f64>>,
        pub hits: Hits,
    }

    impl Behavior for AtTime {
        fn next_time(&self, _now: SimTime) -> SimTime {
            SimTime(self.at.get())
        }

        fn perform(&mut self, _ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            self.hits.set(self.hits.get() + 1);
            Ok(())
        }
    }

    /// Appends its label to a shared log every `period`.
    pub struct Labelled {
        pub label:  &'static str,
        pub period: f64,
        pub log:    Log<&'static str>,
    }

    impl Behavior for Labelled {
        fn next_time(&self, now: SimTime) -> SimTime {
            now + self.period
        }

        fn perform(&mut self, _ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            self.log.borrow_mut().push(self.label);
            Ok(())
        }
    }

    /// Requests each named state in turn during a single perform.
    pub struct Request {
        pub targets: Vec<&'static str>,
        pub swallow: bool,
    }

    impl Behavior for Request {
        fn next_time(&self, now: SimTime) -> SimTime {
            now + 1.0
        }

        fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            for name in &self.targets {
                let state = ctx.state_named(name).expect("state exists");
                let result = ctx.request_next_state(state);
                if !self.swallow {
                    result?;
                }
            }
            Ok(())
        }
    }

    /// Records `other`'s state, then requests its own agent's `target` state.
    pub struct Peek {
        pub other:  AgentId,
        pub target: &'static str,
        pub seen:   Log<Option<StateId>>,
    }

    impl Behavior for Peek {
        fn next_time(&self, now: SimTime) -> SimTime {
            now + 1.0
        }

        fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            self.seen.borrow_mut().push(ctx.state_of(self.other));
            let target = ctx.state_named(self.target).expect("state exists");
            ctx.request_next_state(target)
        }
    }

    /// Records every state change.
    pub struct Changes(pub Log<(StateId, StateId)>);

    impl AgentHooks for Changes {
        fn on_state_changed(
            &mut self,
            _ctx: &mut SimContext<'_>,
            old: StateId,
            new: StateId,
        ) -> BehaviorResult<()> {
            self.0.borrow_mut().push((old, new));
            Ok(())
        }
    }
}

// ── Termination and time advance ──────────────────────────────────────────────

#[cfg(test)]
mod termination {
    use vt_core::{SimTime, TimeWindow};

    use super::helpers::ticker;
    use crate::{EventUniverse, LinearUniverse, TickUniverse, TransitionUniverse, Universe};

    fn window() -> TimeWindow {
        TimeWindow::new(0.0, 100.0).unwrap()
    }

    fn populate(u: &mut dyn Universe) {
        u.reset_simulation(window()).unwrap();
        for name in ["a", "b", "c"] {
            u.add_agent(ticker(name, 10.0).0).unwrap();
        }
    }

    #[test]
    fn linear_runs_to_window_end() {
        let mut u = LinearUniverse::default();
        populate(&mut u);
        u.run().unwrap();
        assert!(u.is_done());
        assert_eq!(u.stats().behaviors_performed, 30);
        assert_eq!(u.now(), SimTime(100.0));
    }

    #[test]
    fn boundary_step_leaves_clock_alone() {
        let mut u = LinearUniverse::default();
        populate(&mut u);
        for _ in 0..10 {
            u.step().unwrap();
        }
        assert!(!u.is_done());
        assert_eq!(u.now(), SimTime(100.0));
        assert_eq!(u.stats().step_behaviors, 3);

        u.step().unwrap();
        assert!(u.is_done());
        assert_eq!(u.now(), SimTime(100.0), "next due time 110 is past the window");
        assert_eq!(u.stats().step_behaviors, 0);
        assert_eq!(u.stats().steps, 11);
    }

    #[test]
    fn every_policy_performs_the_same_count() {
        let mut universes: Vec<Box<dyn Universe>> = vec![
            Box::new(LinearUniverse::default()),
            Box::new(EventUniverse::default()),
            Box::new(TransitionUniverse::default()),
            Box::new(TickUniverse::default()),
        ];
        for u in &mut universes {
            populate(u.as_mut());
            u.run().unwrap();
            assert_eq!(u.stats().behaviors_performed, 30, "{}", u.policy_name());
            assert_eq!(u.now(), SimTime(100.0), "{}", u.policy_name());
        }
    }

    #[test]
    fn far_future_due_times_end_at_the_boundary() {
        let mut universes: Vec<Box<dyn Universe>> = vec![
            Box::new(LinearUniverse::default()),
            Box::new(EventUniverse::default()),
            Box::new(TickUniverse::default()),
        ];
        for u in &mut universes {
            u.reset_simulation(TimeWindow::new(0.0, 10.0).unwrap()).unwrap();
            let (near, near_hits) = ticker("near", 1.0);
            let (far, far_hits) = ticker("far", 1e20);
            u.add_agent(near).unwrap();
            u.add_agent(far).unwrap();

            u.run().unwrap();
            assert!(u.is_done(), "{}", u.policy_name());
            assert_eq!(near_hits.get(), 10, "{}", u.policy_name());
            assert_eq!(far_hits.get(), 0, "{}", u.policy_name());
            assert_eq!(u.now(), SimTime(10.0), "{}", u.policy_name());
        }
    }

    #[test]
    fn tick_universe_stops_when_only_unreachable_entries_remain() {
        let mut u = TickUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, f64::INFINITY).unwrap()).unwrap();
        let (far, hits) = ticker("far", 1e30);
        u.add_agent(far).unwrap();

        u.run().unwrap();
        assert!(u.is_done());
        assert_eq!(hits.get(), 0);
        assert_eq!(u.queued(), 1);
    }

    #[test]
    fn empty_universe_is_done_after_one_step() {
        let mut u = EventUniverse::default();
        u.reset_simulation(window()).unwrap();
        u.step().unwrap();
        assert!(u.is_done());
        assert_eq!(u.now(), SimTime(0.0));
    }

    #[test]
    fn step_to_stops_at_time() {
        let mut u = TransitionUniverse::default();
        populate(&mut u);
        u.step_to(SimTime(35.0)).unwrap();
        assert_eq!(u.now(), SimTime(40.0), "the step that crosses 35 still runs");
        assert_eq!(u.stats().behaviors_performed, 12);
        assert!(!u.is_done());
    }

    #[test]
    fn stopped_universe_does_not_run() {
        let mut u = LinearUniverse::default();
        populate(&mut u);
        u.set_stopped(true);
        u.run().unwrap();
        assert_eq!(u.stats().steps, 0);
        u.set_stopped(false);
        u.run().unwrap();
        assert_eq!(u.stats().behaviors_performed, 30);
    }

    #[test]
    fn reset_evicts_agents_in_registration_order() {
        let mut u = LinearUniverse::default();
        populate(&mut u);
        u.run().unwrap();
        let evicted = u.reset_simulation(window()).unwrap();
        let names: Vec<&str> = evicted.iter().map(|a| a.name()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(evicted.iter().all(|a| a.record().id().is_none()));
        assert_eq!(u.census(), 0);
        assert_eq!(u.stats().behaviors_performed, 0);
        assert!(!u.is_done());
    }

    #[test]
    fn reset_rejects_invalid_window() {
        let mut u = LinearUniverse::default();
        let bad = TimeWindow { start: SimTime(5.0), end: SimTime(1.0) };
        assert!(u.reset_simulation(bad).is_err());
    }
}

// ── Enable / disable ──────────────────────────────────────────────────────────

#[cfg(test)]
mod enabling {
    use std::cell::Cell;
    use std::rc::Rc;

    use vt_agent::{Agent, Behavior, BehaviorResult, SimContext};
    use vt_core::{AgentId, BehaviorId, SimTime, TimeWindow};

    use super::helpers::{AtTime, Hits, Ticker};
    use crate::{EventUniverse, LinearUniverse, SimError, TickUniverse, Universe};

    /// Disables slot 0 of its own agent at a fixed time.
    struct Disable {
        at: f64,
    }

    impl Behavior for Disable {
        fn next_time(&self, _now: SimTime) -> SimTime {
            SimTime(self.at)
        }

        fn perform(&mut self, ctx: &mut SimContext<'_>) -> BehaviorResult<()> {
            let target = ctx.behavior(0);
            ctx.set_enabled(target, false)
        }
    }

    #[test]
    fn no_progress_disables_then_reenable_resumes() {
        let at   = Rc::new(Cell::new(5.0));
        let hits = Hits::default();
        let mut agent = Agent::new("once");
        agent.add_behavior(AtTime { at: at.clone(), hits: hits.clone() });

        let mut u = LinearUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 100.0).unwrap()).unwrap();
        let id = u.add_agent(agent).unwrap();
        let behavior = BehaviorId::new(id, 0);

        u.step().unwrap();
        assert_eq!(hits.get(), 1);
        assert_eq!(u.now(), SimTime(5.0));
        assert!(!u.agent(id).unwrap().slot(0).unwrap().is_enabled());

        at.set(8.0);
        u.set_behavior_enabled(behavior, true).unwrap();
        u.step().unwrap();
        assert_eq!(hits.get(), 2);
        assert_eq!(u.now(), SimTime(8.0));

        u.step().unwrap();
        assert!(u.is_done());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn toggle_takes_effect_after_the_step() {
        let hits = Hits::default();
        let mut agent = Agent::new("a");
        agent.add_behavior(Ticker { period: 3.0, hits: hits.clone() });
        agent.add_behavior(Disable { at: 2.0 });

        let mut u = TickUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 10.0).unwrap()).unwrap();
        u.add_agent(agent).unwrap();
        u.step_to(SimTime(2.0)).unwrap();
        assert_eq!(u.queued(), 0, "disabled behavior was moved out of its tick");

        u.run().unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(u.now(), SimTime(2.0));
    }

    #[test]
    fn stale_heap_entries_are_skipped() {
        let hits = Hits::default();
        let mut agent = Agent::new("a");
        agent.add_behavior(Ticker { period: 3.0, hits: hits.clone() });
        agent.add_behavior(Disable { at: 2.0 });

        let mut u = EventUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 10.0).unwrap()).unwrap();
        u.add_agent(agent).unwrap();
        u.run().unwrap();
        assert_eq!(hits.get(), 0);
        assert_eq!(u.now(), SimTime(2.0));
        assert_eq!(u.stats().behaviors_performed, 1);
    }

    #[test]
    fn unknown_behavior_is_an_error() {
        let mut u = LinearUniverse::default();
        let err = u.set_behavior_enabled(BehaviorId::new(AgentId(9), 0), false).unwrap_err();
        assert!(matches!(err, SimError::UnknownBehavior(_)));
        assert!(u.behavior_changed(BehaviorId::new(AgentId(9), 0)).is_err());
    }
}

// ── Intra-tick order ──────────────────────────────────────────────────────────

#[cfg(test)]
mod ordering {
    use vt_agent::Agent;
    use vt_core::TimeWindow;

    use super::helpers::{Labelled, Log};
    use crate::{TickUniverse, Universe};

    #[test]
    fn ordered_behaviors_run_first_by_order() {
        let log = Log::default();
        let mut a = Agent::new("a");
        a.add_behavior(Labelled { label: "free", period: 1.0, log: log.clone() });
        a.add_ordered_behavior(Labelled { label: "second", period: 1.0, log: log.clone() }, 2);
        a.add_ordered_behavior(Labelled { label: "first", period: 1.0, log: log.clone() }, 1);
        let mut b = Agent::new("b");
        b.add_ordered_behavior(Labelled { label: "zeroth", period: 1.0, log: log.clone() }, 0);

        let mut u = TickUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 2.0).unwrap()).unwrap();
        u.add_agent(a).unwrap();
        u.add_agent(b).unwrap();
        u.run().unwrap();

        let expected = ["zeroth", "first", "second", "free"];
        let log = log.borrow();
        assert_eq!(log.len(), 8);
        assert_eq!(&log[..4], expected);
        assert_eq!(&log[4..], expected);
    }

    #[test]
    fn fractional_times_round_up_to_the_next_tick() {
        let log = Log::default();
        let mut a = Agent::new("a");
        a.add_behavior(Labelled { label: "x", period: 0.4, log: log.clone() });

        let mut u = TickUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 3.0).unwrap()).unwrap();
        u.add_agent(a).unwrap();
        u.run().unwrap();
        // 0.4 → tick 1; 1.4 → tick 2; 2.4 → tick 3.
        assert_eq!(log.borrow().len(), 3);
    }
}

// ── State transitions ─────────────────────────────────────────────────────────

#[cfg(test)]
mod transitions {
    use vt_agent::{Agent, StateTime};
    use vt_core::{AgentId, SimTime, StateId, TimeWindow};

    use super::helpers::{Changes, Log, Peek, Request, ticker};
    use crate::{
        EventUniverse, LinearUniverse, SimError, TickUniverse, TransitionUniverse, Universe,
    };

    fn flipper(targets: Vec<&'static str>, swallow: bool, changes: &Log<(StateId, StateId)>) -> Agent {
        let mut a = Agent::new("flipper").with_hooks(Changes(changes.clone()));
        a.add_state("a");
        a.add_state("b");
        a.add_state("c");
        a.add_behavior(Request { targets, swallow });
        a
    }

    #[test]
    fn repeated_requests_collapse_into_one_change() {
        let changes = Log::default();
        let mut u = TransitionUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 1.0).unwrap()).unwrap();
        let id = u.add_agent(flipper(vec!["b", "c"], false, &changes)).unwrap();
        u.step().unwrap();

        assert_eq!(*changes.borrow(), [(StateId::UNDEFINED, StateId(2))]);
        assert_eq!(u.agent(id).unwrap().current_state(), StateId(2));
        assert_eq!(u.stats().state_transitions, 1);
    }

    #[test]
    fn transitions_apply_after_every_behavior_ran() {
        let seen = Log::default();
        let mut u = LinearUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 1.0).unwrap()).unwrap();
        for (name, other) in [("x", AgentId(1)), ("y", AgentId(0))] {
            let mut a = Agent::new(name);
            a.add_state("off");
            a.add_state("on");
            a.add_behavior(Peek { other, target: "on", seen: seen.clone() });
            u.add_agent(a).unwrap();
        }
        u.step().unwrap();

        assert_eq!(*seen.borrow(), [Some(StateId::UNDEFINED), Some(StateId::UNDEFINED)]);
        assert_eq!(u.agent(AgentId(0)).unwrap().current_state(), StateId(1));
        assert_eq!(u.agent(AgentId(1)).unwrap().current_state(), StateId(1));
        assert_eq!(u.stats().state_transitions, 2);
    }

    #[test]
    fn event_universe_rejects_transitions() {
        let changes = Log::default();
        let mut u = EventUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 5.0).unwrap()).unwrap();
        u.add_agent(flipper(vec!["b"], false, &changes)).unwrap();
        let err = u.run().unwrap_err();
        assert!(matches!(err, SimError::UnsupportedTransition { .. }));
        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn swallowed_rejection_is_still_fatal() {
        let changes = Log::default();
        let mut u = EventUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 5.0).unwrap()).unwrap();
        u.add_agent(flipper(vec!["b"], true, &changes)).unwrap();
        let err = u.run().unwrap_err();
        assert!(matches!(err, SimError::UnsupportedTransition { .. }));
    }

    #[test]
    fn outside_request_needs_support() {
        let mut u = EventUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 5.0).unwrap()).unwrap();
        let id = u.add_agent(ticker("t", 1.0).0).unwrap();
        let err = u.request_next_state(id, StateId(0)).unwrap_err();
        assert!(matches!(err, SimError::UnsupportedTransition { .. }));
    }

    #[test]
    fn outside_request_is_flushed_by_the_next_step() {
        let changes = Log::default();
        let mut u = TransitionUniverse::default();
        u.reset_simulation(TimeWindow::new(0.0, 5.0).unwrap()).unwrap();
        let id = u.add_agent(flipper(vec![], false, &changes)).unwrap();
        u.step().unwrap();
        u.request_next_state(id, StateId(1)).unwrap();
        assert!(matches!(
            u.request_next_state(id, StateId(7)),
            Err(SimError::UnknownState { .. })
        ));
        u.step().unwrap();
        assert_eq!(u.agent(id).unwrap().current_state(), StateId(1));
        assert_eq!(*changes.borrow(), [(StateId::UNDEFINED, StateId(1))]);
    }

    fn seeded(changes: &Log<(StateId, StateId)>, at: f64) -> Agent {
        let (mut a, _) = ticker("seeded", 10.0);
        a = a.with_hooks(Changes(changes.clone()));
        a.add_state("healthy");
        let sick = a.add_state("sick");
        assert!(a.set_initial_state(StateTime::new(sick, at)));
        a
    }

    #[test]
    fn seeds_are_applied_and_rewind_the_clock() {
        let changes = Log::default();
        let mut u = TransitionUniverse::default();
        u.reset_simulation(TimeWindow::new(10.0, 100.0).unwrap()).unwrap();
        let id = u.add_agent(seeded(&changes, 5.0)).unwrap();
        u.step().unwrap();

        assert_eq!(u.agent(id).unwrap().current_state(), StateId(1));
        assert_eq!(*changes.borrow(), [(StateId::UNDEFINED, StateId(1))]);
        assert_eq!(u.stats().state_transitions, 1);
        assert_eq!(u.now(), SimTime(15.0), "behaviors scheduled from the seed time");
    }

    #[test]
    fn tick_seeds_do_not_move_the_clock() {
        let changes = Log::default();
        let mut u = TickUniverse::default();
        u.reset_simulation(TimeWindow::new(10.0, 100.0).unwrap()).unwrap();
        let id = u.add_agent(seeded(&changes, 5.0)).unwrap();
        u.step().unwrap();

        assert_eq!(u.agent(id).unwrap().current_state(), StateId(1));
        assert_eq!(u.now(), SimTime(10.0));
        assert_eq!(u.stats().state_transitions, 1);
    }

    #[test]
    fn event_universe_applies_seeds() {
        let changes = Log::default();
        let mut u = EventUniverse::default();
        u.reset_simulation(TimeWindow::new(10.0, 100.0).unwrap()).unwrap();
        let id = u.add_agent(seeded(&changes, 5.0)).unwrap();
        u.step().unwrap();

        assert_eq!(u.agent(id).unwrap().current_state(), StateId(1));
        assert_eq!(*changes.borrow(), [(StateId::UNDEFINED, StateId(1))]);
        assert_eq!(u.stats().state_transitions, 1);
        assert_eq!(u.now(), SimTime(15.0));
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod registration {
    use vt_agent::Agent;
    use vt_core::AgentId;

    use super::helpers::ticker;
    use crate::{LinearUniverse, SimError, Universe};

    #[test]
    fn ids_follow_registration_order() {
        let mut u = LinearUniverse::default();
        assert_eq!(u.add_agent(ticker("a", 1.0).0).unwrap(), AgentId(0));
        assert_eq!(u.add_agent(ticker("b", 1.0).0).unwrap(), AgentId(1));
        assert_eq!(u.census(), 2);
        assert_eq!(u.agent(AgentId(1)).unwrap().name(), "b");
    }

    #[test]
    fn registered_agent_is_rejected() {
        let (agent, _) = ticker("twice", 1.0);
        let (mut record, logic) = agent.into_parts();
        record.register(AgentId(3)).unwrap();
        let agent = Agent::from_parts(record, logic);

        let mut u = LinearUniverse::default();
        let err = u.add_agent(agent).unwrap_err();
        assert!(matches!(err, SimError::AgentAlreadyRegistered { ref name } if name == "twice"));
        assert_eq!(u.census(), 0);
    }
}

// ── Scenario driver ───────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario {
    use std::ops::ControlFlow;

    use vt_agent::Agent;
    use vt_core::{AgentId, SimTime};

    use super::helpers::ticker;
    use crate::{
        AgentFactory, LinearUniverse, NoopObserver, RunObserver, RunReport, ScenarioBuilder,
        SimError, SimResult, TickUniverse, Universe, UserObjects,
    };

    fn add_one(u: &mut dyn Universe) -> SimResult<()> {
        u.add_agent(ticker("made", 10.0).0)?;
        Ok(())
    }

    #[test]
    fn rerun_reproduces_the_same_counts() {
        let (direct, hits) = ticker("direct", 10.0);
        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 100.0)
            .universe(LinearUniverse::default())
            .agent(direct)
            .factory(add_one)
            .build()
            .unwrap();

        let first = scenario.execute(&mut NoopObserver).unwrap();
        assert_eq!(first.behaviors_performed, 20);
        assert_eq!(first.census, 2);
        assert!(first.done);
        assert_eq!(hits.get(), 10);

        let second = scenario.execute(&mut NoopObserver).unwrap();
        assert_eq!(second.behaviors_performed, 20);
        assert_eq!(second.census, 2, "factory agents from the first run were dropped");
        assert_eq!(hits.get(), 20, "the direct agent was reused");
        assert_eq!(scenario.direct_agent_count(), 1);
    }

    struct StopAfter {
        steps:   u32,
        started: bool,
        ended:   Option<RunReport>,
    }

    impl RunObserver for StopAfter {
        fn on_run_start(&mut self, now: SimTime, census: usize) {
            assert_eq!(now, SimTime(0.0));
            assert_eq!(census, 1);
            self.started = true;
        }

        fn on_step_end(&mut self, _now: SimTime, _step_behaviors: u64) -> ControlFlow<()> {
            self.steps += 1;
            if self.steps == 3 { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
        }

        fn on_run_end(&mut self, report: &RunReport) {
            self.ended = Some(report.clone());
        }
    }

    #[test]
    fn observer_can_stop_and_resume() {
        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 10.0)
            .universe(TickUniverse::default())
            .agent(ticker("t", 1.0).0)
            .build()
            .unwrap();

        let mut observer = StopAfter { steps: 0, started: false, ended: None };
        let paused = scenario.execute(&mut observer).unwrap();
        assert!(observer.started);
        assert!(paused.stopped && !paused.done);
        assert_eq!(paused.steps, 3);
        assert_eq!(observer.ended.as_ref(), Some(&paused));

        let finished = scenario.resume(&mut NoopObserver).unwrap();
        assert!(finished.done);
        assert_eq!(finished.behaviors_performed, 10);
        assert_eq!(finished.end, SimTime(10.0));
    }

    #[test]
    fn factory_failure_aborts_the_run() {
        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 10.0)
            .universe(LinearUniverse::default())
            .factory(|_: &mut dyn Universe| -> SimResult<()> { Err(SimError::Config("boom".into())) })
            .build()
            .unwrap();

        let err = scenario.execute(&mut NoopObserver).unwrap_err();
        let SimError::RunAborted(inner) = err else { panic!("expected RunAborted") };
        assert!(matches!(*inner, SimError::Factory { .. }));
    }

    #[test]
    fn registered_direct_agent_stays_with_the_scenario() {
        let (agent, _) = ticker("elsewhere", 1.0);
        let (mut record, logic) = agent.into_parts();
        record.register(AgentId(7)).unwrap();
        let registered = Agent::from_parts(record, logic);

        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 10.0)
            .universe(LinearUniverse::default())
            .agent(ticker("fine", 1.0).0)
            .agent(registered)
            .build()
            .unwrap();

        let err = scenario.execute(&mut NoopObserver).unwrap_err();
        let SimError::RunAborted(inner) = err else { panic!("expected RunAborted") };
        assert!(matches!(*inner, SimError::AgentAlreadyRegistered { ref name } if name == "elsewhere"));
        assert_eq!(scenario.direct_agent_count(), 2);
        assert_eq!(scenario.universe().census(), 0);
    }

    /// Adds as many agents as the `crowd` user object asks for.
    struct Crowd;

    impl AgentFactory for Crowd {
        fn populate(&mut self, _universe: &mut dyn Universe) -> SimResult<()> {
            Err(SimError::Config("crowd needs user objects".into()))
        }

        fn populate_with(&mut self, universe: &mut dyn Universe, objects: &UserObjects) -> SimResult<()> {
            let size = objects
                .get::<usize>("crowd")
                .ok_or_else(|| SimError::Config("no crowd size".into()))?;
            for i in 0..*size {
                universe.add_agent(ticker(&format!("walker-{i}"), 5.0).0)?;
            }
            Ok(())
        }
    }

    #[test]
    fn factories_read_user_objects() {
        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 10.0)
            .universe(LinearUniverse::default())
            .user_object("crowd", 3usize)
            .factory(Crowd)
            .build()
            .unwrap();

        let report = scenario.execute(&mut NoopObserver).unwrap();
        assert_eq!(report.census, 3);
        assert_eq!(report.behaviors_performed, 6);

        scenario.set_user_object("crowd", 5usize);
        assert_eq!(scenario.user_object::<usize>("crowd"), Some(&5));
        let report = scenario.execute(&mut NoopObserver).unwrap();
        assert_eq!(report.census, 5);
    }

    #[test]
    fn user_objects_are_typed() {
        let mut objects = UserObjects::new();
        objects.insert("rate", 0.25f64);
        objects.insert("label", String::from("north"));
        assert_eq!(objects.len(), 2);
        assert_eq!(objects.get::<f64>("rate"), Some(&0.25));
        assert_eq!(objects.get::<f32>("rate"), None);
        assert!(objects.contains("label"));

        objects.get_mut::<String>("label").unwrap().push_str("-east");
        assert_eq!(objects.remove::<String>("label").as_deref(), Some("north-east"));
        assert!(!objects.contains("label"));
        assert_eq!(objects.remove::<u8>("rate"), None);
        assert!(objects.is_empty());
    }

    #[test]
    fn builder_requires_a_universe() {
        let err = ScenarioBuilder::new().window(0.0, 1.0).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn builder_rejects_invalid_window() {
        let err = ScenarioBuilder::new()
            .window(5.0, 1.0)
            .universe(LinearUniverse::default())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Core(_)));
    }

    #[test]
    fn set_factory_replaces_existing_factories() {
        let mut scenario = ScenarioBuilder::new()
            .window(0.0, 10.0)
            .universe(LinearUniverse::default())
            .factory(add_one)
            .factory(add_one)
            .build()
            .unwrap();
        scenario.set_factory(add_one);
        let report = scenario.execute(&mut NoopObserver).unwrap();
        assert_eq!(report.census, 1);
        assert_eq!(report.behaviors_performed, 1);
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use vt_core::TimeWindow;

    use super::helpers::ticker;
    use crate::{EventUniverse, LinearUniverse, TickUniverse, Universe};

    fn populate(u: &mut dyn Universe, periods: &[u8], end: u32) {
        u.reset_simulation(TimeWindow::new(0.0, end as f64).unwrap()).unwrap();
        for (i, &p) in periods.iter().enumerate() {
            u.add_agent(ticker(&format!("agent-{i}"), p as f64).0).unwrap();
        }
    }

    proptest! {
        /// Integer periods land on exact ticks, so every policy performs
        /// floor(end / period) runs per agent.  The clock never goes back
        /// and never leaves the window.
        #[test]
        fn policies_agree_and_time_is_monotonic(
            periods in prop::collection::vec(1u8..20, 1..8),
            end in 0u32..200,
        ) {
            let expected: u64 = periods.iter().map(|&p| (end / p as u32) as u64).sum();
            let mut universes: Vec<Box<dyn Universe>> = vec![
                Box::new(LinearUniverse::default()),
                Box::new(EventUniverse::default()),
                Box::new(TickUniverse::default()),
            ];
            for u in &mut universes {
                populate(u.as_mut(), &periods, end);
                let mut last = u.now();
                while !u.is_done() {
                    u.step().unwrap();
                    prop_assert!(u.now() >= last);
                    prop_assert!(u.now() >= u.window().start && u.now() <= u.window().end);
                    last = u.now();
                }
                prop_assert_eq!(u.stats().behaviors_performed, expected, "{}", u.policy_name());
            }
        }
    }
}
