//! # Validation Tier Tests (T0-T3)
//!
//! If ANY tier fails, the memory is INVALID.
//!
//! ## Tiers
//! - T0: Bag Integrity
//! - T1: Concept Firing
//! - T2: Concept Lifecycle
//! - T3: Cycle Determinism

use bagmind_core::{
    Budget, Concept, DeriveContext, Derivation, Event, LevelBag, MindError, Op, Premise,
    PriorityBag, Punctuation, ReasonerConfig, TaskId, TaskInput, TaskLink, TermId, TermSpec,
};
use std::cell::RefCell;
use std::rc::Rc;

fn link(key: u64, priority: f32) -> TaskLink {
    TaskLink::new(TaskId(key), Budget::new(priority, 0.5, 0.5))
}

fn micro() -> ReasonerConfig {
    ReasonerConfig {
        worker_threads: 0,
        ..ReasonerConfig::micro()
    }
}

// =============================================================================
// TIER T0: BAG INTEGRITY
// =============================================================================

mod t0_bag_integrity {
    use super::*;

    /// T0.1: Overflow evicts the lowest entry of the lowest bucket.
    #[test]
    fn overflow_evicts_lowest() {
        let mut bag = LevelBag::new(4, 3, 1).expect("bag");
        assert!(bag.put(link(1, 0.9)).is_none()); // A
        assert!(bag.put(link(2, 0.5)).is_none()); // B
        assert!(bag.put(link(3, 0.2)).is_none()); // C

        let evicted = bag.put(link(4, 0.7)).expect("overflow"); // D
        assert_eq!(evicted.task, TaskId(3));
        assert_eq!(bag.size(), 3);
        for kept in [1, 2, 4] {
            assert!(bag.contains(&TaskId(kept)));
        }
    }

    /// T0.2: An entry too weak to stay evicts itself.
    #[test]
    fn weak_insert_evicts_itself() {
        let mut bag = LevelBag::new(4, 2, 1).expect("bag");
        bag.put(link(1, 0.9));
        bag.put(link(2, 0.8));
        let evicted = bag.put(link(3, 0.05)).expect("overflow");
        assert_eq!(evicted.task, TaskId(3));
        assert_eq!(bag.size(), 2);
    }

    /// T0.3: Empty bags answer with nothing and never panic.
    #[test]
    fn empty_bag_is_quiet() {
        let mut bag: LevelBag<TaskLink> = LevelBag::new(4, 2, 1).expect("bag");
        assert!(bag.take_next().is_none());
        assert!(bag.peek_next().is_none());
        assert!(bag.take(&TaskId(1)).is_none());
        assert!(bag.process_next(|_| {}).is_none());
        assert_eq!(bag.mass(), 0.0);
        assert_eq!(bag.average_priority(), 0.0);
    }

    /// T0.4: Zero capacity is a configuration error.
    #[test]
    fn zero_capacity_rejected() {
        let result: Result<LevelBag<TaskLink>, _> = LevelBag::new(4, 0, 1);
        assert!(matches!(result, Err(MindError::Config(_))));
    }

    /// T0.5: Sampling favours high priority.
    #[test]
    fn sampling_prefers_priority() {
        let mut bag = LevelBag::new(10, 8, 42).expect("bag");
        bag.put(link(1, 0.95));
        bag.put(link(2, 0.05));
        let mut high = 0;
        for _ in 0..400 {
            let e = bag.take_next().expect("entry");
            if e.task == TaskId(1) {
                high += 1;
            }
            bag.put(e);
        }
        assert!(high > 300, "high-priority entry drawn {high} of 400 times");
    }
}

// =============================================================================
// TIER T1: CONCEPT FIRING
// =============================================================================

mod t1_concept_firing {
    use super::*;
    use bagmind_core::{LinkKind, Reasoner, TermLink};
    use std::cell::Cell;

    fn concept(config: &ReasonerConfig, priority: f32) -> Concept {
        Concept::new(TermId(0), Budget::new(priority, 0.9, 0.9), config, 3).expect("concept")
    }

    /// T1.1: A full-priority concept fires the maximum number of task-links.
    #[test]
    fn full_priority_fires_max() {
        let config = ReasonerConfig {
            min_task_links_fired: 1,
            max_task_links_fired: 4,
            ..micro()
        };
        let mut c = concept(&config, 1.0);
        for i in 0..5 {
            c.link_task(link(i, 0.5));
        }
        c.link_term(TermLink::new(
            TermId(1),
            LinkKind::Component,
            Budget::new(0.5, 0.5, 0.5),
        ));
        let report = c.fire(&c.plan(&config, 0), |_, _| {});
        assert_eq!(report.task_links_fired, 4);
    }

    /// T1.2: A zero-priority concept fires the minimum.
    #[test]
    fn zero_priority_fires_min() {
        let config = ReasonerConfig {
            min_task_links_fired: 1,
            max_task_links_fired: 4,
            ..micro()
        };
        let mut c = concept(&config, 0.0);
        for i in 0..5 {
            c.link_task(link(i, 0.5));
        }
        let report = c.fire(&c.plan(&config, 0), |_, _| {});
        assert_eq!(report.task_links_fired, 1);
    }

    /// T1.3: A concept with no task-links makes no deriver call.
    #[test]
    fn no_task_links_no_premises() {
        let config = micro();
        let mut c = concept(&config, 1.0);
        c.link_term(TermLink::new(
            TermId(1),
            LinkKind::Compound,
            Budget::new(0.5, 0.5, 0.5),
        ));
        let mut calls = 0;
        let report = c.fire(&c.plan(&config, 0), |_, _| calls += 1);
        assert_eq!(calls, 0);
        assert_eq!(report.task_links_fired, 0);
    }

    /// T1.4: In a running memory, a concept with no task-links is drawn
    /// without a deriver call and without any concept event.
    #[test]
    fn no_task_links_no_concept_events() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let deriver =
            move |_: &Premise, _: &DeriveContext<'_>| -> Result<Vec<Derivation>, MindError> {
                counter.set(counter.get() + 1);
                Ok(Vec::new())
            };
        let mut r = Reasoner::new(micro(), deriver).expect("reasoner");

        let lone = r.intern(&TermSpec::atom("lone")).expect("intern");
        let other = r.intern(&TermSpec::atom("other")).expect("intern");
        let mut c = Concept::new(lone, Budget::new(1.0, 0.9, 0.9), r.config(), 3).expect("concept");
        c.link_term(TermLink::new(
            other,
            LinkKind::Component,
            Budget::new(0.5, 0.5, 0.5),
        ));
        r.adopt(c).expect("adopt");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        r.subscribe(move |e: &Event| sink.borrow_mut().push(e.clone()));

        let report = r.run(3).expect("run");
        assert_eq!(calls.get(), 0);
        assert_eq!(report.concepts_fired, 0);
        assert_eq!(report.task_links_fired, 0);
        assert_eq!(report.premises, 0);

        let log = seen.borrow();
        assert_eq!(log.len(), 6, "only cycle brackets expected: {log:?}");
        assert!(log.iter().all(|e| e.concept().is_none()));
        assert!(r.concepts().contains(lone));
    }
}

// =============================================================================
// TIER T2: CONCEPT LIFECYCLE
// =============================================================================

mod t2_concept_lifecycle {
    use super::*;
    use bagmind_core::Reasoner;

    fn quiet(_: &Premise, _: &DeriveContext<'_>) -> Result<Vec<Derivation>, MindError> {
        Ok(Vec::new())
    }

    fn atom(name: &str, p: f32) -> TaskInput {
        TaskInput::new(TermSpec::atom(name), Punctuation::Judgment)
            .with_budget(Budget::new(p, 0.9, 0.9))
    }

    /// T2.1: A full store displaces its weakest concept into the cache,
    /// and a later activation remembers it.
    #[test]
    fn displace_then_remember() {
        let config = ReasonerConfig {
            concept_capacity: 2,
            concept_levels: 4,
            subconcept_capacity: 4,
            ..micro()
        };
        let mut r = Reasoner::new(config, quiet).expect("reasoner");
        let names = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&names);
        r.subscribe(move |e: &Event| {
            if e.concept().is_some() {
                sink.borrow_mut().push(e.to_string());
            }
        });

        r.accept(atom("a", 0.1)).expect("a");
        r.accept(atom("b", 0.9)).expect("b");
        r.accept(atom("c", 0.8)).expect("c");
        let a = TermId(0);
        assert!(r.concepts().is_cached(a));
        assert!(!r.concepts().contains(a));

        r.accept(atom("a", 0.95)).expect("a again");
        assert!(r.concepts().contains(a));
        let log = names.borrow();
        assert!(log.contains(&"ConceptForget t0: Displaced".to_string()));
        assert!(log.contains(&"ConceptRemember t0".to_string()));
    }

    /// T2.2: Without a cache, displaced concepts release their tasks.
    #[test]
    fn discard_releases_tasks() {
        let config = ReasonerConfig {
            concept_capacity: 1,
            subconcept_capacity: 0,
            ..micro()
        };
        let mut r = Reasoner::new(config, quiet).expect("reasoner");
        let first = r.accept(atom("a", 0.1)).expect("a").id();
        assert!(r.tasks().contains(first));
        r.accept(atom("b", 0.9)).expect("b");
        assert!(!r.tasks().contains(first));
        assert_eq!(r.concepts().len(), 1);
    }

    /// T2.3: Question and goal indices follow the tables.
    #[test]
    fn question_and_goal_indices() {
        let mut r = Reasoner::new(micro(), quiet).expect("reasoner");
        r.accept(TaskInput::new(TermSpec::atom("q"), Punctuation::Question))
            .expect("question");
        r.accept(TaskInput::new(TermSpec::atom("g"), Punctuation::Goal))
            .expect("goal");
        r.accept(TaskInput::new(TermSpec::atom("j"), Punctuation::Judgment))
            .expect("judgment");
        assert_eq!(r.concepts().question_concepts().len(), 1);
        assert_eq!(r.concepts().goal_concepts().len(), 1);
        assert!(r.concepts().question_concepts().contains(&TermId(0)));
        assert!(r.concepts().goal_concepts().contains(&TermId(1)));
    }
}

// =============================================================================
// TIER T3: CYCLE DETERMINISM
// =============================================================================

mod t3_cycle_determinism {
    use super::*;
    use bagmind_core::{Reasoner, Term, TermArena};

    /// `(--> a m)` with a term-link to `(--> m b)` gives `(--> a b)`.
    fn deduce(
        premise: &Premise,
        ctx: &DeriveContext<'_>,
    ) -> Result<Vec<Derivation>, MindError> {
        let task = ctx.task(premise.task())?;
        let Some((a, m)) = inheritance(ctx.terms, task.term) else {
            return Ok(Vec::new());
        };
        let Some((m2, b)) = inheritance(ctx.terms, premise.term_link.target()) else {
            return Ok(Vec::new());
        };
        if m != m2 || a == b {
            return Ok(Vec::new());
        }
        let spec = |id: TermId| ctx.terms.to_spec(id).ok_or(MindError::UnknownTerm(id));
        Ok(vec![TaskInput::new(
            TermSpec::inheritance(spec(a)?, spec(b)?),
            Punctuation::Judgment,
        )])
    }

    fn inheritance(terms: &TermArena, id: TermId) -> Option<(TermId, TermId)> {
        match terms.get(id)? {
            Term::Compound(Op::Inheritance, args) => Some((args[0], args[1])),
            _ => None,
        }
    }

    fn statement(s: &str, p: &str) -> TaskInput {
        TaskInput::new(
            TermSpec::inheritance(TermSpec::atom(s), TermSpec::atom(p)),
            Punctuation::Judgment,
        )
    }

    fn busy() -> ReasonerConfig {
        ReasonerConfig {
            concepts_fired_per_cycle: 5,
            max_task_links_fired: 4,
            max_term_links_fired: 4,
            ..micro()
        }
    }

    fn run_recorded(seed: u64, cycles: u64) -> (Vec<Event>, Reasoner) {
        let config = ReasonerConfig {
            random_seed: seed,
            ..busy()
        };
        let mut r = Reasoner::new(config, deduce).expect("reasoner");
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        r.subscribe(move |e: &Event| sink.borrow_mut().push(e.clone()));
        r.accept(statement("a", "m")).expect("a-m");
        r.accept(statement("m", "b")).expect("m-b");
        r.run(cycles).expect("run");
        let events = log.borrow().clone();
        (events, r)
    }

    /// T3.1: Same seed and same inputs give the same event stream.
    #[test]
    fn same_seed_same_events() {
        let (first, _) = run_recorded(17, 40);
        let (second, _) = run_recorded(17, 40);
        assert!(!first.is_empty());
        assert_eq!(first, second);
    }

    /// T3.2: Derived tasks re-enter through ingestion with their parent.
    #[test]
    fn derivations_reenter() {
        let (events, r) = run_recorded(5, 100);
        let derived: Vec<TaskId> = events
            .iter()
            .filter_map(|e| match e {
                Event::TaskAdd {
                    task,
                    reason: Some(reason),
                } if reason == "Derived" => Some(*task),
                _ => None,
            })
            .collect();
        assert!(!derived.is_empty(), "nothing was derived");

        let conclusion = derived
            .iter()
            .filter_map(|id| r.tasks().get(*id))
            .find(|task| r.terms().render(task.term) == "(--> a b)")
            .expect("(--> a b) derived");
        assert!(conclusion.parent.is_some());
    }

    /// T3.3: Cycles are bracketed and the clock advances by one each.
    #[test]
    fn cycles_are_bracketed() {
        let (events, r) = run_recorded(1, 3);
        let starts = events
            .iter()
            .filter(|e| matches!(e, Event::CycleStart { .. }))
            .count();
        let ends = events
            .iter()
            .filter(|e| matches!(e, Event::CycleEnd { .. }))
            .count();
        assert_eq!((starts, ends), (3, 3));
        assert_eq!(r.time(), 3);
        assert!(matches!(events.last(), Some(Event::CycleEnd { time: 2 })));
    }

    /// T3.4: Inputs sent from another thread arrive at cycle start.
    #[test]
    fn threaded_producers() {
        let mut r = Reasoner::new(micro(), deduce).expect("reasoner");
        let handle = r.handle();
        std::thread::spawn(move || {
            handle.send(statement("x", "y")).expect("send");
        })
        .join()
        .expect("join");
        assert_eq!(r.pending(), 1);
        let report = r.cycle().expect("cycle");
        assert_eq!(report.accepted, 1);
        assert_eq!(r.pending(), 0);
    }
}
