//! # Reasoner
//!
//! The cycle controller: owner of every arena, the concept store, the
//! event bus, the input queue and the worker pool.
//!
//! One cycle:
//! 1. `CycleStart`; ingest tasks derived last cycle, then up to
//!    `inputsPerCycle` queued inputs
//! 2. draw `conceptsFiredPerCycle` concepts by priority
//! 3. fire each, forget it, put it back
//! 4. run the deferred actions queued before this step
//! 5. `CycleEnd`; the clock advances one tick
//!
//! Nothing here blocks. Derivers run inline; background work goes to the
//! worker pool and comes back only as queued input.

use crate::bag::{Item, PriorityBag};
use crate::budget::{self, Budget};
use crate::concept::{Admission, Concept};
use crate::config::ReasonerConfig;
use crate::derive::{DeriveContext, Derivation, Deriver, Premise};
use crate::event::{Event, EventBus, Subscription};
use crate::ingestor::{Ingestor, Rejection, TaskOutcome};
use crate::input::{Inbox, InputHandle};
use crate::link::{LinkKind, TaskLink, TermLink};
use crate::store::{self, ConceptStore, FORGOTTEN};
use crate::task::{Task, TaskArena, TaskInput};
use crate::term::{TermArena, TermSpec};
use crate::worker::WorkerPool;
use crate::{MindError, Punctuation, TaskId, TermId};
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, trace, warn};

/// Reason attached to a table entry pushed out by a newer one.
pub const TABLE_OVERFLOW: &str = "Table overflow";

/// Follow-up work run at the end of a cycle.
pub type Action = Box<dyn FnOnce(&mut Reasoner)>;

// =============================================================================
// REPORTS
// =============================================================================

/// Counters for one or more cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CycleReport {
    pub cycles: u64,
    pub accepted: usize,
    pub rejected: usize,
    pub concepts_fired: usize,
    pub task_links_fired: usize,
    pub premises: usize,
    pub derived: usize,
    pub errors: usize,
    pub actions: usize,
}

impl CycleReport {
    fn absorb(&mut self, other: &CycleReport) {
        self.cycles += other.cycles;
        self.accepted += other.accepted;
        self.rejected += other.rejected;
        self.concepts_fired += other.concepts_fired;
        self.task_links_fired += other.task_links_fired;
        self.premises += other.premises;
        self.derived += other.derived;
        self.errors += other.errors;
        self.actions += other.actions;
    }

    fn count(&mut self, outcome: &TaskOutcome) {
        if outcome.is_accepted() {
            self.accepted += 1;
        } else {
            self.rejected += 1;
        }
    }
}

// =============================================================================
// REASONER
// =============================================================================

/// The memory and its cycle loop.
pub struct Reasoner {
    config: ReasonerConfig,
    // Declared before `inbox` so workers are joined while the queue is open.
    pool: Option<WorkerPool>,
    inbox: Inbox,
    terms: TermArena,
    tasks: TaskArena,
    store: ConceptStore,
    events: EventBus,
    derived: VecDeque<Derivation>,
    deferred: VecDeque<Action>,
    deriver: Box<dyn Deriver>,
    time: u64,
}

impl fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reasoner")
            .field("time", &self.time)
            .field("concepts", &self.store.len())
            .field("tasks", &self.tasks.len())
            .field("terms", &self.terms.len())
            .field("pending", &self.inbox.pending())
            .field("derived", &self.derived.len())
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl Reasoner {
    /// Build a reasoner. The configuration is validated first; the worker
    /// pool starts when `workerThreads > 0`.
    pub fn new<D>(config: ReasonerConfig, deriver: D) -> Result<Self, MindError>
    where
        D: Deriver + 'static,
    {
        config.validate()?;
        let store = ConceptStore::new(&config)?;
        let inbox = Inbox::new();
        let pool = if config.worker_threads > 0 {
            Some(WorkerPool::start(config.worker_threads, &inbox.handle())?)
        } else {
            None
        };
        Ok(Self {
            config,
            pool,
            inbox,
            terms: TermArena::new(),
            tasks: TaskArena::new(),
            store,
            events: EventBus::new(),
            derived: VecDeque::new(),
            deferred: VecDeque::new(),
            deriver: Box::new(deriver),
            time: 0,
        })
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    #[must_use]
    pub fn time(&self) -> u64 {
        self.time
    }

    #[must_use]
    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    #[must_use]
    pub fn terms(&self) -> &TermArena {
        &self.terms
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskArena {
        &self.tasks
    }

    #[must_use]
    pub fn concepts(&self) -> &ConceptStore {
        &self.store
    }

    #[must_use]
    pub fn concept(&self, term: TermId) -> Option<&Concept> {
        self.store.get(term)
    }

    /// Inputs waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inbox.pending()
    }

    /// Live concepts ordered by priority, highest first; ties by term.
    #[must_use]
    pub fn top_concepts(&self, n: usize) -> Vec<(TermId, f32)> {
        let mut all: Vec<(TermId, f32)> = self
            .store
            .concepts()
            .iter()
            .map(|c| (c.term(), c.priority()))
            .collect();
        all.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        all.truncate(n);
        all
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    /// Register an event handler.
    pub fn subscribe<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&Event) + 'static,
    {
        self.events.subscribe(handler)
    }

    // =========================================================================
    // INPUT
    // =========================================================================

    /// A producer handle for the input queue.
    #[must_use]
    pub fn handle(&self) -> InputHandle {
        self.inbox.handle()
    }

    /// Queue an input for a later cycle.
    pub fn enqueue(&self, input: TaskInput) -> Result<(), MindError> {
        self.inbox.handle().send(input)
    }

    /// Intern a term without creating a concept for it.
    pub fn intern(&mut self, spec: &TermSpec) -> Result<TermId, MindError> {
        self.terms.intern(spec)
    }

    /// Put a concept built outside the reasoner into the store.
    ///
    /// Its term must already be interned. A concept already live for the
    /// term absorbs the budget only; overflow displaces as usual.
    pub fn adopt(&mut self, concept: Concept) -> Result<(), MindError> {
        let term = concept.term();
        if self.terms.get(term).is_none() {
            return Err(MindError::UnknownTerm(term));
        }
        self.store.restore(concept, &mut self.tasks, &mut self.events);
        Ok(())
    }

    /// Ingest a task now.
    ///
    /// Rejected tasks are reported through the outcome and a `TaskRemove`
    /// event; only failures of the memory itself are errors.
    pub fn accept(&mut self, input: TaskInput) -> Result<TaskOutcome, MindError> {
        let id = self.tasks.next_id();
        let origin = match input.parent {
            Some(parent) => format!("Derived from {parent}"),
            None => "Input".to_string(),
        };
        let budget = input.effective_budget(self.time);

        let term = match Ingestor::validate(&mut self.terms, &input, &budget, &self.config) {
            Ok(term) => term,
            Err(reason) => return Ok(self.reject(id, reason, origin)),
        };

        self.tasks.insert(Task {
            id,
            term,
            punctuation: input.punctuation,
            budget,
            parent: input.parent,
            created: self.time,
            history: vec![origin],
        });
        let added = if input.parent.is_some() {
            "Derived"
        } else {
            "Input"
        };
        self.events.emit(Event::TaskAdd {
            task: id,
            reason: Some(added.to_string()),
        });

        self.link(id, term, input.punctuation, budget)?;

        if self.tasks.refs(id) == 0 && self.tasks.discard_unreferenced(id).is_some() {
            self.events.emit(Event::TaskRemove {
                task: id,
                reason: FORGOTTEN.to_string(),
            });
        }
        Ok(TaskOutcome::Accepted(id))
    }

    fn reject(&mut self, id: TaskId, reason: Rejection, origin: String) -> TaskOutcome {
        let text = reason.to_string();
        debug!(task = %id, reason = %text, "task rejected");
        self.events.emit(Event::TaskRemove {
            task: id,
            reason: text.clone(),
        });
        TaskOutcome::Rejected {
            id,
            reason,
            history: vec![origin, format!("Rejected: {text}")],
        }
    }

    /// Attach an accepted task to its concept and to the concepts of its
    /// components.
    fn link(
        &mut self,
        id: TaskId,
        term: TermId,
        punctuation: Punctuation,
        budget: Budget,
    ) -> Result<(), MindError> {
        let Self {
            config,
            terms,
            tasks,
            store,
            events,
            ..
        } = self;

        let Some(host) = store.conceptualize(terms, term, &budget, true, tasks, events)? else {
            return Ok(());
        };
        let limit = table_limit(config, punctuation);
        store.with_concept(host, tasks, events, |concept, tasks, events| {
            attach(concept, TaskLink::new(id, budget), tasks, events);
            admit(concept, id, punctuation, limit, tasks, events);
        });

        let mut parts: Vec<TermId> = Vec::new();
        for &part in terms.components(term) {
            if terms.is_conceptualizable(part) && !parts.contains(&part) {
                parts.push(part);
            }
        }
        if parts.is_empty() {
            return Ok(());
        }

        let share = budget::distribute(&budget, parts.len());
        for part in parts {
            let Some(part) = store.conceptualize(terms, part, &share, true, tasks, events)? else {
                continue;
            };
            store.with_concept(part, tasks, events, |concept, tasks, events| {
                attach(concept, TaskLink::new(id, share), tasks, events);
                concept.link_term(TermLink::new(term, LinkKind::Compound, share));
            });
            store.with_concept(term, tasks, events, |concept, _, _| {
                concept.link_term(TermLink::new(part, LinkKind::Component, share));
            });
        }
        Ok(())
    }

    // =========================================================================
    // CYCLE
    // =========================================================================

    /// Run one cycle.
    pub fn cycle(&mut self) -> Result<CycleReport, MindError> {
        let mut report = CycleReport {
            cycles: 1,
            ..CycleReport::default()
        };
        trace!(time = self.time, "cycle start");
        self.events.emit(Event::CycleStart { time: self.time });

        // Ingestion: last cycle's derivations are not rate limited.
        let derived: Vec<Derivation> = self.derived.drain(..).collect();
        for input in derived {
            let outcome = self.accept(input)?;
            report.count(&outcome);
        }
        for input in self.inbox.drain(self.config.inputs_per_cycle) {
            let outcome = self.accept(input)?;
            report.count(&outcome);
        }

        for _ in 0..self.config.concepts_fired_per_cycle {
            let Some(concept) = self.store.take_next() else {
                break;
            };
            self.fire(concept, &mut report)?;
        }

        let batch: Vec<Action> = self.deferred.drain(..).collect();
        report.actions = batch.len();
        for action in batch {
            action(self);
        }

        self.events.emit(Event::CycleEnd { time: self.time });
        trace!(time = self.time, "cycle end");
        self.time += 1;
        Ok(report)
    }

    /// Run `cycles` cycles and add up their reports.
    pub fn run(&mut self, cycles: u64) -> Result<CycleReport, MindError> {
        let mut total = CycleReport::default();
        for _ in 0..cycles {
            total.absorb(&self.cycle()?);
        }
        Ok(total)
    }

    /// Fire a concept taken from the store, then forget and restore it.
    fn fire(&mut self, mut concept: Concept, report: &mut CycleReport) -> Result<(), MindError> {
        let term = concept.term();
        let plan = concept.plan(&self.config, self.time);
        let escalate = self.config.escalate_derivation_errors;

        let mut derivations: Vec<Derivation> = Vec::new();
        let mut failures: Vec<MindError> = Vec::new();
        let ctx = DeriveContext {
            terms: &self.terms,
            tasks: &self.tasks,
            time: self.time,
        };
        let deriver = &mut self.deriver;

        let fired = concept.fire(&plan, |task_link, term_link| {
            if escalate && !failures.is_empty() {
                return;
            }
            if !ctx.tasks.contains(task_link.task) {
                return;
            }
            let premise = Premise {
                concept: term,
                task_link: *task_link,
                term_link: *term_link,
            };
            match deriver.derive(&premise, &ctx) {
                Ok(out) => derivations.extend(out.into_iter().map(|d| match d.parent {
                    Some(_) => d,
                    None => d.with_parent(premise.task()),
                })),
                Err(e) => failures.push(e),
            }
        });

        if fired.task_links_fired > 0 {
            report.concepts_fired += 1;
            self.events.emit(Event::ConceptFire { term });
        }
        report.task_links_fired += fired.task_links_fired;
        report.premises += fired.premises;
        report.derived += derivations.len();
        self.derived.extend(derivations);

        let forget_cycles = self.config.forget_cycles(self.config.forget_durations.concept);
        budget::forget(
            concept.budget_mut(),
            self.time,
            forget_cycles,
            self.config.forget_quality_relative,
        );
        self.store.restore(concept, &mut self.tasks, &mut self.events);

        for failure in failures {
            if escalate {
                return Err(match failure {
                    MindError::Derivation(reason) => MindError::Derivation(reason),
                    other => MindError::Derivation(other.to_string()),
                });
            }
            report.errors += 1;
            warn!(concept = %term, error = %failure, "derivation failed");
            self.events.emit(Event::Error {
                reason: failure.to_string(),
            });
        }
        Ok(())
    }

    // =========================================================================
    // FOLLOW-UP WORK
    // =========================================================================

    /// Queue an action for the end of the current (or next) cycle.
    ///
    /// Actions queued while deferred actions run wait for the next cycle.
    pub fn defer<F>(&mut self, action: F)
    where
        F: FnOnce(&mut Reasoner) + 'static,
    {
        self.deferred.push_back(Box::new(action));
    }

    /// Hand a job to the worker pool. Without a pool the job runs here,
    /// immediately.
    pub fn later<F>(&self, job: F) -> Result<(), MindError>
    where
        F: FnOnce(&InputHandle) + Send + 'static,
    {
        match &self.pool {
            Some(pool) => pool.submit(job),
            None => {
                job(&self.inbox.handle());
                Ok(())
            }
        }
    }

    /// Stop the worker pool, waiting for queued jobs. Idempotent.
    pub fn shutdown(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            pool.shutdown();
        }
    }
}

// =============================================================================
// LINKING HELPERS
// =============================================================================

fn table_limit(config: &ReasonerConfig, punctuation: Punctuation) -> usize {
    match punctuation {
        Punctuation::Judgment => config.concept_beliefs_max,
        Punctuation::Question | Punctuation::Quest => config.concept_questions_max,
        Punctuation::Goal => config.concept_goals_max,
    }
}

/// Put a task-link into a concept, taking a reference for a new link and
/// releasing the task of any link pushed out.
fn attach(concept: &mut Concept, link: TaskLink, tasks: &mut TaskArena, events: &mut EventBus) {
    let fresh = !concept.task_links().contains(&link.task);
    if fresh && !tasks.retain(link.task) {
        return;
    }
    if let Some(out) = concept.link_task(link) {
        store::release_task(out.task, FORGOTTEN, tasks, events);
    }
}

/// Enter a task into the concept's table for its punctuation.
fn admit(
    concept: &mut Concept,
    id: TaskId,
    punctuation: Punctuation,
    limit: usize,
    tasks: &mut TaskArena,
    events: &mut EventBus,
) {
    if !tasks.contains(id) {
        return;
    }
    if let Admission::Added { displaced } = concept.admit(id, punctuation, limit) {
        tasks.retain(id);
        if let Some(old) = displaced {
            if let Some(task) = tasks.get_mut(old) {
                task.note(TABLE_OVERFLOW);
            }
            store::release_task(old, TABLE_OVERFLOW, tasks, events);
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
