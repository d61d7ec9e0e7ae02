//! # Concept Store
//!
//! The memory's top-level bag: live concepts in a [`LevelBag`], displaced
//! concepts in an [`EvictionCache`], and two ordered indices naming the
//! concepts that currently hold questions or goals.
//!
//! Every path that moves a concept in or out of the bag keeps the indices
//! current, so they are never rebuilt by scanning.

use crate::bag::{EvictionCache, Item, LevelBag, PriorityBag};
use crate::budget::Budget;
use crate::concept::Concept;
use crate::config::ReasonerConfig;
use crate::event::{Event, EventBus};
use crate::task::TaskArena;
use crate::term::TermArena;
use crate::{MindError, TaskId, TermId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;
use tracing::debug;

/// Reason attached to concepts pushed out of the bag.
pub const DISPLACED: &str = "Displaced";
/// Reason attached to tasks whose last reference was released.
pub const FORGOTTEN: &str = "Forgotten";

/// Live and displaced concepts.
#[derive(Debug)]
pub struct ConceptStore {
    concepts: LevelBag<Concept>,
    cache: EvictionCache<Concept>,
    question_concepts: BTreeSet<TermId>,
    goal_concepts: BTreeSet<TermId>,
    seeds: StdRng,
    config: ReasonerConfig,
}

impl ConceptStore {
    /// Build an empty store. `config.random_seed` seeds the concept bag and
    /// every concept's link bags.
    pub fn new(config: &ReasonerConfig) -> Result<Self, MindError> {
        let mut seeds = StdRng::seed_from_u64(config.random_seed);
        let concepts = LevelBag::new(
            config.concept_levels,
            config.concept_capacity,
            seeds.random(),
        )?
        .with_sampling(config.sampling);
        Ok(Self {
            concepts,
            cache: EvictionCache::new(config.subconcept_capacity),
            question_concepts: BTreeSet::new(),
            goal_concepts: BTreeSet::new(),
            seeds,
            config: config.clone(),
        })
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    /// Resolve the concept for `term`, activating it with `budget`.
    ///
    /// - live concept: budget merged, `ConceptActivate`
    /// - cached concept (with `create`): recalled, merged, `ConceptRemember`
    ///   then `ConceptActivate`
    /// - otherwise (with `create`): new concept, `ConceptNew`
    ///
    /// Returns `None` for variables, intervals, absent concepts when
    /// `create` is false, and concepts displaced by their own insertion.
    pub fn conceptualize(
        &mut self,
        terms: &TermArena,
        term: TermId,
        budget: &Budget,
        create: bool,
        tasks: &mut TaskArena,
        events: &mut EventBus,
    ) -> Result<Option<TermId>, MindError> {
        if !terms.is_conceptualizable(term) {
            return Ok(None);
        }

        if let Some(mut live) = self.concepts.take(&term) {
            live.budget_mut().absorb(budget);
            self.reinsert(live, tasks, events);
            events.emit(Event::ConceptActivate { term });
            return Ok(Some(term));
        }

        if !create {
            return Ok(None);
        }

        let concept = match self.cache.recall(&term) {
            Some(mut cached) => {
                cached.budget_mut().absorb(budget);
                events.emit(Event::ConceptRemember { term });
                events.emit(Event::ConceptActivate { term });
                cached
            }
            None => {
                let fresh = Concept::new(term, *budget, &self.config, self.seeds.random())?;
                events.emit(Event::ConceptNew { term });
                fresh
            }
        };

        Ok(self.insert(concept, tasks, events))
    }

    /// Put a concept into the bag, displacing whatever overflows.
    ///
    /// Returns the concept's term if it is still live afterwards.
    fn insert(
        &mut self,
        concept: Concept,
        tasks: &mut TaskArena,
        events: &mut EventBus,
    ) -> Option<TermId> {
        let term = concept.term();
        let overflow = self.concepts.put(concept);
        self.reindex(term);
        match overflow {
            Some(out) if out.term() == term => {
                self.displace(out, tasks, events);
                None
            }
            Some(out) => {
                self.displace(out, tasks, events);
                Some(term)
            }
            None => Some(term),
        }
    }

    /// Put back a concept that was taken out of the bag.
    fn reinsert(&mut self, concept: Concept, tasks: &mut TaskArena, events: &mut EventBus) {
        let term = concept.term();
        let overflow = self.concepts.put(concept);
        debug_assert!(overflow.is_none(), "reinsertion of {term} overflowed");
        if let Some(out) = overflow {
            self.displace(out, tasks, events);
        }
        self.reindex(term);
    }

    /// Move a concept out of the bag into the cache, or drop it.
    fn displace(&mut self, concept: Concept, tasks: &mut TaskArena, events: &mut EventBus) {
        let term = concept.term();
        self.question_concepts.remove(&term);
        self.goal_concepts.remove(&term);
        debug!(
            concept = %term,
            priority = concept.priority(),
            cached = self.cache.capacity() > 0,
            "concept displaced"
        );
        events.emit(Event::ConceptForget {
            term,
            reason: DISPLACED.to_string(),
        });
        if let Some(dropped) = self.cache.store(concept) {
            release_all(&dropped, tasks, events);
        }
    }

    fn reindex(&mut self, term: TermId) {
        let (questions, goals) = self
            .concepts
            .get(&term)
            .map_or((false, false), |c| (c.has_questions(), c.has_goals()));
        if questions {
            self.question_concepts.insert(term);
        } else {
            self.question_concepts.remove(&term);
        }
        if goals {
            self.goal_concepts.insert(term);
        } else {
            self.goal_concepts.remove(&term);
        }
    }

    // =========================================================================
    // ACCESS
    // =========================================================================

    /// Run `f` on a live concept, keeping the bag and indices consistent
    /// with whatever `f` changes.
    pub fn with_concept<R, F>(
        &mut self,
        term: TermId,
        tasks: &mut TaskArena,
        events: &mut EventBus,
        f: F,
    ) -> Option<R>
    where
        F: FnOnce(&mut Concept, &mut TaskArena, &mut EventBus) -> R,
    {
        let mut concept = self.concepts.take(&term)?;
        let out = f(&mut concept, tasks, events);
        self.reinsert(concept, tasks, events);
        Some(out)
    }

    /// Take a concept out by priority-proportional sampling.
    ///
    /// The concept stays in the question/goal indices while it is out; hand
    /// it back with [`restore`](Self::restore).
    pub fn take_next(&mut self) -> Option<Concept> {
        self.concepts.take_next()
    }

    /// Return a concept obtained from [`take_next`](Self::take_next).
    pub fn restore(&mut self, concept: Concept, tasks: &mut TaskArena, events: &mut EventBus) {
        self.insert(concept, tasks, events);
    }

    #[must_use]
    pub fn get(&self, term: TermId) -> Option<&Concept> {
        self.concepts.get(&term)
    }

    #[must_use]
    pub fn contains(&self, term: TermId) -> bool {
        self.concepts.contains(&term)
    }

    #[must_use]
    pub fn is_cached(&self, term: TermId) -> bool {
        self.cache.contains(&term)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.size()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.concepts.capacity()
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn concepts(&self) -> &LevelBag<Concept> {
        &self.concepts
    }

    /// Concepts holding at least one question or quest.
    #[must_use]
    pub fn question_concepts(&self) -> &BTreeSet<TermId> {
        &self.question_concepts
    }

    /// Concepts holding at least one goal.
    #[must_use]
    pub fn goal_concepts(&self) -> &BTreeSet<TermId> {
        &self.goal_concepts
    }
}

/// Drop one reference on a task; announce it with `reason` if that was
/// the last one.
pub(crate) fn release_task(
    id: TaskId,
    reason: &str,
    tasks: &mut TaskArena,
    events: &mut EventBus,
) {
    if tasks.release(id).is_some() {
        events.emit(Event::TaskRemove {
            task: id,
            reason: reason.to_string(),
        });
    }
}

/// Release every task reference a dropped concept held.
fn release_all(concept: &Concept, tasks: &mut TaskArena, events: &mut EventBus) {
    for id in concept.task_references() {
        release_task(id, FORGOTTEN, tasks, events);
    }
}

// =============================================================================
// TESTS
// =============================================================================
