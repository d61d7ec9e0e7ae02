//! # Concept
//!
//! A concept is the unit of attention: one term, its budget, and the work
//! gathered under it.
//!
//! - `task_links`: bag of tasks this concept should process
//! - `term_links`: bag of structurally related terms
//! - belief / question / goal tables: small FIFO tables of task ids
//!
//! Firing draws from the two bags and pairs every drawn task-link with a
//! handful of drawn term-links. What happens to a pair is up to the
//! caller.

use crate::bag::{Item, LevelBag, PriorityBag};
use crate::budget::{self, Budget};
use crate::config::ReasonerConfig;
use crate::link::{TaskLink, TermLink};
use crate::{MindError, Punctuation, TaskId, TermId};
use serde::Serialize;
use std::collections::VecDeque;

// =============================================================================
// TABLES
// =============================================================================

/// Which table a task belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Table {
    Beliefs,
    Questions,
    Goals,
}

impl Table {
    #[must_use]
    pub const fn for_punctuation(punctuation: Punctuation) -> Self {
        match punctuation {
            Punctuation::Judgment => Table::Beliefs,
            Punctuation::Question | Punctuation::Quest => Table::Questions,
            Punctuation::Goal => Table::Goals,
        }
    }
}

/// Result of offering a task to a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The task was already in the table.
    Present,
    /// The task was added; the oldest entry left if the table was full.
    Added { displaced: Option<TaskId> },
}

// =============================================================================
// FIRING
// =============================================================================

/// How much one firing may draw, and how drawn links decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FirePlan {
    pub task_links: usize,
    pub term_links: usize,
    pub now: u64,
    pub task_link_forget_cycles: f32,
    pub term_link_forget_cycles: f32,
    pub relative_floor: f32,
}

/// What one firing did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct FireReport {
    pub task_links_fired: usize,
    pub premises: usize,
}

// =============================================================================
// CONCEPT
// =============================================================================

/// A named reasoning unit.
#[derive(Debug, Clone)]
pub struct Concept {
    term: TermId,
    budget: Budget,
    task_links: LevelBag<TaskLink>,
    term_links: LevelBag<TermLink>,
    beliefs: VecDeque<TaskId>,
    questions: VecDeque<TaskId>,
    goals: VecDeque<TaskId>,
}

impl Item for Concept {
    type Key = TermId;

    fn key(&self) -> &TermId {
        &self.term
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

impl Concept {
    /// Create an empty concept with link bags sized by `config`.
    ///
    /// `seed` feeds both bags' samplers.
    pub fn new(
        term: TermId,
        budget: Budget,
        config: &ReasonerConfig,
        seed: u64,
    ) -> Result<Self, MindError> {
        let task_links = LevelBag::new(config.task_link_levels, config.task_link_capacity, seed)?
            .with_sampling(config.sampling);
        let term_links = LevelBag::new(
            config.term_link_levels,
            config.term_link_capacity,
            seed.rotate_left(32) ^ 0x9e37_79b9_7f4a_7c15,
        )?
        .with_sampling(config.sampling);

        Ok(Self {
            term,
            budget,
            task_links,
            term_links,
            beliefs: VecDeque::new(),
            questions: VecDeque::new(),
            goals: VecDeque::new(),
        })
    }

    #[must_use]
    pub fn term(&self) -> TermId {
        self.term
    }

    #[must_use]
    pub fn priority(&self) -> f32 {
        self.budget.priority()
    }

    #[must_use]
    pub fn task_links(&self) -> &LevelBag<TaskLink> {
        &self.task_links
    }

    #[must_use]
    pub fn term_links(&self) -> &LevelBag<TermLink> {
        &self.term_links
    }

    /// Insert or reinforce a task-link; returns the link pushed out.
    pub fn link_task(&mut self, link: TaskLink) -> Option<TaskLink> {
        self.task_links.put(link)
    }

    /// Insert or reinforce a term-link; returns the link pushed out.
    pub fn link_term(&mut self, link: TermLink) -> Option<TermLink> {
        self.term_links.put(link)
    }

    // =========================================================================
    // TABLES
    // =========================================================================

    fn table_mut(&mut self, table: Table) -> &mut VecDeque<TaskId> {
        match table {
            Table::Beliefs => &mut self.beliefs,
            Table::Questions => &mut self.questions,
            Table::Goals => &mut self.goals,
        }
    }

    #[must_use]
    pub fn table(&self, table: Table) -> &VecDeque<TaskId> {
        match table {
            Table::Beliefs => &self.beliefs,
            Table::Questions => &self.questions,
            Table::Goals => &self.goals,
        }
    }

    /// Offer a task to the table for its punctuation, holding at most
    /// `limit` entries.
    pub fn admit(&mut self, task: TaskId, punctuation: Punctuation, limit: usize) -> Admission {
        let table = self.table_mut(Table::for_punctuation(punctuation));
        if table.contains(&task) {
            return Admission::Present;
        }
        table.push_back(task);
        let displaced = if table.len() > limit.max(1) {
            table.pop_front()
        } else {
            None
        };
        Admission::Added { displaced }
    }

    /// Remove a task from whichever table holds it.
    pub fn withdraw(&mut self, task: TaskId) -> Option<Table> {
        for kind in [Table::Beliefs, Table::Questions, Table::Goals] {
            let table = self.table_mut(kind);
            if let Some(pos) = table.iter().position(|t| *t == task) {
                table.remove(pos);
                return Some(kind);
            }
        }
        None
    }

    #[must_use]
    pub fn has_questions(&self) -> bool {
        !self.questions.is_empty()
    }

    #[must_use]
    pub fn has_goals(&self) -> bool {
        !self.goals.is_empty()
    }

    /// Every task reference the concept holds, one entry per reference.
    #[must_use]
    pub fn task_references(&self) -> Vec<TaskId> {
        self.task_links
            .iter()
            .map(|link| link.task)
            .chain(self.beliefs.iter().copied())
            .chain(self.questions.iter().copied())
            .chain(self.goals.iter().copied())
            .collect()
    }

    // =========================================================================
    // FIRING
    // =========================================================================

    /// Plan a firing from the concept's current priority.
    #[must_use]
    pub fn plan(&self, config: &ReasonerConfig, now: u64) -> FirePlan {
        let p = self.priority();
        FirePlan {
            task_links: budget::interpolate(
                p,
                config.min_task_links_fired,
                config.max_task_links_fired,
            ),
            term_links: budget::interpolate(
                p,
                config.min_term_links_fired,
                config.max_term_links_fired,
            ),
            now,
            task_link_forget_cycles: config.forget_cycles(config.forget_durations.task_link),
            term_link_forget_cycles: config.forget_cycles(config.forget_durations.term_link),
            relative_floor: config.forget_quality_relative,
        }
    }

    /// Fire the concept.
    ///
    /// Draws up to `plan.task_links` task-links; for each, draws up to
    /// `plan.term_links` term-links and hands every pair to `premise`.
    /// Drawn links are forgotten and put back. A concept without
    /// task-links does nothing.
    pub fn fire<F>(&mut self, plan: &FirePlan, mut premise: F) -> FireReport
    where
        F: FnMut(&TaskLink, &TermLink),
    {
        let mut report = FireReport::default();
        if self.task_links.is_empty() {
            return report;
        }

        let FirePlan {
            now,
            task_link_forget_cycles,
            term_link_forget_cycles,
            relative_floor,
            ..
        } = *plan;

        for _ in 0..plan.task_links {
            let Some(task_link) = self
                .task_links
                .process_next(|b| budget::forget(b, now, task_link_forget_cycles, relative_floor))
                .copied()
            else {
                break;
            };
            report.task_links_fired += 1;

            for _ in 0..plan.term_links {
                let Some(term_link) = self
                    .term_links
                    .process_next(|b| {
                        budget::forget(b, now, term_link_forget_cycles, relative_floor);
                    })
                    .copied()
                else {
                    break;
                };
                premise(&task_link, &term_link);
                report.premises += 1;
            }
        }
        report
    }
}

// =============================================================================
// TESTS
// =============================================================================
