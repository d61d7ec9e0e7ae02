//! # Task Module
//!
//! Tasks are the work items of the memory: a term, a punctuation and a
//! budget. They live in one [`TaskArena`]; links and concept tables refer
//! to them by [`TaskId`] only.
//!
//! The arena counts references. Each task-link and each table slot naming
//! a task holds one; when the last is released the task leaves the arena.

use crate::budget::Budget;
use crate::primitives::{DEFAULT_GOAL_BUDGET, DEFAULT_JUDGMENT_BUDGET, DEFAULT_QUESTION_BUDGET};
use crate::term::TermSpec;
use crate::{Punctuation, TaskId, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// TASK INPUT
// =============================================================================

/// A task description that has not entered the memory yet.
///
/// Built by parsers and derivers without access to the arenas; safe to
/// send across threads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInput {
    pub term: TermSpec,
    pub punctuation: Punctuation,
    /// `None` uses the default budget for the punctuation.
    pub budget: Option<Budget>,
    /// The task this one was derived from, if any.
    #[serde(default)]
    pub parent: Option<TaskId>,
}

impl TaskInput {
    #[must_use]
    pub fn new(term: TermSpec, punctuation: Punctuation) -> Self {
        Self {
            term,
            punctuation,
            budget: None,
            parent: None,
        }
    }

    #[must_use]
    pub fn with_budget(mut self, budget: Budget) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn with_parent(mut self, parent: TaskId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// The budget this input will enter with, stamped at `now`.
    #[must_use]
    pub fn effective_budget(&self, now: u64) -> Budget {
        let mut budget = self
            .budget
            .unwrap_or_else(|| Budget::from_triple(default_budget(self.punctuation)));
        budget.stamp(now);
        budget
    }
}

/// Default `(priority, durability, quality)` for input of each punctuation.
#[must_use]
pub fn default_budget(punctuation: Punctuation) -> (f32, f32, f32) {
    match punctuation {
        Punctuation::Judgment => DEFAULT_JUDGMENT_BUDGET,
        Punctuation::Question | Punctuation::Quest => DEFAULT_QUESTION_BUDGET,
        Punctuation::Goal => DEFAULT_GOAL_BUDGET,
    }
}

// =============================================================================
// TASK
// =============================================================================

/// A task living in the memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub term: TermId,
    pub punctuation: Punctuation,
    pub budget: Budget,
    pub parent: Option<TaskId>,
    /// Clock value at creation.
    pub created: u64,
    /// Audit trail: why the task was added, rejected or removed.
    pub history: Vec<String>,
}

impl Task {
    /// Append an entry to the audit trail.
    pub fn note(&mut self, entry: impl Into<String>) {
        self.history.push(entry.into());
    }
}

// =============================================================================
// TASK ARENA
// =============================================================================

#[derive(Debug, Clone)]
struct Held {
    task: Task,
    refs: u32,
}

/// Reference-counted owner of every live task.
#[derive(Debug, Clone, Default)]
pub struct TaskArena {
    tasks: HashMap<TaskId, Held>,
    next_id: u64,
}

impl TaskArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next task id.
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Store a task with no references yet.
    pub fn insert(&mut self, task: Task) {
        self.tasks.insert(task.id, Held { task, refs: 0 });
    }

    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id).map(|h| &h.task)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(&id).map(|h| &mut h.task)
    }

    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Number of references currently held on a task.
    #[must_use]
    pub fn refs(&self, id: TaskId) -> u32 {
        self.tasks.get(&id).map_or(0, |h| h.refs)
    }

    /// Add a reference. Returns false for unknown ids.
    pub fn retain(&mut self, id: TaskId) -> bool {
        match self.tasks.get_mut(&id) {
            Some(held) => {
                held.refs = held.refs.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Drop a reference; returns the task once nothing refers to it.
    pub fn release(&mut self, id: TaskId) -> Option<Task> {
        let held = self.tasks.get_mut(&id)?;
        held.refs = held.refs.saturating_sub(1);
        if held.refs == 0 {
            return self.tasks.remove(&id).map(|h| h.task);
        }
        None
    }

    /// Remove a task that never gained a reference.
    pub fn discard_unreferenced(&mut self, id: TaskId) -> Option<Task> {
        if self.refs(id) == 0 {
            return self.tasks.remove(&id).map(|h| h.task);
        }
        None
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// =============================================================================
// TESTS
// =============================================================================
