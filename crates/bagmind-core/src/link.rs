//! # Links
//!
//! Budgeted references held in a concept's bags. Links store handles,
//! never the task or term itself.

use crate::bag::Item;
use crate::budget::Budget;
use crate::{TaskId, TermId};
use serde::{Deserialize, Serialize};

/// Reference from a concept to a task it should process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaskLink {
    pub task: TaskId,
    pub budget: Budget,
}

impl TaskLink {
    #[must_use]
    pub fn new(task: TaskId, budget: Budget) -> Self {
        Self { task, budget }
    }
}

impl Item for TaskLink {
    type Key = TaskId;

    fn key(&self) -> &TaskId {
        &self.task
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

/// Direction of a term-link relative to the owning concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LinkKind {
    /// From a compound's concept down to one of its components.
    Component,
    /// From a component's concept up to a compound containing it.
    Compound,
}

/// Key of a term-link: its target and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermLinkKey {
    pub target: TermId,
    pub kind: LinkKind,
}

/// Reference from a concept to a structurally related term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TermLink {
    pub key: TermLinkKey,
    pub budget: Budget,
}

impl TermLink {
    #[must_use]
    pub fn new(target: TermId, kind: LinkKind, budget: Budget) -> Self {
        Self {
            key: TermLinkKey { target, kind },
            budget,
        }
    }

    #[must_use]
    pub fn target(&self) -> TermId {
        self.key.target
    }

    #[must_use]
    pub fn kind(&self) -> LinkKind {
        self.key.kind
    }
}

impl Item for TermLink {
    type Key = TermLinkKey;

    fn key(&self) -> &TermLinkKey {
        &self.key
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}
