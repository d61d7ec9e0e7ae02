//! # Derivation Seam
//!
//! The memory does not reason; it selects. Every (task-link, term-link)
//! pair a firing concept draws is handed to a [`Deriver`] as a
//! [`Premise`], together with read-only access to the arenas. Whatever
//! the deriver returns re-enters the memory through ingestion on the next
//! cycle.

use crate::link::{TaskLink, TermLink};
use crate::task::{Task, TaskArena, TaskInput};
use crate::term::{Term, TermArena};
use crate::{MindError, TaskId, TermId};

/// A new task proposed by a deriver; `parent` names the premise task.
pub type Derivation = TaskInput;

/// One pair drawn by a firing concept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Premise {
    /// The firing concept.
    pub concept: TermId,
    pub task_link: TaskLink,
    pub term_link: TermLink,
}

impl Premise {
    #[must_use]
    pub fn task(&self) -> TaskId {
        self.task_link.task
    }
}

/// Read-only view of the memory handed to a deriver.
#[derive(Debug, Clone, Copy)]
pub struct DeriveContext<'a> {
    pub terms: &'a TermArena,
    pub tasks: &'a TaskArena,
    /// Current clock value.
    pub time: u64,
}

impl<'a> DeriveContext<'a> {
    pub fn task(&self, id: TaskId) -> Result<&'a Task, MindError> {
        self.tasks.get(id).ok_or(MindError::UnknownTask(id))
    }

    pub fn term(&self, id: TermId) -> Result<&'a Term, MindError> {
        self.terms.get(id).ok_or(MindError::UnknownTerm(id))
    }
}

/// Inference collaborator.
///
/// Called synchronously from inside a cycle; must not block.
pub trait Deriver {
    fn derive(
        &mut self,
        premise: &Premise,
        ctx: &DeriveContext<'_>,
    ) -> Result<Vec<Derivation>, MindError>;
}

impl<F> Deriver for F
where
    F: FnMut(&Premise, &DeriveContext<'_>) -> Result<Vec<Derivation>, MindError>,
{
    fn derive(
        &mut self,
        premise: &Premise,
        ctx: &DeriveContext<'_>,
    ) -> Result<Vec<Derivation>, MindError> {
        self(premise, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::Budget;
    use crate::link::LinkKind;
    use crate::term::TermSpec;
    use crate::{Punctuation, task::Task};

    #[test]
    fn closures_are_derivers() {
        let mut terms = TermArena::new();
        let a = terms.atom("a").expect("atom");
        let mut tasks = TaskArena::new();
        let id = tasks.next_id();
        tasks.insert(Task {
            id,
            term: a,
            punctuation: Punctuation::Judgment,
            budget: Budget::new(0.5, 0.5, 0.5),
            parent: None,
            created: 0,
            history: Vec::new(),
        });

        let premise = Premise {
            concept: a,
            task_link: TaskLink::new(id, Budget::new(0.5, 0.5, 0.5)),
            term_link: TermLink::new(a, LinkKind::Component, Budget::new(0.5, 0.5, 0.5)),
        };
        let ctx = DeriveContext {
            terms: &terms,
            tasks: &tasks,
            time: 3,
        };

        let mut echo =
            |p: &Premise, ctx: &DeriveContext<'_>| -> Result<Vec<Derivation>, MindError> {
                let task = ctx.task(p.task())?;
                let spec = ctx
                    .terms
                    .to_spec(task.term)
                    .ok_or(MindError::UnknownTerm(task.term))?;
                Ok(vec![TaskInput::new(spec, Punctuation::Question).with_parent(task.id)])
            };
        let out = echo.derive(&premise, &ctx).expect("derive");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].term, TermSpec::atom("a"));
        assert_eq!(out[0].parent, Some(id));
    }

    #[test]
    fn context_reports_unknown_ids() {
        let terms = TermArena::new();
        let tasks = TaskArena::new();
        let ctx = DeriveContext {
            terms: &terms,
            tasks: &tasks,
            time: 0,
        };
        assert!(matches!(
            ctx.task(TaskId(5)),
            Err(MindError::UnknownTask(TaskId(5)))
        ));
        assert!(matches!(
            ctx.term(TermId(1)),
            Err(MindError::UnknownTerm(TermId(1)))
        ));
    }
}
