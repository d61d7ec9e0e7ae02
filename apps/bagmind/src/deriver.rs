//! # Reference Deriver
//!
//! A single inference rule, enough to watch the memory work: deduction
//! over inheritance chains.
//!
//! ```text
//! (--> A M)  +  (--> M B)  |-  (--> A B)
//! ```
//!
//! The premise task supplies one statement; the term-link target the
//! firing concept drew supplies the other. Either may be the first link of
//! the chain.

use bagmind_core::{
    Budget, DeriveContext, Derivation, Deriver, MindError, Op, Premise, Punctuation, TaskInput,
    Term, TermArena, TermId, TermSpec,
};

/// Confidence lost by each deduction step.
pub const DEDUCTION_DISCOUNT: f32 = 0.9;

/// Deduction over `-->` statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyllogisticDeriver {
    derived: u64,
}

impl SyllogisticDeriver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Conclusions produced so far.
    #[must_use]
    pub fn derived(&self) -> u64 {
        self.derived
    }
}

impl Deriver for SyllogisticDeriver {
    fn derive(
        &mut self,
        premise: &Premise,
        ctx: &DeriveContext<'_>,
    ) -> Result<Vec<Derivation>, MindError> {
        let task = ctx.task(premise.task())?;
        if task.punctuation != Punctuation::Judgment {
            return Ok(Vec::new());
        }
        let Some(first) = inheritance(ctx.terms, task.term) else {
            return Ok(Vec::new());
        };
        let Some(second) = inheritance(ctx.terms, premise.term_link.target()) else {
            return Ok(Vec::new());
        };

        let chain = if first.1 == second.0 {
            (first.0, second.1)
        } else if second.1 == first.0 {
            (second.0, first.1)
        } else {
            return Ok(Vec::new());
        };
        if chain.0 == chain.1 {
            return Ok(Vec::new());
        }

        let spec = |id: TermId| ctx.terms.to_spec(id).ok_or(MindError::UnknownTerm(id));
        let conclusion = TermSpec::inheritance(spec(chain.0)?, spec(chain.1)?);
        let budget = deduction_budget(&task.budget, &premise.term_link.budget);

        self.derived += 1;
        Ok(vec![
            TaskInput::new(conclusion, Punctuation::Judgment)
                .with_budget(budget)
                .with_parent(task.id),
        ])
    }
}

/// Budget of a conclusion from its task budget and term-link budget.
#[must_use]
pub fn deduction_budget(task: &Budget, link: &Budget) -> Budget {
    Budget::new(
        task.priority() * link.priority(),
        task.durability() * link.durability(),
        task.quality().min(link.quality()) * DEDUCTION_DISCOUNT,
    )
}

fn inheritance(terms: &TermArena, id: TermId) -> Option<(TermId, TermId)> {
    match terms.get(id)? {
        Term::Compound(Op::Inheritance, args) if args.len() == 2 => Some((args[0], args[1])),
        _ => None,
    }
}
