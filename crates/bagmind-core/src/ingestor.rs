//! # Ingestor Module
//!
//! Task validation for the memory.
//!
//! - Check the budget against the activation threshold
//! - Build the term, rejecting malformed structure
//! - Check the term against the configured reasoning level
//! - Refuse terms that cannot name a concept
//!
//! Validation never touches concepts; the reasoner does that once a task
//! is accepted.

use crate::budget::{self, Budget};
use crate::config::ReasonerConfig;
use crate::task::TaskInput;
use crate::term::TermArena;
use crate::{TaskId, TermId};
use thiserror::Error;

/// Why a task was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Insufficient budget")]
    InsufficientBudget,

    #[error("Insufficient reasoning level")]
    InsufficientLevel {
        /// Level the term needs.
        required: u8,
        /// Level the memory runs at.
        allowed: u8,
    },

    /// The term could not be built; carries the construction error text.
    #[error("{0}")]
    InvalidTerm(String),

    #[error("Not conceptualizable")]
    NotConceptualizable,
}

/// Result of offering a task to the memory.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Accepted(TaskId),
    Rejected {
        id: TaskId,
        reason: Rejection,
        /// The task's audit trail, ending with the rejection.
        history: Vec<String>,
    },
}

impl TaskOutcome {
    #[must_use]
    pub fn id(&self) -> TaskId {
        match self {
            TaskOutcome::Accepted(id) | TaskOutcome::Rejected { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, TaskOutcome::Accepted(_))
    }
}

/// Validates task inputs before they reach a concept.
pub struct Ingestor;

impl Ingestor {
    /// Validate an input with its effective budget.
    ///
    /// Checks run cheapest first; the term is interned only once the
    /// budget passes. Returns the interned term on success.
    pub fn validate(
        terms: &mut TermArena,
        input: &TaskInput,
        budget: &Budget,
        config: &ReasonerConfig,
    ) -> Result<TermId, Rejection> {
        if !budget::above_threshold(budget, config.activation_budget_threshold) {
            return Err(Rejection::InsufficientBudget);
        }

        let term = terms
            .intern(&input.term)
            .map_err(|e| Rejection::InvalidTerm(e.to_string()))?;

        let required = terms.level(term);
        if required > config.reasoning_level {
            return Err(Rejection::InsufficientLevel {
                required,
                allowed: config.reasoning_level,
            });
        }

        if !terms.is_conceptualizable(term) {
            return Err(Rejection::NotConceptualizable);
        }

        Ok(term)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Punctuation;
    use crate::term::{Op, TermSpec};

    fn judgment(term: TermSpec) -> TaskInput {
        TaskInput::new(term, Punctuation::Judgment)
    }

    fn check(input: &TaskInput, config: &ReasonerConfig) -> Result<TermId, Rejection> {
        let mut terms = TermArena::new();
        let budget = input.effective_budget(0);
        Ingestor::validate(&mut terms, input, &budget, config)
    }

    #[test]
    fn validate_accepts_plain_inheritance() {
        let input = judgment(TermSpec::inheritance(
            TermSpec::atom("bird"),
            TermSpec::atom("animal"),
        ));
        assert!(check(&input, &ReasonerConfig::default()).is_ok());
    }

    #[test]
    fn validate_rejects_weak_budget() {
        let input = judgment(TermSpec::atom("a")).with_budget(Budget::new(0.0, 0.0, 0.0));
        let err = check(&input, &ReasonerConfig::default()).expect_err("rejected");
        assert_eq!(err, Rejection::InsufficientBudget);
        assert_eq!(err.to_string(), "Insufficient budget");
    }

    #[test]
    fn validate_rejects_deep_levels() {
        let config = ReasonerConfig {
            reasoning_level: 1,
            ..ReasonerConfig::default()
        };
        let input = judgment(TermSpec::compound(
            Op::Similarity,
            vec![TermSpec::atom("a"), TermSpec::atom("b")],
        ));
        let err = check(&input, &config).expect_err("rejected");
        assert_eq!(
            err,
            Rejection::InsufficientLevel {
                required: 2,
                allowed: 1
            }
        );
        assert_eq!(err.to_string(), "Insufficient reasoning level");
    }

    #[test]
    fn validate_rejects_bad_arity_with_error_text() {
        let input = judgment(TermSpec::compound(
            Op::Inheritance,
            vec![TermSpec::atom("a")],
        ));
        let err = check(&input, &ReasonerConfig::default()).expect_err("rejected");
        assert!(matches!(err, Rejection::InvalidTerm(_)));
        assert!(err.to_string().contains("-->"));
    }

    #[test]
    fn validate_rejects_bare_variables_and_intervals() {
        let var = judgment(TermSpec::Variable("$x".into()));
        assert_eq!(
            check(&var, &ReasonerConfig::default()),
            Err(Rejection::NotConceptualizable)
        );
        let interval = judgment(TermSpec::Interval(4));
        assert_eq!(
            check(&interval, &ReasonerConfig::default()),
            Err(Rejection::NotConceptualizable)
        );
    }

    #[test]
    fn outcome_accessors() {
        let ok = TaskOutcome::Accepted(TaskId(2));
        assert!(ok.is_accepted());
        let no = TaskOutcome::Rejected {
            id: TaskId(3),
            reason: Rejection::NotConceptualizable,
            history: vec!["Not conceptualizable".into()],
        };
        assert_eq!(no.id(), TaskId(3));
        assert!(!no.is_accepted());
    }
}
