//! # Term Arena
//!
//! Owned interning table for the symbolic terms that name concepts.
//!
//! The memory does not reason about terms; it only needs to
//! - give every distinct term one small handle ([`TermId`])
//! - know which terms may become concepts (not variables, not intervals)
//! - know how demanding a term is (its reasoning level)
//! - walk a compound's components when linking
//!
//! Terms enter through [`TermSpec`], an arena-free tree that parsers and
//! derivers build without touching the arena.

use crate::primitives::{MAX_NAME_LENGTH, MAX_TERM_ARGS, MAX_TERM_DEPTH};
use crate::{MindError, TermId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// OPERATORS
// =============================================================================

/// Compound term operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Op {
    Inheritance,
    Similarity,
    Implication,
    Equivalence,
    Negation,
    Conjunction,
    Disjunction,
    Product,
    SetExt,
    SetInt,
}

impl Op {
    /// All operators, for symbol lookup.
    pub const ALL: [Op; 10] = [
        Op::Inheritance,
        Op::Similarity,
        Op::Implication,
        Op::Equivalence,
        Op::Negation,
        Op::Conjunction,
        Op::Disjunction,
        Op::Product,
        Op::SetExt,
        Op::SetInt,
    ];

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Op::Inheritance => "-->",
            Op::Similarity => "<->",
            Op::Implication => "==>",
            Op::Equivalence => "<=>",
            Op::Negation => "--",
            Op::Conjunction => "&&",
            Op::Disjunction => "||",
            Op::Product => "*",
            Op::SetExt => "{}",
            Op::SetInt => "[]",
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }

    /// Lowest reasoning level that may process a term built with this op.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Op::Inheritance => 1,
            Op::Similarity | Op::SetExt | Op::SetInt => 2,
            Op::Product => 4,
            Op::Implication
            | Op::Equivalence
            | Op::Negation
            | Op::Conjunction
            | Op::Disjunction => 5,
        }
    }

    /// Component order does not matter; components are kept sorted.
    #[must_use]
    pub const fn is_commutative(self) -> bool {
        matches!(
            self,
            Op::Similarity
                | Op::Equivalence
                | Op::Conjunction
                | Op::Disjunction
                | Op::SetExt
                | Op::SetInt
        )
    }

    /// Repeated components collapse into one.
    const fn is_set_like(self) -> bool {
        matches!(
            self,
            Op::Conjunction | Op::Disjunction | Op::SetExt | Op::SetInt
        )
    }

    fn check_arity(self, found: usize) -> Result<(), MindError> {
        let (ok, expected) = match self {
            Op::Inheritance | Op::Similarity | Op::Implication | Op::Equivalence => {
                (found == 2, "2")
            }
            Op::Negation => (found == 1, "1"),
            Op::Conjunction | Op::Disjunction => (found >= 2, "at least 2"),
            Op::Product | Op::SetExt | Op::SetInt => (found >= 1, "at least 1"),
        };
        if ok && found <= MAX_TERM_ARGS {
            Ok(())
        } else {
            Err(MindError::Arity {
                op: self.symbol(),
                expected,
                found,
            })
        }
    }
}

// =============================================================================
// TERM DESCRIPTIONS
// =============================================================================

/// Arena-free term tree, as produced by parsers and derivers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermSpec {
    Atom(String),
    /// Name includes its sigil (`$x`, `#x`, `?x`).
    Variable(String),
    Interval(u32),
    Compound(Op, Vec<TermSpec>),
}

impl TermSpec {
    #[must_use]
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    #[must_use]
    pub fn compound(op: Op, args: Vec<TermSpec>) -> Self {
        Self::Compound(op, args)
    }

    /// `(--> subject predicate)`
    #[must_use]
    pub fn inheritance(subject: TermSpec, predicate: TermSpec) -> Self {
        Self::Compound(Op::Inheritance, vec![subject, predicate])
    }
}

impl fmt::Display for TermSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermSpec::Atom(name) | TermSpec::Variable(name) => f.write_str(name),
            TermSpec::Interval(n) => write!(f, "+{n}"),
            TermSpec::Compound(op, args) => {
                write!(f, "({}", op.symbol())?;
                for arg in args {
                    write!(f, " {arg}")?;
                }
                f.write_str(")")
            }
        }
    }
}

// =============================================================================
// INTERNED TERMS
// =============================================================================

/// An interned term. Compound components are handles into the same arena.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Atom(Box<str>),
    Variable(Box<str>),
    Interval(u32),
    Compound(Op, Box<[TermId]>),
}

#[derive(Debug, Clone)]
struct TermData {
    term: Term,
    complexity: u32,
    level: u8,
}

/// Interning table handing out [`TermId`] handles.
///
/// Interning the same structure twice returns the same handle, so term
/// equality is handle equality.
#[derive(Debug, Clone, Default)]
pub struct TermArena {
    terms: Vec<TermData>,
    lookup: HashMap<Term, TermId>,
}

impl TermArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Intern a whole term description.
    pub fn intern(&mut self, spec: &TermSpec) -> Result<TermId, MindError> {
        self.intern_at(spec, 0)
    }

    fn intern_at(&mut self, spec: &TermSpec, depth: usize) -> Result<TermId, MindError> {
        if depth > MAX_TERM_DEPTH {
            return Err(MindError::InvalidTerm(format!(
                "nesting deeper than {MAX_TERM_DEPTH}"
            )));
        }
        match spec {
            TermSpec::Atom(name) => self.atom(name),
            TermSpec::Variable(name) => self.variable(name),
            TermSpec::Interval(n) => Ok(self.interval(*n)),
            TermSpec::Compound(op, args) => {
                op.check_arity(args.len())?;
                let ids = args
                    .iter()
                    .map(|arg| self.intern_at(arg, depth + 1))
                    .collect::<Result<Vec<_>, _>>()?;
                self.compound(*op, ids)
            }
        }
    }

    /// Intern an atom.
    pub fn atom(&mut self, name: &str) -> Result<TermId, MindError> {
        validate_name(name)?;
        if is_variable_name(name) {
            return Err(MindError::InvalidTerm(format!(
                "atom name '{name}' starts with a variable sigil"
            )));
        }
        Ok(self.insert(Term::Atom(name.into()), 1, 1))
    }

    /// Intern a variable; the name must start with `$`, `#` or `?`.
    pub fn variable(&mut self, name: &str) -> Result<TermId, MindError> {
        validate_name(name)?;
        if !is_variable_name(name) || name.len() < 2 {
            return Err(MindError::InvalidTerm(format!(
                "variable '{name}' needs a sigil and a name"
            )));
        }
        Ok(self.insert(Term::Variable(name.into()), 1, 6))
    }

    /// Intern a time interval.
    pub fn interval(&mut self, n: u32) -> TermId {
        self.insert(Term::Interval(n), 1, 7)
    }

    /// Intern a compound from already-interned components.
    ///
    /// Commutative operators sort their components; set-like operators
    /// also drop duplicates. The arity is checked after that.
    pub fn compound(&mut self, op: Op, mut args: Vec<TermId>) -> Result<TermId, MindError> {
        if let Some(bad) = args.iter().find(|id| id.index() >= self.terms.len()) {
            return Err(MindError::UnknownTerm(*bad));
        }
        if op.is_commutative() {
            args.sort_unstable();
        }
        if op.is_set_like() {
            args.dedup();
        }
        op.check_arity(args.len())?;

        let mut complexity: u32 = 1;
        let mut level = op.level();
        for id in &args {
            let data = &self.terms[id.index()];
            complexity = complexity.saturating_add(data.complexity);
            level = level.max(data.level);
        }
        Ok(self.insert(Term::Compound(op, args.into_boxed_slice()), complexity, level))
    }

    fn insert(&mut self, term: Term, complexity: u32, level: u8) -> TermId {
        if let Some(&id) = self.lookup.get(&term) {
            return id;
        }
        let id = TermId(self.terms.len() as u32);
        self.lookup.insert(term.clone(), id);
        self.terms.push(TermData {
            term,
            complexity,
            level,
        });
        id
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index()).map(|d| &d.term)
    }

    /// Whether the term may name a concept.
    #[must_use]
    pub fn is_conceptualizable(&self, id: TermId) -> bool {
        matches!(self.get(id), Some(Term::Atom(_) | Term::Compound(..)))
    }

    /// Number of nodes in the term tree; 0 for unknown ids.
    #[must_use]
    pub fn complexity(&self, id: TermId) -> u32 {
        self.terms.get(id.index()).map_or(0, |d| d.complexity)
    }

    /// Lowest reasoning level able to handle the term; `u8::MAX` for
    /// unknown ids.
    #[must_use]
    pub fn level(&self, id: TermId) -> u8 {
        self.terms.get(id.index()).map_or(u8::MAX, |d| d.level)
    }

    #[must_use]
    pub fn op(&self, id: TermId) -> Option<Op> {
        match self.get(id)? {
            Term::Compound(op, _) => Some(*op),
            _ => None,
        }
    }

    /// Direct components of a compound, empty for anything else.
    #[must_use]
    pub fn components(&self, id: TermId) -> &[TermId] {
        match self.get(id) {
            Some(Term::Compound(_, args)) => args,
            _ => &[],
        }
    }

    /// Rebuild the arena-free description of a term.
    #[must_use]
    pub fn to_spec(&self, id: TermId) -> Option<TermSpec> {
        Some(match self.get(id)? {
            Term::Atom(name) => TermSpec::Atom(name.to_string()),
            Term::Variable(name) => TermSpec::Variable(name.to_string()),
            Term::Interval(n) => TermSpec::Interval(*n),
            Term::Compound(op, args) => TermSpec::Compound(
                *op,
                args.iter()
                    .map(|a| self.to_spec(*a))
                    .collect::<Option<Vec<_>>>()?,
            ),
        })
    }

    /// Canonical text form, e.g. `(--> bird animal)`.
    #[must_use]
    pub fn render(&self, id: TermId) -> String {
        self.to_spec(id)
            .map_or_else(|| id.to_string(), |spec| spec.to_string())
    }
}

fn is_variable_name(name: &str) -> bool {
    name.starts_with(['$', '#', '?'])
}

fn validate_name(name: &str) -> Result<(), MindError> {
    if name.is_empty() {
        return Err(MindError::InvalidTerm("empty name".into()));
    }
    if name.len() > MAX_NAME_LENGTH {
        return Err(MindError::InvalidTerm(format!(
            "name longer than {MAX_NAME_LENGTH} bytes"
        )));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '(' | ')'))
    {
        return Err(MindError::InvalidTerm(format!(
            "name '{name}' contains whitespace or parentheses"
        )));
    }
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================
