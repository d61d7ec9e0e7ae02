//! # Core Type Definitions
//!
//! This module contains the small shared types of the bagmind memory:
//! - Arena handles (`TermId`, `TaskId`)
//! - Sentence punctuation (`Punctuation`)
//! - Error types (`MindError`)
//!
//! ## Handle Guarantees
//!
//! Handles are plain indices into an owning arena:
//! - Equality and hashing are integer comparisons
//! - Implement `Ord` for deterministic ordering in `BTreeMap`/`BTreeSet`
//! - A handle is only meaningful for the arena that issued it

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// ARENA HANDLES
// =============================================================================

/// Handle to an interned term in a [`TermArena`](crate::term::TermArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermId(pub u32);

impl TermId {
    /// Position of the term inside its arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Handle to a task in a [`TaskArena`](crate::task::TaskArena).
///
/// Task ids are never reused within one arena, so a stale id simply
/// resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// PUNCTUATION
// =============================================================================

/// The kind of sentence a task carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Punctuation {
    /// A statement believed to some degree (`.`).
    Judgment,
    /// A request for an answer (`?`).
    Question,
    /// A state to be realized (`!`).
    Goal,
    /// A request for a desire value (`@`).
    Quest,
}

impl Punctuation {
    /// Parse the punctuation from its symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(Self::Judgment),
            '?' => Some(Self::Question),
            '!' => Some(Self::Goal),
            '@' => Some(Self::Quest),
            _ => None,
        }
    }

    /// The symbol used in text form.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Judgment => '.',
            Self::Question => '?',
            Self::Goal => '!',
            Self::Quest => '@',
        }
    }

    /// Questions and quests both wait for answers.
    #[must_use]
    pub const fn is_question(self) -> bool {
        matches!(self, Self::Question | Self::Quest)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the bagmind memory.
///
/// - Rejected input is reported, never silently dropped
/// - Use `Result<T, MindError>` for fallible operations
/// - The memory should never panic; invariant checks are debug assertions
#[derive(Debug, Error)]
pub enum MindError {
    /// The configuration is not usable.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A compound term was built with the wrong number of components.
    #[error("Operator {op} expects {expected} components, found {found}")]
    Arity {
        /// Operator symbol.
        op: &'static str,
        /// Human-readable arity requirement.
        expected: &'static str,
        /// Number of components supplied.
        found: usize,
    },

    /// The term is structurally invalid.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),

    /// The term id does not belong to the arena.
    #[error("Unknown term: {0}")]
    UnknownTerm(TermId),

    /// The task id does not resolve to a live task.
    #[error("Unknown task: {0}")]
    UnknownTask(TaskId),

    /// Text input could not be parsed.
    #[error("Parse error on line {line}: {reason}")]
    Parse {
        /// 1-based line number (0 when parsing a single string).
        line: usize,
        /// What went wrong.
        reason: String,
    },

    /// The derivation collaborator failed.
    #[error("Derivation failed: {0}")]
    Derivation(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// TESTS
// =============================================================================
