//! # Innate Primitives
//!
//! Hardcoded runtime constants for the bagmind memory.
//!
//! The memory starts empty but with fixed resource rules.
//! Tunable values live in [`ReasonerConfig`](crate::config::ReasonerConfig);
//! the constants here are the defaults it falls back to and the limits
//! no configuration may cross.

// =============================================================================
// BUDGET PRIMITIVES
// =============================================================================

/// Smallest budget difference treated as significant.
///
/// Used when comparing priorities for eviction and when deciding whether a
/// bucket mass is effectively zero.
pub const BUDGET_EPSILON: f32 = 1.0e-4;

/// Default fraction of an entry's quality below which forgetting stops.
///
/// An entry never decays below `FORGET_QUALITY_RELATIVE * quality`.
pub const FORGET_QUALITY_RELATIVE: f32 = 0.3;

/// Default budget `(priority, durability, quality)` for input judgments.
pub const DEFAULT_JUDGMENT_BUDGET: (f32, f32, f32) = (0.8, 0.5, 0.9);

/// Default budget for input questions and quests.
pub const DEFAULT_QUESTION_BUDGET: (f32, f32, f32) = (0.9, 0.9, 0.9);

/// Default budget for input goals.
pub const DEFAULT_GOAL_BUDGET: (f32, f32, f32) = (0.9, 0.9, 0.9);

// =============================================================================
// CONTAINER DEFAULTS
// =============================================================================

/// Default number of live concepts.
pub const DEFAULT_CONCEPT_CAPACITY: usize = 1024;

/// Default number of priority levels in the concept bag.
pub const DEFAULT_CONCEPT_LEVELS: usize = 32;

/// Default task-link capacity per concept.
pub const DEFAULT_TASK_LINK_CAPACITY: usize = 48;

/// Default task-link bag levels.
pub const DEFAULT_TASK_LINK_LEVELS: usize = 12;

/// Default term-link capacity per concept.
pub const DEFAULT_TERM_LINK_CAPACITY: usize = 128;

/// Default term-link bag levels.
pub const DEFAULT_TERM_LINK_LEVELS: usize = 12;

/// Default capacity of the displaced-concept cache (0 disables it).
pub const DEFAULT_SUBCONCEPT_CAPACITY: usize = 1024;

/// Number of cycles in one duration, the unit forgetting rates are given in.
pub const DEFAULT_DURATION: u32 = 5;

/// Highest reasoning level; terms above the configured level are rejected.
pub const MAX_REASONING_LEVEL: u8 = 8;

// =============================================================================
// INPUT LIMITS
// =============================================================================

/// Maximum number of components in one compound term.
///
/// Terms wider than this are rejected at construction.
pub const MAX_TERM_ARGS: usize = 64;

/// Maximum nesting depth accepted when interning a term description.
pub const MAX_TERM_DEPTH: usize = 32;

/// Maximum length of an atom or variable name.
pub const MAX_NAME_LENGTH: usize = 256;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budgets_are_normalized() {
        for (p, d, q) in [
            DEFAULT_JUDGMENT_BUDGET,
            DEFAULT_QUESTION_BUDGET,
            DEFAULT_GOAL_BUDGET,
        ] {
            assert!((0.0..=1.0).contains(&p));
            assert!((0.0..=1.0).contains(&d));
            assert!((0.0..=1.0).contains(&q));
        }
    }

    #[test]
    fn forget_floor_is_a_fraction() {
        assert!(FORGET_QUALITY_RELATIVE > 0.0 && FORGET_QUALITY_RELATIVE < 1.0);
    }
}
