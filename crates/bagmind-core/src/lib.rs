//! # bagmind-core
//!
//! The bounded-resource reasoning memory for bagmind - THE MEMORY.
//!
//! A store of competing concepts, each holding prioritized work, processed
//! one bounded batch per cycle under a strict capacity ceiling. The same
//! leveled priority bag is used at three nested levels: concepts in the
//! store, task-links and term-links in a concept.
//!
//! ## Architectural Constraints
//!
//! - Bounded: every container has a fixed capacity and evicts under pressure
//! - Reproducible: every bag samples through its own seeded RNG
//! - Single-threaded cycles: only the input queue and worker pool cross threads
//! - Closed: inference and text parsing are injected through
//!   [`Deriver`] and [`Parser`]
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod bag;
pub mod budget;
pub mod concept;
pub mod config;
pub mod derive;
pub mod event;
pub mod ingestor;
pub mod input;
pub mod link;
pub mod primitives;
pub mod reasoner;
pub mod store;
pub mod task;
pub mod term;
pub mod types;
pub mod worker;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{MindError, Punctuation, TaskId, TermId};

// =============================================================================
// RE-EXPORTS: Attention
// =============================================================================

pub use bag::{EvictionCache, Item, LevelBag, PriorityBag, Sampling};
pub use budget::Budget;
pub use concept::{Concept, FirePlan, FireReport, Table};
pub use link::{LinkKind, TaskLink, TermLink, TermLinkKey};
pub use store::ConceptStore;

// =============================================================================
// RE-EXPORTS: Terms and Tasks
// =============================================================================

pub use task::{Task, TaskArena, TaskInput};
pub use term::{Op, Term, TermArena, TermSpec};

// =============================================================================
// RE-EXPORTS: Cycle Controller
// =============================================================================

pub use config::{ForgetDurations, ReasonerConfig};
pub use derive::{DeriveContext, Derivation, Deriver, Premise};
pub use event::{Event, EventBus, Subscription};
pub use ingestor::{Ingestor, Rejection, TaskOutcome};
pub use input::{Inbox, InputHandle, Parser};
pub use reasoner::{Action, CycleReport, Reasoner};
pub use worker::{Job, WorkerPool};
