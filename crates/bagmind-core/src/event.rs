//! # Event Bus
//!
//! Named signals emitted at fixed points of the memory's work. The memory
//! knows nothing about who listens: handlers are called synchronously, in
//! registration order, and must not block.

use crate::{TaskId, TermId};
use crossbeam_channel::Receiver;
use serde::Serialize;
use std::fmt;

// =============================================================================
// EVENTS
// =============================================================================

/// A signal emitted by the memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Event {
    CycleStart {
        time: u64,
    },
    CycleEnd {
        time: u64,
    },
    /// A concept was created.
    ConceptNew {
        term: TermId,
    },
    /// A live or recalled concept received new budget.
    ConceptActivate {
        term: TermId,
    },
    /// A concept came back from the displaced-concept cache.
    ConceptRemember {
        term: TermId,
    },
    /// A concept left the store.
    ConceptForget {
        term: TermId,
        reason: String,
    },
    /// A concept fired at least one task-link.
    ConceptFire {
        term: TermId,
    },
    TaskAdd {
        task: TaskId,
        reason: Option<String>,
    },
    TaskRemove {
        task: TaskId,
        reason: String,
    },
    /// A collaborator failed; the cycle carried on.
    Error {
        reason: String,
    },
}

impl Event {
    /// Stable name of the event kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Event::CycleStart { .. } => "CycleStart",
            Event::CycleEnd { .. } => "CycleEnd",
            Event::ConceptNew { .. } => "ConceptNew",
            Event::ConceptActivate { .. } => "ConceptActivate",
            Event::ConceptRemember { .. } => "ConceptRemember",
            Event::ConceptForget { .. } => "ConceptForget",
            Event::ConceptFire { .. } => "ConceptFire",
            Event::TaskAdd { .. } => "TaskAdd",
            Event::TaskRemove { .. } => "TaskRemove",
            Event::Error { .. } => "Error",
        }
    }

    /// The concept this event is about, if any.
    #[must_use]
    pub const fn concept(&self) -> Option<TermId> {
        match self {
            Event::ConceptNew { term }
            | Event::ConceptActivate { term }
            | Event::ConceptRemember { term }
            | Event::ConceptForget { term, .. }
            | Event::ConceptFire { term } => Some(*term),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::CycleStart { time } | Event::CycleEnd { time } => {
                write!(f, "{} @{time}", self.name())
            }
            Event::ConceptForget { term, reason } => {
                write!(f, "{} {term}: {reason}", self.name())
            }
            Event::TaskAdd { task, reason } => match reason {
                Some(r) => write!(f, "{} {task}: {r}", self.name()),
                None => write!(f, "{} {task}", self.name()),
            },
            Event::TaskRemove { task, reason } => write!(f, "{} {task}: {reason}", self.name()),
            Event::Error { reason } => write!(f, "{}: {reason}", self.name()),
            Event::ConceptNew { term }
            | Event::ConceptActivate { term }
            | Event::ConceptRemember { term }
            | Event::ConceptFire { term } => write!(f, "{} {term}", self.name()),
        }
    }
}

// =============================================================================
// BUS
// =============================================================================

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

type Handler = Box<dyn FnMut(&Event)>;

/// Synchronous publish/subscribe channel.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(Subscription, Handler)>,
    next: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler.
    pub fn subscribe<F>(&mut self, handler: F) -> Subscription
    where
        F: FnMut(&Event) + 'static,
    {
        let id = Subscription(self.next);
        self.next = self.next.saturating_add(1);
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Register a handler that forwards a copy of every event to an
    /// unbounded channel. Sending never blocks; events are dropped once the
    /// receiver is gone.
    pub fn subscribe_channel(&mut self) -> (Subscription, Receiver<Event>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        let id = self.subscribe(move |event: &Event| {
            let _ = tx.send(event.clone());
        });
        (id, rx)
    }

    /// Remove a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(id, _)| *id != subscription);
        self.handlers.len() != before
    }

    /// Whether anyone is listening.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.handlers.is_empty()
    }

    /// Deliver an event to every handler.
    pub fn emit(&mut self, event: Event) {
        for (_, handler) in &mut self.handlers {
            handler(&event);
        }
    }
}
