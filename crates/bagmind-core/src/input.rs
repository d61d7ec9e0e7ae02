//! # Input Module
//!
//! The one place where other threads reach the memory.
//!
//! Producers hold a cloneable [`InputHandle`] and enqueue [`TaskInput`]s
//! from anywhere; the reasoner drains its [`Inbox`] at the start of a
//! cycle and nowhere else. Text is turned into inputs by a [`Parser`]
//! before it is enqueued.

use crate::MindError;
use crate::task::TaskInput;
use crossbeam_channel::{Receiver, Sender, TryRecvError};

// =============================================================================
// PARSER
// =============================================================================

/// Turns one line of text into a task input.
pub trait Parser {
    /// Parse a single task. Errors should be [`MindError::Parse`] with
    /// `line` 0; [`parse_lines`](Parser::parse_lines) fills in the line.
    fn parse(&self, text: &str) -> Result<TaskInput, MindError>;

    /// Parse a whole document, one task per line.
    ///
    /// Blank lines and lines starting with `#` are skipped. Each result is
    /// paired with its 1-based line number.
    fn parse_lines(&self, text: &str) -> Vec<(usize, Result<TaskInput, MindError>)> {
        text.lines()
            .enumerate()
            .filter_map(|(i, raw)| {
                let line = raw.trim();
                if line.is_empty() || line.starts_with('#') {
                    return None;
                }
                let number = i + 1;
                let parsed = self.parse(line).map_err(|e| match e {
                    MindError::Parse { reason, .. } => MindError::Parse {
                        line: number,
                        reason,
                    },
                    other => other,
                });
                Some((number, parsed))
            })
            .collect()
    }
}

// =============================================================================
// QUEUE
// =============================================================================

/// Cloneable sender side of the input queue.
#[derive(Debug, Clone)]
pub struct InputHandle {
    tx: Sender<TaskInput>,
}

impl InputHandle {
    /// Enqueue an input. Never blocks.
    pub fn send(&self, input: TaskInput) -> Result<(), MindError> {
        self.tx
            .send(input)
            .map_err(|_| MindError::Io("input queue closed".into()))
    }

    /// Parse `text` and enqueue the result.
    pub fn send_text<P: Parser + ?Sized>(&self, parser: &P, text: &str) -> Result<(), MindError> {
        self.send(parser.parse(text)?)
    }
}

/// Receiver side of the input queue, owned by the reasoner.
#[derive(Debug)]
pub struct Inbox {
    tx: Sender<TaskInput>,
    rx: Receiver<TaskInput>,
}

impl Default for Inbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Inbox {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self { tx, rx }
    }

    /// A new producer handle.
    #[must_use]
    pub fn handle(&self) -> InputHandle {
        InputHandle {
            tx: self.tx.clone(),
        }
    }

    /// Inputs waiting to be ingested.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Remove up to `limit` inputs in arrival order.
    pub fn drain(&self, limit: usize) -> Vec<TaskInput> {
        let mut out = Vec::with_capacity(limit.min(self.rx.len()));
        while out.len() < limit {
            match self.rx.try_recv() {
                Ok(input) => out.push(input),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        out
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::Punctuation;
    use crate::term::TermSpec;
    use std::thread;

    /// Accepts a bare atom name per line.
    struct AtomParser;

    impl Parser for AtomParser {
        fn parse(&self, text: &str) -> Result<TaskInput, MindError> {
            if text.contains(' ') {
                return Err(MindError::Parse {
                    line: 0,
                    reason: "unexpected space".into(),
                });
            }
            Ok(TaskInput::new(TermSpec::atom(text), Punctuation::Judgment))
        }
    }

    #[test]
    fn drain_respects_limit_and_order() {
        let inbox = Inbox::new();
        let handle = inbox.handle();
        for name in ["a", "b", "c"] {
            handle.send_text(&AtomParser, name).expect("send");
        }
        assert_eq!(inbox.pending(), 3);

        let first = inbox.drain(2);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].term, TermSpec::atom("a"));
        assert_eq!(first[1].term, TermSpec::atom("b"));
        assert_eq!(inbox.drain(5).len(), 1);
        assert!(inbox.drain(5).is_empty());
    }

    #[test]
    fn producers_on_other_threads() {
        let inbox = Inbox::new();
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let handle = inbox.handle();
                thread::spawn(move || {
                    handle
                        .send(TaskInput::new(
                            TermSpec::atom(format!("w{i}")),
                            Punctuation::Goal,
                        ))
                        .expect("send");
                })
            })
            .collect();
        for w in workers {
            w.join().expect("join");
        }
        assert_eq!(inbox.drain(10).len(), 4);
    }

    #[test]
    fn parse_lines_skips_comments_and_numbers_errors() {
        let text = "# header\na\n\nbad line\n  b  \n";
        let parsed = AtomParser.parse_lines(text);
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[0].0, 2);
        assert!(parsed[0].1.is_ok());
        match &parsed[1] {
            (4, Err(MindError::Parse { line, .. })) => assert_eq!(*line, 4),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(parsed[2].0, 5);
    }

    #[test]
    fn send_after_inbox_dropped_fails() {
        let inbox = Inbox::new();
        let handle = inbox.handle();
        drop(inbox);
        assert!(
            handle
                .send(TaskInput::new(TermSpec::atom("late"), Punctuation::Judgment))
                .is_err()
        );
    }
}
