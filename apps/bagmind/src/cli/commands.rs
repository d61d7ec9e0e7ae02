//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Each command has a pure half that returns data (`run_file`,
//! `check_file`) and a `cmd_*` half that prints it.

use crate::deriver::SyllogisticDeriver;
use crate::parser::SexprParser;
use crate::settings;
use bagmind_core::{CycleReport, MindError, Parser, Reasoner, ReasonerConfig};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// =============================================================================
// FILE LIMITS
// =============================================================================

/// Maximum task file size (100 MB).
///
/// This prevents memory exhaustion from malicious or accidental large files.
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Concepts listed in the run summary.
const TOP_CONCEPTS: usize = 10;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), MindError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| MindError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(MindError::Io(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve a path to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, MindError> {
    let canonical = path
        .canonicalize()
        .map_err(|e| MindError::Io(format!("Invalid file path '{}': {}", path.display(), e)))?;

    if !canonical.is_file() {
        return Err(MindError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

fn read_task_file(path: &Path) -> Result<String, MindError> {
    let path = validate_file_path(path)?;
    validate_file_size(&path, MAX_INPUT_FILE_SIZE)?;
    std::fs::read_to_string(&path)
        .map_err(|e| MindError::Io(format!("Cannot read '{}': {}", path.display(), e)))
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// RUN COMMAND
// =============================================================================

/// A concept and its priority at the end of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedConcept {
    pub term: String,
    pub priority: f32,
}

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub report: CycleReport,
    /// Lines that did not parse and were left out.
    pub skipped: usize,
    /// Inputs still queued when the run ended.
    pub pending: usize,
    pub concepts: usize,
    pub tasks: usize,
    pub events: BTreeMap<&'static str, usize>,
    pub top_concepts: Vec<RankedConcept>,
}

/// Parse `path`, queue every task and run `cycles` cycles.
pub fn run_file(
    config: ReasonerConfig,
    path: &Path,
    cycles: u64,
) -> Result<RunSummary, MindError> {
    let text = read_task_file(path)?;
    run_text(config, &text, cycles)
}

/// [`run_file`] over text already in memory.
pub fn run_text(config: ReasonerConfig, text: &str, cycles: u64) -> Result<RunSummary, MindError> {
    let mut reasoner = Reasoner::new(config, SyllogisticDeriver::new())?;
    let (_, events) = reasoner.events_mut().subscribe_channel();

    let mut skipped = 0;
    for (line, parsed) in SexprParser.parse_lines(text) {
        match parsed {
            Ok(input) => reasoner.enqueue(input)?,
            Err(e) => {
                warn!(line, error = %e, "skipping task");
                skipped += 1;
            }
        }
    }

    let report = reasoner.run(cycles)?;
    info!(
        cycles = report.cycles,
        derived = report.derived,
        concepts = reasoner.concepts().len(),
        "run finished"
    );

    let mut counts = BTreeMap::new();
    for event in events.try_iter() {
        *counts.entry(event.name()).or_insert(0) += 1;
    }

    let top_concepts = reasoner
        .top_concepts(TOP_CONCEPTS)
        .into_iter()
        .map(|(term, priority)| RankedConcept {
            term: reasoner.terms().render(term),
            priority,
        })
        .collect();

    let summary = RunSummary {
        report,
        skipped,
        pending: reasoner.pending(),
        concepts: reasoner.concepts().len(),
        tasks: reasoner.tasks().len(),
        events: counts,
        top_concepts,
    };
    reasoner.shutdown();
    Ok(summary)
}

/// Run a task file and print the summary.
pub fn cmd_run(
    config: ReasonerConfig,
    input: &Path,
    cycles: u64,
    json_mode: bool,
) -> Result<(), MindError> {
    let summary = run_file(config, input, cycles)?;

    if json_mode {
        print_json(&summary);
        return Ok(());
    }

    let report = &summary.report;
    println!("bagmind Run");
    println!("===========");
    println!("Input:    {}", input.display());
    println!();
    println!("Cycles:   {}", report.cycles);
    println!("Accepted: {}", report.accepted);
    println!("Rejected: {}", report.rejected);
    println!("Derived:  {}", report.derived);
    println!("Errors:   {}", report.errors);
    if summary.skipped > 0 {
        println!("Skipped:  {} (unparsable)", summary.skipped);
    }
    if summary.pending > 0 {
        println!("Pending:  {} (still queued)", summary.pending);
    }
    println!();
    println!("Concepts: {}", summary.concepts);
    println!("Tasks:    {}", summary.tasks);

    println!();
    println!("Events:");
    for (name, count) in &summary.events {
        println!("  {:<16} {}", name, count);
    }

    if !summary.top_concepts.is_empty() {
        println!();
        println!("Top concepts:");
        for concept in &summary.top_concepts {
            println!("  {:.3}  {}", concept.priority, concept.term);
        }
    }

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// A line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineError {
    pub line: usize,
    pub reason: String,
}

/// Parse results for a task file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Task lines seen (comments and blank lines excluded).
    pub tasks: usize,
    pub errors: Vec<LineError>,
}

impl CheckReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse `text` and collect every error.
pub fn check_text(text: &str) -> CheckReport {
    let mut report = CheckReport::default();
    for (line, parsed) in SexprParser.parse_lines(text) {
        report.tasks += 1;
        if let Err(e) = parsed {
            let reason = match e {
                MindError::Parse { reason, .. } => reason,
                other => other.to_string(),
            };
            report.errors.push(LineError { line, reason });
        }
    }
    report
}

/// Parse a task file and collect every error.
pub fn check_file(path: &Path) -> Result<CheckReport, MindError> {
    let text = read_task_file(path)?;
    Ok(check_text(&text))
}

/// Check a task file; fails when any line does not parse.
pub fn cmd_check(input: &Path, json_mode: bool) -> Result<(), MindError> {
    let report = check_file(input)?;

    if json_mode {
        print_json(&report);
    } else {
        for error in &report.errors {
            println!("{}:{}: {}", input.display(), error.line, error.reason);
        }
        println!(
            "{} task(s), {} error(s)",
            report.tasks,
            report.errors.len()
        );
    }

    match report.errors.first() {
        None => Ok(()),
        Some(first) => Err(MindError::Parse {
            line: first.line,
            reason: format!(
                "{} of {} task(s) failed to parse",
                report.errors.len(),
                report.tasks
            ),
        }),
    }
}

// =============================================================================
// CONFIG COMMAND
// =============================================================================

/// Print the effective configuration.
pub fn cmd_config(config: &ReasonerConfig, json_mode: bool) -> Result<(), MindError> {
    if json_mode {
        print_json(config);
        return Ok(());
    }
    print!("{}", settings::to_toml(config)?);
    Ok(())
}
