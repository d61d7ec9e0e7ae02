//! Tests for the s-expression task syntax.

#![allow(clippy::unwrap_used, clippy::panic)]

use bagmind::SexprParser;
use bagmind_core::task::default_budget;
use bagmind_core::{MindError, Op, Parser, Punctuation, TermArena, TermSpec};

fn parse(text: &str) -> bagmind_core::TaskInput {
    SexprParser.parse(text).unwrap()
}

fn parse_error(text: &str) -> String {
    match SexprParser.parse(text) {
        Err(MindError::Parse { reason, .. }) => reason,
        other => panic!("expected a parse error for {text:?}, got {other:?}"),
    }
}

// =============================================================================
// TERMS
// =============================================================================

#[test]
fn inheritance_judgment() {
    let input = parse("(--> bird animal).");
    assert_eq!(
        input.term,
        TermSpec::inheritance(TermSpec::atom("bird"), TermSpec::atom("animal"))
    );
    assert_eq!(input.punctuation, Punctuation::Judgment);
    assert!(input.budget.is_none());
    assert!(input.parent.is_none());
}

#[test]
fn every_operator_symbol_parses() {
    let cases = [
        ("(--> a b)", Op::Inheritance),
        ("(<-> a b)", Op::Similarity),
        ("(==> a b)", Op::Implication),
        ("(<=> a b)", Op::Equivalence),
        ("(-- a)", Op::Negation),
        ("(&& a b)", Op::Conjunction),
        ("(|| a b)", Op::Disjunction),
        ("(* a b)", Op::Product),
        ("({} a b)", Op::SetExt),
        ("([] a b)", Op::SetInt),
    ];
    for (text, op) in cases {
        match parse(&format!("{text} .")).term {
            TermSpec::Compound(found, _) => assert_eq!(found, op, "{text}"),
            other => panic!("{text} parsed as {other:?}"),
        }
    }
}

#[test]
fn nested_compounds_variables_and_intervals() {
    let input = parse("(==> (&& (--> $x bird) +3) (--> $x flyer))?");
    let TermSpec::Compound(Op::Implication, args) = input.term else {
        panic!("not an implication");
    };
    assert_eq!(args.len(), 2);
    let TermSpec::Compound(Op::Conjunction, inner) = &args[0] else {
        panic!("not a conjunction");
    };
    assert_eq!(
        inner[0],
        TermSpec::inheritance(TermSpec::Variable("$x".into()), TermSpec::atom("bird"))
    );
    assert_eq!(inner[1], TermSpec::Interval(3));
    assert_eq!(input.punctuation, Punctuation::Question);
}

#[test]
fn parsed_terms_render_back() {
    let mut terms = TermArena::new();
    let input = parse("(--> (* a b) rel)!");
    let id = terms.intern(&input.term).unwrap();
    assert_eq!(terms.render(id), "(--> (* a b) rel)");
    assert_eq!(input.punctuation, Punctuation::Goal);
}

// =============================================================================
// PUNCTUATION AND BUDGET
// =============================================================================

#[test]
fn punctuation_may_be_glued_to_an_atom() {
    let input = parse("bird.");
    assert_eq!(input.term, TermSpec::atom("bird"));
    assert_eq!(input.punctuation, Punctuation::Judgment);

    let input = parse("?what@");
    assert_eq!(input.term, TermSpec::Variable("?what".into()));
    assert_eq!(input.punctuation, Punctuation::Quest);

    let input = parse("bird! %0.7%");
    assert_eq!(input.punctuation, Punctuation::Goal);
    assert!((input.budget.unwrap().priority() - 0.7).abs() < 1e-6);
}

#[test]
fn full_budget_is_used_as_given() {
    let budget = parse("(--> a b). %0.3;0.4;0.5%").budget.unwrap();
    assert!((budget.priority() - 0.3).abs() < 1e-6);
    assert!((budget.durability() - 0.4).abs() < 1e-6);
    assert!((budget.quality() - 0.5).abs() < 1e-6);
}

#[test]
fn partial_budget_takes_punctuation_defaults() {
    let (_, d, q) = default_budget(Punctuation::Question);
    let budget = parse("(--> a b)? %0.2%").budget.unwrap();
    assert!((budget.priority() - 0.2).abs() < 1e-6);
    assert!((budget.durability() - d).abs() < 1e-6);
    assert!((budget.quality() - q).abs() < 1e-6);
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn malformed_lines_are_rejected_with_a_reason() {
    assert!(parse_error("(--> a b)").contains("punctuation"));
    assert!(parse_error("(--> a b .").contains("unclosed"));
    assert!(parse_error("(~~ a b).").contains("unknown operator"));
    assert!(parse_error(") a .").contains("unexpected"));
    assert!(parse_error("(--> a b). %1.5%").contains("within"));
    assert!(parse_error("(--> a b). %0.1;0.2;0.3;0.4%").contains("at most three"));
    assert!(parse_error("(--> a b). %0.5% extra").contains("after the budget"));
    assert!(parse_error("").contains("expected a term"));
}

#[test]
fn runaway_nesting_is_rejected() {
    let depth = 200;
    let text = format!("{}x{} .", "(-- ".repeat(depth), ")".repeat(depth));
    assert!(parse_error(&text).contains("nested deeper"));
}

#[test]
fn documents_report_line_numbers() {
    let text = "# animals\n\n(--> bird animal).\n(--> bird\n(--> robin bird).\n";
    let results = SexprParser.parse_lines(text);
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, 3);
    assert!(results[0].1.is_ok());
    match &results[1].1 {
        Err(MindError::Parse { line, .. }) => assert_eq!(*line, 4),
        other => panic!("expected a parse error, got {other:?}"),
    }
    assert!(results[2].1.is_ok());
}
