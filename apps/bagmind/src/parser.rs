//! # Task Syntax
//!
//! The reference text format for tasks, one per line:
//!
//! ```text
//! TERM PUNCT [%p;d;q%]
//! ```
//!
//! - TERM: an atom, a variable (`$x`, `#x`, `?x`), an interval (`+3`) or a
//!   compound `(op arg ...)` with one of `--> <-> ==> <=> -- && || * {} []`
//! - PUNCT: `.` judgment, `?` question, `!` goal, `@` quest
//! - the optional budget lists priority, durability and quality; missing
//!   trailing values take the punctuation's default
//!
//! A bare atom may carry its punctuation without a space (`bird.`).

use bagmind_core::primitives::MAX_TERM_DEPTH;
use bagmind_core::task::default_budget;
use bagmind_core::{Budget, MindError, Op, Parser, Punctuation, TaskInput, TermSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Word(String),
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut word = String::new();
    let flush = |word: &mut String, tokens: &mut Vec<Token>| {
        if !word.is_empty() {
            tokens.push(Token::Word(std::mem::take(word)));
        }
    };

    for ch in text.chars() {
        match ch {
            '(' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Open);
            }
            ')' => {
                flush(&mut word, &mut tokens);
                tokens.push(Token::Close);
            }
            c if c.is_whitespace() => flush(&mut word, &mut tokens),
            c => word.push(c),
        }
    }
    flush(&mut word, &mut tokens);
    tokens
}

fn error(reason: impl Into<String>) -> MindError {
    MindError::Parse {
        line: 0,
        reason: reason.into(),
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// Parser for the s-expression task syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct SexprParser;

impl SexprParser {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Parser for SexprParser {
    fn parse(&self, text: &str) -> Result<TaskInput, MindError> {
        let tokens = tokenize(text);
        let mut cursor = Cursor {
            tokens: &tokens,
            pos: 0,
        };

        let term = cursor.term(0)?;
        let (term, punctuation) = match cursor.word() {
            Some(word) => match punctuation(word) {
                Some(p) => (term, p),
                None => {
                    // `bird. %0.5%`: the punctuation is glued to the atom
                    cursor.pos -= 1;
                    split_glued(term)?
                }
            },
            None => split_glued(term)?,
        };

        let mut input = TaskInput::new(term, punctuation);
        if let Some(word) = cursor.word() {
            input = input.with_budget(budget(word, punctuation)?);
        }
        if cursor.pos < tokens.len() {
            return Err(error("unexpected input after the budget"));
        }
        Ok(input)
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// The next token, if it is a word.
    fn word(&mut self) -> Option<&'a str> {
        match self.tokens.get(self.pos)? {
            Token::Word(w) => {
                self.pos += 1;
                Some(w)
            }
            _ => None,
        }
    }

    fn term(&mut self, depth: usize) -> Result<TermSpec, MindError> {
        if depth > MAX_TERM_DEPTH {
            return Err(error(format!("term nested deeper than {MAX_TERM_DEPTH}")));
        }
        match self.next() {
            None => Err(error("expected a term")),
            Some(Token::Close) => Err(error("unexpected ')'")),
            Some(Token::Word(w)) => Ok(leaf(w)),
            Some(Token::Open) => {
                let symbol = match self.next() {
                    Some(Token::Word(w)) => w.clone(),
                    _ => return Err(error("expected an operator after '('")),
                };
                let op = Op::from_symbol(&symbol)
                    .ok_or_else(|| error(format!("unknown operator '{symbol}'")))?;
                let mut args = Vec::new();
                loop {
                    match self.tokens.get(self.pos) {
                        None => return Err(error("unclosed '('")),
                        Some(Token::Close) => {
                            self.pos += 1;
                            break;
                        }
                        Some(_) => args.push(self.term(depth + 1)?),
                    }
                }
                Ok(TermSpec::Compound(op, args))
            }
        }
    }
}

fn leaf(word: &str) -> TermSpec {
    if let Some(n) = word.strip_prefix('+').and_then(|d| d.parse::<u32>().ok()) {
        return TermSpec::Interval(n);
    }
    if word.len() > 1 && word.starts_with(['$', '#', '?']) {
        return TermSpec::Variable(word.to_string());
    }
    TermSpec::Atom(word.to_string())
}

fn punctuation(word: &str) -> Option<Punctuation> {
    let mut chars = word.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Punctuation::from_symbol(c),
        _ => None,
    }
}

/// Peel a trailing punctuation symbol off a bare atom.
fn split_glued(term: TermSpec) -> Result<(TermSpec, Punctuation), MindError> {
    let name = match &term {
        TermSpec::Atom(name) | TermSpec::Variable(name) => name.as_str(),
        _ => "",
    };
    let mut chars = name.chars();
    let glued = chars
        .next_back()
        .and_then(Punctuation::from_symbol)
        .filter(|_| !chars.as_str().is_empty());
    match glued {
        Some(p) => Ok((leaf(chars.as_str()), p)),
        None => Err(error("expected punctuation: one of . ? ! @")),
    }
}

fn budget(word: &str, punctuation: Punctuation) -> Result<Budget, MindError> {
    let inner = word
        .strip_prefix('%')
        .and_then(|w| w.strip_suffix('%'))
        .filter(|w| !w.is_empty())
        .ok_or_else(|| error(format!("malformed budget '{word}'")))?;

    let values = inner
        .split(';')
        .map(|v| {
            v.trim()
                .parse::<f32>()
                .ok()
                .filter(|x| (0.0..=1.0).contains(x))
                .ok_or_else(|| error(format!("budget value '{v}' is not within [0, 1]")))
        })
        .collect::<Result<Vec<f32>, MindError>>()?;
    if values.len() > 3 {
        return Err(error("a budget has at most three values"));
    }

    let (p, d, q) = default_budget(punctuation);
    let at = |i: usize, fallback: f32| values.get(i).copied().unwrap_or(fallback);
    Ok(Budget::new(at(0, p), at(1, d), at(2, q)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizer_splits_parentheses() {
        assert_eq!(
            tokenize("(--> a b)."),
            vec![
                Token::Open,
                Token::Word("-->".into()),
                Token::Word("a".into()),
                Token::Word("b".into()),
                Token::Close,
                Token::Word(".".into()),
            ]
        );
    }

    #[test]
    fn leaves_classify() {
        assert_eq!(leaf("+4"), TermSpec::Interval(4));
        assert_eq!(leaf("$x"), TermSpec::Variable("$x".into()));
        assert_eq!(leaf("+x"), TermSpec::Atom("+x".into()));
        assert_eq!(leaf("#"), TermSpec::Atom("#".into()));
    }
}
