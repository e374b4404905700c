//! Errors raised by the lexical analyzer and the shift-reduce runtime.
//!
//! Both are data errors: they describe input the automatons reject. Defects
//! in generated tables (an index out of range) panic instead.
//!
//! # Examples
//!
//! ```rust
//! # use tablex::{LexError, Position};
//! let err = LexError::NoMatchingRule {
//!     position: Position::new(2, 7),
//!     remaining: "@@".into(),
//! };
//! assert_eq!(err.to_string(), "no lexical rule matches \"@@\" at 2:7");
//! ```

use crate::cursor::{Position, Span};
use smartstring::alias::String;
use thiserror::Error;

/// Longest remaining input echoed back in a [`LexError`].
const REMAINING_PREVIEW: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No rule matches a non-empty prefix of the remaining input.
    #[error("no lexical rule matches {remaining:?} at {position}")]
    NoMatchingRule {
        position: Position,
        /// A prefix of the unmatched input.
        remaining: String,
    },
}

impl LexError {
    pub(crate) fn no_matching_rule(position: Position, rest: &str) -> Self {
        LexError::NoMatchingRule {
            position,
            remaining: rest.chars().take(REMAINING_PREVIEW).collect(),
        }
    }
}

/// Why the shift-reduce runtime rejected its input.
///
/// `E` is the error type of the token stream; it is [`LexError`] when a
/// lexer feeds the parser directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError<E = LexError> {
    /// The action table has no entry for the current state and lookahead.
    #[error("unexpected {symbol} in state {state}{}", display_span(.span))]
    UndefinedAction {
        state: usize,
        symbol: String,
        span: Option<Span>,
    },
    /// The goto table has no entry after a reduction. Only reachable with
    /// hand-edited tables.
    #[error("no goto for {symbol} from state {state}")]
    UndefinedGoto { state: usize, symbol: String },
    /// A reduction needs more frames than the stack holds. Only reachable
    /// with hand-edited tables.
    #[error("reduce by production {production} underflows the stack in state {state}")]
    StackUnderflow { state: usize, production: usize },
    /// The input ended before the automaton accepted.
    #[error("unexpected end of input")]
    UnexpectedEndOfInput,
    #[error(transparent)]
    Lex(E),
}

fn display_span(span: &Option<Span>) -> std::string::String {
    match span {
        Some(span) => format!(" at {}", span.display()),
        None => std::string::String::new(),
    }
}
