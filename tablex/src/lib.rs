//! Runtime for table-driven lexers and parsers.
//!
//! `tablex` holds everything a generated analyzer needs at run time:
//!  * the grammar model ([`Grammar`], [`Symbol`], [`Production`]),
//!  * character atoms and deterministic automatons ([`Atoms`], [`Dfa`],
//!    [`CompiledPattern`]),
//!  * the lexical analyzer ([`Lexer`], [`LexRule`], [`Token`]),
//!  * the shift-reduce runtime ([`Parser`], [`ParseTable`]).
//!
//! The generators producing patterns and tables live in `tablex-gen`.

pub mod charclass;
mod cursor;
pub mod dfa;
mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod pattern;

pub use charclass::{Atom, AtomId, Atoms, LeafClass};
pub use cursor::{LexerCursor, Position, Span};
pub use dfa::{Dfa, DfaEdge, DfaNode};
pub use error::{LexError, ParseError};
pub use grammar::{
    Grammar, GrammarBuilder, NonTerminal, Production, SemanticAction, Symbol, Terminal, Vocabulary,
};
pub use lexer::{LexRule, Lexer, LexerStats, Token, Tokens, ValueFn};
pub use parser::{Action, Conflict, ConflictKind, Frame, ParseTable, Parser, ParserStats};
pub use pattern::CompiledPattern;
