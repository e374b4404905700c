//! The `aslr` parser-table generator.
//!
//! A [`Generator`] turns a [`Grammar`](tablex::Grammar) into a ready-to-run
//! [`Parser`](tablex::Parser). It works in phases over a dense integer copy
//! of the grammar: FIRST sets, FOLLOW sets (SLR only), the canonical
//! collection of item sets, and finally the ACTION/GOTO tables.
//!
//! Tables are built in [`ParserMode::Lr1`] by default; [`ParserMode::Slr`]
//! gives the smaller SLR(1) automaton. Slots claimed by two actions are
//! settled by an optional [`ConflictResolver`]; what it leaves unsettled is
//! recorded as a [`Conflict`](tablex::Conflict) on the parser.

mod generate;
mod items;
mod resolver;
mod sets;
mod symtab;
mod table;

pub use generate::{GenStats, Generator, ParserMode};
pub use resolver::{Assoc, ConflictResolver, LeftAssociative, ParserItem, Precedence, Preference};
