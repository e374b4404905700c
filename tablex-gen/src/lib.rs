//! Lexer and parser generators for `tablex`.
//!
//! `tablex-gen` provides two generators:
//!  * **`alex`**: compiles regular expressions into deterministic automatons
//!    over disjoint character atoms, and assembles them into lexers;
//!  * **`aslr`**: builds LR(1) or SLR(1) parse tables from a grammar, with a
//!    pluggable hook for settling conflicts.
//!
//! Both produce runtime values ([`tablex::CompiledPattern`],
//! [`tablex::Lexer`], [`tablex::Parser`]) rather than source code.
//!
//! ```rust
//! # use tablex::Grammar;
//! # use tablex_gen::alex::LexerBuilder;
//! # use tablex_gen::aslr::{Generator, LeftAssociative};
//! let mut g = Grammar::<i64>::builder();
//! let expr = g.nonterminal("Expr");
//! let minus = g.terminal("-");
//! let num = g.terminal("num");
//! g.rule(expr, [expr.into(), minus.into(), expr.into()]).action(|v| v[0] - v[2]);
//! g.rule(expr, [num.into()]).action(|v| v[0]);
//! let parser = Generator::new()
//!     .resolver(LeftAssociative::new([minus]))
//!     .generate(g.build(expr));
//!
//! let mut lex = LexerBuilder::new();
//! lex.rule_with("[0-9]+", num, |s| s.parse().unwrap_or_default()).unwrap();
//! lex.rule("-", minus).unwrap();
//! lex.ignore(" +").unwrap();
//! let lexer = lex.build();
//!
//! assert_eq!(parser.parse_results(lexer.analyze("7 - 3 - 2")).unwrap(), 2);
//! ```

pub mod alex;
pub mod aslr;
