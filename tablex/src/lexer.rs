//! Table-driven lexical analyzer.
//!
//! A [`Lexer`] is an ordered list of [`LexRule`]s, each a compiled pattern
//! with an optional token kind. At every step the longest match among all
//! rules wins; among equally long matches the rule declared first wins.
//! Rules without a token kind (whitespace, comments) consume input silently.

use crate::cursor::{LexerCursor, Span};
use crate::error::LexError;
use crate::grammar::Terminal;
use crate::pattern::CompiledPattern;
use std::fmt;
use std::iter::FusedIterator;
use std::sync::Arc;

/// A lexical token: a terminal, its semantic value and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<V> {
    pub symbol: Terminal,
    pub value: V,
    pub span: Option<Span>,
}

impl<V> Token<V> {
    pub fn new(symbol: Terminal, value: V) -> Self {
        Self {
            symbol,
            value,
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Computes a token's semantic value from its lexeme.
pub type ValueFn<V> = Arc<dyn Fn(&str) -> V + Send + Sync>;

/// One lexical rule.
pub struct LexRule<V> {
    pattern: CompiledPattern,
    token: Option<Terminal>,
    value: Option<ValueFn<V>>,
}

impl<V> Clone for LexRule<V> {
    fn clone(&self) -> Self {
        Self {
            pattern: self.pattern.clone(),
            token: self.token,
            value: self.value.clone(),
        }
    }
}

impl<V> fmt::Debug for LexRule<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LexRule")
            .field("token", &self.token)
            .field("value", &self.value.is_some())
            .finish_non_exhaustive()
    }
}

impl<V> LexRule<V> {
    /// A rule producing `token` for every lexeme matched by `pattern`.
    pub fn new(pattern: CompiledPattern, token: Terminal) -> Self {
        Self {
            pattern,
            token: Some(token),
            value: None,
        }
    }

    /// A rule whose lexemes are consumed without producing a token.
    pub fn ignore(pattern: CompiledPattern) -> Self {
        Self {
            pattern,
            token: None,
            value: None,
        }
    }

    /// Sets the function deriving the semantic value from the lexeme.
    pub fn value<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> V + Send + Sync + 'static,
    {
        self.value = Some(Arc::new(f));
        self
    }

    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    pub fn token(&self) -> Option<Terminal> {
        self.token
    }

    fn make_value(&self, lexeme: &str) -> V
    where
        V: Default,
    {
        match &self.value {
            Some(f) => f(lexeme),
            None => V::default(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LexerStats {
    /// Characters consumed, ignored lexemes included.
    pub chars: usize,
    pub tokens: usize,
    /// Lexemes matched by rules without a token kind.
    pub skipped: usize,
}

/// An ordered set of lexical rules.
pub struct Lexer<V> {
    rules: Vec<LexRule<V>>,
}

impl<V> Clone for Lexer<V> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<V> fmt::Debug for Lexer<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lexer").field("rules", &self.rules).finish()
    }
}

impl<V> Lexer<V> {
    pub fn new(rules: impl IntoIterator<Item = LexRule<V>>) -> Self {
        Self {
            rules: rules.into_iter().collect(),
        }
    }

    pub fn rules(&self) -> &[LexRule<V>] {
        &self.rules
    }

    /// Lazily tokenizes `input`.
    pub fn analyze<'a>(&'a self, input: &'a str) -> Tokens<'a, V> {
        Tokens {
            lexer: self,
            input,
            cursor: LexerCursor::new(),
            done: false,
            stats: LexerStats::default(),
        }
    }

    /// Index and byte length of the winning rule at the start of `rest`.
    fn best_match(&self, rest: &str) -> Option<(usize, usize)> {
        let mut best: Option<(usize, usize)> = None;
        for (i, rule) in self.rules.iter().enumerate() {
            let Some(len) = rule.pattern.longest_match_len(rest) else {
                continue;
            };
            // An empty lexeme would never advance the input.
            if len == 0 {
                continue;
            }
            if best.is_none_or(|(_, n)| len > n) {
                best = Some((i, len));
            }
        }
        best
    }
}

/// Token stream produced by [`Lexer::analyze`].
///
/// Yields `Err` at most once, after which the stream is over.
pub struct Tokens<'a, V> {
    lexer: &'a Lexer<V>,
    input: &'a str,
    cursor: LexerCursor,
    done: bool,
    stats: LexerStats,
}

impl<V: Default> Tokens<'_, V> {
    pub fn stats(&self) -> LexerStats {
        self.stats.clone()
    }

    /// The input not yet consumed.
    pub fn remaining(&self) -> &str {
        &self.input[self.cursor.pos..]
    }

    #[inline]
    pub fn try_next(&mut self) -> Result<Option<Token<V>>, LexError> {
        if self.done {
            return Ok(None);
        }
        loop {
            let rest = &self.input[self.cursor.pos..];
            if rest.is_empty() {
                self.done = true;
                return Ok(None);
            }
            let Some((index, len)) = self.lexer.best_match(rest) else {
                self.done = true;
                log::trace!("NO MATCH at {}: {:?}", self.cursor.position(), rest);
                return Err(LexError::no_matching_rule(self.cursor.position(), rest));
            };
            let lexeme = &rest[..len];
            let rule = &self.lexer.rules[index];
            log::trace!(
                "MATCHED: rule={}, token={:?}, lexeme={:?}",
                index,
                rule.token,
                lexeme
            );
            self.cursor.advance(lexeme);
            self.stats.chars += lexeme.chars().count();
            match rule.token {
                Some(symbol) => {
                    self.stats.tokens += 1;
                    return Ok(Some(Token {
                        symbol,
                        value: rule.make_value(lexeme),
                        span: Some(self.cursor.span),
                    }));
                }
                None => self.stats.skipped += 1,
            }
        }
    }
}

impl<V: Default> Iterator for Tokens<'_, V> {
    type Item = Result<Token<V>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.try_next().transpose()
    }
}

impl<V: Default> FusedIterator for Tokens<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charclass::{Atom, Atoms, LeafClass};
    use crate::cursor::Position;
    use crate::dfa::Dfa;
    use crate::span;
    use std::collections::BTreeSet;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    /// `[chars]+` built by hand.
    fn one_or_more(chars: &str) -> CompiledPattern {
        let atoms = Atoms::new([Atom {
            class: LeafClass::Explicit(chars.chars().collect()),
            origins: BTreeSet::from([0]),
        }]);
        let mut dfa = Dfa::new();
        let s0 = dfa.add_node(false);
        let s1 = dfa.add_node(true);
        dfa.set_start(s0);
        dfa.add_edge(s0, 0, s1);
        dfa.add_edge(s1, 0, s1);
        CompiledPattern::new(atoms, dfa)
    }

    /// The literal `word`, built by hand.
    fn literal(word: &str) -> CompiledPattern {
        let chars: Vec<char> = word.chars().collect();
        let distinct: BTreeSet<char> = chars.iter().copied().collect();
        let atoms = Atoms::new(distinct.iter().enumerate().map(|(i, &c)| Atom {
            class: LeafClass::Explicit(BTreeSet::from([c])),
            origins: BTreeSet::from([i]),
        }));
        let mut dfa = Dfa::new();
        let mut state = dfa.add_node(chars.is_empty());
        dfa.set_start(state);
        for (i, c) in chars.iter().enumerate() {
            let next = dfa.add_node(i + 1 == chars.len());
            dfa.add_edge(state, atoms.classify(*c), next);
            state = next;
        }
        CompiledPattern::new(atoms, dfa)
    }

    struct Kinds {
        word: Terminal,
        num: Terminal,
        kw: Terminal,
    }

    fn lexer() -> (Lexer<String>, Kinds) {
        let mut vocab = crate::grammar::Vocabulary::new();
        let kinds = Kinds {
            word: vocab.terminal("word"),
            num: vocab.terminal("num"),
            kw: vocab.terminal("if"),
        };
        let lexer = Lexer::new([
            LexRule::new(literal("if"), kinds.kw),
            LexRule::new(one_or_more("abcdefghijklmnopqrstuvwxyz"), kinds.word)
                .value(|s| s.to_string()),
            LexRule::new(one_or_more("0123456789"), kinds.num).value(|s| s.to_string()),
            LexRule::ignore(one_or_more(" \n")),
        ]);
        (lexer, kinds)
    }

    #[test]
    fn longest_match_then_declaration_order() {
        init_logger();
        let (lexer, k) = lexer();
        let tokens: Vec<_> = lexer
            .analyze("if iffy 42")
            .collect::<Result<_, _>>()
            .unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.symbol).collect();
        assert_eq!(kinds, vec![k.kw, k.word, k.num]);
        assert_eq!(tokens[0].value, "");
        assert_eq!(tokens[1].value, "iffy");
        assert_eq!(tokens[2].value, "42");
    }

    #[test]
    fn spans_follow_lines() {
        let (lexer, _) = lexer();
        let tokens: Vec<_> = lexer.analyze("ab\n cd").map(|t| t.unwrap()).collect();
        assert_eq!(tokens[0].span, span!(0, 0, 0, 2));
        assert_eq!(tokens[1].span, span!(1, 1, 1, 3));
    }

    #[test]
    fn stats_count_skipped_lexemes() {
        let (lexer, _) = lexer();
        let mut tokens = lexer.analyze(" a  1 ");
        while tokens.try_next().unwrap().is_some() {}
        let stats = tokens.stats();
        assert_eq!(stats.tokens, 2);
        assert_eq!(stats.skipped, 3);
        assert_eq!(stats.chars, 6);
    }

    #[test]
    fn no_matching_rule_ends_stream() {
        init_logger();
        let (lexer, k) = lexer();
        let mut tokens = lexer.analyze("ab ?cd");
        let first = tokens.next().unwrap().unwrap();
        assert_eq!(first.symbol, k.word);
        let err = tokens.next().unwrap().unwrap_err();
        assert_eq!(
            err,
            LexError::NoMatchingRule {
                position: Position::new(0, 3),
                remaining: "?cd".into(),
            }
        );
        assert_eq!(tokens.remaining(), "?cd");
        assert!(tokens.next().is_none());
        assert!(tokens.next().is_none());
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (lexer, _) = lexer();
        assert_eq!(lexer.analyze("").count(), 0);
        assert_eq!(lexer.analyze("   ").count(), 0);
    }

    #[test]
    fn empty_matches_are_ignored() {
        let mut vocab = crate::grammar::Vocabulary::new();
        let t = vocab.terminal("t");
        let lexer: Lexer<()> = Lexer::new([LexRule::new(literal(""), t)]);
        let mut tokens = lexer.analyze("x");
        assert!(matches!(
            tokens.next(),
            Some(Err(LexError::NoMatchingRule { .. }))
        ));
    }
}
