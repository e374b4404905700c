//! The `alex` lexer generator.
//!
//! Regular expressions, written as [`Regex`] trees or in the textual syntax
//! of [`parse_regex`], are compiled into [`CompiledPattern`]s: their
//! character classes are split into disjoint atoms, a Thompson NFA is built
//! over the atoms and determinized by subset construction.
//!
//! [`LexerBuilder`] assembles compiled rules into a [`Lexer`]:
//!
//! ```rust
//! # use tablex::Vocabulary;
//! # use tablex_gen::alex::LexerBuilder;
//! let mut vocab = Vocabulary::new();
//! let (num, ident) = (vocab.terminal("num"), vocab.terminal("ident"));
//!
//! let mut b = LexerBuilder::<i64>::new();
//! b.define("digit", "[0-9]").unwrap();
//! b.rule_with("{{digit}}+", num, |s| s.parse().unwrap_or_default()).unwrap();
//! b.rule("[a-z_]([a-z_]|{{digit}})*", ident).unwrap();
//! b.ignore("[ \\t\\n]+").unwrap();
//! let lexer = b.build();
//!
//! let values: Vec<i64> = lexer.analyze("x1 42").map(|t| t.unwrap().value).collect();
//! assert_eq!(values, [0, 42]);
//! ```

mod charclass;
mod nfa;
mod regex;
mod syntax;

pub use charclass::{Atomization, CharClass, atomize};
pub use nfa::Nfa;
pub use regex::Regex;
pub use syntax::parse_regex;

use anyhow::{Context, Result, bail};
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tablex::{CompiledPattern, LexRule, Lexer, Terminal};

static VAR_IN_REGEX_RE: Lazy<::regex::Regex> = Lazy::new(|| {
    ::regex::Regex::new(r#"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}"#)
        .unwrap_or_else(|e| unreachable!("variable reference pattern: {}", e))
});

/// Parses and compiles a textual regular expression.
pub fn compile(pattern: &str) -> Result<CompiledPattern> {
    Ok(parse_regex(pattern)?.compile())
}

/// Collects lexical rules in declaration order.
///
/// Patterns may refer to earlier [`define`](LexerBuilder::define)d patterns
/// as `{{name}}`; a reference expands to the named pattern in parentheses.
pub struct LexerBuilder<V> {
    vars: HashMap<String, String>,
    rules: Vec<LexRule<V>>,
}

impl<V> Default for LexerBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> LexerBuilder<V> {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
            rules: Vec::new(),
        }
    }

    /// Names `pattern` for use in later patterns.
    pub fn define(&mut self, name: &str, pattern: &str) -> Result<&mut Self> {
        let expanded = expand_vars(pattern, &self.vars)?;
        parse_regex(&expanded).with_context(|| format!("definition of {:?}", name))?;
        self.vars.insert(name.to_string(), expanded);
        Ok(self)
    }

    /// Adds a rule producing `token` with the null value.
    pub fn rule(&mut self, pattern: &str, token: Terminal) -> Result<&mut Self> {
        let pattern = self.compile(pattern)?;
        self.rules.push(LexRule::new(pattern, token));
        Ok(self)
    }

    /// Adds a rule producing `token` with a value computed from the lexeme.
    pub fn rule_with<F>(&mut self, pattern: &str, token: Terminal, value: F) -> Result<&mut Self>
    where
        F: Fn(&str) -> V + Send + Sync + 'static,
    {
        let pattern = self.compile(pattern)?;
        self.rules.push(LexRule::new(pattern, token).value(value));
        Ok(self)
    }

    /// Adds a rule whose lexemes produce no token.
    pub fn ignore(&mut self, pattern: &str) -> Result<&mut Self> {
        let pattern = self.compile(pattern)?;
        self.rules.push(LexRule::ignore(pattern));
        Ok(self)
    }

    /// Adds a rule from a hand-built expression.
    pub fn regex(&mut self, regex: &Regex, token: Terminal) -> &mut Self {
        self.rules.push(LexRule::new(regex.compile(), token));
        self
    }

    pub fn push(&mut self, rule: LexRule<V>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn build(self) -> Lexer<V> {
        log::debug!("lexer with {} rules", self.rules.len());
        Lexer::new(self.rules)
    }

    fn compile(&self, pattern: &str) -> Result<CompiledPattern> {
        let expanded = expand_vars(pattern, &self.vars)?;
        compile(&expanded).with_context(|| format!("rule {}", self.rules.len()))
    }
}

/// Replaces every `{{name}}` in `input` by the definition of `name`.
///
/// Definitions are stored already expanded, so one pass suffices.
fn expand_vars(input: &str, vars: &HashMap<String, String>) -> Result<String> {
    let mut missing: HashSet<String> = HashSet::new();
    let out = VAR_IN_REGEX_RE.replace_all(input, |caps: &::regex::Captures| {
        let name = &caps[1];
        match vars.get(name) {
            Some(val) => format!("({})", val),
            None => {
                missing.insert(name.to_string());
                caps[0].to_string()
            }
        }
    });
    if !missing.is_empty() {
        let mut list: Vec<String> = missing.into_iter().collect();
        list.sort();
        bail!("unknown variable(s): {}", list.join(", "));
    }
    Ok(out.into_owned())
}
