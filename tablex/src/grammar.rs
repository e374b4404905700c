//! Grammar model: symbols, productions and grammars.
//!
//! Symbols are dense ids handed out by a [`Vocabulary`]. Identity is the id,
//! never the display name: two terminals registered under the same name are
//! two different terminals.
//!
//! ```rust
//! # use tablex::{Grammar, Symbol};
//! let mut g = Grammar::<i64>::builder();
//! let expr = g.nonterminal("Expr");
//! let num = g.terminal("num");
//! g.rule(expr, [num.into()]).action(|v| v[0]);
//! let grammar = g.build(expr);
//! assert_eq!(grammar.productions().len(), 1);
//! assert_eq!(grammar.name(Symbol::from(num)), "num");
//! ```

use smartstring::alias::String;
use std::fmt;
use std::sync::Arc;

/// A terminal symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Terminal(u32);

/// A nonterminal symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonTerminal(u32);

impl Terminal {
    /// End of input. Appended to every token stream by the parser.
    pub const EOF: Terminal = Terminal(0);
    /// The empty string.
    pub const EPSILON: Terminal = Terminal(1);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl NonTerminal {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A grammar symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }
}

impl From<Terminal> for Symbol {
    fn from(t: Terminal) -> Self {
        Symbol::Terminal(t)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(n: NonTerminal) -> Self {
        Symbol::NonTerminal(n)
    }
}

/// Allocates symbols and remembers their display names.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    terminals: Vec<String>,
    nonterminals: Vec<String>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new()
    }
}

impl Vocabulary {
    /// Creates a vocabulary holding only the reserved `eof` and `epsilon`
    /// terminals.
    pub fn new() -> Self {
        Self {
            terminals: vec![String::from("eof"), String::from("epsilon")],
            nonterminals: Vec::new(),
        }
    }

    /// Allocates a fresh terminal.
    pub fn terminal(&mut self, name: impl AsRef<str>) -> Terminal {
        let id = self.terminals.len() as u32;
        self.terminals.push(String::from(name.as_ref()));
        Terminal(id)
    }

    /// Allocates a fresh nonterminal.
    pub fn nonterminal(&mut self, name: impl AsRef<str>) -> NonTerminal {
        let id = self.nonterminals.len() as u32;
        self.nonterminals.push(String::from(name.as_ref()));
        NonTerminal(id)
    }

    pub fn terminal_name(&self, t: Terminal) -> &str {
        self.terminals.get(t.index()).map_or("?", |s| s.as_str())
    }

    pub fn nonterminal_name(&self, n: NonTerminal) -> &str {
        self.nonterminals.get(n.index()).map_or("?", |s| s.as_str())
    }

    pub fn name(&self, sym: Symbol) -> &str {
        match sym {
            Symbol::Terminal(t) => self.terminal_name(t),
            Symbol::NonTerminal(n) => self.nonterminal_name(n),
        }
    }

    pub fn n_terminals(&self) -> usize {
        self.terminals.len()
    }

    pub fn n_nonterminals(&self) -> usize {
        self.nonterminals.len()
    }

    /// Every terminal in allocation order, reserved ones first.
    pub fn terminals(&self) -> impl Iterator<Item = Terminal> + use<> {
        (0..self.terminals.len() as u32).map(Terminal)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = NonTerminal> + use<> {
        (0..self.nonterminals.len() as u32).map(NonTerminal)
    }
}

/// Combines the semantic values of a production's right-hand side.
pub type SemanticAction<V> = Arc<dyn Fn(Vec<V>) -> V + Send + Sync>;

/// A production `from -> to`, with an optional semantic action.
pub struct Production<V> {
    pub from: NonTerminal,
    pub to: Vec<Symbol>,
    action: Option<SemanticAction<V>>,
}

impl<V> Clone for Production<V> {
    fn clone(&self) -> Self {
        Self {
            from: self.from,
            to: self.to.clone(),
            action: self.action.clone(),
        }
    }
}

impl<V> fmt::Debug for Production<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Production")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("action", &self.action.is_some())
            .finish()
    }
}

impl<V> Production<V> {
    pub fn new(from: NonTerminal, to: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            from,
            to: to.into_iter().collect(),
            action: None,
        }
    }

    /// Sets the semantic action run when this production is reduced.
    pub fn action<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(Vec<V>) -> V + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(f));
        self
    }

    /// Number of right-hand side symbols a reduction pops. An explicit
    /// `epsilon` stands for the empty sequence and is not counted.
    pub fn arity(&self) -> usize {
        self.to
            .iter()
            .filter(|s| **s != Symbol::Terminal(Terminal::EPSILON))
            .count()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Runs the semantic action over the right-hand side values, or yields the
    /// null value when the production has none.
    pub fn reduce(&self, values: Vec<V>) -> V
    where
        V: Default,
    {
        match &self.action {
            Some(action) => action(values),
            None => V::default(),
        }
    }
}

/// A context-free grammar over semantic values of type `V`.
pub struct Grammar<V> {
    vocab: Vocabulary,
    goal: NonTerminal,
    productions: Vec<Production<V>>,
}

impl<V> Clone for Grammar<V> {
    fn clone(&self) -> Self {
        Self {
            vocab: self.vocab.clone(),
            goal: self.goal,
            productions: self.productions.clone(),
        }
    }
}

impl<V> fmt::Debug for Grammar<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("goal", &self.goal)
            .field("productions", &self.productions)
            .finish()
    }
}

impl<V> Grammar<V> {
    pub fn builder() -> GrammarBuilder<V> {
        GrammarBuilder::new()
    }

    pub fn goal(&self) -> NonTerminal {
        self.goal
    }

    pub fn productions(&self) -> &[Production<V>] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> Option<&Production<V>> {
        self.productions.get(index)
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn name(&self, sym: Symbol) -> &str {
        self.vocab.name(sym)
    }

    /// Renders production `index` as `From -> a b c`.
    pub fn display_production(&self, index: usize) -> String {
        let mut out = String::new();
        if let Some(p) = self.productions.get(index) {
            out.push_str(self.vocab.nonterminal_name(p.from));
            out.push_str(" ->");
            for s in &p.to {
                out.push(' ');
                out.push_str(self.vocab.name(*s));
            }
        }
        out
    }
}

/// Collects symbols and productions, then freezes them into a [`Grammar`].
pub struct GrammarBuilder<V> {
    vocab: Vocabulary,
    productions: Vec<Production<V>>,
}

impl<V> Default for GrammarBuilder<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> GrammarBuilder<V> {
    pub fn new() -> Self {
        Self {
            vocab: Vocabulary::new(),
            productions: Vec::new(),
        }
    }

    pub fn terminal(&mut self, name: impl AsRef<str>) -> Terminal {
        self.vocab.terminal(name)
    }

    pub fn nonterminal(&mut self, name: impl AsRef<str>) -> NonTerminal {
        self.vocab.nonterminal(name)
    }

    /// Appends the production `from -> to` and returns it so an action can
    /// be attached.
    pub fn rule(
        &mut self,
        from: NonTerminal,
        to: impl IntoIterator<Item = Symbol>,
    ) -> &mut Production<V> {
        self.productions.push(Production::new(from, to));
        let last = self.productions.len() - 1;
        &mut self.productions[last]
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn build(self, goal: NonTerminal) -> Grammar<V> {
        Grammar {
            vocab: self.vocab,
            goal,
            productions: self.productions,
        }
    }
}
