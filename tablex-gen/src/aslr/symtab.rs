use indexmap::IndexSet;
use std::hash::Hash;
use tablex::{Grammar, NonTerminal, Symbol, Terminal};

/// Interns values into dense indices, in insertion order.
#[derive(Debug, Clone)]
pub struct Symtab<T> {
    set: IndexSet<T>,
}

impl<T> Default for Symtab<T> {
    fn default() -> Self {
        Self {
            set: IndexSet::new(),
        }
    }
}

impl<T: Hash + Eq> Symtab<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the index of `sym`, interning it first if needed.
    pub fn add(&mut self, sym: T) -> usize {
        self.set.insert_full(sym).0
    }

    pub fn idx(&self, sym: &T) -> Option<usize> {
        self.set.get_index_of(sym)
    }

    pub fn sym(&self, idx: usize) -> Option<&T> {
        self.set.get_index(idx)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }
}

/// A grammar rewritten over dense integers.
///
/// Nonterminals take `0..n_nonterm`: `0` is the synthetic goal `Goal'` and `1`
/// the user goal. Terminals take `n_nonterm..n_sym`, starting with `epsilon`
/// and `eof`. Production `0` is `Goal' -> goal`; production `k > 0` is
/// grammar production `k - 1`. Each production is stored as
/// `[lhs, rhs...]`.
#[derive(Debug, Clone)]
pub struct Rewrite {
    nonterms: Symtab<Option<NonTerminal>>,
    terms: Symtab<Terminal>,
    prods: Vec<Vec<usize>>,
}

impl Rewrite {
    pub fn new<V>(grammar: &Grammar<V>) -> Self {
        let vocab = grammar.vocabulary();
        let mut nonterms = Symtab::new();
        nonterms.add(None);
        nonterms.add(Some(grammar.goal()));
        for n in vocab.nonterminals() {
            nonterms.add(Some(n));
        }
        let mut terms = Symtab::new();
        terms.add(Terminal::EPSILON);
        terms.add(Terminal::EOF);
        for t in vocab.terminals() {
            terms.add(t);
        }

        let n_nonterm = nonterms.len();
        let mut prods = Vec::with_capacity(grammar.productions().len() + 1);
        prods.push(vec![0, 1]);
        for p in grammar.productions() {
            let mut prod = Vec::with_capacity(p.to.len() + 1);
            prod.push(nonterms.add(Some(p.from)));
            for sym in &p.to {
                match *sym {
                    Symbol::Terminal(Terminal::EPSILON) => {}
                    Symbol::Terminal(t) => prod.push(n_nonterm + terms.add(t)),
                    Symbol::NonTerminal(n) => prod.push(nonterms.add(Some(n))),
                }
            }
            prods.push(prod);
        }
        debug_assert_eq!(nonterms.len(), n_nonterm);

        Self {
            nonterms,
            terms,
            prods,
        }
    }

    pub fn prods(&self) -> &[Vec<usize>] {
        &self.prods
    }

    pub fn n_nonterm(&self) -> usize {
        self.nonterms.len()
    }

    pub fn n_term(&self) -> usize {
        self.terms.len()
    }

    pub fn n_sym(&self) -> usize {
        self.n_nonterm() + self.n_term()
    }

    pub fn epsilon(&self) -> usize {
        self.n_nonterm()
    }

    pub fn eof(&self) -> usize {
        self.n_nonterm() + 1
    }

    #[inline]
    pub fn is_nonterminal(&self, sym: usize) -> bool {
        sym < self.n_nonterm()
    }

    /// The terminal behind dense index `sym`. Panics on nonterminals.
    pub fn terminal(&self, sym: usize) -> Terminal {
        match self.terms.sym(sym - self.n_nonterm()) {
            Some(&t) => t,
            None => unreachable!("terminal index {} out of range", sym),
        }
    }

    /// The nonterminal behind dense index `sym`, `None` for `Goal'`.
    pub fn nonterminal(&self, sym: usize) -> Option<NonTerminal> {
        match self.nonterms.sym(sym) {
            Some(&n) => n,
            None => unreachable!("nonterminal index {} out of range", sym),
        }
    }

    /// Back-translation of `sym`, `None` for `Goal'`.
    pub fn symbol(&self, sym: usize) -> Option<Symbol> {
        if self.is_nonterminal(sym) {
            self.nonterminal(sym).map(Symbol::NonTerminal)
        } else {
            Some(Symbol::Terminal(self.terminal(sym)))
        }
    }

    pub fn name<'g, V>(&self, grammar: &'g Grammar<V>, sym: usize) -> &'g str {
        match self.symbol(sym) {
            Some(s) => grammar.name(s),
            None => "Goal'",
        }
    }
}
