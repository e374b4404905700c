// LR items, closure/goto and the canonical collection.

use super::sets::first_of_sequence;
use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet};

/// An LR item: a production, a dot position and a lookahead.
///
/// Productions are `[lhs, rhs...]`, so the dot ranges over `1..=len` and
/// `dot == len` means the item is complete. In SLR mode the lookahead is a
/// fixed placeholder.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    pub prod: usize,
    pub dot: usize,
    pub lookahead: usize,
}

impl Item {
    /// The symbol right after the dot, if any.
    #[inline]
    pub fn next_symbol(&self, prods: &[Vec<usize>]) -> Option<usize> {
        prods[self.prod].get(self.dot).copied()
    }

    #[inline]
    pub fn is_complete(&self, prods: &[Vec<usize>]) -> bool {
        self.dot == prods[self.prod].len()
    }
}

pub type ItemSet = BTreeSet<Item>;

/// How new items get their lookahead during closure.
#[derive(Clone, Copy, Debug)]
pub enum Lookahead<'a> {
    /// LR(1): FIRST of the rest of the item followed by its lookahead.
    First {
        first: &'a [BTreeSet<usize>],
        epsilon: usize,
    },
    /// SLR: always this placeholder.
    Placeholder(usize),
}

/// Shared inputs of closure and goto.
pub struct Automaton<'a> {
    pub prods: &'a [Vec<usize>],
    pub n_nonterm: usize,
    pub lookahead: Lookahead<'a>,
    by_lhs: Vec<Vec<usize>>,
}

impl<'a> Automaton<'a> {
    pub fn new(prods: &'a [Vec<usize>], n_nonterm: usize, lookahead: Lookahead<'a>) -> Self {
        let mut by_lhs = vec![Vec::new(); n_nonterm];
        for (i, p) in prods.iter().enumerate() {
            by_lhs[p[0]].push(i);
        }
        Self {
            prods,
            n_nonterm,
            lookahead,
            by_lhs,
        }
    }

    /// Adds, for every item expecting a nonterminal, one item per production
    /// of that nonterminal with the dot at the start. Repeats until nothing
    /// new appears.
    pub fn closure(&self, items: ItemSet) -> ItemSet {
        let mut c = items;
        let mut work: Vec<Item> = c.iter().copied().collect();
        while let Some(item) = work.pop() {
            let Some(next) = item.next_symbol(self.prods) else {
                continue;
            };
            if next >= self.n_nonterm {
                continue;
            }
            let lookaheads = match self.lookahead {
                Lookahead::First { first, epsilon } => {
                    let mut rest = self.prods[item.prod][item.dot + 1..].to_vec();
                    rest.push(item.lookahead);
                    let mut set = first_of_sequence(&rest, first, epsilon);
                    set.remove(&epsilon);
                    set
                }
                Lookahead::Placeholder(p) => BTreeSet::from([p]),
            };
            for &prod in &self.by_lhs[next] {
                for &lookahead in &lookaheads {
                    let new_item = Item {
                        prod,
                        dot: 1,
                        lookahead,
                    };
                    if c.insert(new_item) {
                        work.push(new_item);
                    }
                }
            }
        }
        c
    }

    /// Advances every item expecting `sym` and closes the result.
    pub fn goto(&self, items: &ItemSet, sym: usize) -> ItemSet {
        let moved: ItemSet = items
            .iter()
            .filter(|item| item.next_symbol(self.prods) == Some(sym))
            .map(|item| Item {
                dot: item.dot + 1,
                ..*item
            })
            .collect();
        self.closure(moved)
    }
}

/// States of the LR automaton, numbered in discovery order, and the
/// transitions between them.
#[derive(Debug, Clone)]
pub struct Collection {
    pub states: IndexSet<ItemSet>,
    pub transitions: Vec<BTreeMap<usize, usize>>,
}

impl Collection {
    pub fn n_transitions(&self) -> usize {
        self.transitions.iter().map(BTreeMap::len).sum()
    }
}

/// Breadth-first construction of the canonical collection from the closure
/// of `start`. States are deduplicated by item-set equality.
pub fn construct_set(automaton: &Automaton<'_>, start: Item) -> Collection {
    let mut states: IndexSet<ItemSet> = IndexSet::new();
    let mut transitions: Vec<BTreeMap<usize, usize>> = Vec::new();
    states.insert(automaton.closure(ItemSet::from([start])));
    let mut current = 0;
    while current < states.len() {
        let state = states[current].clone();
        let symbols: BTreeSet<usize> = state
            .iter()
            .filter_map(|item| item.next_symbol(automaton.prods))
            .collect();
        let mut row = BTreeMap::new();
        for sym in symbols {
            let next = automaton.goto(&state, sym);
            let (index, _) = states.insert_full(next);
            row.insert(sym, index);
        }
        transitions.push(row);
        current += 1;
    }
    Collection {
        states,
        transitions,
    }
}
