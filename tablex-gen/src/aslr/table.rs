// ACTION/GOTO construction from the canonical collection.

use super::items::{Collection, Item};
use super::resolver::{ConflictResolver, ParserItem, Preference};
use super::symtab::Rewrite;
use std::collections::{BTreeMap, BTreeSet};
use tablex::{Action, Conflict, ConflictKind, Grammar, ParseTable, Symbol, Terminal};

/// Fills a [`ParseTable`] one proposal at a time.
///
/// The first action proposed for a slot is kept unless the resolver prefers
/// a later one. Every slot remembers the item that put its action there so
/// that the resolver can compare both items.
pub struct TableBuilder<'a, V> {
    grammar: &'a Grammar<V>,
    rewrite: &'a Rewrite,
    resolver: Option<&'a dyn ConflictResolver>,
    /// Right-hand sides translated back to grammar symbols.
    rhs: Vec<Vec<Symbol>>,
    table: ParseTable,
    owners: Vec<BTreeMap<Terminal, Item>>,
    conflicts: Vec<Conflict>,
}

impl<'a, V> TableBuilder<'a, V> {
    pub fn new(
        grammar: &'a Grammar<V>,
        rewrite: &'a Rewrite,
        n_states: usize,
        resolver: Option<&'a dyn ConflictResolver>,
    ) -> Self {
        let rhs = rewrite
            .prods()
            .iter()
            .map(|p| p[1..].iter().filter_map(|&s| rewrite.symbol(s)).collect())
            .collect();
        Self {
            grammar,
            rewrite,
            resolver,
            rhs,
            table: ParseTable::new(n_states),
            owners: vec![BTreeMap::new(); n_states],
            conflicts: Vec::new(),
        }
    }

    /// Adds the shifts, reduces and gotos of every state.
    ///
    /// `follow` selects SLR reduces on FOLLOW of the left-hand side; without
    /// it, each complete item reduces on its own lookahead.
    pub fn fill(&mut self, collection: &Collection, follow: Option<&[BTreeSet<usize>]>) {
        let rewrite = self.rewrite;
        let prods = rewrite.prods();
        for (state, items) in collection.states.iter().enumerate() {
            let transitions = &collection.transitions[state];
            for &item in items {
                match item.next_symbol(prods) {
                    Some(sym) if !self.rewrite.is_nonterminal(sym) => {
                        let Some(&target) = transitions.get(&sym) else {
                            unreachable!("no transition on {} from state {}", sym, state);
                        };
                        self.propose(state, sym, Action::Shift(target), item);
                    }
                    Some(_) => {}
                    None => {
                        let action = match item.prod {
                            0 => Action::Accept,
                            prod => Action::Reduce(prod - 1),
                        };
                        match follow {
                            Some(follow) => {
                                for &la in &follow[prods[item.prod][0]] {
                                    self.propose(state, la, action, item);
                                }
                            }
                            None => self.propose(state, item.lookahead, action, item),
                        }
                    }
                }
            }
            for (&sym, &target) in transitions {
                if !self.rewrite.is_nonterminal(sym) {
                    continue;
                }
                if let Some(n) = self.rewrite.nonterminal(sym) {
                    self.table.set_goto(state, n, target);
                }
            }
        }
    }

    fn propose(&mut self, state: usize, sym: usize, action: Action, item: Item) {
        let terminal = self.rewrite.terminal(sym);
        let Some(existing) = self.table.action(state, terminal) else {
            self.table.set_action(state, terminal, action);
            self.owners[state].insert(terminal, item);
            return;
        };
        if existing == action {
            return;
        }
        let kind = match (existing, action) {
            (Action::Accept, _) | (_, Action::Accept) => ConflictKind::AcceptReduce,
            (Action::Shift(_), _) | (_, Action::Shift(_)) => ConflictKind::ShiftReduce,
            _ => ConflictKind::ReduceReduce,
        };
        if kind != ConflictKind::AcceptReduce {
            match self.consult(terminal, item, self.owners[state][&terminal]) {
                Preference::PreferFirst => {
                    log::debug!(
                        "state {}: {} replaces {} on {}",
                        state,
                        action,
                        existing,
                        self.terminal_name(terminal)
                    );
                    self.table.set_action(state, terminal, action);
                    self.owners[state].insert(terminal, item);
                    return;
                }
                Preference::PreferSecond => {
                    log::debug!(
                        "state {}: {} kept over {} on {}",
                        state,
                        existing,
                        action,
                        self.terminal_name(terminal)
                    );
                    return;
                }
                Preference::Unknown => {}
            }
        }
        log::warn!(
            "{} conflict in state {} on {}: kept {}, rejected {}",
            kind,
            state,
            self.terminal_name(terminal),
            existing,
            action
        );
        self.conflicts.push(Conflict {
            state,
            terminal,
            kind,
            kept: existing,
            rejected: action,
        });
    }

    fn consult(&self, terminal: Terminal, incoming: Item, existing: Item) -> Preference {
        let Some(resolver) = self.resolver else {
            return Preference::Unknown;
        };
        let (Some(first), Some(second)) =
            (self.view(incoming, terminal), self.view(existing, terminal))
        else {
            return Preference::Unknown;
        };
        resolver.resolve(&first, &second)
    }

    /// The resolver's view of `item`; `None` for the synthetic goal.
    fn view(&self, item: Item, lookahead: Terminal) -> Option<ParserItem<'_>> {
        let from = self.rewrite.nonterminal(self.rewrite.prods()[item.prod][0])?;
        let rhs = &self.rhs[item.prod];
        let (seen, expected) = rhs.split_at(item.dot - 1);
        Some(ParserItem {
            production: item.prod - 1,
            from,
            seen,
            expected,
            lookahead,
            vocabulary: self.grammar.vocabulary(),
        })
    }

    fn terminal_name(&self, terminal: Terminal) -> &str {
        self.grammar.vocabulary().terminal_name(terminal)
    }

    pub fn finish(self) -> (ParseTable, Vec<Conflict>) {
        (self.table, self.conflicts)
    }
}
