use super::items::{Automaton, Item, Lookahead, construct_set};
use super::resolver::ConflictResolver;
use super::sets::{first_sets, follow_sets};
use super::symtab::Rewrite;
use super::table::TableBuilder;
use tablex::{Grammar, Parser};

/// Which lookaheads the generated tables use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParserMode {
    /// Reduces on FOLLOW of the left-hand side.
    Slr,
    /// Canonical LR(1): reduces on the item's own lookahead.
    #[default]
    Lr1,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenStats {
    pub states: usize,
    pub transitions: usize,
    pub conflicts: usize,
}

/// Builds shift-reduce parsers from grammars.
///
/// ```rust
/// # use tablex::{Grammar, Token};
/// # use tablex_gen::aslr::{Generator, ParserMode};
/// let mut g = Grammar::<i64>::builder();
/// let sum = g.nonterminal("Sum");
/// let plus = g.terminal("+");
/// let num = g.terminal("num");
/// g.rule(sum, [sum.into(), plus.into(), num.into()]).action(|v| v[0] + v[2]);
/// g.rule(sum, [num.into()]).action(|v| v[0]);
///
/// let parser = Generator::new().mode(ParserMode::Slr).generate(g.build(sum));
/// assert!(parser.conflicts().is_empty());
/// let tokens = [Token::new(num, 1), Token::new(plus, 0), Token::new(num, 2)];
/// assert_eq!(parser.parse(tokens).unwrap(), 3);
/// ```
#[derive(Default)]
pub struct Generator<'r> {
    mode: ParserMode,
    resolver: Option<Box<dyn ConflictResolver + 'r>>,
}

impl<'r> Generator<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: ParserMode) -> Self {
        self.mode = mode;
        self
    }

    /// Installs the resolver consulted on shift/reduce and reduce/reduce
    /// conflicts.
    pub fn resolver(mut self, resolver: impl ConflictResolver + 'r) -> Self {
        self.resolver = Some(Box::new(resolver));
        self
    }

    pub fn generate<V>(&self, grammar: Grammar<V>) -> Parser<V> {
        self.generate_with_stats(grammar).0
    }

    pub fn generate_with_stats<V>(&self, grammar: Grammar<V>) -> (Parser<V>, GenStats) {
        let rw = Rewrite::new(&grammar);
        let prods = rw.prods();
        log::debug!(
            "rewrite: {} nonterminals, {} terminals, {} productions",
            rw.n_nonterm(),
            rw.n_term(),
            prods.len()
        );

        let first = first_sets(prods, rw.n_nonterm(), rw.n_term(), rw.epsilon());
        let follow = match self.mode {
            ParserMode::Slr => Some(follow_sets(
                prods,
                rw.n_nonterm(),
                0,
                &first,
                rw.epsilon(),
                rw.eof(),
            )),
            ParserMode::Lr1 => None,
        };

        let (lookahead, start) = match self.mode {
            ParserMode::Slr => (Lookahead::Placeholder(rw.epsilon()), rw.epsilon()),
            ParserMode::Lr1 => (
                Lookahead::First {
                    first: &first,
                    epsilon: rw.epsilon(),
                },
                rw.eof(),
            ),
        };
        let automaton = Automaton::new(prods, rw.n_nonterm(), lookahead);
        let collection = construct_set(
            &automaton,
            Item {
                prod: 0,
                dot: 1,
                lookahead: start,
            },
        );
        log::debug!(
            "{:?} collection: {} states, {} transitions",
            self.mode,
            collection.states.len(),
            collection.n_transitions()
        );

        let mut builder =
            TableBuilder::new(&grammar, &rw, collection.states.len(), self.resolver.as_deref());
        builder.fill(&collection, follow.as_deref());
        let (table, conflicts) = builder.finish();

        let stats = GenStats {
            states: collection.states.len(),
            transitions: collection.n_transitions(),
            conflicts: conflicts.len(),
        };
        log::debug!("generated {:?}", stats);
        (Parser::new(grammar, table, conflicts), stats)
    }
}
