//! Conflict resolution for table construction.
//!
//! When two actions claim the same ACTION slot, the generator asks a
//! [`ConflictResolver`] which one to keep. The resolver sees both candidates
//! as [`ParserItem`]s: `first` is the incoming item, `second` the item whose
//! action currently occupies the slot.

use std::collections::BTreeMap;
use std::fmt;
use tablex::{NonTerminal, Symbol, Terminal, Vocabulary};

/// A read-only view of an LR item involved in a conflict.
#[derive(Clone, Copy)]
pub struct ParserItem<'a> {
    /// Index of the grammar production.
    pub production: usize,
    pub from: NonTerminal,
    /// Symbols before the dot.
    pub seen: &'a [Symbol],
    /// Symbols after the dot.
    pub expected: &'a [Symbol],
    /// The terminal whose ACTION slot is contested.
    pub lookahead: Terminal,
    pub vocabulary: &'a Vocabulary,
}

impl ParserItem<'_> {
    /// Whether the dot is at the end, i.e. this item asks for a reduce.
    pub fn is_complete(&self) -> bool {
        self.expected.is_empty()
    }

    /// The rightmost terminal of the whole production.
    pub fn last_terminal(&self) -> Option<Terminal> {
        self.seen
            .iter()
            .chain(self.expected)
            .rev()
            .find_map(|s| match s {
                Symbol::Terminal(t) => Some(*t),
                Symbol::NonTerminal(_) => None,
            })
    }
}

impl fmt::Display for ParserItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.vocabulary.nonterminal_name(self.from))?;
        for s in self.seen {
            write!(f, " {}", self.vocabulary.name(*s))?;
        }
        write!(f, " .")?;
        for s in self.expected {
            write!(f, " {}", self.vocabulary.name(*s))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ParserItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self, self.vocabulary.terminal_name(self.lookahead))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Preference {
    /// Replace the existing action with the incoming one.
    PreferFirst,
    /// Keep the existing action.
    PreferSecond,
    /// No opinion; the existing action stays and a conflict is reported.
    Unknown,
}

pub trait ConflictResolver {
    fn resolve(&self, first: &ParserItem<'_>, second: &ParserItem<'_>) -> Preference;
}

impl<F> ConflictResolver for F
where
    F: Fn(&ParserItem<'_>, &ParserItem<'_>) -> Preference,
{
    fn resolve(&self, first: &ParserItem<'_>, second: &ParserItem<'_>) -> Preference {
        self(first, second)
    }
}

/// Left associativity for binary operators of the form `E -> E op E`.
///
/// Prefers reducing `E -> E op E .` over shifting in `E -> E . op E` on
/// `op`, for a registered `op` shared by both items. Anything else,
/// including two different operators, is [`Preference::Unknown`].
#[derive(Clone, Debug, Default)]
pub struct LeftAssociative {
    operators: Vec<Terminal>,
}

impl LeftAssociative {
    pub fn new(operators: impl IntoIterator<Item = Terminal>) -> Self {
        Self {
            operators: operators.into_iter().collect(),
        }
    }

    fn binary_operator(&self, item: &ParserItem<'_>) -> Option<Terminal> {
        let rhs: Vec<Symbol> = item.seen.iter().chain(item.expected).copied().collect();
        let [Symbol::NonTerminal(l), Symbol::Terminal(op), Symbol::NonTerminal(r)] = rhs[..] else {
            return None;
        };
        (l == item.from && r == item.from && self.operators.contains(&op)).then_some(op)
    }

    /// The operator of `E -> E op E .` when `op` is the contested terminal.
    fn reduce_operator(&self, item: &ParserItem<'_>) -> Option<Terminal> {
        let op = self.binary_operator(item)?;
        (item.is_complete() && op == item.lookahead).then_some(op)
    }

    /// The operator of `E -> E . op E` when `op` is the contested terminal.
    fn shift_operator(&self, item: &ParserItem<'_>) -> Option<Terminal> {
        let op = self.binary_operator(item)?;
        (item.seen.len() == 1 && op == item.lookahead).then_some(op)
    }
}

impl ConflictResolver for LeftAssociative {
    /// Reduces when both items use the same registered operator; any other
    /// pair is left unresolved.
    fn resolve(&self, first: &ParserItem<'_>, second: &ParserItem<'_>) -> Preference {
        let same = |r: Option<Terminal>, s: Option<Terminal>| r.is_some() && r == s;
        if same(self.reduce_operator(first), self.shift_operator(second)) {
            Preference::PreferFirst
        } else if same(self.reduce_operator(second), self.shift_operator(first)) {
            Preference::PreferSecond
        } else {
            Preference::Unknown
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
}

/// Operator precedence and associativity.
///
/// Levels are declared from loosest to tightest binding. A shift/reduce
/// conflict compares the reduce production's rightmost terminal with the
/// lookahead: the tighter one wins; on a tie, left associativity reduces and
/// right associativity shifts.
///
/// ```rust
/// # use tablex::Vocabulary;
/// # use tablex_gen::aslr::Precedence;
/// let mut v = Vocabulary::new();
/// let (plus, times, pow) = (v.terminal("+"), v.terminal("*"), v.terminal("^"));
/// let prec = Precedence::new().left([plus]).left([times]).right([pow]);
/// assert!(prec.level(times) > prec.level(plus));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Precedence {
    levels: BTreeMap<Terminal, (usize, Assoc)>,
    next: usize,
}

impl Precedence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn left(self, operators: impl IntoIterator<Item = Terminal>) -> Self {
        self.level_of(Assoc::Left, operators)
    }

    pub fn right(self, operators: impl IntoIterator<Item = Terminal>) -> Self {
        self.level_of(Assoc::Right, operators)
    }

    fn level_of(mut self, assoc: Assoc, operators: impl IntoIterator<Item = Terminal>) -> Self {
        self.next += 1;
        for op in operators {
            self.levels.insert(op, (self.next, assoc));
        }
        self
    }

    pub fn level(&self, op: Terminal) -> Option<usize> {
        self.levels.get(&op).map(|&(level, _)| level)
    }

    /// Preference for reducing `reduce` over shifting its lookahead.
    fn reduce_over_shift(&self, reduce: &ParserItem<'_>) -> Option<bool> {
        let (red, assoc) = *self.levels.get(&reduce.last_terminal()?)?;
        let (shift, _) = *self.levels.get(&reduce.lookahead)?;
        Some(match red.cmp(&shift) {
            std::cmp::Ordering::Greater => true,
            std::cmp::Ordering::Less => false,
            std::cmp::Ordering::Equal => assoc == Assoc::Left,
        })
    }
}

impl ConflictResolver for Precedence {
    fn resolve(&self, first: &ParserItem<'_>, second: &ParserItem<'_>) -> Preference {
        let (reduce, reduce_is_first) = match (first.is_complete(), second.is_complete()) {
            (true, false) => (first, true),
            (false, true) => (second, false),
            _ => return Preference::Unknown,
        };
        match self.reduce_over_shift(reduce) {
            Some(wins) if wins == reduce_is_first => Preference::PreferFirst,
            Some(_) => Preference::PreferSecond,
            None => Preference::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ops {
        vocab: Vocabulary,
        e: NonTerminal,
        minus: Terminal,
        times: Terminal,
        num: Terminal,
    }

    fn ops() -> Ops {
        let mut vocab = Vocabulary::new();
        let e = vocab.nonterminal("E");
        let minus = vocab.terminal("-");
        let times = vocab.terminal("*");
        let num = vocab.terminal("num");
        Ops {
            vocab,
            e,
            minus,
            times,
            num,
        }
    }

    fn item<'a>(o: &'a Ops, rhs: &'a [Symbol], dot: usize, lookahead: Terminal) -> ParserItem<'a> {
        ParserItem {
            production: 0,
            from: o.e,
            seen: &rhs[..dot],
            expected: &rhs[dot..],
            lookahead,
            vocabulary: &o.vocab,
        }
    }

    #[test]
    fn display() {
        let o = ops();
        let rhs = [o.e.into(), o.minus.into(), o.e.into()];
        assert_eq!(item(&o, &rhs, 1, o.minus).to_string(), "E -> E . - E");
        assert_eq!(item(&o, &rhs, 3, o.minus).to_string(), "E -> E - E .");
        assert_eq!(format!("{:?}", item(&o, &rhs, 0, o.num)), "[E -> . E - E, num]");
    }

    #[test]
    fn left_associative_prefers_reduce_either_way() {
        let o = ops();
        let rhs = [o.e.into(), o.minus.into(), o.e.into()];
        let shift = item(&o, &rhs, 1, o.minus);
        let reduce = item(&o, &rhs, 3, o.minus);
        let r = LeftAssociative::new([o.minus]);
        assert_eq!(r.resolve(&reduce, &shift), Preference::PreferFirst);
        assert_eq!(r.resolve(&shift, &reduce), Preference::PreferSecond);

        let other = LeftAssociative::new([o.times]);
        assert_eq!(other.resolve(&reduce, &shift), Preference::Unknown);
    }

    #[test]
    fn left_associative_needs_one_operator() {
        let o = ops();
        let sub = [o.e.into(), o.minus.into(), o.e.into()];
        let mul = [o.e.into(), o.times.into(), o.e.into()];
        let r = LeftAssociative::new([o.minus, o.times]);

        // E - E . against E . * E on *
        let reduce = item(&o, &sub, 3, o.times);
        let shift = item(&o, &mul, 1, o.times);
        assert_eq!(r.resolve(&reduce, &shift), Preference::Unknown);
        assert_eq!(r.resolve(&shift, &reduce), Preference::Unknown);

        // E * E . against E . * E on *
        let reduce = item(&o, &mul, 3, o.times);
        assert_eq!(r.resolve(&reduce, &shift), Preference::PreferFirst);
        assert_eq!(r.resolve(&shift, &reduce), Preference::PreferSecond);
    }

    #[test]
    fn left_associative_ignores_other_shapes() {
        let o = ops();
        let unary = [o.minus.into(), o.e.into()];
        let binary = [o.e.into(), o.minus.into(), o.e.into()];
        let r = LeftAssociative::new([o.minus]);
        let a = item(&o, &unary, 2, o.minus);
        let b = item(&o, &binary, 1, o.minus);
        assert_eq!(r.resolve(&a, &b), Preference::Unknown);
    }

    #[test]
    fn precedence_decides_by_level_then_assoc() {
        let o = ops();
        let sub = [o.e.into(), o.minus.into(), o.e.into()];
        let mul = [o.e.into(), o.times.into(), o.e.into()];
        let p = Precedence::new().left([o.minus]).left([o.times]);

        // E - E . with lookahead * : shift wins
        let reduce = item(&o, &sub, 3, o.times);
        let shift = item(&o, &mul, 1, o.times);
        assert_eq!(p.resolve(&reduce, &shift), Preference::PreferSecond);
        assert_eq!(p.resolve(&shift, &reduce), Preference::PreferFirst);

        // E * E . with lookahead - : reduce wins
        let reduce = item(&o, &mul, 3, o.minus);
        let shift = item(&o, &sub, 1, o.minus);
        assert_eq!(p.resolve(&reduce, &shift), Preference::PreferFirst);

        // E - E . with lookahead - : left assoc reduces
        let reduce = item(&o, &sub, 3, o.minus);
        assert_eq!(p.resolve(&shift, &reduce), Preference::PreferSecond);

        let right = Precedence::new().right([o.minus]);
        assert_eq!(right.resolve(&shift, &reduce), Preference::PreferFirst);
    }

    #[test]
    fn precedence_unknown_without_levels() {
        let o = ops();
        let sub = [o.e.into(), o.minus.into(), o.e.into()];
        let reduce = item(&o, &sub, 3, o.num);
        let shift = item(&o, &sub, 1, o.num);
        let p = Precedence::new().left([o.minus]);
        assert_eq!(p.resolve(&reduce, &shift), Preference::Unknown);
        assert_eq!(p.resolve(&reduce, &reduce), Preference::Unknown);
    }

    #[test]
    fn closures_are_resolvers() {
        let o = ops();
        let rhs = [o.e.into(), o.minus.into(), o.e.into()];
        let a = item(&o, &rhs, 3, o.minus);
        let always_first = |_: &ParserItem<'_>, _: &ParserItem<'_>| Preference::PreferFirst;
        assert_eq!(always_first.resolve(&a, &a), Preference::PreferFirst);
    }
}
