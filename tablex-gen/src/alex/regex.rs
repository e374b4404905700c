//! Regular-expression syntax trees and their compilation to DFAs.
//!
//! ```rust
//! # use tablex_gen::alex::{CharClass, Regex};
//! let ident = Regex::set(CharClass::range('a', 'z'))
//!     .concat(Regex::set(CharClass::range('a', 'z').union(CharClass::range('0', '9'))).star());
//! let pattern = ident.compile();
//! assert!(pattern.is_match("x86"));
//! assert_eq!(pattern.longest_match("abc+1"), Some("abc"));
//! ```

use super::charclass::{CharClass, atomize};
use super::nfa::Nfa;
use std::collections::BTreeSet;
use std::fmt;
use tablex::{AtomId, CompiledPattern};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Regex {
    CharSet(CharClass),
    Concat(Box<Regex>, Box<Regex>),
    Union(Box<Regex>, Box<Regex>),
    Star(Box<Regex>),
}

impl Regex {
    pub fn set(class: CharClass) -> Self {
        Regex::CharSet(class)
    }

    /// Matches exactly `c`.
    pub fn char(c: char) -> Self {
        Regex::CharSet(CharClass::single(c))
    }

    /// Matches only the empty string.
    pub fn epsilon() -> Self {
        Regex::set(CharClass::empty()).star()
    }

    /// Matches the string `s`. The empty string gives [`Regex::epsilon`].
    pub fn literal(s: &str) -> Self {
        s.chars()
            .map(Regex::char)
            .reduce(Regex::concat)
            .unwrap_or_else(Regex::epsilon)
    }

    /// Matches any single character of `chars`.
    pub fn any_of(chars: &str) -> Self {
        Regex::set(CharClass::explicit(chars.chars()))
    }

    /// Matches any single character not in `chars`.
    pub fn none_of(chars: &str) -> Self {
        Regex::set(CharClass::explicit(chars.chars()).complement())
    }

    pub fn concat(self, other: Regex) -> Self {
        Regex::Concat(Box::new(self), Box::new(other))
    }

    pub fn union(self, other: Regex) -> Self {
        Regex::Union(Box::new(self), Box::new(other))
    }

    pub fn star(self) -> Self {
        Regex::Star(Box::new(self))
    }

    /// One or more repetitions.
    pub fn plus(self) -> Self {
        self.clone().concat(self.star())
    }

    /// Zero or one occurrence.
    pub fn optional(self) -> Self {
        self.union(Regex::epsilon())
    }

    /// Appends the character classes of the leaves, left to right.
    pub fn find_character_classes<'a>(&'a self, out: &mut Vec<&'a CharClass>) {
        match self {
            Regex::CharSet(class) => out.push(class),
            Regex::Concat(a, b) | Regex::Union(a, b) => {
                a.find_character_classes(out);
                b.find_character_classes(out);
            }
            Regex::Star(a) => a.find_character_classes(out),
        }
    }

    /// Builds the Thompson NFA, labelling each leaf with the atoms of its
    /// class. `class_atoms` is indexed like [`Regex::find_character_classes`].
    pub fn build(&self, class_atoms: &[BTreeSet<AtomId>]) -> Nfa {
        let mut nfa = Nfa::new();
        let mut sets = class_atoms.iter();
        let (start, end) = self.fragment(&mut nfa, &mut sets);
        nfa.set_start(start);
        nfa.set_end(end);
        nfa
    }

    fn fragment<'a>(
        &self,
        nfa: &mut Nfa,
        sets: &mut impl Iterator<Item = &'a BTreeSet<AtomId>>,
    ) -> (usize, usize) {
        match self {
            Regex::CharSet(_) => {
                let start = nfa.add_node();
                let end = nfa.add_node();
                // Leaves and atom sets are visited in the same order.
                if let Some(atoms) = sets.next() {
                    for &atom in atoms {
                        nfa.add_edge(start, Some(atom), end);
                    }
                }
                (start, end)
            }
            Regex::Concat(a, b) => {
                let (a_start, a_end) = a.fragment(nfa, sets);
                let (b_start, b_end) = b.fragment(nfa, sets);
                nfa.add_edge(a_end, None, b_start);
                (a_start, b_end)
            }
            Regex::Union(a, b) => {
                let start = nfa.add_node();
                let (a_start, a_end) = a.fragment(nfa, sets);
                let (b_start, b_end) = b.fragment(nfa, sets);
                let end = nfa.add_node();
                nfa.add_edge(start, None, a_start);
                nfa.add_edge(start, None, b_start);
                nfa.add_edge(a_end, None, end);
                nfa.add_edge(b_end, None, end);
                (start, end)
            }
            Regex::Star(a) => {
                let start = nfa.add_node();
                let (a_start, a_end) = a.fragment(nfa, sets);
                let end = nfa.add_node();
                nfa.add_edge(start, None, a_start);
                nfa.add_edge(a_end, None, end);
                nfa.add_edge(a_end, None, a_start);
                nfa.add_edge(start, None, end);
                (start, end)
            }
        }
    }

    /// Atomizes the classes, builds the NFA and determinizes it.
    pub fn compile(&self) -> CompiledPattern {
        let mut classes = Vec::new();
        self.find_character_classes(&mut classes);
        let atomization = atomize(classes);
        let nfa = self.build(&atomization.class_atoms);
        let dfa = nfa.to_dfa();
        log::debug!(
            "compiled {}: {} atoms, {} NFA nodes, {} DFA nodes",
            self,
            atomization.atoms.len(),
            nfa.len(),
            dfa.nodes().len()
        );
        CompiledPattern::new(atomization.atoms, dfa)
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regex::CharSet(c) => write!(f, "{}", c),
            Regex::Concat(a, b) => write!(f, "{}{}", a, b),
            Regex::Union(a, b) => write!(f, "({}|{})", a, b),
            Regex::Star(a) => write!(f, "({})*", a),
        }
    }
}
