//! Composite character classes and their atomization.
//!
//! Patterns are written with possibly overlapping classes (`[a-z]`, `[aeiou]`,
//! `[^0-9]`, ...). Automatons need a partition instead. [`atomize`] splits the
//! leaves of every class into pairwise-disjoint [`Atom`]s and then rebuilds
//! each composite class as a set of atoms.

use std::collections::BTreeSet;
use std::fmt;
use tablex::{Atom, AtomId, Atoms, LeafClass};

/// A character class as written by the user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CharClass {
    Explicit(BTreeSet<char>),
    /// Inclusive range. A range with `lo > hi` holds nothing.
    Range(char, char),
    Union(Box<CharClass>, Box<CharClass>),
    Complement(Box<CharClass>),
    Intersect(Box<CharClass>, Box<CharClass>),
}

impl CharClass {
    pub fn explicit(chars: impl IntoIterator<Item = char>) -> Self {
        CharClass::Explicit(chars.into_iter().collect())
    }

    pub fn single(c: char) -> Self {
        CharClass::Explicit(BTreeSet::from([c]))
    }

    pub fn range(lo: char, hi: char) -> Self {
        CharClass::Range(lo, hi)
    }

    /// The class holding no character.
    pub fn empty() -> Self {
        CharClass::Explicit(BTreeSet::new())
    }

    /// The class holding every character.
    pub fn any() -> Self {
        CharClass::empty().complement()
    }

    pub fn union(self, other: CharClass) -> Self {
        CharClass::Union(Box::new(self), Box::new(other))
    }

    pub fn complement(self) -> Self {
        CharClass::Complement(Box::new(self))
    }

    pub fn intersect(self, other: CharClass) -> Self {
        CharClass::Intersect(Box::new(self), Box::new(other))
    }

    /// Direct membership test, independent of any atomization.
    pub fn contains(&self, c: char) -> bool {
        match self {
            CharClass::Explicit(set) => set.contains(&c),
            CharClass::Range(lo, hi) => (*lo..=*hi).contains(&c),
            CharClass::Union(a, b) => a.contains(c) || b.contains(c),
            CharClass::Complement(a) => !a.contains(c),
            CharClass::Intersect(a, b) => a.contains(c) && b.contains(c),
        }
    }

    /// Appends the leaves of this class, depth first, left to right.
    fn collect_leaves(&self, out: &mut Vec<LeafClass>) {
        match self {
            CharClass::Explicit(set) => out.push(LeafClass::Explicit(set.clone())),
            CharClass::Range(lo, hi) => out.push(LeafClass::range(*lo, *hi)),
            CharClass::Union(a, b) | CharClass::Intersect(a, b) => {
                a.collect_leaves(out);
                b.collect_leaves(out);
            }
            CharClass::Complement(a) => a.collect_leaves(out),
        }
    }

    /// Rebuilds this class from `atoms`, numbering leaves in the same order as
    /// [`CharClass::collect_leaves`].
    fn pick_atoms(&self, next_leaf: &mut usize, atoms: &Atoms) -> BTreeSet<AtomId> {
        match self {
            CharClass::Explicit(_) | CharClass::Range(..) => {
                let leaf = *next_leaf;
                *next_leaf += 1;
                atoms
                    .iter()
                    .enumerate()
                    .filter(|(_, a)| a.origins.contains(&leaf))
                    .map(|(i, _)| i)
                    .collect()
            }
            CharClass::Union(a, b) => {
                let mut set = a.pick_atoms(next_leaf, atoms);
                set.extend(b.pick_atoms(next_leaf, atoms));
                set
            }
            CharClass::Complement(a) => {
                let inner = a.pick_atoms(next_leaf, atoms);
                (0..atoms.len()).filter(|i| !inner.contains(i)).collect()
            }
            CharClass::Intersect(a, b) => {
                let left = a.pick_atoms(next_leaf, atoms);
                let right = b.pick_atoms(next_leaf, atoms);
                left.intersection(&right).copied().collect()
            }
        }
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CharClass::Explicit(set) => fmt::Display::fmt(&LeafClass::Explicit(set.clone()), f),
            CharClass::Range(lo, hi) => fmt::Display::fmt(&LeafClass::range(*lo, *hi), f),
            CharClass::Union(a, b) => write!(f, "({} | {})", a, b),
            CharClass::Complement(a) => write!(f, "!{}", a),
            CharClass::Intersect(a, b) => write!(f, "({} & {})", a, b),
        }
    }
}

/// Result of [`atomize`]: the atom partition and, for every input class in
/// order, the atoms it is made of.
#[derive(Debug, Clone)]
pub struct Atomization {
    pub atoms: Atoms,
    pub class_atoms: Vec<BTreeSet<AtomId>>,
}

/// Splits `classes` into disjoint atoms.
///
/// Every leaf (explicit set or range) reachable from `classes` is collected
/// depth first and numbered; that number is the leaf's origin. Overlapping
/// leaves are then split pairwise until none overlap. The catch-all atom
/// comes last.
pub fn atomize<'a>(classes: impl IntoIterator<Item = &'a CharClass>) -> Atomization {
    let classes: Vec<&CharClass> = classes.into_iter().collect();
    let mut leaves = Vec::new();
    for class in &classes {
        class.collect_leaves(&mut leaves);
    }
    let n_leaves = leaves.len();
    let pending: Vec<Atom> = leaves
        .into_iter()
        .enumerate()
        .map(|(i, class)| Atom {
            class,
            origins: BTreeSet::from([i]),
        })
        .collect();
    let atoms = Atoms::new(split_overlaps(pending));

    let mut next_leaf = 0;
    let class_atoms = classes
        .iter()
        .map(|c| c.pick_atoms(&mut next_leaf, &atoms))
        .collect();
    debug_assert_eq!(next_leaf, n_leaves);

    log::trace!(
        "atomized {} classes ({} leaves) into {} atoms",
        classes.len(),
        n_leaves,
        atoms.len()
    );
    Atomization { atoms, class_atoms }
}

fn split_overlaps(mut pending: Vec<Atom>) -> Vec<Atom> {
    let mut atoms = Vec::new();
    while !pending.is_empty() {
        let found = (1..pending.len())
            .find_map(|j| split(&pending[0], &pending[j]).map(|pieces| (j, pieces)));
        match found {
            Some((j, pieces)) => {
                pending.remove(j);
                pending.remove(0);
                pending.extend(pieces);
            }
            None => atoms.push(pending.remove(0)),
        }
    }
    atoms
}

fn piece(class: LeafClass, parents: &[&Atom]) -> Atom {
    Atom {
        class,
        origins: parents.iter().flat_map(|p| p.origins.iter().copied()).collect(),
    }
}

/// Splits two overlapping leaves into disjoint pieces, or returns `None` when
/// they do not overlap.
fn split(a: &Atom, b: &Atom) -> Option<Vec<Atom>> {
    match (&a.class, &b.class) {
        (LeafClass::Explicit(x), LeafClass::Explicit(y)) => split_sets(a, x, b, y),
        (LeafClass::Range { lo, hi }, LeafClass::Explicit(y)) => {
            split_range_set(a, *lo, *hi, b, y)
        }
        (LeafClass::Explicit(x), LeafClass::Range { lo, hi }) => {
            split_range_set(b, *lo, *hi, a, x)
        }
        (LeafClass::Range { lo: l1, hi: h1 }, LeafClass::Range { lo: l2, hi: h2 }) => {
            split_ranges(a, (*l1, *h1), b, (*l2, *h2))
        }
        (LeafClass::Others, _) | (_, LeafClass::Others) => None,
    }
}

fn split_sets(a: &Atom, x: &BTreeSet<char>, b: &Atom, y: &BTreeSet<char>) -> Option<Vec<Atom>> {
    let both: BTreeSet<char> = x.intersection(y).copied().collect();
    if both.is_empty() {
        return None;
    }
    let left: BTreeSet<char> = x.difference(&both).copied().collect();
    let right: BTreeSet<char> = y.difference(&both).copied().collect();
    let mut pieces = Vec::with_capacity(3);
    if !left.is_empty() {
        pieces.push(piece(LeafClass::Explicit(left), &[a]));
    }
    pieces.push(piece(LeafClass::Explicit(both), &[a, b]));
    if !right.is_empty() {
        pieces.push(piece(LeafClass::Explicit(right), &[b]));
    }
    Some(pieces)
}

/// Cuts the range at every shared element; the shared elements become an
/// explicit piece and the rest of the set stays explicit.
fn split_range_set(
    range: &Atom,
    lo: u32,
    hi: u32,
    set: &Atom,
    chars: &BTreeSet<char>,
) -> Option<Vec<Atom>> {
    let (shared, rest): (BTreeSet<char>, BTreeSet<char>) =
        chars.iter().partition(|&&c| (lo..=hi).contains(&(c as u32)));
    if shared.is_empty() {
        return None;
    }
    let mut pieces = Vec::new();
    let mut start = lo;
    for &c in &shared {
        let c = c as u32;
        if c > start {
            pieces.push(piece(LeafClass::Range { lo: start, hi: c - 1 }, &[range]));
        }
        start = c + 1;
    }
    if start <= hi {
        pieces.push(piece(LeafClass::Range { lo: start, hi }, &[range]));
    }
    pieces.push(piece(LeafClass::Explicit(shared), &[range, set]));
    if !rest.is_empty() {
        pieces.push(piece(LeafClass::Explicit(rest), &[set]));
    }
    Some(pieces)
}

/// Endpoint sweep of two ranges: first-only, shared, second-only.
fn split_ranges(a: &Atom, (l1, h1): (u32, u32), b: &Atom, (l2, h2): (u32, u32)) -> Option<Vec<Atom>> {
    let (lo, hi) = (l1.max(l2), h1.min(h2));
    if lo > hi || l1 > h1 || l2 > h2 {
        return None;
    }
    let mut first = Vec::new();
    let mut second = Vec::new();
    if l1 < lo {
        first.push(LeafClass::Range { lo: l1, hi: lo - 1 });
    }
    if l2 < lo {
        second.push(LeafClass::Range { lo: l2, hi: lo - 1 });
    }
    if h1 > hi {
        first.push(LeafClass::Range { lo: hi + 1, hi: h1 });
    }
    if h2 > hi {
        second.push(LeafClass::Range { lo: hi + 1, hi: h2 });
    }
    let mut pieces: Vec<Atom> = first.into_iter().map(|c| piece(c, &[a])).collect();
    pieces.push(piece(LeafClass::Range { lo, hi }, &[a, b]));
    pieces.extend(second.into_iter().map(|c| piece(c, &[b])));
    Some(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars_of(atoms: &Atoms, ids: &BTreeSet<AtomId>, sample: &str) -> String {
        sample
            .chars()
            .filter(|&c| ids.contains(&atoms.classify(c)))
            .collect()
    }

    #[test]
    fn empty_input_has_only_others() {
        let a = atomize([]);
        assert_eq!(a.atoms.len(), 1);
        assert!(a.class_atoms.is_empty());
    }

    #[test]
    fn overlapping_sets_are_split() {
        let x = CharClass::explicit("abc".chars());
        let y = CharClass::explicit("bcd".chars());
        let a = atomize([&x, &y]);
        // {a}, {b,c}, {d}, others
        assert_eq!(a.atoms.len(), 4);
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[0], "abcdz"), "abc");
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[1], "abcdz"), "bcd");
    }

    #[test]
    fn range_cut_by_set() {
        let r = CharClass::range('a', 'z');
        let v = CharClass::explicit("aex!".chars());
        let a = atomize([&r, &v]);
        let sample = "abefxyz!?";
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[0], sample), "abefxyz");
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[1], sample), "aex!");
        let classes: BTreeSet<_> = sample.chars().map(|c| a.atoms.classify(c)).collect();
        assert_eq!(classes.len(), 6);
    }

    #[test]
    fn ranges_sweep() {
        let r1 = CharClass::range('a', 'm');
        let r2 = CharClass::range('h', 'z');
        let a = atomize([&r1, &r2]);
        assert_eq!(a.atoms.len(), 4);
        assert_eq!(a.atoms.classify('h'), a.atoms.classify('m'));
        assert_ne!(a.atoms.classify('g'), a.atoms.classify('h'));
        assert_ne!(a.atoms.classify('m'), a.atoms.classify('n'));
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[0], "agmnz"), "agm");
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[1], "agmnz"), "mnz");
    }

    #[test]
    fn complement_includes_others() {
        let digits = CharClass::range('0', '9');
        let not_digits = digits.clone().complement();
        let a = atomize([&not_digits]);
        assert!(a.class_atoms[0].contains(&a.atoms.others()));
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[0], "a5%"), "a%");
    }

    #[test]
    fn complement_of_nothing_is_everything() {
        let any = CharClass::any();
        let a = atomize([&any]);
        assert_eq!(a.class_atoms[0].len(), a.atoms.len());
    }

    #[test]
    fn intersection_and_union() {
        let lower = CharClass::range('a', 'z');
        let vowels = CharClass::explicit("aeiou".chars());
        let consonants = lower.clone().intersect(vowels.clone().complement());
        let digits_or_vowels = CharClass::range('0', '9').union(vowels);
        let a = atomize([&consonants, &digits_or_vowels]);
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[0], "abe7z"), "bz");
        assert_eq!(chars_of(&a.atoms, &a.class_atoms[1], "abe7z"), "ae7");
    }

    #[test]
    fn identical_leaves_share_one_atom() {
        let x = CharClass::single('q');
        let y = CharClass::single('q');
        let a = atomize([&x, &y]);
        assert_eq!(a.atoms.len(), 2);
        assert_eq!(a.class_atoms[0], a.class_atoms[1]);
    }

    #[test]
    fn display() {
        let c = CharClass::range('a', 'c').union(CharClass::single('x')).complement();
        assert_eq!(c.to_string(), "!('a'..='c' | {'x'})");
    }
}
