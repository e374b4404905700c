//! Atoms: pairwise-disjoint primitive character classes.
//!
//! The atom list is the alphabet compiled automatons run over. Every `char`
//! belongs to exactly one atom; the catch-all [`LeafClass::Others`] is always
//! last so that "first atom containing `c`" is a total classification.

use std::collections::BTreeSet;
use std::fmt;

/// Index of an atom inside its [`Atoms`] list.
pub type AtomId = usize;

/// A primitive character class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LeafClass {
    /// An explicit enumeration of characters.
    Explicit(BTreeSet<char>),
    /// The inclusive code point range `lo..=hi`.
    Range { lo: u32, hi: u32 },
    /// Everything not covered by any other atom.
    Others,
}

impl LeafClass {
    pub fn range(lo: char, hi: char) -> Self {
        LeafClass::Range {
            lo: lo as u32,
            hi: hi as u32,
        }
    }

    pub fn contains(&self, c: char) -> bool {
        match self {
            LeafClass::Explicit(set) => set.contains(&c),
            LeafClass::Range { lo, hi } => (*lo..=*hi).contains(&(c as u32)),
            LeafClass::Others => true,
        }
    }

    /// Whether the class holds no character at all.
    pub fn is_empty(&self) -> bool {
        match self {
            LeafClass::Explicit(set) => set.is_empty(),
            LeafClass::Range { lo, hi } => lo > hi,
            LeafClass::Others => false,
        }
    }
}

impl fmt::Display for LeafClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafClass::Explicit(set) => {
                write!(f, "{{")?;
                for (i, c) in set.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{:?}", c)?;
                }
                write!(f, "}}")
            }
            LeafClass::Range { lo, hi } => {
                let show = |u: u32| match char::from_u32(u) {
                    Some(c) => format!("{:?}", c),
                    None => format!("\\u{{{:x}}}", u),
                };
                write!(f, "{}..={}", show(*lo), show(*hi))
            }
            LeafClass::Others => write!(f, "others"),
        }
    }
}

/// An atom together with the user-authored leaves it was carved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atom {
    pub class: LeafClass,
    /// Ids of the original leaf classes (in collection order) this atom
    /// belongs to. Empty for [`LeafClass::Others`].
    pub origins: BTreeSet<usize>,
}

/// An ordered list of atoms ending with the catch-all atom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Atoms {
    atoms: Vec<Atom>,
}

impl Atoms {
    /// Builds the atom list from disjoint `atoms`, appending the catch-all.
    pub fn new(atoms: impl IntoIterator<Item = Atom>) -> Self {
        let mut atoms: Vec<Atom> = atoms
            .into_iter()
            .filter(|a| a.class != LeafClass::Others)
            .collect();
        atoms.push(Atom {
            class: LeafClass::Others,
            origins: BTreeSet::new(),
        });
        Self { atoms }
    }

    /// Id of the first atom containing `c`.
    #[inline]
    pub fn classify(&self, c: char) -> AtomId {
        self.atoms
            .iter()
            .position(|a| a.class.contains(c))
            .unwrap_or(self.atoms.len() - 1)
    }

    /// Id of the catch-all atom.
    pub fn others(&self) -> AtomId {
        self.atoms.len() - 1
    }

    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter()
    }
}

impl Default for Atoms {
    fn default() -> Self {
        Self::new([])
    }
}
