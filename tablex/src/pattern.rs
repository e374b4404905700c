use crate::charclass::Atoms;
use crate::dfa::Dfa;

/// A compiled regular expression: atoms plus the DFA labelled by them.
///
/// Built once by the regex compiler and reused for every match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPattern {
    atoms: Atoms,
    dfa: Dfa,
}

impl CompiledPattern {
    pub fn new(atoms: Atoms, dfa: Dfa) -> Self {
        Self { atoms, dfa }
    }

    pub fn atoms(&self) -> &Atoms {
        &self.atoms
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    /// Whether the whole of `s` is matched.
    pub fn is_match(&self, s: &str) -> bool {
        if self.dfa.nodes().is_empty() {
            return false;
        }
        let mut state = self.dfa.start();
        for c in s.chars() {
            match self.dfa.step(state, self.atoms.classify(c)) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.dfa.is_final(state)
    }

    /// Byte length of the longest prefix of `s` that is matched.
    ///
    /// A missing edge stops the scan but keeps the best prefix found so far.
    pub fn longest_match_len(&self, s: &str) -> Option<usize> {
        if self.dfa.nodes().is_empty() {
            return None;
        }
        let mut state = self.dfa.start();
        let mut best = self.dfa.is_final(state).then_some(0);
        for (i, c) in s.char_indices() {
            match self.dfa.step(state, self.atoms.classify(c)) {
                Some(next) => {
                    state = next;
                    if self.dfa.is_final(state) {
                        best = Some(i + c.len_utf8());
                    }
                }
                None => break,
            }
        }
        best
    }

    /// The longest prefix of `s` that is matched.
    pub fn longest_match<'a>(&self, s: &'a str) -> Option<&'a str> {
        self.longest_match_len(s).map(|n| &s[..n])
    }
}
