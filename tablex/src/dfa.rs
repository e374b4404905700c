use crate::charclass::AtomId;
use std::collections::BTreeMap;

/// A node of a [`Dfa`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DfaNode {
    pub is_final: bool,
    transitions: BTreeMap<AtomId, usize>,
}

/// A labelled DFA edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DfaEdge {
    pub source: usize,
    pub target: usize,
    pub atom: AtomId,
}

/// Deterministic automaton over atoms.
///
/// Nodes live in an arena and are addressed by index. Each node keeps at
/// most one outgoing edge per atom; [`Dfa::add_edge`] refuses a second one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dfa {
    start: usize,
    nodes: Vec<DfaNode>,
}

impl Dfa {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node and returns its index.
    pub fn add_node(&mut self, is_final: bool) -> usize {
        self.nodes.push(DfaNode {
            is_final,
            transitions: BTreeMap::new(),
        });
        self.nodes.len() - 1
    }

    pub fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    /// Adds `source --atom--> target`. Returns `false` (and leaves the
    /// automaton unchanged) if `source` already has a different edge on `atom`.
    pub fn add_edge(&mut self, source: usize, atom: AtomId, target: usize) -> bool {
        let node = &mut self.nodes[source];
        match node.transitions.get(&atom) {
            Some(&existing) => existing == target,
            None => {
                node.transitions.insert(atom, target);
                true
            }
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn nodes(&self) -> &[DfaNode] {
        &self.nodes
    }

    pub fn is_final(&self, node: usize) -> bool {
        self.nodes[node].is_final
    }

    /// The node reached from `node` on `atom`, if any.
    #[inline]
    pub fn step(&self, node: usize, atom: AtomId) -> Option<usize> {
        self.nodes[node].transitions.get(&atom).copied()
    }

    pub fn edges(&self) -> impl Iterator<Item = DfaEdge> + '_ {
        self.nodes.iter().enumerate().flat_map(|(source, node)| {
            node.transitions.iter().map(move |(&atom, &target)| DfaEdge {
                source,
                target,
                atom,
            })
        })
    }
}
