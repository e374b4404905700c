use indexmap::IndexSet;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tablex::{AtomId, Dfa};

/// Nondeterministic automaton over atoms.
///
/// Edges labelled `None` are epsilon moves. Built by Thompson construction
/// with exactly one start and one end node.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    nodes: Vec<Vec<(Option<AtomId>, usize)>>,
    start: usize,
    end: usize,
}

impl Nfa {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self) -> usize {
        self.nodes.push(Vec::new());
        self.nodes.len() - 1
    }

    pub fn add_edge(&mut self, source: usize, label: Option<AtomId>, target: usize) {
        self.nodes[source].push((label, target));
    }

    pub fn set_start(&mut self, start: usize) {
        self.start = start;
    }

    pub fn set_end(&mut self, end: usize) {
        self.end = end;
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes reachable from `nodes` through epsilon edges alone.
    pub fn epsilon_closure(&self, nodes: impl IntoIterator<Item = usize>) -> BTreeSet<usize> {
        let mut closure = BTreeSet::new();
        let mut queue: VecDeque<usize> = nodes.into_iter().collect();
        while let Some(n) = queue.pop_front() {
            if !closure.insert(n) {
                continue;
            }
            for &(label, target) in &self.nodes[n] {
                if label.is_none() && !closure.contains(&target) {
                    queue.push_back(target);
                }
            }
        }
        closure
    }

    /// Subset construction. No minimization: one DFA node per reachable
    /// NFA subset.
    pub fn to_dfa(&self) -> Dfa {
        let mut dfa = Dfa::new();
        if self.nodes.is_empty() {
            return dfa;
        }
        let mut subsets: IndexSet<BTreeSet<usize>> = IndexSet::new();
        let start = self.epsilon_closure([self.start]);
        let node = dfa.add_node(start.contains(&self.end));
        dfa.set_start(node);
        subsets.insert(start);

        let mut current = 0;
        while current < subsets.len() {
            let mut moves: BTreeMap<AtomId, BTreeSet<usize>> = BTreeMap::new();
            for &n in &subsets[current] {
                for &(label, target) in &self.nodes[n] {
                    if let Some(atom) = label {
                        moves.entry(atom).or_default().insert(target);
                    }
                }
            }
            for (atom, targets) in moves {
                let next = self.epsilon_closure(targets);
                let is_final = next.contains(&self.end);
                let (index, inserted) = subsets.insert_full(next);
                if inserted {
                    dfa.add_node(is_final);
                }
                dfa.add_edge(current, atom, index);
            }
            current += 1;
        }
        log::trace!(
            "subset construction: {} NFA nodes, {} DFA nodes",
            self.nodes.len(),
            dfa.nodes().len()
        );
        dfa
    }
}
