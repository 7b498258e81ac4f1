//! The alignment lattice of a candidate relation.
//!
//! For a relation `R`, the [`AlignmentGraph`] is a DAG whose nodes are the
//! alignment pairs `(L, Rg)` reachable from the singleton pairs of `R` by
//! merging nodes that share a side. Nodes are grouped by complexity
//! `k = |L| · |Rg|`; the alignment handed to the decision procedure at a
//! complexity budget `k` is the set of all nodes with complexity `≤ k`.
//!
//! Node masks pack one bit per symbol: bit `j` for the `j`-th left symbol and
//! bit `n1 + j` for the `j`-th right symbol, so a node is identified by
//! `id = left | right` and two merge paths reaching the same grouping share
//! one node.

mod pair;

pub use pair::{Alignment, AlignmentDocument, AlignmentPair};

use crate::relation::{BitRelation, SearchSpace};
use log::trace;
use std::collections::{BTreeMap, VecDeque};
use std::fmt::Write;

/// One alignment pair `(L, Rg)` in mask form.
#[derive(Clone, Debug)]
pub struct AlignmentNode {
    id: u64,
    left: u64,
    right: u64,
    k_left: u16,
    k_right: u16,
    /// Ids of nodes generated by merging this node with a sibling.
    next: Vec<u64>,
}

impl AlignmentNode {
    fn new(left: u64, right: u64) -> AlignmentNode {
        AlignmentNode {
            id: left | right,
            left,
            right,
            k_left: left.count_ones() as u16,
            k_right: right.count_ones() as u16,
            next: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn left(&self) -> u64 {
        self.left
    }

    pub fn right(&self) -> u64 {
        self.right
    }

    /// The complexity `k = |L| · |Rg|` of this grouping.
    pub fn complexity(&self) -> u16 {
        self.k_left * self.k_right
    }
}

/// The lattice of alignment pairs of one relation, grouped by complexity.
///
/// A throwaway per-job structure: nodes live in an arena indexed by id, and
/// the whole graph is dropped when the job finishes.
pub struct AlignmentGraph<'a> {
    space: &'a SearchSpace,
    arena: Vec<AlignmentNode>,
    index: BTreeMap<u64, usize>,
    /// Complexity `k` to the (id-ordered) nodes at that complexity.
    node_map: BTreeMap<u16, BTreeMap<u64, usize>>,
}

impl<'a> AlignmentGraph<'a> {
    /// Build the full lattice for `relation`.
    ///
    /// Seeds one complexity-1 node per set pair, then merges in waves: two
    /// nodes of the same wave sharing a side propose their union, which is
    /// accepted only if it advances the opposite side by exactly one symbol.
    /// Each accepted id is created once; the construction terminates because
    /// the id domain is finite and every wave only creates strictly larger
    /// masks.
    pub fn build(space: &'a SearchSpace, relation: &BitRelation) -> AlignmentGraph<'a> {
        let mut graph = AlignmentGraph {
            space,
            arena: Vec::new(),
            index: BTreeMap::new(),
            node_map: BTreeMap::new(),
        };

        let n1 = space.left_count();
        let mut wave = VecDeque::new();
        for i in relation.pair_indices() {
            let (i1, i2) = space.pair(i);
            let left = 1u64 << i1;
            let right = 1u64 << (n1 + i2);
            if let Some(idx) = graph.insert(AlignmentNode::new(left, right)) {
                wave.push_back(idx);
            }
        }

        graph.merge_waves(wave);
        trace!(
            "alignment graph for R={{{}}}: {} nodes, largest k = {:?}",
            relation,
            graph.arena.len(),
            graph.largest_k()
        );
        graph
    }

    fn merge_waves(&mut self, mut wave: VecDeque<usize>) {
        let mut left_map: BTreeMap<u64, Vec<usize>> = BTreeMap::new();
        let mut right_map: BTreeMap<u64, Vec<usize>> = BTreeMap::new();

        while !wave.is_empty() {
            left_map.clear();
            right_map.clear();
            while let Some(idx) = wave.pop_front() {
                left_map.entry(self.arena[idx].left).or_default().push(idx);
                right_map.entry(self.arena[idx].right).or_default().push(idx);
            }

            // Nodes sharing a left mask, like {ab~x, ab~y}, merge into ab~xy.
            for group in left_map.values() {
                for (a, &first) in group.iter().enumerate() {
                    for &second in &group[a + 1..] {
                        let right = self.arena[first].right | self.arena[second].right;
                        // Single-symbol-advance: the merged side must gain
                        // exactly one symbol over the first parent.
                        if right.count_ones() as u16 != self.arena[first].k_right + 1 {
                            continue;
                        }
                        let left = self.arena[first].left;
                        if let Some(idx) = self.create_if_absent(left, right, first, second) {
                            wave.push_back(idx);
                        }
                    }
                }
            }

            // Symmetrically for nodes sharing a right mask, like {ab~x, cd~x}.
            for group in right_map.values() {
                for (a, &first) in group.iter().enumerate() {
                    for &second in &group[a + 1..] {
                        let left = self.arena[first].left | self.arena[second].left;
                        if left.count_ones() as u16 != self.arena[first].k_left + 1 {
                            continue;
                        }
                        let right = self.arena[first].right;
                        if let Some(idx) = self.create_if_absent(left, right, first, second) {
                            wave.push_back(idx);
                        }
                    }
                }
            }
        }
    }

    /// Create the node `(left, right)` unless it coincides with a parent or
    /// already exists. Returns the arena index of a freshly created node.
    fn create_if_absent(
        &mut self,
        left: u64,
        right: u64,
        first: usize,
        second: usize,
    ) -> Option<usize> {
        let id = left | right;
        if id == self.arena[first].id || id == self.arena[second].id {
            return None;
        }
        if self.index.contains_key(&id) {
            return None;
        }

        let idx = self.insert(AlignmentNode::new(left, right));
        if idx.is_some() {
            self.arena[first].next.push(id);
            self.arena[second].next.push(id);
        }
        idx
    }

    /// Register a node in the arena, the id index and its k-group. Returns
    /// `None` if the id is already present.
    fn insert(&mut self, node: AlignmentNode) -> Option<usize> {
        if self.index.contains_key(&node.id) {
            return None;
        }
        let idx = self.arena.len();
        let id = node.id;
        let k = node.complexity();
        self.arena.push(node);
        self.index.insert(id, idx);
        self.node_map.entry(k).or_default().insert(id, idx);
        Some(idx)
    }

    /// Number of distinct alignment pairs in the lattice.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// The highest complexity with at least one node, or `None` for the
    /// empty relation.
    pub fn largest_k(&self) -> Option<u16> {
        self.node_map.keys().next_back().copied()
    }

    /// The populated complexities, ascending.
    pub fn complexities(&self) -> impl Iterator<Item = u16> + '_ {
        self.node_map.keys().copied()
    }

    /// All alignment pairs at complexity `k`, ordered by id.
    pub fn nodes_at(&self, k: u16) -> impl Iterator<Item = &AlignmentNode> + '_ {
        self.node_map
            .get(&k)
            .into_iter()
            .flat_map(|group| group.values().map(|&idx| &self.arena[idx]))
    }

    /// Emit the alignment for a complexity budget: every pair with
    /// complexity `≤ max_k`, largest complexities first, id-ordered within
    /// one complexity. The decision procedure fails on other orderings of
    /// valid alignments, so this order is part of the oracle contract.
    pub fn to_oracle_alignment(&self, max_k: u16) -> Alignment {
        let mut alignment = Alignment::new();
        for (&k, group) in self.node_map.iter().rev() {
            if k > max_k {
                continue;
            }
            for &idx in group.values() {
                alignment.push(self.labeled_pair(&self.arena[idx]));
            }
        }
        alignment
    }

    /// The alignment as a human-readable group list, e.g. `ab~s, c~t`.
    pub fn sorted_alignment(&self, max_k: u16) -> String {
        let mut out = String::new();
        for (&k, group) in self.node_map.iter().rev() {
            if k > max_k {
                continue;
            }
            for &idx in group.values() {
                if !out.is_empty() {
                    out.push_str(", ");
                }
                out.push_str(&self.label_of(self.arena[idx].id));
            }
        }
        out
    }

    /// Convert a node to its label form.
    fn labeled_pair(&self, node: &AlignmentNode) -> AlignmentPair {
        let n1 = self.space.left_count();
        let mut lhs = Vec::with_capacity(node.k_left as usize);
        for j in 0..n1 {
            if node.left & (1u64 << j) != 0 {
                lhs.push(self.space.symbols_left()[j as usize].clone());
            }
        }
        let mut rhs = Vec::with_capacity(node.k_right as usize);
        for j in 0..self.space.right_count() {
            if node.right & (1u64 << (n1 + j)) != 0 {
                rhs.push(self.space.symbols_right()[j as usize].clone());
            }
        }
        AlignmentPair { lhs, rhs }
    }

    /// Render a node mask as `ab~st`. The empty mask renders as an empty
    /// string.
    fn label_of(&self, id: u64) -> String {
        if id == 0 {
            return String::new();
        }
        let n1 = self.space.left_count();
        let mut out = String::new();
        for j in 0..(n1 + self.space.right_count()) {
            if j == n1 {
                out.push('~');
            }
            if id & (1u64 << j) != 0 {
                if j < n1 {
                    out.push_str(&self.space.symbols_left()[j as usize]);
                } else {
                    out.push_str(&self.space.symbols_right()[(j - n1) as usize]);
                }
            }
        }
        out
    }

    /// Render the lattice in Graphviz dot format, with the relation printed
    /// above the graph. Edges run from each node to the nodes it helped
    /// generate; the complexity-1 seeds hang off a synthetic `{}` root.
    pub fn to_dot(&self, relation: &BitRelation) -> String {
        let mut out = String::new();
        out.push_str("digraph AlignmentGraph {\n");
        let _ = writeln!(
            out,
            "label=\"S1={{{}}}, S2={{{}}}, R={{{}}}\";\nlabelloc=\"t\";",
            self.space.symbols_left().join(","),
            self.space.symbols_right().join(","),
            relation
        );

        for node in self.nodes_at(1) {
            let _ = writeln!(out, "  \"{{}}\" -> {}", self.dot_label(node));
        }
        for node in &self.arena {
            for &next_id in &node.next {
                let next = &self.arena[self.index[&next_id]];
                let _ = writeln!(out, "  {} -> {}", self.dot_label(node), self.dot_label(next));
            }
        }

        out.push_str("}\n");
        out
    }

    fn dot_label(&self, node: &AlignmentNode) -> String {
        format!("\"{{{}}} {}\"", self.label_of(node.id), node.complexity())
    }
}
