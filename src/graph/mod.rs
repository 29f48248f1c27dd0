// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! `Graph`, the rooted DAG that backs multifurcating trees, general trees
//! and level-1 networks alike (spec C2).
//!
//! Mirrors `AbstractGraph` in `rooted_triplet_distance/__abstract.py`:
//! built from a nested `{parent: {child: {...}}}` map, lazily memoizing
//! its derived triplet set, and comparing equal to another graph only up
//! to a label-preserving isomorphism rather than by raw adjacency.

pub mod distance;
pub mod spanning;
pub mod spr;
pub mod triplets;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::counter::Counter;
use crate::error::GraphError;
use crate::label::Label;
use crate::triplet::Triplet;

/// Opaque internal vertex identity. Never exposed to triplet-level code;
/// only `Graph` and its submodules see it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

/// The nested-map input format: `{parent_label: {child_label: {...}, ...}}`.
///
/// A label that recurs as a key anywhere else in the structure denotes a
/// second edge into the node first defined under that label (a level-1
/// reticulation), not a redefinition; its own nested map must then be
/// empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeDict<L: Label>(pub HashMap<L, TreeDict<L>>);

impl<L: Label> TreeDict<L> {
    /// An empty subtree marker, used for the second (and later) mention of
    /// a reticulation's label.
    pub fn leaf() -> Self {
        TreeDict(HashMap::new())
    }
}

/// A rooted, labeled DAG: a tree when every node has a single parent, a
/// level-1 network when some nodes (reticulations) have exactly two.
///
/// The memoized triplet cache is deliberately excluded from the
/// serialized form (`#[serde(skip)]`) and recomputed lazily on first
/// access after a round-trip, the same way the teacher excludes
/// `TreeReplica`'s derived indices from its own `State` serialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph<L: Label> {
    root: NodeId,
    next_id: usize,
    labels: HashMap<NodeId, L>,
    label_to_node: HashMap<L, NodeId>,
    children: HashMap<NodeId, Vec<NodeId>>,
    parents: HashMap<NodeId, Vec<NodeId>>,
    #[serde(skip)]
    triplet_cache: RefCell<Option<HashSet<Triplet<L>>>>,
}

impl<L: Label> Graph<L> {
    fn empty() -> Self {
        Self {
            root: NodeId(0),
            next_id: 0,
            labels: HashMap::new(),
            label_to_node: HashMap::new(),
            children: HashMap::new(),
            parents: HashMap::new(),
            triplet_cache: RefCell::new(None),
        }
    }

    /// Builder entry point for the reconstruction engines, which assemble
    /// a `Graph` node by node rather than from a `TreeDict`.
    pub(crate) fn builder() -> Self {
        Self::empty()
    }

    /// Adds a fresh, as yet unlabeled vertex and returns its id.
    pub(crate) fn add_node(&mut self) -> NodeId {
        self.fresh_node()
    }

    /// Assigns `label` to `node`. `node` must have no label yet.
    pub(crate) fn set_label(&mut self, node: NodeId, label: L) {
        self.labels.insert(node.clone(), label.clone());
        self.label_to_node.insert(label, node);
    }

    /// Adds a directed edge `parent -> child`.
    pub(crate) fn add_edge(&mut self, parent: NodeId, child: NodeId) {
        self.link(parent, child);
    }

    /// Declares `node` the root of the graph.
    pub(crate) fn set_root(&mut self, node: NodeId) {
        self.root = node;
    }

    fn fresh_node(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.children.insert(id, Vec::new());
        self.parents.insert(id, Vec::new());
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.children.get_mut(&parent).unwrap().push(child);
        self.parents.get_mut(&child).unwrap().push(parent);
    }

    /// Builds a graph from a single-rooted nested map. A reticulation's two
    /// mentions may appear in either order in the map (it's a `HashMap`, so
    /// iteration order isn't meaningful); whichever mention carries its
    /// own subtree is used as the node's real definition, and every other
    /// mention is treated as a second incoming link regardless of which
    /// one is visited first.
    pub fn from_tree_dict(dict: &TreeDict<L>) -> Result<Self, GraphError> {
        if dict.0.len() != 1 {
            return Err(GraphError::NotSingleRooted(dict.0.len()));
        }
        let (root_label, root_subtree) = dict.0.iter().next().unwrap();

        let mut definitions: HashMap<L, &TreeDict<L>> = HashMap::new();
        Self::collect_definitions(root_label, root_subtree, &mut definitions);

        let mut g = Self::empty();
        let root = g.fresh_node();
        g.root = root;
        g.labels.insert(root.clone(), root_label.clone());
        g.label_to_node.insert(root_label.clone(), root.clone());
        g.build_subtree(root, root_subtree, &definitions);
        Ok(g)
    }

    /// Finds, for every label in the map, the one occurrence whose subtree
    /// should be treated as authoritative: the first non-empty mention
    /// found, or (if every mention is empty, i.e. a leaf) whichever is
    /// found first.
    fn collect_definitions<'a>(
        label: &'a L,
        subtree: &'a TreeDict<L>,
        out: &mut HashMap<L, &'a TreeDict<L>>,
    ) {
        let replace = match out.get(label) {
            None => true,
            Some(existing) => existing.0.is_empty() && !subtree.0.is_empty(),
        };
        if replace {
            out.insert(label.clone(), subtree);
        }
        for (child_label, grandchildren) in subtree.0.iter() {
            Self::collect_definitions(child_label, grandchildren, out);
        }
    }

    fn build_subtree(&mut self, parent: NodeId, subtree: &TreeDict<L>, definitions: &HashMap<L, &TreeDict<L>>) {
        for (label, _) in subtree.0.iter() {
            if let Some(&existing) = self.label_to_node.get(label) {
                self.link(parent.clone(), existing);
                continue;
            }
            let child = self.fresh_node();
            self.labels.insert(child.clone(), label.clone());
            self.label_to_node.insert(label.clone(), child.clone());
            self.link(parent.clone(), child.clone());
            let canonical_subtree = definitions.get(label).copied().unwrap_or(subtree);
            self.build_subtree(child, canonical_subtree, definitions);
        }
        self.triplet_cache = RefCell::new(None);
    }

    /// The root vertex.
    pub fn root(&self) -> NodeId {
        self.root.clone()
    }

    /// All vertex ids, in insertion order.
    pub fn nodes(&self) -> Vec<NodeId> {
        (0..self.next_id).map(NodeId).collect()
    }

    /// All labels present in the graph.
    pub fn labels(&self) -> HashSet<L> {
        self.labels.values().cloned().collect()
    }

    /// The label of a vertex, if any (internal/synthetic vertices carry
    /// none).
    pub fn label_of(&self, node: &NodeId) -> Option<&L> {
        self.labels.get(node)
    }

    /// The vertex carrying `label`, if the label is present.
    pub fn node_of(&self, label: &L) -> Option<NodeId> {
        self.label_to_node.get(label).cloned()
    }

    /// Direct children of `node`.
    pub fn children_of(&self, node: &NodeId) -> &[NodeId] {
        self.children.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Direct parents of `node` (more than one marks a reticulation).
    pub fn parents_of(&self, node: &NodeId) -> &[NodeId] {
        self.parents.get(node).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// True if `node` has more than one parent.
    pub fn is_reticulation(&self, node: &NodeId) -> bool {
        self.parents_of(node).len() > 1
    }

    /// True if `node` has no children.
    pub fn is_leaf(&self, node: &NodeId) -> bool {
        self.children_of(node).is_empty()
    }

    /// All vertices reachable from `node` (inclusive of `node`), following
    /// children edges. Safe on DAGs: visited-set keyed dedup handles
    /// reticulations reached by more than one path.
    pub fn descendants(&self, node: &NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node.clone());
        while let Some(n) = queue.pop_front() {
            if !seen.insert(n.clone()) {
                continue;
            }
            for c in self.children_of(&n) {
                queue.push_back(c.clone());
            }
        }
        seen
    }

    /// The labels of every leaf reachable from `node`.
    pub fn descendant_labels(&self, node: &NodeId) -> HashSet<L> {
        self.descendants(node)
            .iter()
            .filter_map(|n| self.labels.get(n).cloned())
            .collect()
    }

    /// True if `ancestor` can reach `node` via children edges.
    pub fn is_ancestor(&self, ancestor: &NodeId, node: &NodeId) -> bool {
        if ancestor == node {
            return true;
        }
        self.descendants(ancestor).contains(node)
    }

    /// All ancestors of `node`, including `node` itself.
    pub fn ancestors(&self, node: &NodeId) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut queue = VecDeque::new();
        queue.push_back(node.clone());
        while let Some(n) = queue.pop_front() {
            if !seen.insert(n.clone()) {
                continue;
            }
            for p in self.parents_of(&n) {
                queue.push_back(p.clone());
            }
        }
        seen
    }

    /// This graph's full triplet set, computed once and cached (spec §3
    /// "Lifecycle: lazily derived, memoized on first access").
    pub fn triplets(&self) -> HashSet<Triplet<L>> {
        if let Some(cached) = self.triplet_cache.borrow().as_ref() {
            return cached.clone();
        }
        let computed = triplets::enumerate(self);
        *self.triplet_cache.borrow_mut() = Some(computed.clone());
        computed
    }

    /// True if every vertex has at most one parent (a tree, not a
    /// network).
    pub fn is_tree(&self) -> bool {
        self.nodes().iter().all(|n| self.parents_of(n).len() <= 1)
    }

    /// Vertices with two parents: the reticulations of a level-1 network.
    pub fn reticulations(&self) -> Vec<NodeId> {
        self.nodes().into_iter().filter(|n| self.is_reticulation(n)).collect()
    }

    /// Label-preserving isomorphism check (spec C2 "isomorphism equality"):
    /// labeled vertices must match exactly; unlabeled/synthetic vertices
    /// are free to correspond to any structurally-matching counterpart.
    pub fn is_isomorphic(&self, other: &Self) -> bool {
        if self.labels() != other.labels() {
            return false;
        }
        if self.nodes().len() != other.nodes().len() {
            return false;
        }
        let mut memo = HashMap::new();
        Self::match_node(self, &self.root, other, &other.root, &mut memo)
    }

    fn match_node(
        a: &Self,
        an: &NodeId,
        b: &Self,
        bn: &NodeId,
        memo: &mut HashMap<(NodeId, NodeId), bool>,
    ) -> bool {
        if let Some(&cached) = memo.get(&(an.clone(), bn.clone())) {
            return cached;
        }
        if a.label_of(an) != b.label_of(bn) {
            memo.insert((an.clone(), bn.clone()), false);
            return false;
        }
        let ac = a.children_of(an);
        let bc = b.children_of(bn);
        if ac.len() != bc.len() {
            memo.insert((an.clone(), bn.clone()), false);
            return false;
        }
        memo.insert((an.clone(), bn.clone()), true);
        let result = Self::match_children(a, ac, b, bc, memo);
        memo.insert((an.clone(), bn.clone()), result);
        result
    }

    /// Backtracking bijection search over sibling sets: order is
    /// irrelevant, so try every permutation-by-recursive-pick until one
    /// assignment makes every pair match.
    fn match_children(
        a: &Self,
        ac: &[NodeId],
        b: &Self,
        bc: &[NodeId],
        memo: &mut HashMap<(NodeId, NodeId), bool>,
    ) -> bool {
        if ac.is_empty() {
            return true;
        }
        let (first, rest) = ac.split_first().unwrap();
        for (i, cand) in bc.iter().enumerate() {
            if Self::match_node(a, first, b, cand, memo) {
                let mut remaining = bc.to_vec();
                remaining.remove(i);
                if Self::match_children(a, rest, b, &remaining, memo) {
                    return true;
                }
            }
        }
        false
    }
}

impl<L: Label> PartialEq for Graph<L> {
    fn eq(&self, other: &Self) -> bool {
        self.is_isomorphic(other)
    }
}

impl<L: Label> Eq for Graph<L> {}

impl<L: Label + fmt::Display> fmt::Display for Graph<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let naming = Counter::new();
        let mut names: HashMap<NodeId, String> = HashMap::new();
        self.write_node(f, &self.root, 0, &naming, &mut names)
    }
}

impl<L: Label + fmt::Display> Graph<L> {
    fn write_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        node: &NodeId,
        depth: usize,
        naming: &Counter,
        names: &mut HashMap<NodeId, String>,
    ) -> fmt::Result {
        let label = match self.label_of(node) {
            Some(l) => l.to_string(),
            None => names
                .entry(node.clone())
                .or_insert_with(|| naming.next_name())
                .clone(),
        };
        writeln!(f, "{}{}", "  ".repeat(depth), label)?;
        for child in self.children_of(node) {
            self.write_node(f, child, depth + 1, naming, names)?;
        }
        Ok(())
    }
}
