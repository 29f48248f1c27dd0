// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Triplet enumeration from a known structure (spec C2), ported from the
//! combination-of-ancestor-sets dispatch in
//! `general_tree.py::_find_triplets` (trees) and
//! `level_one_network.py::_find_triplets` (networks, via spanning-tree
//! union — see `graph::spanning`).

use std::collections::HashSet;

use itertools::Itertools;

use super::{spanning, Graph, NodeId};
use crate::label::Label;
use crate::triplet::{Triplet, TripletShape};

/// The full triplet set induced by `graph`: every combination of three
/// labels, classified into one of the eight shapes.
pub fn enumerate<L: Label>(graph: &Graph<L>) -> HashSet<Triplet<L>> {
    if graph.is_tree() {
        enumerate_tree(graph)
    } else {
        // A network's triplet set is the union over its spanning trees
        // (level_one_network.py: `_find_triplets` walks `spanning_trees`).
        spanning::trees(graph)
            .iter()
            .flat_map(enumerate_tree)
            .collect()
    }
}

fn enumerate_tree<L: Label>(graph: &Graph<L>) -> HashSet<Triplet<L>> {
    let labels: Vec<L> = graph.labels().into_iter().collect();
    let mut out = HashSet::new();
    for combo in labels.iter().combinations(3) {
        let x = combo[0].clone();
        let y = combo[1].clone();
        let z = combo[2].clone();
        if let Some(t) = classify(graph, x, y, z) {
            out.insert(t);
        }
    }
    out
}

fn lca<L: Label>(graph: &Graph<L>, a: &NodeId, b: &NodeId) -> NodeId {
    let anc_a = graph.ancestors(a);
    let mut cur = b.clone();
    loop {
        if anc_a.contains(&cur) {
            return cur;
        }
        cur = graph
            .parents_of(&cur)
            .first()
            .cloned()
            .expect("tree root is a common ancestor of every node");
    }
}

fn depth<L: Label>(graph: &Graph<L>, n: &NodeId) -> usize {
    graph.ancestors(n).len()
}

/// Classifies the unordered label triple `{x, y, z}` against a genuine
/// tree (single-parent) graph, returning the triplet it induces.
fn classify<L: Label>(graph: &Graph<L>, x: L, y: L, z: L) -> Option<Triplet<L>> {
    let nx = graph.node_of(&x)?;
    let ny = graph.node_of(&y)?;
    let nz = graph.node_of(&z)?;

    let lca_xy = lca(graph, &nx, &ny);
    let lca_xz = lca(graph, &nx, &nz);
    let lca_yz = lca(graph, &ny, &nz);

    let build = |shape, nodes: [L; 3]| Triplet::from_parts(shape, nodes).ok();

    if lca_xy == lca_xz && lca_xy == lca_yz {
        let m = lca_xy;
        return if m == nx {
            chain_or_v(graph, x, y, z, &ny, &nz)
        } else if m == ny {
            chain_or_v(graph, y, x, z, &nx, &nz)
        } else if m == nz {
            chain_or_v(graph, z, x, y, &nx, &ny)
        } else {
            build(TripletShape::Fanned, [x, y, z])
        };
    }

    // Exactly one pair has a strictly more specific (deeper) LCA than the
    // other two, which coincide at the outer common ancestor.
    let candidates = [
        (depth(graph, &lca_xy), x.clone(), y.clone(), z.clone(), lca_xy, nx.clone(), ny.clone()),
        (depth(graph, &lca_xz), x.clone(), z.clone(), y.clone(), lca_xz, nx.clone(), nz.clone()),
        (depth(graph, &lca_yz), y.clone(), z.clone(), x.clone(), lca_yz, ny.clone(), nz.clone()),
    ];
    let (_, a, b, sep, pair_lca, na, nb) = candidates
        .into_iter()
        .max_by_key(|c| c.0)
        .expect("three candidates");

    if pair_lca == na {
        build(TripletShape::DownResolved, [b, a, sep])
    } else if pair_lca == nb {
        build(TripletShape::DownResolved, [a, b, sep])
    } else {
        build(TripletShape::ResolvedPairLeft, [a, b, sep])
    }
}

/// `root` is a common ancestor of both `a_node` and `b_node`: decide
/// between a chain (one of them is also an ancestor of the other) and a
/// V-triplet (they are incomparable siblings beneath `root`).
fn chain_or_v<L: Label>(
    graph: &Graph<L>,
    root: L,
    a: L,
    b: L,
    a_node: &NodeId,
    b_node: &NodeId,
) -> Option<Triplet<L>> {
    if graph.is_ancestor(a_node, b_node) {
        Triplet::from_parts(TripletShape::PathUp, [root, a, b]).ok()
    } else if graph.is_ancestor(b_node, a_node) {
        Triplet::from_parts(TripletShape::PathUp, [root, b, a]).ok()
    } else {
        Triplet::from_parts(TripletShape::VTriplet, [a, root, b]).ok()
    }
}
