// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Spanning-tree enumeration for level-1 networks (spec C3), ported from
//! `level_one_network.py`'s `spanning_trees` property: drop one of the
//! two incoming edges at each reticulation, in every combination, and
//! keep only the results that are still single-rooted and connected.

use std::cell::RefCell;

use super::Graph;
use crate::label::Label;

/// Every spanning tree obtainable from `graph` by dropping one incoming
/// edge per reticulation. A graph with no reticulations spans to itself.
pub fn trees<L: Label>(graph: &Graph<L>) -> Vec<Graph<L>> {
    let reticulations = graph.reticulations();
    if reticulations.is_empty() {
        return vec![graph.clone()];
    }

    let k = reticulations.len();
    let mut out = Vec::with_capacity(1 << k);
    for mask in 0u32..(1 << k) {
        let mut candidate = graph.clone();
        for (i, r) in reticulations.iter().enumerate() {
            let parents = candidate.parents.get(r).cloned().unwrap_or_default();
            if parents.len() != 2 {
                continue;
            }
            let drop_index = if mask & (1 << i) != 0 { 1 } else { 0 };
            let dropped = parents[drop_index].clone();
            let kept = parents[1 - drop_index].clone();
            if let Some(children) = candidate.children.get_mut(&dropped) {
                children.retain(|c| c != r);
            }
            candidate.parents.insert(r.clone(), vec![kept]);
        }
        candidate.triplet_cache = RefCell::new(None);
        if is_single_rooted_tree(&candidate) {
            out.push(candidate);
        }
    }
    out
}

fn is_single_rooted_tree<L: Label>(graph: &Graph<L>) -> bool {
    let reachable = graph.descendants(&graph.root());
    let nodes = graph.nodes();
    if reachable.len() != nodes.len() {
        return false;
    }
    nodes.iter().all(|n| {
        if *n == graph.root() {
            graph.parents_of(n).is_empty()
        } else {
            graph.parents_of(n).len() == 1
        }
    })
}
