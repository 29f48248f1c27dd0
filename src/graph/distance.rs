// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The five structural distance metrics (spec §4.2).
//!
//! None of these are ported from `original_source/`: the Python project
//! this crate's reconstruction algorithms were distilled from never
//! implements distance metrics, only reconstruction. Each function below
//! is a direct, from-scratch implementation of its spec formula.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use itertools::Itertools;

use super::{Graph, NodeId};
use crate::error::DistanceError;
use crate::label::Label;

fn require_same_labels<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<(), DistanceError> {
    if a.labels() != b.labels() {
        return Err(DistanceError::LabelMismatch);
    }
    Ok(())
}

/// Symmetric difference of the two triplet sets, normalized by their
/// union (0.0 = identical, 1.0 = disjoint).
pub fn triplet_distance<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<f64, DistanceError> {
    require_same_labels(a, b)?;
    let ta = a.triplets();
    let tb = b.triplets();
    let union: HashSet<_> = ta.union(&tb).collect();
    if union.is_empty() {
        return Ok(0.0);
    }
    let shared: HashSet<_> = ta.intersection(&tb).collect();
    Ok(1.0 - (shared.len() as f64 / union.len() as f64))
}

fn clusters<L: Label>(graph: &Graph<L>) -> HashSet<BTreeSet<L>> {
    let total = graph.labels().len();
    graph
        .nodes()
        .into_iter()
        .map(|n| graph.descendant_labels(&n).into_iter().collect::<BTreeSet<_>>())
        .filter(|c| c.len() > 1 && c.len() < total)
        .collect()
}

/// Robinson-Foulds distance: the symmetric difference between the two
/// graphs' non-trivial cluster sets, normalized by their union (spec §4.2,
/// §8 invariant 5: "normalized to [0,1]").
pub fn robinson_foulds<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<f64, DistanceError> {
    require_same_labels(a, b)?;
    let ca = clusters(a);
    let cb = clusters(b);
    let union: HashSet<_> = ca.union(&cb).collect();
    if union.is_empty() {
        return Ok(0.0);
    }
    let sym = ca.symmetric_difference(&cb).count();
    Ok(sym as f64 / union.len() as f64)
}

fn tripartitions<L: Label>(graph: &Graph<L>) -> HashSet<(BTreeSet<L>, BTreeSet<L>)> {
    graph
        .nodes()
        .into_iter()
        .map(|n| {
            let strict: BTreeSet<L> = graph.descendant_labels(&n).into_iter().collect();
            let mut non_strict = strict.clone();
            if let Some(l) = graph.label_of(&n) {
                non_strict.insert(l.clone());
            }
            (strict, non_strict)
        })
        .collect()
}

/// Tripartition distance: symmetric difference of the (strict, non-strict
/// descendant set) pair recorded at every vertex, normalized by the union
/// of both sets (spec §4.2, §8 invariant 5).
pub fn tripartition_distance<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<f64, DistanceError> {
    require_same_labels(a, b)?;
    let pa = tripartitions(a);
    let pb = tripartitions(b);
    let union: HashSet<_> = pa.union(&pb).collect();
    if union.is_empty() {
        return Ok(0.0);
    }
    let sym = pa.symmetric_difference(&pb).count();
    Ok(sym as f64 / union.len() as f64)
}

fn path_counts<L: Label>(graph: &Graph<L>, node: &NodeId) -> BTreeMap<L, usize> {
    if let Some(children) = Some(graph.children_of(node)).filter(|c| !c.is_empty()) {
        let mut totals = BTreeMap::new();
        for child in children {
            for (label, count) in path_counts(graph, child) {
                *totals.entry(label).or_insert(0) += count;
            }
        }
        totals
    } else if let Some(label) = graph.label_of(node) {
        let mut m = BTreeMap::new();
        m.insert(label.clone(), 1);
        m
    } else {
        BTreeMap::new()
    }
}

fn mu_vectors<L: Label>(graph: &Graph<L>) -> HashMap<Vec<(L, usize)>, usize> {
    let mut multiset = HashMap::new();
    for node in graph.nodes() {
        let v: Vec<(L, usize)> = path_counts(graph, &node).into_iter().collect();
        *multiset.entry(v).or_insert(0) += 1;
    }
    multiset
}

/// mu-distance: symmetric difference, with multiplicity, of the multiset
/// of per-vertex leaf-path-count vectors, normalized by the multiset union
/// size (spec §4.2, §8 invariant 5).
pub fn mu_distance<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<f64, DistanceError> {
    require_same_labels(a, b)?;
    let ma = mu_vectors(a);
    let mb = mu_vectors(b);
    let mut sym = 0usize;
    let mut union = 0usize;
    let mut keys: HashSet<&Vec<(L, usize)>> = ma.keys().collect();
    keys.extend(mb.keys());
    for k in keys {
        let na = *ma.get(k).unwrap_or(&0);
        let nb = *mb.get(k).unwrap_or(&0);
        sym += na.abs_diff(nb);
        union += na.max(nb);
    }
    if union == 0 {
        return Ok(0.0);
    }
    Ok(sym as f64 / union as f64)
}

/// Undirected edge-count distance between the vertices carrying `x` and
/// `y`, via breadth-first search over the graph's edges treated as
/// undirected (a network's reticulations give some vertex pairs more
/// than one path; BFS still finds the shortest).
fn label_distance<L: Label>(graph: &Graph<L>, x: &L, y: &L) -> usize {
    let (Some(start), Some(goal)) = (graph.node_of(x), graph.node_of(y)) else {
        return 0;
    };
    if start == goal {
        return 0;
    }
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back((start, 0usize));
    while let Some((n, d)) = queue.pop_front() {
        if n == goal {
            return d;
        }
        if !seen.insert(n.clone()) {
            continue;
        }
        for next in graph.children_of(&n).iter().chain(graph.parents_of(&n)) {
            queue.push_back((next.clone(), d + 1));
        }
    }
    0
}

/// -1, 0, or +1 depending on the sign of `d(l1, l2) - d(l1, l3)` (spec
/// §4.2 "average signed distance").
fn sign<L: Label>(graph: &Graph<L>, l1: &L, l2: &L, l3: &L) -> i32 {
    let d12 = label_distance(graph, l1, l2) as i64;
    let d13 = label_distance(graph, l1, l3) as i64;
    (d12 - d13).signum() as i32
}

/// Average signed distance: for every ordered triple `(l1, l2, l3)`,
/// 0.5 * |sign(d_G(l1,l2) - d_G(l1,l3)) - sign(d_H(l1,l2) - d_H(l1,l3))|,
/// averaged over all ordered triples (spec §4.2, §8 invariant 5).
pub fn average_signed_distance<L: Label>(a: &Graph<L>, b: &Graph<L>) -> Result<f64, DistanceError> {
    require_same_labels(a, b)?;
    let labels: Vec<L> = a.labels().into_iter().sorted().collect();
    if labels.len() < 3 {
        return Ok(0.0);
    }
    let mut total = 0.0;
    let mut count = 0usize;
    for combo in labels.iter().permutations(3) {
        let (x, y, z) = (combo[0], combo[1], combo[2]);
        let sa = sign(a, x, y, z);
        let sb = sign(b, x, y, z);
        total += 0.5 * (sa - sb).unsigned_abs() as f64;
        count += 1;
    }
    Ok(total / count as f64)
}
