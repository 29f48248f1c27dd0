// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! C6: level-1 network reconstruction, ported from
//! `level_one_network_reconstruction.py`'s `reconstruct()` — the hardest
//! of the three engines, since a level-1 network additionally needs to
//! recognize when a set of labels cannot be resolved into a simple
//! multifurcation or chain because the triplets describe a reticulation
//! cycle, locate that cycle's sink, order the two arcs feeding into it,
//! and stitch each arc's own subtree back onto the shared sink vertex.

use std::collections::{HashMap, HashSet};

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cancellation::Cancellation;
use crate::error::ReconstructionError;
use crate::graph::{Graph, NodeId};
use crate::label::Label;
use crate::triplet::Triplet;

use super::{aggregate_descendants_and_separations, partition_branches, transitive_closure};

/// What [`LevelOneNetworkEngine::find_root`] found for a label set: either
/// an ordinary (possibly unlabeled-below) branch split, or a label that
/// dominates everything else but whose remainder collapses into a single
/// block — the signature of a node sitting directly above a reticulation
/// cycle (spec §4.6 step 5).
enum RootOutcome<L: Label> {
    Branches(L, Vec<HashSet<L>>),
    CycleSource(L),
}

/// Reconstructs a rooted level-1 network from a triplet set.
pub struct LevelOneNetworkEngine;

impl LevelOneNetworkEngine {
    /// Builds the network.
    pub fn reconstruct<L: Label, R: Rng>(
        triplets: &HashSet<Triplet<L>>,
        labels: &HashSet<L>,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<Graph<L>, ReconstructionError> {
        let mut graph = Graph::builder();
        let root = graph.add_node();
        graph.set_root(root.clone());
        Self::build(&mut graph, root, labels, triplets, rng, cancellation)?;
        super::check_round_trip(&graph, triplets)?;
        Ok(graph)
    }

    fn build<L: Label, R: Rng>(
        graph: &mut Graph<L>,
        node: NodeId,
        labels: &HashSet<L>,
        triplets: &HashSet<Triplet<L>>,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<(), ReconstructionError> {
        if let Some(c) = cancellation {
            c.check()?;
        }
        if labels.len() == 1 {
            graph.set_label(node, labels.iter().next().unwrap().clone());
            return Ok(());
        }
        if labels.len() == 2 {
            for l in labels {
                let child = graph.add_node();
                graph.add_edge(node.clone(), child.clone());
                graph.set_label(child, l.clone());
            }
            return Ok(());
        }

        let relevant: HashSet<Triplet<L>> = triplets
            .iter()
            .filter(|t| t.labels().is_subset(labels))
            .cloned()
            .collect();
        let (descendants, separations) = aggregate_descendants_and_separations(&relevant);
        let closure = transitive_closure(&descendants);
        let sn_sets = maximal_sn_sets(non_trivial_sn_sets(labels, &relevant));

        if let Some(outcome) = Self::find_root(labels, &closure, &separations, &relevant, &sn_sets, rng) {
            match outcome {
                RootOutcome::Branches(root_label, branches) => {
                    graph.set_label(node.clone(), root_label.clone());
                    for branch in branches {
                        let child = graph.add_node();
                        graph.add_edge(node.clone(), child.clone());
                        Self::build(graph, child, &branch, &relevant, rng, cancellation)?;
                    }
                    return Ok(());
                }
                RootOutcome::CycleSource(root_label) => {
                    debug!("level-1 network: {:?} sits above a reticulation cycle", root_label);
                    graph.set_label(node.clone(), root_label.clone());
                    let remaining: HashSet<L> =
                        labels.iter().filter(|l| **l != root_label).cloned().collect();
                    let sink = find_sink_of_cycle(&remaining, &descendants, &separations).ok_or_else(|| {
                        ReconstructionError::Contradiction(format!(
                            "{:?} sits above a cycle with no detectable sink",
                            root_label
                        ))
                    })?;
                    return Self::build_cycle(graph, node, &remaining, &relevant, &sink, rng, cancellation);
                }
            }
        }

        let branches = partition_branches_seeded(labels, &relevant, &sn_sets);
        if branches.len() >= 2 {
            for branch in branches {
                let child = graph.add_node();
                graph.add_edge(node.clone(), child.clone());
                Self::build(graph, child, &branch, &relevant, rng, cancellation)?;
            }
            return Ok(());
        }

        if let Some(sink) = find_sink_of_cycle(labels, &descendants, &separations) {
            debug!("level-1 network: resolving a reticulation cycle at sink {:?}", sink);
            return Self::build_cycle(graph, node, labels, &relevant, &sink, rng, cancellation);
        }

        warn!("level-1 network: no root, branch split, or cycle sink over {} labels", labels.len());
        Err(ReconstructionError::Contradiction(format!(
            "{} labels admit no root, no branch split, and no cycle sink",
            labels.len()
        )))
    }

    fn find_root<L: Label, R: Rng>(
        labels: &HashSet<L>,
        closure: &HashMap<L, HashSet<L>>,
        separations: &HashMap<L, HashSet<L>>,
        relevant: &HashSet<Triplet<L>>,
        sn_sets: &[HashSet<L>],
        rng: &mut R,
    ) -> Option<RootOutcome<L>> {
        let mut candidates: Vec<L> = labels
            .iter()
            .filter(|r| {
                let others: HashSet<L> = labels.iter().filter(|x| *x != *r).cloned().collect();
                let dominates = closure.get(*r).map(|d| others.is_subset(d)).unwrap_or(false);
                let not_separated = separations.get(*r).map(|s| s.is_disjoint(&others)).unwrap_or(true);
                let not_dominated = others
                    .iter()
                    .all(|x| !closure.get(x).map(|d| d.contains(*r)).unwrap_or(false));
                dominates || (not_separated && not_dominated)
            })
            .cloned()
            .collect();
        candidates.shuffle(rng);

        for r in candidates {
            let remaining: HashSet<L> = labels.iter().filter(|l| **l != r).cloned().collect();
            if remaining.is_empty() {
                return Some(RootOutcome::Branches(r, Vec::new()));
            }
            let branches = partition_branches_seeded(&remaining, relevant, sn_sets);
            if branches.len() > 1 {
                return Some(RootOutcome::Branches(r, branches));
            }
            if branches.len() == 1 && remaining.len() == branches[0].len() {
                return Some(RootOutcome::CycleSource(r));
            }
        }
        None
    }

    /// Resolves a reticulation cycle: `sink` receives two incoming arcs,
    /// each built as its own subtree over a disjoint half of the
    /// remaining labels (spec C6 "cycle resolution" and "left/right arc
    /// ordering"), then stitched back together at a freshly created
    /// shared vertex for `sink` (in-degree 2: a level-1 reticulation).
    fn build_cycle<L: Label, R: Rng>(
        graph: &mut Graph<L>,
        node: NodeId,
        labels: &HashSet<L>,
        relevant: &HashSet<Triplet<L>>,
        sink: &L,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<(), ReconstructionError> {
        let remaining: HashSet<L> = labels.iter().filter(|l| *l != sink).cloned().collect();
        let (left, right) = order_cycle_arcs(&remaining, relevant, sink);

        let left_arm = graph.add_node();
        graph.add_edge(node.clone(), left_arm.clone());
        let right_arm = graph.add_node();
        graph.add_edge(node.clone(), right_arm.clone());
        let sink_node = graph.add_node();
        graph.set_label(sink_node.clone(), sink.clone());

        let left_end = Self::build_arc(graph, left_arm, &left, relevant, rng, cancellation)?;
        let right_end = Self::build_arc(graph, right_arm, &right, relevant, rng, cancellation)?;
        graph.add_edge(left_end, sink_node.clone());
        graph.add_edge(right_end, sink_node);
        Ok(())
    }

    fn build_arc<L: Label, R: Rng>(
        graph: &mut Graph<L>,
        start: NodeId,
        arc_labels: &HashSet<L>,
        relevant: &HashSet<Triplet<L>>,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<NodeId, ReconstructionError> {
        if arc_labels.is_empty() {
            return Ok(start);
        }
        Self::build(graph, start.clone(), arc_labels, relevant, rng, cancellation)?;
        Ok(start)
    }
}

/// Tests whether `x` could join the growing SN-set `s` (spec §4.6 "x can
/// be apart" test): `x` is barred from joining if some triplet places it
/// and two existing members of `s` together, yet asserts `x` apart from
/// one of them — i.e. some triplet already on record contradicts `x`
/// sharing `s`'s branch.
fn can_join<L: Label>(x: &L, s: &HashSet<L>, triplets: &HashSet<Triplet<L>>) -> bool {
    for t in triplets {
        if !t.contains(x) {
            continue;
        }
        let others: Vec<L> = t.labels().into_iter().filter(|l| l != x).collect();
        if others.len() != 2 || !s.contains(&others[0]) || !s.contains(&others[1]) {
            continue;
        }
        if t.apart(x, &others[0]) == Some(true) || t.apart(x, &others[1]) == Some(true) {
            return false;
        }
    }
    true
}

/// Non-trivial SN-sets: separating-neighbor sets grown outward from each
/// pair of labels (spec §4.6 "SN-sets"). Starting from `S = {i, j}`, every
/// other label `x` with positive evidence of belonging to `S` (some
/// triplet ties `x` to a member of `S`) and no evidence barring it (the
/// "x can be apart" test) is folded in, until the set stops growing. Only
/// sets with `2 <= |S| < |labels|` are kept; `maximal_sn_sets` then
/// reduces the resulting family to its maximal laminar elements. Ported
/// from `__get_non_trivial_sn_sets`'s frontier-growth construction in
/// `level_one_network_reconstruction.py`.
pub fn non_trivial_sn_sets<L: Label>(labels: &HashSet<L>, triplets: &HashSet<Triplet<L>>) -> Vec<HashSet<L>> {
    let label_list: Vec<L> = labels.iter().cloned().collect();
    let mut sn_sets: Vec<HashSet<L>> = Vec::new();

    for (i_idx, i) in label_list.iter().enumerate() {
        for j in &label_list[i_idx + 1..] {
            let mut s: HashSet<L> = HashSet::new();
            s.insert(i.clone());
            s.insert(j.clone());
            loop {
                let mut grown = false;
                for x in &label_list {
                    if s.contains(x) {
                        continue;
                    }
                    let tied = triplets
                        .iter()
                        .any(|t| t.contains(x) && t.labels().iter().any(|l| s.contains(l)));
                    if tied && can_join(x, &s, triplets) {
                        s.insert(x.clone());
                        grown = true;
                    }
                }
                if !grown {
                    break;
                }
            }
            if s.len() >= 2 && s.len() < labels.len() {
                sn_sets.push(s);
            }
        }
    }
    sn_sets
}

/// Keeps only the maximal sets of a family (none a subset of another).
pub fn maximal_sn_sets<L: Label>(sets: Vec<HashSet<L>>) -> Vec<HashSet<L>> {
    sets.iter()
        .enumerate()
        .filter(|(i, s)| !sets.iter().enumerate().any(|(j, t)| j != *i && s.is_subset(t)))
        .map(|(_, s)| s.clone())
        .collect()
}

fn partition_branches_seeded<L: Label>(
    labels: &HashSet<L>,
    triplets: &HashSet<Triplet<L>>,
    sn_sets: &[HashSet<L>],
) -> Vec<HashSet<L>> {
    let mut groups = partition_branches(labels, triplets);
    for sn in sn_sets {
        let touching: Vec<usize> = groups
            .iter()
            .enumerate()
            .filter(|(_, g)| !g.is_disjoint(sn))
            .map(|(i, _)| i)
            .collect();
        if touching.len() > 1 {
            let mut merged = HashSet::new();
            for &i in touching.iter().rev() {
                merged.extend(groups.remove(i));
            }
            groups.push(merged);
        }
    }
    groups
}

/// Finds the sink of a reticulation cycle: a label `d` declared a
/// descendant, by two or more *separate* ancestors, via two distinct
/// triplets — the signature of two incoming cycle arcs converging on one
/// vertex (spec §3 "sink = unique node with two incoming cycle-edges",
/// §4.6 "cycle sink detection"). Every triplet shape that can assert a
/// descendant fact (`DownResolved`, `UpResolved`, `VTriplet`, `PathDown`,
/// `PathUp`) feeds `descendants`, so checking convergence on that
/// aggregated map — rather than re-deriving it from each shape pairing —
/// covers the down/up-resolved, chain, and V-triplet cases the original
/// enumerates separately. When more than one label qualifies (the
/// "missing fourth configuration" ambiguity), the candidate with the
/// most independently-converging ancestor pairs wins; ties break on
/// label order for determinism.
fn find_sink_of_cycle<L: Label>(
    labels: &HashSet<L>,
    descendants: &HashMap<L, HashSet<L>>,
    separations: &HashMap<L, HashSet<L>>,
) -> Option<L> {
    let mut ancestors_of: HashMap<L, HashSet<L>> = HashMap::new();
    for (ancestor, descs) in descendants {
        if !labels.contains(ancestor) {
            continue;
        }
        for d in descs {
            if labels.contains(d) {
                ancestors_of.entry(d.clone()).or_default().insert(ancestor.clone());
            }
        }
    }

    let mut best: Option<(L, usize)> = None;
    for (d, ancestors) in &ancestors_of {
        let ancestors: Vec<&L> = ancestors.iter().collect();
        let mut converging = 0usize;
        for (i, a) in ancestors.iter().enumerate() {
            for b in ancestors.iter().skip(i + 1) {
                if separations.get(*a).map(|s| s.contains(*b)).unwrap_or(false) {
                    converging += 1;
                }
            }
        }
        if converging == 0 {
            continue;
        }
        let better = match &best {
            None => true,
            Some((b, c)) => converging > *c || (converging == *c && d < b),
        };
        if better {
            best = Some((d.clone(), converging));
        }
    }
    best.map(|(d, _)| d)
}

/// Splits the labels feeding a cycle's sink into its two arcs (spec §4.6
/// "two-side ordering"): every triplet that names `sink` alongside two
/// `remaining` labels votes those two labels "together" (same arc) or
/// "apart" (opposite arcs), per `Triplet::apart` on the non-sink pair —
/// `a/b/sink` and `a\b\sink` vote together, `a/sink\b` votes apart, and
/// so on, matching spec's per-shape together/apart table without
/// re-deriving it by hand. Labels tied "together" are unioned into one
/// group; groups connected by an "apart" vote to an already-placed group
/// go to the opposite side; any group with no opinion either way is
/// dropped onto whichever side is currently smaller so both arcs stay
/// populated.
fn order_cycle_arcs<L: Label>(
    remaining: &HashSet<L>,
    relevant: &HashSet<Triplet<L>>,
    sink: &L,
) -> (HashSet<L>, HashSet<L>) {
    if remaining.is_empty() {
        return (HashSet::new(), HashSet::new());
    }

    let mut together: HashMap<L, HashSet<L>> = HashMap::new();
    let mut apart: HashMap<L, HashSet<L>> = HashMap::new();
    for t in relevant {
        if !t.contains(sink) {
            continue;
        }
        let members: Vec<L> = t.labels().into_iter().filter(|l| l != sink).collect();
        if members.len() != 2 || !remaining.contains(&members[0]) || !remaining.contains(&members[1]) {
            continue;
        }
        let (a, b) = (members[0].clone(), members[1].clone());
        match t.apart(&a, &b) {
            Some(true) => {
                apart.entry(a.clone()).or_default().insert(b.clone());
                apart.entry(b.clone()).or_default().insert(a);
            }
            Some(false) => {
                together.entry(a.clone()).or_default().insert(b.clone());
                together.entry(b.clone()).or_default().insert(a);
            }
            None => {}
        }
    }

    let mut parent: HashMap<L, L> = remaining.iter().map(|l| (l.clone(), l.clone())).collect();
    fn find<L: Label>(parent: &mut HashMap<L, L>, x: &L) -> L {
        let p = parent.get(x).cloned().unwrap_or_else(|| x.clone());
        if &p == x {
            x.clone()
        } else {
            let root = find(parent, &p);
            parent.insert(x.clone(), root.clone());
            root
        }
    }
    fn union<L: Label>(parent: &mut HashMap<L, L>, a: &L, b: &L) {
        let ra = find(parent, a);
        let rb = find(parent, b);
        if ra != rb {
            parent.insert(ra, rb);
        }
    }
    for (a, bs) in &together {
        for b in bs {
            union(&mut parent, a, b);
        }
    }

    let mut raw_groups: HashMap<L, HashSet<L>> = HashMap::new();
    for l in remaining {
        let root = find(&mut parent, l);
        raw_groups.entry(root).or_default().insert(l.clone());
    }
    let mut groups: Vec<HashSet<L>> = raw_groups.into_values().collect();
    groups.sort_by(|a, b| a.iter().min().cmp(&b.iter().min()));

    let mut left = HashSet::new();
    let mut right = HashSet::new();
    let mut side_of: Vec<Option<bool>> = vec![None; groups.len()];

    for i in 0..groups.len() {
        if side_of[i].is_some() {
            continue;
        }
        side_of[i] = Some(true);
        left.extend(groups[i].iter().cloned());
        for j in 0..groups.len() {
            if i == j || side_of[j].is_some() {
                continue;
            }
            let opposed = groups[i]
                .iter()
                .any(|a| apart.get(a).map(|s| !s.is_disjoint(&groups[j])).unwrap_or(false));
            if opposed {
                side_of[j] = Some(false);
                right.extend(groups[j].iter().cloned());
            }
        }
    }
    for (i, g) in groups.into_iter().enumerate() {
        if side_of[i].is_none() {
            if left.len() <= right.len() {
                left.extend(g);
            } else {
                right.extend(g);
            }
        }
    }
    (left, right)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::triplets as graph_triplets;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn labels(xs: &[&str]) -> HashSet<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconstructs_a_tree_shaped_network() {
        let triplets: HashSet<Triplet<String>> =
            vec![Triplet::parse("A/B/C").unwrap()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(7);
        let graph =
            LevelOneNetworkEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), &mut rng, None).unwrap();
        let induced = graph_triplets::enumerate(&graph);
        assert!(induced.contains(&Triplet::parse("A/B/C").unwrap()));
        assert!(graph.is_tree());
    }

    #[test]
    fn detects_a_cycle_sink_from_converging_ancestors() {
        // X1 and X2 are two separated ancestors that both declare Y a
        // descendant: two incoming arcs converging on Y.
        let mut descendants = HashMap::new();
        descendants.insert("X1".to_string(), labels(&["Y"]));
        descendants.insert("X2".to_string(), labels(&["Y"]));
        let mut separations = HashMap::new();
        separations.insert("X1".to_string(), labels(&["X2"]));
        separations.insert("X2".to_string(), labels(&["X1"]));
        let sink = find_sink_of_cycle(&labels(&["X1", "X2", "Y"]), &descendants, &separations);
        assert_eq!(sink, Some("Y".to_string()));
    }

    #[test]
    fn orders_cycle_arcs_by_sink_adjacent_constraints() {
        // Arc1 = {A}, Arc2 = {B}, both feeding sink S: A/S|B keeps A and B
        // apart, so they must land on opposite arcs.
        let triplets: HashSet<Triplet<String>> = vec![Triplet::parse("A/S|B").unwrap()].into_iter().collect();
        let remaining = labels(&["A", "B"]);
        let (left, right) = order_cycle_arcs(&remaining, &triplets, &"S".to_string());
        assert_ne!(left.contains(&"A".to_string()), right.contains(&"A".to_string()));
        assert_ne!(left.contains(&"B".to_string()), right.contains(&"B".to_string()));
        assert!(left.is_disjoint(&right));
        assert_eq!(&left | &right, remaining);
    }
}
