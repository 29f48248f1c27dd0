// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! C5: rooted general tree reconstruction, ported from
//! `general_tree_reconstruction.py`'s `reconstruct()`. Unlike the
//! multifurcating case, a general tree's apex can itself carry a label
//! (chains and V-triplets pin one), so root selection may find more than
//! one structurally valid candidate; the original breaks the tie with
//! `random.choice` and retries on failure, which is why this engine
//! takes an `R: Rng` the multifurcating one does not need.

use std::collections::HashSet;

use log::{debug, warn};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cancellation::Cancellation;
use crate::error::ReconstructionError;
use crate::graph::{Graph, NodeId};
use crate::label::Label;
use crate::triplet::Triplet;

use super::{aggregate_descendants_and_separations, partition_branches, transitive_closure};

/// Reconstructs a rooted general tree from a triplet set.
pub struct GeneralTreeEngine;

impl GeneralTreeEngine {
    /// Builds the tree.
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

        if let Some((root_label, branches)) = Self::find_root(labels, &closure, &separations, &relevant, rng) {
            debug!("general tree: chose {:?} as apex over {} labels", root_label, labels.len());
            graph.set_label(node.clone(), root_label.clone());
            for branch in branches {
                let child = graph.add_node();
                graph.add_edge(node.clone(), child.clone());
                Self::build(graph, child, &branch, &relevant, rng, cancellation)?;
            }
            return Ok(());
        }

        let branches = partition_branches(labels, &relevant);
        if branches.len() <= 1 {
            warn!("general tree: no labeled apex and no branch split over {} labels", labels.len());
            return Err(ReconstructionError::Contradiction(format!(
                "{} labels admit neither a labeled root nor multiple branches",
                labels.len()
            )));
        }
        for branch in branches {
            let child = graph.add_node();
            graph.add_edge(node.clone(), child.clone());
            Self::build(graph, child, &branch, &relevant, rng, cancellation)?;
        }
        Ok(())
    }

    /// Finds a label that can serve as this subtree's apex: the spec's
    /// "V-triplet guard" — a candidate must transitively dominate every
    /// other label, or at least not be separated from (or dominated by)
    /// any of them. On a tie, `original_source`'s `random.choice` is
    /// mirrored with `rng`; if the first draw fails a closer look, the
    /// remaining candidates are tried in turn before falling back to an
    /// unlabeled apex.
    fn find_root<L: Label, R: Rng>(
        labels: &HashSet<L>,
        closure: &std::collections::HashMap<L, HashSet<L>>,
        separations: &std::collections::HashMap<L, HashSet<L>>,
        relevant: &HashSet<Triplet<L>>,
        rng: &mut R,
    ) -> Option<(L, Vec<HashSet<L>>)> {
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
                return Some((r, Vec::new()));
            }
            let branches = partition_branches(&remaining, relevant);
            if !branches.is_empty() {
                return Some((r, branches));
            }
        }
        None
    }
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
    fn reconstructs_a_chain() {
        let triplets: HashSet<Triplet<String>> =
            vec![Triplet::parse("A/B/C").unwrap()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let graph =
            GeneralTreeEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), &mut rng, None).unwrap();
        let induced = graph_triplets::enumerate(&graph);
        assert!(induced.contains(&Triplet::parse("A/B/C").unwrap()));
    }

    #[test]
    fn reconstructs_a_v_triplet() {
        let triplets: HashSet<Triplet<String>> =
            vec![Triplet::parse(r"A/B\C").unwrap()].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(2);
        let graph =
            GeneralTreeEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), &mut rng, None).unwrap();
        assert_eq!(graph.label_of(&graph.node_of(&"B".to_string()).unwrap()), Some(&"B".to_string()));
        let induced = graph_triplets::enumerate(&graph);
        assert!(induced.contains(&Triplet::parse(r"A/B\C").unwrap()));
    }
}
