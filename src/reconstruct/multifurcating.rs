// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! C4: rooted multifurcating tree reconstruction, ported from
//! `multifurcating_tree_reconstruction.py`'s `reconstruct()`. No
//! randomness is needed here (unlike C5/C6): a multifurcating tree's
//! branch partition is always uniquely determined by its D-sets, so
//! there is never more than one candidate root to choose between.

use std::collections::HashSet;

use log::debug;

use crate::cancellation::Cancellation;
use crate::error::ReconstructionError;
use crate::graph::{Graph, NodeId};
use crate::label::Label;
use crate::triplet::Triplet;

use super::{fanned_triplets_contradict, partition_branches};

/// Reconstructs a rooted multifurcating tree from a triplet set.
pub struct MultifurcatingEngine;

impl MultifurcatingEngine {
    /// Builds the tree. Fails with
    /// [`ReconstructionError::Contradiction`] if the triplets cannot be
    /// resolved into at least two branches at some level, or with
    /// [`ReconstructionError::Cancelled`] if `cancellation` fires
    /// mid-recursion.
    pub fn reconstruct<L: Label>(
        triplets: &HashSet<Triplet<L>>,
        labels: &HashSet<L>,
        cancellation: Option<&Cancellation>,
    ) -> Result<Graph<L>, ReconstructionError> {
        let mut graph = Graph::builder();
        let root = graph.add_node();
        graph.set_root(root.clone());
        if labels.len() == 1 {
            graph.set_label(root, labels.iter().next().unwrap().clone());
            return Ok(graph);
        }
        Self::build(&mut graph, root, labels, triplets, cancellation)?;
        super::check_round_trip(&graph, triplets)?;
        Ok(graph)
    }

    fn build<L: Label>(
        graph: &mut Graph<L>,
        parent: NodeId,
        labels: &HashSet<L>,
        triplets: &HashSet<Triplet<L>>,
        cancellation: Option<&Cancellation>,
    ) -> Result<(), ReconstructionError> {
        if let Some(c) = cancellation {
            c.check()?;
        }
        if labels.len() == 1 {
            graph.set_label(parent, labels.iter().next().unwrap().clone());
            return Ok(());
        }

        let relevant: HashSet<Triplet<L>> = triplets
            .iter()
            .filter(|t| t.labels().is_subset(labels))
            .cloned()
            .collect();
        let branches = partition_branches(labels, &relevant);
        if branches.len() <= 1 {
            return Err(ReconstructionError::Contradiction(format!(
                "{} labels collapse into a single branch",
                labels.len()
            )));
        }
        if fanned_triplets_contradict(&branches, &relevant) {
            return Err(ReconstructionError::Contradiction(format!(
                "a fanned triplet over {} labels disagrees with another triplet's branch merge",
                labels.len()
            )));
        }
        debug!("multifurcating: {} labels split into {} branches", labels.len(), branches.len());

        for branch in branches {
            let child = graph.add_node();
            graph.add_edge(parent.clone(), child.clone());
            if branch.len() == 1 {
                graph.set_label(child, branch.into_iter().next().unwrap());
            } else {
                Self::build(graph, child, &branch, &relevant, cancellation)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::triplets as graph_triplets;

    fn labels(xs: &[&str]) -> HashSet<String> {
        xs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn reconstructs_a_simple_fan() {
        let triplets: HashSet<Triplet<String>> =
            vec![Triplet::parse("A|B|C").unwrap()].into_iter().collect();
        let graph = MultifurcatingEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), None).unwrap();
        assert_eq!(graph.labels(), labels(&["A", "B", "C"]));
        let induced = graph_triplets::enumerate(&graph);
        assert!(induced.is_superset(&triplets));
    }

    #[test]
    fn reconstructs_a_resolved_pair() {
        let triplets: HashSet<Triplet<String>> =
            vec![Triplet::parse("A,B|C").unwrap()].into_iter().collect();
        let graph = MultifurcatingEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), None).unwrap();
        let induced = graph_triplets::enumerate(&graph);
        assert!(induced.contains(&Triplet::parse("A,B|C").unwrap()));
    }

    #[test]
    fn contradictory_triplets_fail() {
        let triplets: HashSet<Triplet<String>> = vec![
            Triplet::parse("A,B|C").unwrap(),
            Triplet::parse("B,C|A").unwrap(),
        ]
        .into_iter()
        .collect();
        assert!(MultifurcatingEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), None).is_err());
    }

    #[test]
    fn fanned_triplet_vs_resolved_pair_is_a_contradiction() {
        let triplets: HashSet<Triplet<String>> = vec![
            Triplet::parse("A,B|C").unwrap(),
            Triplet::parse("A|B|C").unwrap(),
        ]
        .into_iter()
        .collect();
        let err = MultifurcatingEngine::reconstruct(&triplets, &labels(&["A", "B", "C"]), None).unwrap_err();
        assert!(matches!(err, ReconstructionError::Contradiction(_)));
    }
}
