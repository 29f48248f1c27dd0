// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Thin, self-documenting newtypes over [`Graph`] for each of the three
//! structures this crate reconstructs. `Graph` itself stays general
//! (it backs all three plus C2's standalone operations); these wrappers
//! just pin a reconstruction engine to a name a caller would actually
//! reach for.

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cancellation::Cancellation;
use crate::error::{GraphError, ReconstructionError};
use crate::graph::{Graph, TreeDict};
use crate::label::Label;
use crate::reconstruct::{GeneralTreeEngine, LevelOneNetworkEngine, MultifurcatingEngine};
use crate::triplet::Triplet;

/// A rooted multifurcating tree: every internal vertex may have any
/// number of children, but (unlike [`GeneralTree`]) is never itself
/// labeled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultifurcatingTree<L: Label>(Graph<L>);

impl<L: Label> MultifurcatingTree<L> {
    /// Reconstructs a tree consistent with `triplets` over `labels`.
    pub fn reconstruct(
        triplets: &HashSet<Triplet<L>>,
        labels: &HashSet<L>,
        cancellation: Option<&Cancellation>,
    ) -> Result<Self, ReconstructionError> {
        MultifurcatingEngine::reconstruct(triplets, labels, cancellation).map(Self)
    }

    /// Wraps an already-built tree-shaped nested map.
    pub fn from_tree_dict(dict: &TreeDict<L>) -> Result<Self, GraphError> {
        Graph::from_tree_dict(dict).map(Self)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph<L> {
        &self.0
    }

    /// This tree's full triplet set.
    pub fn triplets(&self) -> HashSet<Triplet<L>> {
        self.0.triplets()
    }
}

impl<L: Label + fmt::Display> fmt::Display for MultifurcatingTree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A rooted general tree: internal vertices may carry a label of their
/// own (chains and V-triplets pin one).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralTree<L: Label>(Graph<L>);

impl<L: Label> GeneralTree<L> {
    /// Reconstructs a tree consistent with `triplets` over `labels`.
    pub fn reconstruct<R: Rng>(
        triplets: &HashSet<Triplet<L>>,
        labels: &HashSet<L>,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<Self, ReconstructionError> {
        GeneralTreeEngine::reconstruct(triplets, labels, rng, cancellation).map(Self)
    }

    /// Wraps an already-built tree-shaped nested map.
    pub fn from_tree_dict(dict: &TreeDict<L>) -> Result<Self, GraphError> {
        Graph::from_tree_dict(dict).map(Self)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph<L> {
        &self.0
    }

    /// This tree's full triplet set.
    pub fn triplets(&self) -> HashSet<Triplet<L>> {
        self.0.triplets()
    }
}

impl<L: Label + fmt::Display> fmt::Display for GeneralTree<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A rooted level-1 network: like [`GeneralTree`], but some vertices
/// (reticulations) may have two parents, each bounded inside a simple
/// cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelOneNetwork<L: Label>(Graph<L>);

impl<L: Label> LevelOneNetwork<L> {
    /// Reconstructs a network consistent with `triplets` over `labels`.
    pub fn reconstruct<R: Rng>(
        triplets: &HashSet<Triplet<L>>,
        labels: &HashSet<L>,
        rng: &mut R,
        cancellation: Option<&Cancellation>,
    ) -> Result<Self, ReconstructionError> {
        LevelOneNetworkEngine::reconstruct(triplets, labels, rng, cancellation).map(Self)
    }

    /// Wraps an already-built nested map; reticulations are expressed by
    /// a label recurring as a second, empty-subtree mention (see
    /// [`TreeDict`]).
    pub fn from_tree_dict(dict: &TreeDict<L>) -> Result<Self, GraphError> {
        Graph::from_tree_dict(dict).map(Self)
    }

    /// The underlying graph.
    pub fn graph(&self) -> &Graph<L> {
        &self.0
    }

    /// This network's full triplet set, taken as the union over its
    /// spanning trees (spec C6).
    pub fn triplets(&self) -> HashSet<Triplet<L>> {
        self.0.triplets()
    }

    /// Every spanning tree obtainable by dropping one incoming edge per
    /// reticulation (spec C3).
    pub fn spanning_trees(&self) -> Vec<Graph<L>> {
        crate::graph::spanning::trees(&self.0)
    }
}

impl<L: Label + fmt::Display> fmt::Display for LevelOneNetwork<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
