// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Error kinds surfaced by triplet parsing, graph construction,
//! reconstruction, distances, and the SPR-move helper.

use thiserror::Error;

/// A triplet string matched no shape, or fewer than three distinct
/// labels remained after splitting on the shape's operators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid triplet string: {0}")]
pub struct ParseError(pub String);

/// Graph construction received a nested map that cannot represent a
/// single rooted structure (this is ambient input validation, not one
/// of the five domain error kinds of the reconstruction algorithms).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The nested map had zero or more than one top-level entry.
    #[error("tree dict must have exactly one root entry, found {0}")]
    NotSingleRooted(usize),
}

/// Errors from the three reconstruction engines (C4/C5/C6).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconstructionError {
    /// Branch partitioning collapsed to a single block where the
    /// algorithm requires at least two, and no cycle could be detected
    /// either: the triplet set is contradictory (or not multifurcating,
    /// for C4).
    #[error("contradictory triplet set: {0}")]
    Contradiction(String),
    /// The caller's cancellation flag was observed between recursion
    /// frames.
    #[error("reconstruction cancelled")]
    Cancelled,
    /// Internal round-trip check: the reconstructed structure's induced
    /// triplets are not a superset of the input triplets.
    #[error("reconstruction result failed round-trip check: {0}")]
    IsomorphismMismatch(String),
}

/// Errors from `Graph::perform_spr_move`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SprError {
    /// Neither `new_parent` nor `insert_edge` was given.
    #[error("perform_spr_move requires either new_parent or insert_edge")]
    NoTarget,
    /// Both `new_parent` and `insert_edge` were given.
    #[error("perform_spr_move accepts only one of new_parent or insert_edge")]
    AmbiguousTarget,
    /// `node` is not a node of the graph.
    #[error("node not found in graph")]
    NodeNotFound,
    /// The new parent (or an endpoint of `insert_edge`) lies in `node`'s
    /// own subtree.
    #[error("new attachment point is a descendant of the node being moved")]
    TargetIsDescendant,
    /// `node` lies on a level-1 cycle and `allow_breaking_cycles` was not
    /// set.
    #[error("node lies inside a cycle; set allow_breaking_cycles to move it")]
    ForbiddenCycle,
    /// `insert_edge` is not an edge of the graph, or is incident to
    /// `node`'s own subtree.
    #[error("insert_edge is not a valid edge for this move")]
    InvalidInsertEdge,
}

/// Distances require both graphs to share the same label set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistanceError {
    /// The two graphs' label sets differ.
    #[error("graphs do not share the same label set")]
    LabelMismatch,
}
