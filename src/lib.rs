// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! Reconstructs rooted multifurcating trees, rooted general trees, and
//! rooted level-1 networks from a set of resolved-triplet constraints,
//! and provides the triplet/tripartition/Robinson-Foulds/mu/average
//! signed distance metrics and the SPR-move primitive used to compare
//! and edit the results.
//!
//! Entry points by structure:
//!
//! - [`MultifurcatingTree`] / [`reconstruct::MultifurcatingEngine`]
//! - [`GeneralTree`] / [`reconstruct::GeneralTreeEngine`]
//! - [`LevelOneNetwork`] / [`reconstruct::LevelOneNetworkEngine`]
//!
//! Triplet strings parse via [`Triplet::parse`], and [`Graph`] is the
//! common structure all three reconstructed types wrap; its submodules
//! ([`graph::triplets`], [`graph::spanning`], [`graph::distance`],
//! [`graph::spr`]) are public for callers that want to operate on a
//! `Graph` directly rather than through the named wrappers.
#![deny(missing_docs)]

pub mod cancellation;
pub mod counter;
pub mod error;
pub mod graph;
pub mod label;
pub mod reconstruct;
pub mod triplet;

mod wrappers;

pub use self::cancellation::Cancellation;
pub use self::error::{DistanceError, GraphError, ParseError, ReconstructionError, SprError};
pub use self::graph::distance::{
    average_signed_distance, mu_distance, robinson_foulds, tripartition_distance, triplet_distance,
};
pub use self::graph::spr::{perform_spr_move, perform_spr_move_with, Reattach};
pub use self::graph::{Graph, NodeId, TreeDict};
pub use self::label::Label;
pub use self::triplet::{Triplet, TripletShape};
pub use self::wrappers::{GeneralTree, LevelOneNetwork, MultifurcatingTree};
