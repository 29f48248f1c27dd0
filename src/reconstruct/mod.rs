// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! The three reconstruction engines (C4/C5/C6), plus the helpers they
//! share (spec §4.3-4.5, ported from the `*_reconstruction.py` modules).

mod common;
pub mod general;
pub mod multifurcating;
pub mod network;

use std::collections::HashSet;

pub use common::{
    aggregate_descendants_and_separations, fanned_triplets_contradict, partition_branches, transitive_closure,
};
pub use general::GeneralTreeEngine;
pub use multifurcating::MultifurcatingEngine;
pub use network::LevelOneNetworkEngine;

use crate::error::ReconstructionError;
use crate::graph::Graph;
use crate::label::Label;
use crate::triplet::Triplet;

/// Internal round-trip check (spec §7 `IsomorphismMismatch`, §8 invariant
/// 4): every triplet the caller supplied must also be induced by the
/// structure an engine builds from it. A failure here means an engine's
/// recursion produced a structure its own inputs don't actually support —
/// a bug, not a property of the input triplets (which are allowed to be
/// partial, just never contradicted by the result).
pub(crate) fn check_round_trip<L: Label>(
    graph: &Graph<L>,
    input: &HashSet<Triplet<L>>,
) -> Result<(), ReconstructionError> {
    let induced = graph.triplets();
    if input.is_subset(&induced) {
        return Ok(());
    }
    let missing: Vec<String> = input
        .difference(&induced)
        .take(3)
        .map(|t| format!("{:?}", t))
        .collect();
    Err(ReconstructionError::IsomorphismMismatch(format!(
        "reconstructed structure does not induce {} input triplet(s), e.g. {}",
        input.difference(&induced).count(),
        missing.join(", ")
    )))
}
