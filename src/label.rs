// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

use std::fmt::Debug;
use std::hash::Hash;

/// `Label` identifies a vertex in a triplet set or a reconstructed
/// structure. Labels are opaque to the algorithms in this crate: they are
/// compared, hashed, and ordered (for canonical sibling-set sorting), but
/// never interpreted.
///
/// Blanket-implemented for any type with the right bounds, the same way
/// `TreeId` is blanket-implemented for CRDT-tree node identifiers.
pub trait Label: Eq + Ord + Clone + Hash + Debug {}
impl<L: Eq + Ord + Clone + Hash + Debug> Label for L {}
