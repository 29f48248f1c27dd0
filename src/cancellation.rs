// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

//! A cooperative cancellation flag for the reconstruction engines (spec
//! §7). Reconstruction recurses once per internal vertex of the result;
//! a caller driving it from an interactive context can request it stop
//! between frames rather than waiting out a worst-case O(n) recursion.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::ReconstructionError;

/// A shared flag checked once per recursion frame by the C4/C5/C6
/// engines.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    /// Creates a new, not-yet-cancelled handle.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Takes effect at the next recursion frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn check(&self) -> Result<(), ReconstructionError> {
        if self.is_cancelled() {
            Err(ReconstructionError::Cancelled)
        } else {
            Ok(())
        }
    }
}
