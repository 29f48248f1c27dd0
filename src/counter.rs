// Copyright (c) 2022, MaidSafe.
// All rights reserved.
//
// This SAFE Network Software is licensed under the BSD-3-Clause license.
// Please see the LICENSE file for more details.

use std::cell::Cell;
use std::rc::Rc;

/// Generates unique synthetic node names (`*_k`) across a single
/// reconstruction call tree.
///
/// original_source threads a plain integer (`numb_unlabelled_nodes`)
/// through every recursive constructor call and reassigns it on the way
/// back out of each child call. `Counter` gets the same externally
/// observable behavior (monotonically increasing, unique per
/// reconstruction run) via a shared `Cell` instead, so recursive helpers
/// can borrow it rather than thread a return value through every call
/// site.
#[derive(Debug, Clone)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    /// Creates a new counter starting at zero.
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(0)))
    }

    /// Returns the next synthetic name and advances the counter.
    pub fn next_name(&self) -> String {
        let n = self.0.get();
        self.0.set(n + 1);
        format!("*_{}", n)
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}
