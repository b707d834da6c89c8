// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Handle types for the wall graph arena.
//!
//! Walls reference their endpoints through [`NodeKey`] handles rather than
//! shared pointers. Keys are created by `slotmap::SlotMap` and stay valid (or
//! detectably stale) after other entities are removed, so merging two nodes
//! is an explicit "repoint every handle, then delete" operation.

use slotmap::new_key_type;

new_key_type! {
    /// Key for a node (shared wall endpoint).
    pub struct NodeKey;

    /// Key for a wall (segment between two nodes).
    pub struct WallKey;
}

/// Returns the pair in a canonical order, for unordered-pair lookups.
pub fn ordered_pair(a: NodeKey, b: NodeKey) -> (NodeKey, NodeKey) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
