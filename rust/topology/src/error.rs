// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for wall graph operations.
//!
//! Only structural misuse is an error: stale handles and malformed plan
//! files. Degenerate geometry is filtered by the normalizer and placement
//! refusals are reported as `None`, never as errors.

use crate::keys::{NodeKey, WallKey};

/// Result type alias for wall graph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during wall graph operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Node key not found in the graph.
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeKey),

    /// Wall key not found in the graph.
    #[error("wall not found: {0:?}")]
    WallNotFound(WallKey),

    /// Item index out of range for the wall's item list.
    #[error("wall {wall:?} has no item at index {index}")]
    ItemNotFound { wall: WallKey, index: usize },

    /// A persisted wall references a node index outside the node array.
    #[error("wall {wall} references missing node index {index}")]
    InvalidNodeIndex { wall: usize, index: usize },

    /// A persisted door/window/vent references a wall index outside the wall array.
    #[error("{kind} {item} references missing wall index {index}")]
    InvalidWallIndex {
        kind: &'static str,
        item: usize,
        index: usize,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}
