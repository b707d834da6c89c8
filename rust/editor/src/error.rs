// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for edit sessions.

/// Result type alias for edit operations.
pub type Result<T> = std::result::Result<T, EditError>;

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Failure reported by the wall-graph kernel.
    #[error(transparent)]
    Topology(#[from] floorkit_topology::Error),

    #[error("room index {0} out of range")]
    RoomNotFound(usize),

    /// A room label must stay inside its room.
    #[error("label position ({x}, {y}) is outside room {room}")]
    LabelOutsideRoom { room: usize, x: f64, y: f64 },

    #[error("invalid editor configuration: {0}")]
    Config(String),
}
