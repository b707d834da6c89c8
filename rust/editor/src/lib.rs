// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorkit Editor
//!
//! Interactive editing on top of the [`floorkit_topology`] kernel: pointer
//! snapping with drag locking, and an [`EditSession`] that applies edits,
//! keeps the plan normalized and records undo history.

pub mod config;
pub mod error;
pub mod session;
pub mod snap;

pub use config::EditorConfig;
pub use error::{EditError, Result};
pub use session::EditSession;
pub use snap::{EditMode, SnapConfig, SnapEngine, SnapKind, SnapMask, SnapResult};
