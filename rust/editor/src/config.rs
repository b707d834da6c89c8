// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Editor configuration.

use floorkit_topology::PlanConfig;
use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};
use crate::snap::SnapConfig;

/// Everything an [`EditSession`](crate::EditSession) can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub plan: PlanConfig,
    pub snap: SnapConfig,
    /// Maximum number of undo steps kept.
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            plan: PlanConfig::default(),
            snap: SnapConfig::default(),
            history_limit: 100,
        }
    }
}

impl EditorConfig {
    /// Parses a JSON configuration; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| EditError::Config(e.to_string()))
    }
}
