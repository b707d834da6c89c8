// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Tolerances and policy knobs for the kernel.
//!
//! All lengths are in plan units (centimeters).

use serde::{Deserialize, Serialize};

/// Configuration for the whole kernel, grouped by component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    pub topology: TopologyConfig,
    pub rooms: RoomConfig,
    pub placement: PlacementConfig,
}

impl PlanConfig {
    /// Parses a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        serde_json::from_str(json).map_err(|e| crate::Error::Serialization(e.to_string()))
    }
}

/// Tolerances used by the topology normalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Two nodes closer than this are unified into one.
    pub merge_tolerance: f64,
    /// Walls shorter than this are pruned.
    pub min_wall_length: f64,
    /// Cross product (of unit directions) below which two walls are collinear.
    pub collinear_epsilon: f64,
    /// Thickness assigned to persisted walls with a non-positive thickness.
    pub default_thickness: f64,
    /// Upper bound on iterations of each fixed-point loop.
    pub max_iterations: usize,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            merge_tolerance: 0.5,
            min_wall_length: 0.1,
            collinear_epsilon: 1e-4,
            default_thickness: 10.0,
            max_iterations: 10_000,
        }
    }
}

/// Face filtering and default naming for detected rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Faces with a smaller signed area (plan units squared) are discarded.
    pub min_face_area: f64,
    /// Multiplier from plan units squared to reported area (cm² → m²).
    pub area_unit_scale: f64,
    /// Reported-area threshold above which a new room gets `large_room_name`.
    pub large_room_area: Option<f64>,
    /// Name given to newly detected rooms.
    pub default_room_name: String,
    /// Name given to newly detected rooms larger than `large_room_area`.
    pub large_room_name: String,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_face_area: 1.0,
            area_unit_scale: 1e-4,
            large_room_area: Some(40.0),
            default_room_name: "Room".into(),
            large_room_name: "Living room".into(),
        }
    }
}

/// Spacing rules for doors, windows and vents along a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Clearance kept between an item and either wall end, beyond half the
    /// wall thickness.
    pub edge_margin: f64,
    /// Minimum distance between two items on the same wall.
    pub min_gap: f64,
    /// Items are never shrunk below this width.
    pub min_item_width: f64,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            edge_margin: 5.0,
            min_gap: 10.0,
            min_item_width: 30.0,
        }
    }
}
