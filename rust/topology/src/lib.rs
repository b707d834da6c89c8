// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Floorkit Topology
//!
//! Planar wall-graph kernel for interactive floor-plan editing.
//!
//! Walls are segments between shared nodes, stored in slot maps with stable
//! keys and a node → wall incidence index. After every edit the graph is
//! brought back to a canonical planar form by [`WallGraph::normalize`]:
//! near-coincident nodes are unified, micro-walls dropped, crossings and
//! T-junctions split, duplicates merged and straight chains fused. Rooms are
//! then the bounded faces of that graph ([`detect_rooms`]), and doors,
//! windows and vents live on walls as non-overlapping intervals
//! ([`placement`]).
//!
//! Lengths are plan units (centimeters by default); room areas are reported
//! in square meters through [`RoomConfig::area_unit_scale`].

pub mod config;
pub mod construction;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod keys;
pub mod normalize;
pub mod placement;
pub mod plan;
pub mod polygon;
pub mod rooms;
pub mod serialization;
pub mod spatial;

pub use config::{PlacementConfig, PlanConfig, RoomConfig, TopologyConfig};
pub use error::{Error, Result};
pub use geometry::{segment_intersection, Intersection, Segment};
pub use graph::{ItemKind, Node, Wall, WallGraph, WallItem, WallKind};
pub use keys::{NodeKey, WallKey};
pub use normalize::NormalizeReport;
pub use placement::{Placement, PlacementRequest, Refit, ResizeAnchor, Span};
pub use plan::FloorPlan;
pub use polygon::Bounds;
pub use rooms::{detect_rooms, Room, RoomHint};
pub use serialization::PlanFile;
