// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! JSON plan format.
//!
//! Nodes and walls are written as dense arrays; walls, doors, windows and
//! vents refer to earlier entries by index. Slot map keys never leave the
//! process: they are mapped to sequential indices in slot order on save and
//! rebuilt on load.

use nalgebra::Point2;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::config::TopologyConfig;
use crate::error::{Error, Result};
use crate::graph::*;
use crate::keys::*;
use crate::rooms::{Room, RoomHint};

/// Serializable representation of a floor plan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanFile {
    pub nodes: Vec<PointRecord>,
    pub walls: Vec<WallRecord>,
    pub doors: Vec<ItemRecord>,
    pub windows: Vec<ItemRecord>,
    pub vents: Vec<ItemRecord>,
    pub rooms: Vec<RoomRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WallRecord {
    pub p1_index: usize,
    pub p2_index: usize,
    #[serde(default)]
    pub thickness: f64,
    #[serde(default)]
    pub kind: WallKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRecord {
    pub wall: usize,
    pub pos: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fixed_width: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub name: String,
    pub center: PointRecord,
    #[serde(default)]
    pub area: f64,
}

impl From<Point2<f64>> for PointRecord {
    fn from(p: Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointRecord> for Point2<f64> {
    fn from(p: PointRecord) -> Self {
        Point2::new(p.x, p.y)
    }
}

impl PlanFile {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Room identities stored in the file, for the first detection pass.
    ///
    /// Persisted rooms carry no proportional offset, so the stored centre is
    /// used as is.
    pub fn room_hints(&self) -> Vec<RoomHint> {
        self.rooms
            .iter()
            .map(|r| RoomHint {
                name: r.name.clone(),
                center: r.center.into(),
                center_offset: None,
            })
            .collect()
    }

    fn items_mut(&mut self, kind: ItemKind) -> &mut Vec<ItemRecord> {
        match kind {
            ItemKind::Door => &mut self.doors,
            ItemKind::Window => &mut self.windows,
            ItemKind::Vent => &mut self.vents,
        }
    }
}

impl WallGraph {
    /// Rebuilds a graph from a plan file.
    ///
    /// Wall and item indices are validated; a wall with non-positive
    /// thickness gets `config.default_thickness`. The result is not
    /// normalized.
    pub fn from_plan(plan: &PlanFile, config: &TopologyConfig) -> Result<Self> {
        let mut graph = WallGraph::new();

        let node_keys: Vec<NodeKey> = plan
            .nodes
            .iter()
            .map(|p| graph.add_node(p.x, p.y))
            .collect();

        let mut wall_keys: Vec<WallKey> = Vec::with_capacity(plan.walls.len());
        for (i, record) in plan.walls.iter().enumerate() {
            let node = |index: usize| {
                node_keys
                    .get(index)
                    .copied()
                    .ok_or(Error::InvalidNodeIndex { wall: i, index })
            };
            let start = node(record.p1_index)?;
            let end = node(record.p2_index)?;
            let thickness = if record.thickness > 0.0 {
                record.thickness
            } else {
                config.default_thickness
            };
            wall_keys.push(graph.add_wall(start, end, thickness, record.kind)?);
        }

        for (kind, records) in [
            (ItemKind::Door, &plan.doors),
            (ItemKind::Window, &plan.windows),
            (ItemKind::Vent, &plan.vents),
        ] {
            for (i, record) in records.iter().enumerate() {
                let wall = wall_keys
                    .get(record.wall)
                    .copied()
                    .ok_or(Error::InvalidWallIndex {
                        kind: kind.as_str(),
                        item: i,
                        index: record.wall,
                    })?;
                graph.walls[wall].items.push(WallItem {
                    kind,
                    pos: record.pos,
                    width: record.width,
                    fixed_width: record.fixed_width,
                });
            }
        }
        for wall in graph.walls.values_mut() {
            wall.sort_items();
        }

        tracing::debug!(
            nodes = graph.node_count(),
            walls = graph.wall_count(),
            "loaded plan"
        );
        Ok(graph)
    }

    /// Writes the graph and room records as a plan file.
    ///
    /// Nodes and walls are re-indexed densely in slot order, so a graph that
    /// went through the same edits always produces the same file.
    pub fn to_plan(&self, rooms: &[Room]) -> PlanFile {
        let mut plan = PlanFile::default();

        let mut node_ids: FxHashMap<NodeKey, usize> = FxHashMap::default();
        for (i, (key, node)) in self.nodes.iter().enumerate() {
            node_ids.insert(key, i);
            plan.nodes.push(PointRecord {
                x: node.x,
                y: node.y,
            });
        }

        for (i, wall) in self.walls.values().enumerate() {
            plan.walls.push(WallRecord {
                p1_index: node_ids[&wall.start],
                p2_index: node_ids[&wall.end],
                thickness: wall.thickness,
                kind: wall.kind,
            });
            for item in &wall.items {
                plan.items_mut(item.kind).push(ItemRecord {
                    wall: i,
                    pos: item.pos,
                    width: item.width,
                    fixed_width: item.fixed_width,
                });
            }
        }

        plan.rooms = rooms
            .iter()
            .map(|room| RoomRecord {
                name: room.name.clone(),
                center: room.center.into(),
                area: room.area,
            })
            .collect();

        plan
    }

    /// Serializes the graph (without rooms) to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        self.to_plan(&[]).to_json()
    }

    /// Deserializes a graph from a JSON plan, ignoring stored rooms.
    pub fn from_json(json: &str, config: &TopologyConfig) -> Result<Self> {
        Self::from_plan(&PlanFile::from_json(json)?, config)
    }
}
