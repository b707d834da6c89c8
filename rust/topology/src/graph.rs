// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Arena-based storage for the wall graph.
//!
//! The [`WallGraph`] is the single owner of all nodes and walls. Both live in
//! slot maps with stable, generational keys; walls refer to their endpoints by
//! [`NodeKey`]. An upward index (node → incident walls) makes degree queries
//! and endpoint repointing cheap.
//!
//! Doors, windows and vents are owned by their wall as an ordered list of
//! [`WallItem`]s and are destroyed with it.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use smallvec::SmallVec;

use crate::keys::*;

/// A shared wall endpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

/// Rendering category of a wall.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WallKind {
    #[default]
    Normal,
    Balcony,
    Glass,
    Half,
}

/// Kind of opening placed along a wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Door,
    Window,
    Vent,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Door => "door",
            ItemKind::Window => "window",
            ItemKind::Vent => "vent",
        }
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A door, window or vent occupying an interval along its wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallItem {
    pub kind: ItemKind,
    /// Distance of the item's centre from the wall's start node.
    pub pos: f64,
    pub width: f64,
    /// Set when the user chose the width; such items are never shrunk.
    pub fixed_width: bool,
}

impl WallItem {
    pub fn new(kind: ItemKind, pos: f64, width: f64) -> Self {
        Self {
            kind,
            pos,
            width,
            fixed_width: false,
        }
    }

    /// The `[pos - width/2, pos + width/2]` interval along the wall.
    pub fn interval(&self) -> (f64, f64) {
        let half = self.width / 2.0;
        (self.pos - half, self.pos + half)
    }
}

/// A wall segment between two nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Wall {
    pub start: NodeKey,
    pub end: NodeKey,
    pub thickness: f64,
    pub kind: WallKind,
    /// Items sorted by `pos`.
    pub items: Vec<WallItem>,
}

impl Wall {
    /// Returns the endpoint opposite to `node`, or `None` if `node` is not an
    /// endpoint of this wall.
    pub fn other_end(&self, node: NodeKey) -> Option<NodeKey> {
        if self.start == node {
            Some(self.end)
        } else if self.end == node {
            Some(self.start)
        } else {
            None
        }
    }

    pub fn has_endpoint(&self, node: NodeKey) -> bool {
        self.start == node || self.end == node
    }

    pub(crate) fn sort_items(&mut self) {
        self.items.sort_by(|a, b| a.pos.total_cmp(&b.pos));
    }
}

/// Incident walls of one node. Most nodes join at most four walls.
pub(crate) type Incidence = SmallVec<[WallKey; 4]>;

/// The central store that owns all nodes and walls.
///
/// # Example
///
/// ```
/// use floorkit_topology::{WallGraph, WallKind};
///
/// let mut graph = WallGraph::new();
/// let a = graph.add_node(0.0, 0.0);
/// let b = graph.add_node(300.0, 0.0);
/// graph.add_wall(a, b, 10.0, WallKind::Normal).unwrap();
///
/// assert_eq!(graph.node_count(), 2);
/// assert_eq!(graph.degree(a), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WallGraph {
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) walls: SlotMap<WallKey, Wall>,

    // Upward adjacency: node → walls using it
    pub(crate) node_to_walls: FxHashMap<NodeKey, Incidence>,
}

impl WallGraph {
    /// Creates a new, empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // --- Node access ---

    /// Returns the node for the given key, or `None` if not found.
    pub fn node(&self, key: NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    /// Iterates nodes in slot order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains_node(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    // --- Wall access ---

    /// Returns the wall for the given key, or `None` if not found.
    pub fn wall(&self, key: WallKey) -> Option<&Wall> {
        self.walls.get(key)
    }

    /// Iterates walls in slot order.
    pub fn walls(&self) -> impl Iterator<Item = (WallKey, &Wall)> {
        self.walls.iter()
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    pub fn contains_wall(&self, key: WallKey) -> bool {
        self.walls.contains_key(key)
    }

    // --- Adjacency ---

    /// Walls incident to a node, in insertion order.
    pub fn walls_at(&self, node: NodeKey) -> &[WallKey] {
        self.node_to_walls
            .get(&node)
            .map(|w| w.as_slice())
            .unwrap_or(&[])
    }

    /// Number of walls incident to a node.
    pub fn degree(&self, node: NodeKey) -> usize {
        self.walls_at(node).len()
    }

    /// Returns the endpoint of `wall` opposite to `node`.
    pub fn other_end(&self, wall: WallKey, node: NodeKey) -> Option<NodeKey> {
        self.walls.get(wall)?.other_end(node)
    }

    /// Finds a wall joining `a` and `b` in either direction.
    pub fn find_wall_between(&self, a: NodeKey, b: NodeKey) -> Option<WallKey> {
        self.walls_at(a)
            .iter()
            .copied()
            .find(|&w| self.other_end(w, a) == Some(b))
    }

    // --- Adjacency index helpers ---

    /// Register that a wall uses a node.
    pub(crate) fn link_node_wall(&mut self, node: NodeKey, wall: WallKey) {
        let incident = self.node_to_walls.entry(node).or_default();
        if !incident.contains(&wall) {
            incident.push(wall);
        }
    }

    /// Remove the registration of a wall at a node.
    pub(crate) fn unlink_node_wall(&mut self, node: NodeKey, wall: WallKey) {
        if let Some(incident) = self.node_to_walls.get_mut(&node) {
            incident.retain(|w| *w != wall);
            if incident.is_empty() {
                self.node_to_walls.remove(&node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_graph_is_empty() {
        let graph = WallGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.wall_count(), 0);
    }

    #[test]
    fn adjacency_tracks_walls() {
        let mut graph = WallGraph::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(100.0, 0.0);
        let c = graph.add_node(100.0, 100.0);
        let ab = graph.add_wall(a, b, 10.0, WallKind::Normal).unwrap();
        let bc = graph.add_wall(b, c, 10.0, WallKind::Glass).unwrap();

        assert_eq!(graph.walls_at(b), &[ab, bc]);
        assert_eq!(graph.degree(a), 1);
        assert_eq!(graph.other_end(ab, a), Some(b));
        assert_eq!(graph.other_end(ab, c), None);
        assert_eq!(graph.find_wall_between(c, b), Some(bc));
        assert_eq!(graph.find_wall_between(a, c), None);
    }

    #[test]
    fn item_interval() {
        let item = WallItem::new(ItemKind::Door, 50.0, 80.0);
        assert_eq!(item.interval(), (10.0, 90.0));
        assert_eq!(ItemKind::Vent.to_string(), "vent");
    }

    #[test]
    fn wall_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&WallKind::Balcony).unwrap(), "\"balcony\"");
        let kind: WallKind = serde_json::from_str("\"half\"").unwrap();
        assert_eq!(kind, WallKind::Half);
    }
}
