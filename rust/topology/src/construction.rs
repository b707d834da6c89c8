// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mutation primitives for the wall graph.
//!
//! Every entity is created and removed through the graph, which checks that
//! referenced nodes exist and keeps the node → wall index in sync. These
//! primitives do not restore topological invariants on their own; callers run
//! [`WallGraph::normalize`](crate::WallGraph::normalize) after an edit.

use nalgebra::Point2;

use crate::error::{Error, Result};
use crate::graph::*;
use crate::keys::*;

impl WallGraph {
    /// Adds a node at the given coordinates.
    pub fn add_node(&mut self, x: f64, y: f64) -> NodeKey {
        self.nodes.insert(Node { x, y })
    }

    /// Returns the node nearest to `point` within `tolerance`, if any.
    ///
    /// Ties go to the node that comes first in slot order.
    pub fn find_node_near(&self, point: &Point2<f64>, tolerance: f64) -> Option<NodeKey> {
        let tol_sq = tolerance * tolerance;
        let mut best: Option<(NodeKey, f64)> = None;
        for (key, node) in self.nodes.iter() {
            let dist_sq = (node.x - point.x).powi(2) + (node.y - point.y).powi(2);
            if dist_sq <= tol_sq && best.map_or(true, |(_, d)| dist_sq < d) {
                best = Some((key, dist_sq));
            }
        }
        best.map(|(key, _)| key)
    }

    /// Reuses a node within `tolerance` of `point`, or creates one there.
    pub fn node_at_or_insert(&mut self, point: &Point2<f64>, tolerance: f64) -> NodeKey {
        match self.find_node_near(point, tolerance) {
            Some(key) => key,
            None => self.add_node(point.x, point.y),
        }
    }

    /// Moves a node. Walls referencing it follow.
    pub fn move_node(&mut self, key: NodeKey, x: f64, y: f64) -> Result<()> {
        let node = self.nodes.get_mut(key).ok_or(Error::NodeNotFound(key))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Creates a wall between two existing nodes.
    ///
    /// Returns an error if either node does not exist. Zero-length and
    /// duplicate walls are accepted here and cleaned up by normalization.
    pub fn add_wall(
        &mut self,
        start: NodeKey,
        end: NodeKey,
        thickness: f64,
        kind: WallKind,
    ) -> Result<WallKey> {
        if !self.nodes.contains_key(start) {
            return Err(Error::NodeNotFound(start));
        }
        if !self.nodes.contains_key(end) {
            return Err(Error::NodeNotFound(end));
        }

        let key = self.walls.insert(Wall {
            start,
            end,
            thickness,
            kind,
            items: Vec::new(),
        });
        self.link_node_wall(start, key);
        self.link_node_wall(end, key);
        Ok(key)
    }

    /// Changes how a wall is rendered.
    pub fn set_wall_kind(&mut self, wall: WallKey, kind: WallKind) -> Result<()> {
        let target = self.walls.get_mut(wall).ok_or(Error::WallNotFound(wall))?;
        target.kind = kind;
        Ok(())
    }

    /// Removes a wall together with its items.
    pub fn remove_wall(&mut self, key: WallKey) -> Option<Wall> {
        let wall = self.walls.remove(key)?;
        self.unlink_node_wall(wall.start, key);
        self.unlink_node_wall(wall.end, key);
        Some(wall)
    }

    /// Removes a node and every wall that references it.
    pub fn remove_node(&mut self, key: NodeKey) -> Option<Node> {
        let incident: Vec<WallKey> = self.walls_at(key).to_vec();
        for wall in incident {
            self.remove_wall(wall);
        }
        self.node_to_walls.remove(&key);
        self.nodes.remove(key)
    }

    /// Collapses `remove` into `keep`.
    ///
    /// Every wall endpoint referencing `remove` is repointed to `keep`, then
    /// `remove` is deleted. A wall joining the two becomes zero-length and is
    /// left for the normalizer to prune.
    pub fn merge_nodes(&mut self, keep: NodeKey, remove: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(keep) {
            return Err(Error::NodeNotFound(keep));
        }
        if !self.nodes.contains_key(remove) {
            return Err(Error::NodeNotFound(remove));
        }
        if keep == remove {
            return Ok(());
        }

        let incident: Vec<WallKey> = self.walls_at(remove).to_vec();
        for wk in incident {
            if let Some(wall) = self.walls.get_mut(wk) {
                if wall.start == remove {
                    wall.start = keep;
                }
                if wall.end == remove {
                    wall.end = keep;
                }
            }
            self.link_node_wall(keep, wk);
        }

        self.node_to_walls.remove(&remove);
        self.nodes.remove(remove);
        Ok(())
    }

    /// Splits a wall at the projection of an existing node.
    ///
    /// The wall is replaced by `start → node` and `node → end`, both keeping
    /// the original thickness and kind. Items whose centre lies before the
    /// split stay on the first half unchanged; the others move to the second
    /// half with their distance re-measured from the node.
    ///
    /// Returns `None` (and changes nothing) if the node is an endpoint of the
    /// wall or projects outside its interior.
    pub fn split_wall(&mut self, wall: WallKey, node: NodeKey) -> Option<(WallKey, WallKey)> {
        let segment = self.wall_segment(wall)?;
        let at = self.node_point(node)?;
        if self.walls[wall].has_endpoint(node) {
            return None;
        }

        let t = segment.project(&at);
        if t <= 0.0 || t >= 1.0 {
            return None;
        }
        let split_at = t * segment.length();

        let original = self.remove_wall(wall)?;
        let (before, after): (Vec<WallItem>, Vec<WallItem>) = original
            .items
            .into_iter()
            .partition(|item| item.pos < split_at);

        let first = self
            .add_wall(original.start, node, original.thickness, original.kind)
            .ok()?;
        let second = self
            .add_wall(node, original.end, original.thickness, original.kind)
            .ok()?;

        self.walls[first].items = before;
        self.walls[second].items = after
            .into_iter()
            .map(|item| WallItem {
                pos: item.pos - split_at,
                ..item
            })
            .collect();

        Some((first, second))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line_graph() -> (WallGraph, NodeKey, NodeKey, WallKey) {
        let mut graph = WallGraph::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        let w = graph.add_wall(a, b, 0.5, WallKind::Normal).unwrap();
        (graph, a, b, w)
    }

    #[test]
    fn add_wall_rejects_stale_node() {
        let (mut graph, a, b, _) = line_graph();
        graph.remove_node(b);
        assert!(matches!(
            graph.add_wall(a, b, 1.0, WallKind::Normal),
            Err(Error::NodeNotFound(k)) if k == b
        ));
    }

    #[test]
    fn set_kind_on_stale_wall_fails() {
        let (mut graph, _, _, w) = line_graph();
        graph.set_wall_kind(w, WallKind::Glass).unwrap();
        assert_eq!(graph.wall(w).unwrap().kind, WallKind::Glass);

        graph.remove_wall(w);
        assert!(matches!(
            graph.set_wall_kind(w, WallKind::Half),
            Err(Error::WallNotFound(_))
        ));
    }

    #[test]
    fn remove_node_removes_incident_walls() {
        let (mut graph, a, b, w) = line_graph();
        assert!(graph.remove_node(a).is_some());
        assert!(!graph.contains_wall(w));
        assert_eq!(graph.degree(b), 0);
    }

    #[test]
    fn merge_repoints_walls() {
        let mut graph = WallGraph::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        let b2 = graph.add_node(10.1, 0.0);
        let c = graph.add_node(10.0, 10.0);
        let ab = graph.add_wall(a, b, 1.0, WallKind::Normal).unwrap();
        let b2c = graph.add_wall(b2, c, 1.0, WallKind::Normal).unwrap();

        graph.merge_nodes(b, b2).unwrap();

        assert!(!graph.contains_node(b2));
        assert_eq!(graph.wall(b2c).unwrap().start, b);
        assert_eq!(graph.walls_at(b), &[ab, b2c]);
    }

    #[test]
    fn find_node_near_prefers_closest() {
        let mut graph = WallGraph::new();
        graph.add_node(0.0, 0.0);
        let near = graph.add_node(1.0, 0.0);
        assert_eq!(graph.find_node_near(&Point2::new(0.9, 0.0), 1.0), Some(near));
        assert_eq!(graph.find_node_near(&Point2::new(5.0, 0.0), 1.0), None);

        let count = graph.node_count();
        let reused = graph.node_at_or_insert(&Point2::new(1.2, 0.0), 0.5);
        assert_eq!(reused, near);
        assert_eq!(graph.node_count(), count);
    }

    #[test]
    fn split_redistributes_items() {
        let (mut graph, a, b, w) = line_graph();
        graph.walls[w].items = vec![
            WallItem::new(ItemKind::Window, 2.0, 1.0),
            WallItem::new(ItemKind::Door, 8.0, 2.0),
        ];
        let m = graph.add_node(5.0, 0.0);

        let (first, second) = graph.split_wall(w, m).unwrap();

        assert!(!graph.contains_wall(w));
        let first = graph.wall(first).unwrap();
        let second = graph.wall(second).unwrap();
        assert_eq!((first.start, first.end), (a, m));
        assert_eq!((second.start, second.end), (m, b));
        assert_eq!(first.items.len(), 1);
        assert_relative_eq!(first.items[0].pos, 2.0);
        assert_eq!(second.items.len(), 1);
        assert_eq!(second.items[0].kind, ItemKind::Door);
        assert_relative_eq!(second.items[0].pos, 3.0);
    }

    #[test]
    fn split_at_endpoint_or_outside_is_refused() {
        let (mut graph, a, _, w) = line_graph();
        assert!(graph.split_wall(w, a).is_none());
        let outside = graph.add_node(15.0, 0.0);
        assert!(graph.split_wall(w, outside).is_none());
        assert!(graph.contains_wall(w));
    }
}
