// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room detection by face tracing over the planar wall graph.
//!
//! Every wall contributes two half-edges, one per direction. At each node the
//! outgoing half-edges are sorted counter-clockwise by angle; the successor of
//! a half-edge `u → v` is the half-edge leaving `v` immediately clockwise
//! from `v → u`. Walking successors traces each face exactly once, bounded
//! faces counter-clockwise (positive signed area) and the outer face of each
//! connected component clockwise (negative signed area), so the outer faces
//! are dropped by sign alone.
//!
//! Room identity (name and label position) survives edits: a new face adopts
//! the identity of the previous room whose label centre it contains.

use nalgebra::{Point2, Vector2};
use rustc_hash::FxHashMap;

use crate::config::RoomConfig;
use crate::graph::WallGraph;
use crate::keys::NodeKey;
use crate::polygon::{self, Bounds};

/// A bounded face of the wall graph with its persistent identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub name: String,
    /// Boundary nodes, counter-clockwise, without dangling-wall spikes.
    pub nodes: Vec<NodeKey>,
    /// Boundary positions matching `nodes`.
    pub polygon: Vec<Point2<f64>>,
    /// Shoelace area in plan units squared (positive for rooms).
    pub signed_area: f64,
    /// Area in reporting units (square meters by default).
    pub area: f64,
    pub centroid: Point2<f64>,
    /// Label anchor, always inside the polygon.
    pub center: Point2<f64>,
    /// `center` as a fraction of the polygon's bounding box.
    pub center_offset: Vector2<f64>,
}

impl Room {
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.polygon)
    }

    /// The identity this room hands on to the next detection pass.
    pub fn hint(&self) -> RoomHint {
        RoomHint {
            name: self.name.clone(),
            center: self.center,
            center_offset: Some(self.center_offset),
        }
    }

    /// Moves the label anchor, keeping it inside the room.
    ///
    /// Returns `false` (and changes nothing) if `center` lies outside.
    pub fn set_center(&mut self, center: Point2<f64>) -> bool {
        if !polygon::contains(&self.polygon, &center) {
            return false;
        }
        self.center = center;
        if let Some(bounds) = self.bounds() {
            self.center_offset = bounds.fraction_of(&center);
        }
        true
    }
}

/// Identity of a previously detected (or persisted) room.
///
/// A hint is matched to the first new face whose polygon contains its
/// `center`. That point is the room's label anchor ([`Room::center`], the
/// centre stored in plan files), not the area centroid: the centroid of a
/// concave room can fall outside it, the anchor cannot.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomHint {
    pub name: String,
    /// Label anchor of the room this hint came from.
    pub center: Point2<f64>,
    /// Proportional label offset; absent for rooms loaded from a plan file.
    pub center_offset: Option<Vector2<f64>>,
}

/// Directed copy of a wall. Half-edge `2i` runs start → end of wall `i`,
/// `2i + 1` runs back; the twin of `h` is `h ^ 1`.
#[derive(Debug, Clone, Copy)]
struct HalfEdge {
    from: NodeKey,
    to: NodeKey,
}

/// Traces all faces of the graph, returning each as its node ring.
///
/// Outer faces are included; callers filter by signed area.
pub fn trace_faces(graph: &WallGraph) -> Vec<Vec<NodeKey>> {
    let mut half_edges: Vec<HalfEdge> = Vec::with_capacity(graph.wall_count() * 2);
    for (_, wall) in graph.walls() {
        half_edges.push(HalfEdge {
            from: wall.start,
            to: wall.end,
        });
        half_edges.push(HalfEdge {
            from: wall.end,
            to: wall.start,
        });
    }

    // Outgoing half-edges per node, counter-clockwise by angle.
    let mut outgoing: FxHashMap<NodeKey, Vec<(f64, usize)>> = FxHashMap::default();
    for (h, he) in half_edges.iter().enumerate() {
        let (Some(p), Some(q)) = (graph.node_point(he.from), graph.node_point(he.to)) else {
            continue;
        };
        let angle = (q.y - p.y).atan2(q.x - p.x);
        outgoing.entry(he.from).or_default().push((angle, h));
    }
    let mut slot = vec![0usize; half_edges.len()];
    for list in outgoing.values_mut() {
        list.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        for (i, &(_, h)) in list.iter().enumerate() {
            slot[h] = i;
        }
    }

    let next = |h: usize| -> Option<usize> {
        let twin = h ^ 1;
        let list = outgoing.get(&half_edges[h].to)?;
        let i = slot[twin];
        Some(list[(i + list.len() - 1) % list.len()].1)
    };

    let mut visited = vec![false; half_edges.len()];
    let mut faces = Vec::new();
    for start in 0..half_edges.len() {
        if visited[start] {
            continue;
        }
        let mut ring = Vec::new();
        let mut h = start;
        let mut closed = false;
        for _ in 0..half_edges.len() {
            visited[h] = true;
            ring.push(half_edges[h].from);
            match next(h) {
                Some(n) if n == start => {
                    closed = true;
                    break;
                }
                Some(n) if !visited[n] => h = n,
                _ => break,
            }
        }
        // An unclosed walk only happens on inconsistent input; drop it.
        if closed {
            faces.push(ring);
        }
    }
    faces
}

/// Removes `a → b → a` excursions left by dangling walls.
fn strip_spikes(ring: Vec<NodeKey>) -> Vec<NodeKey> {
    let mut out: Vec<NodeKey> = Vec::with_capacity(ring.len());
    for n in ring {
        if out.len() >= 2 && out[out.len() - 2] == n {
            out.pop();
        } else {
            out.push(n);
        }
    }

    // Spikes straddling the seam of the ring.
    loop {
        let len = out.len();
        if len < 3 {
            break;
        }
        if out[len - 2] == out[0] {
            out.truncate(len - 2);
        } else if out[len - 1] == out[1] {
            out.remove(0);
            out.pop();
        } else {
            break;
        }
    }
    out
}

/// Detects the rooms of a normalized graph.
///
/// `previous` lists the identities of the last detection pass (or the room
/// records of a freshly loaded plan); each is handed to at most one new room,
/// first match in list order.
pub fn detect_rooms(graph: &WallGraph, previous: &[RoomHint], config: &RoomConfig) -> Vec<Room> {
    if graph.wall_count() < 3 {
        return Vec::new();
    }

    let faces = trace_faces(graph);
    let face_count = faces.len();
    let mut claimed = vec![false; previous.len()];
    let mut rooms = Vec::new();

    for ring in faces {
        let nodes = strip_spikes(ring);
        if nodes.len() < 3 {
            continue;
        }
        let Some(points) = nodes
            .iter()
            .map(|&n| graph.node_point(n))
            .collect::<Option<Vec<_>>>()
        else {
            continue;
        };

        let signed_area = polygon::signed_area(&points);
        if signed_area < config.min_face_area {
            continue;
        }
        let (Some(bounds), Some(centroid)) = (Bounds::from_points(&points), polygon::centroid(&points))
        else {
            continue;
        };
        let area = signed_area * config.area_unit_scale;

        let inherited = previous
            .iter()
            .enumerate()
            .find(|(i, hint)| !claimed[*i] && polygon::contains(&points, &hint.center));

        let (name, mut center) = match inherited {
            Some((i, hint)) => {
                claimed[i] = true;
                let center = match &hint.center_offset {
                    Some(offset) => bounds.lerp(offset),
                    None => hint.center,
                };
                (hint.name.clone(), center)
            }
            None => (default_name(area, config), centroid),
        };

        if !polygon::contains(&points, &center) {
            center = polygon::interior_point(&points).unwrap_or(centroid);
        }

        rooms.push(Room {
            name,
            nodes,
            center_offset: bounds.fraction_of(&center),
            polygon: points,
            signed_area,
            area,
            centroid,
            center,
        });
    }

    tracing::debug!(
        faces = face_count,
        rooms = rooms.len(),
        inherited = claimed.iter().filter(|c| **c).count(),
        "detected rooms"
    );
    rooms
}

fn default_name(area: f64, config: &RoomConfig) -> String {
    match config.large_room_area {
        Some(threshold) if area > threshold => config.large_room_name.clone(),
        _ => config.default_room_name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::WallKind;
    use approx::assert_relative_eq;

    fn polygon_graph(points: &[(f64, f64)]) -> (WallGraph, Vec<NodeKey>) {
        let mut graph = WallGraph::new();
        let nodes: Vec<NodeKey> = points.iter().map(|&(x, y)| graph.add_node(x, y)).collect();
        for i in 0..nodes.len() {
            graph
                .add_wall(nodes[i], nodes[(i + 1) % nodes.len()], 10.0, WallKind::Normal)
                .unwrap();
        }
        (graph, nodes)
    }

    fn square(size: f64) -> (WallGraph, Vec<NodeKey>) {
        polygon_graph(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)])
    }

    #[test]
    fn square_has_one_inner_and_one_outer_face() {
        let (graph, _) = square(100.0);
        let faces = trace_faces(&graph);
        assert_eq!(faces.len(), 2);

        let rooms = detect_rooms(&graph, &[], &RoomConfig::default());
        assert_eq!(rooms.len(), 1);
        assert_relative_eq!(rooms[0].area, 1.0);
        assert_relative_eq!(rooms[0].signed_area, 10_000.0);
        assert_relative_eq!(rooms[0].center, Point2::new(50.0, 50.0));
        assert_eq!(rooms[0].name, "Room");
    }

    #[test]
    fn two_walls_make_no_room() {
        let mut graph = WallGraph::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(100.0, 0.0);
        let c = graph.add_node(100.0, 100.0);
        graph.add_wall(a, b, 10.0, WallKind::Normal).unwrap();
        graph.add_wall(b, c, 10.0, WallKind::Normal).unwrap();
        assert!(detect_rooms(&graph, &[], &RoomConfig::default()).is_empty());
    }

    #[test]
    fn shared_wall_yields_two_rooms() {
        let (mut graph, nodes) = polygon_graph(&[
            (0.0, 0.0),
            (200.0, 0.0),
            (400.0, 0.0),
            (400.0, 200.0),
            (200.0, 200.0),
            (0.0, 200.0),
        ]);
        graph.add_wall(nodes[1], nodes[4], 10.0, WallKind::Normal).unwrap();

        let rooms = detect_rooms(&graph, &[], &RoomConfig::default());
        assert_eq!(rooms.len(), 2);
        for room in &rooms {
            assert_relative_eq!(room.area, 4.0);
        }
    }

    #[test]
    fn dangling_wall_inside_room_is_stripped() {
        let (mut graph, nodes) = square(100.0);
        let stub = graph.add_node(50.0, 50.0);
        graph.add_wall(nodes[0], stub, 10.0, WallKind::Normal).unwrap();

        let rooms = detect_rooms(&graph, &[], &RoomConfig::default());
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].nodes.len(), 4);
        assert!(!rooms[0].nodes.contains(&stub));
        assert_relative_eq!(rooms[0].area, 1.0);
    }

    #[test]
    fn spikes_across_the_seam_are_removed() {
        let mut graph = WallGraph::new();
        let keys: Vec<NodeKey> = (0..5).map(|i| graph.add_node(i as f64, 0.0)).collect();
        let (a, b, x, y) = (keys[0], keys[1], keys[2], keys[3]);

        assert_eq!(strip_spikes(vec![b, a, x, y, a]), vec![a, x, y]);
        assert_eq!(strip_spikes(vec![a, x, y, a, b]), vec![a, x, y]);
        assert_eq!(strip_spikes(vec![a, b, x, b, a, y]), vec![a, y]);
    }

    #[test]
    fn identity_is_inherited_through_centre() {
        let (mut graph, nodes) = square(100.0);
        let config = RoomConfig::default();
        let mut rooms = detect_rooms(&graph, &[], &config);
        rooms[0].name = "Kitchen".into();
        assert!(rooms[0].set_center(Point2::new(25.0, 75.0)));
        let hints: Vec<RoomHint> = rooms.iter().map(Room::hint).collect();

        graph.move_node(nodes[1], 120.0, 0.0).unwrap();
        graph.move_node(nodes[2], 120.0, 100.0).unwrap();
        let rooms = detect_rooms(&graph, &hints, &config);

        assert_eq!(rooms[0].name, "Kitchen");
        // Same proportional offset in the wider box.
        assert_relative_eq!(rooms[0].center, Point2::new(30.0, 75.0));
    }

    #[test]
    fn recovered_centre_outside_l_shape_falls_back_inside() {
        let (graph, _) = polygon_graph(&[
            (0.0, 0.0),
            (1000.0, 0.0),
            (1000.0, 200.0),
            (200.0, 200.0),
            (200.0, 1000.0),
            (0.0, 1000.0),
        ]);
        let hint = RoomHint {
            name: "Hall".into(),
            center: Point2::new(100.0, 100.0),
            center_offset: Some(Vector2::new(0.5, 0.5)),
        };

        let rooms = detect_rooms(&graph, &[hint], &RoomConfig::default());

        assert_eq!(rooms[0].name, "Hall");
        assert!(polygon::contains(&rooms[0].polygon, &rooms[0].center));
        let bounds = rooms[0].bounds().unwrap();
        assert_relative_eq!(bounds.lerp(&rooms[0].center_offset), rooms[0].center);
    }

    #[test]
    fn large_rooms_get_the_large_default_name() {
        let (graph, _) = square(1000.0);
        let rooms = detect_rooms(&graph, &[], &RoomConfig::default());
        assert_eq!(rooms[0].name, "Living room");

        let config = RoomConfig {
            large_room_area: None,
            ..RoomConfig::default()
        };
        assert_eq!(detect_rooms(&graph, &[], &config)[0].name, "Room");
    }
}
