// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Topology normalization.
//!
//! Restores the graph invariants after an arbitrary edit: no two nodes within
//! the merge tolerance, no micro-walls, no crossing walls, no node resting on
//! the interior of a wall, no duplicate walls, no needless degree-2 collinear
//! chains, and every wall item inside its wall's legal span.
//!
//! The pipeline runs in a fixed order and every step is a bounded fixed-point
//! loop over handles in slot order, so the result is deterministic and a
//! second run changes nothing.

use rustc_hash::FxHashMap;

use crate::config::PlanConfig;
use crate::geometry::{are_collinear, segment_intersection};
use crate::graph::{WallGraph, WallItem};
use crate::keys::*;
use crate::placement::{refit, Refit};

/// What a normalization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub nodes_merged: usize,
    pub degenerate_walls_removed: usize,
    pub orphan_nodes_removed: usize,
    pub crossings_split: usize,
    pub t_junctions_split: usize,
    pub duplicates_merged: usize,
    pub collinear_merged: usize,
    pub items_dropped: usize,
    /// Items moved or resized to satisfy the spacing rules.
    pub items_adjusted: usize,
}

impl NormalizeReport {
    /// Returns `true` if the pass left the graph untouched.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

impl WallGraph {
    /// Runs the full normalization pipeline.
    ///
    /// Never fails: steps that cannot make progress simply stop.
    pub fn normalize(&mut self, config: &PlanConfig) -> NormalizeReport {
        let topo = &config.topology;
        let mut report = NormalizeReport {
            nodes_merged: self.unify_nodes(topo.merge_tolerance),
            ..Default::default()
        };

        let (walls, items) = self.remove_degenerate_walls(topo.min_wall_length);
        report.degenerate_walls_removed = walls;
        report.items_dropped += items;
        report.orphan_nodes_removed += self.remove_orphan_nodes();

        report.crossings_split = self.split_crossings(topo.merge_tolerance, topo.max_iterations);
        report.t_junctions_split = self.split_t_junctions(topo.merge_tolerance, topo.max_iterations);
        report.duplicates_merged = self.merge_duplicate_walls();
        report.collinear_merged =
            self.merge_collinear_chains(topo.collinear_epsilon, topo.max_iterations);

        report.orphan_nodes_removed += self.remove_orphan_nodes();
        let refit = self.refit_all_items(config);
        report.items_dropped += refit.dropped;
        report.items_adjusted = refit.adjusted;

        if report.is_noop() {
            tracing::trace!("normalize: graph already normal");
        } else {
            tracing::debug!(
                nodes = self.node_count(),
                walls = self.wall_count(),
                ?report,
                "normalized wall graph"
            );
        }
        report
    }

    /// Removes walls shorter than `min_length` (including walls whose two
    /// endpoints are the same node).
    ///
    /// Returns `(walls removed, items dropped with them)`.
    pub fn remove_degenerate_walls(&mut self, min_length: f64) -> (usize, usize) {
        let degenerate: Vec<WallKey> = self
            .walls
            .iter()
            .filter(|(key, wall)| {
                wall.start == wall.end
                    || self.wall_length(*key).map_or(true, |len| len < min_length)
            })
            .map(|(key, _)| key)
            .collect();

        let mut items = 0;
        for key in &degenerate {
            if let Some(wall) = self.remove_wall(*key) {
                items += wall.items.len();
            }
        }
        (degenerate.len(), items)
    }

    /// Removes nodes that no wall references.
    pub fn remove_orphan_nodes(&mut self) -> usize {
        let orphans: Vec<NodeKey> = self
            .nodes
            .keys()
            .filter(|key| self.degree(*key) == 0)
            .collect();
        for key in &orphans {
            self.nodes.remove(*key);
        }
        orphans.len()
    }

    /// Splits every pair of walls that cross at an interior point.
    ///
    /// A node within `tolerance` of the crossing is reused; otherwise one is
    /// created. Returns the number of crossings resolved.
    pub fn split_crossings(&mut self, tolerance: f64, max_iterations: usize) -> usize {
        let mut count = 0;
        for _ in 0..max_iterations {
            let Some((w1, w2, point)) = self.find_crossing(tolerance) else {
                break;
            };

            let node = self.node_at_or_insert(&point, tolerance);
            let a = self.split_wall(w1, node).is_some();
            let b = self.split_wall(w2, node).is_some();
            if !(a || b) {
                // The crossing sits on endpoints of both walls after all.
                break;
            }
            count += 1;
        }
        count
    }

    /// First pair of walls (in slot order) crossing away from their endpoints.
    fn find_crossing(&self, tolerance: f64) -> Option<(WallKey, WallKey, nalgebra::Point2<f64>)> {
        let walls: Vec<(WallKey, NodeKey, NodeKey)> = self
            .walls
            .iter()
            .map(|(k, w)| (k, w.start, w.end))
            .collect();

        for (i, &(k1, s1, e1)) in walls.iter().enumerate() {
            let Some(seg1) = self.wall_segment(k1) else {
                continue;
            };
            for &(k2, s2, e2) in &walls[i + 1..] {
                if s1 == s2 || s1 == e2 || e1 == s2 || e1 == e2 {
                    continue;
                }
                let Some(seg2) = self.wall_segment(k2) else {
                    continue;
                };
                let Some(hit) = segment_intersection(&seg1, &seg2) else {
                    continue;
                };

                let interior_1 = (hit.point - seg1.a).norm() > tolerance
                    && (hit.point - seg1.b).norm() > tolerance;
                let interior_2 = (hit.point - seg2.a).norm() > tolerance
                    && (hit.point - seg2.b).norm() > tolerance;
                // Touching at an endpoint is a T-junction, handled separately.
                if interior_1 && interior_2 {
                    return Some((k1, k2, hit.point));
                }
            }
        }
        None
    }

    /// Splits every wall that has a foreign node resting on its interior.
    ///
    /// Returns the number of splits performed.
    pub fn split_t_junctions(&mut self, tolerance: f64, max_iterations: usize) -> usize {
        let mut count = 0;
        for _ in 0..max_iterations {
            let Some((wall, node)) = self.find_t_junction(tolerance) else {
                break;
            };
            if self.split_wall(wall, node).is_none() {
                break;
            }
            count += 1;
        }
        count
    }

    fn find_t_junction(&self, tolerance: f64) -> Option<(WallKey, NodeKey)> {
        for (nk, node) in self.nodes.iter() {
            let p = nalgebra::Point2::new(node.x, node.y);
            for (wk, wall) in self.walls.iter() {
                if wall.has_endpoint(nk) {
                    continue;
                }
                let Some(seg) = self.wall_segment(wk) else {
                    continue;
                };
                if seg.distance_to(&p) > tolerance {
                    continue;
                }
                let along = seg.project(&p) * seg.length();
                if along > tolerance && along < seg.length() - tolerance {
                    return Some((wk, nk));
                }
            }
        }
        None
    }

    /// Collapses walls joining the same unordered node pair into one.
    ///
    /// The wall with the lowest slot survives. Items of the removed duplicates
    /// are carried over (mirrored when the duplicate runs the other way) and
    /// sorted out by the item refit at the end of normalization.
    pub fn merge_duplicate_walls(&mut self) -> usize {
        let mut first_by_pair: FxHashMap<(NodeKey, NodeKey), WallKey> = FxHashMap::default();
        let mut duplicates: Vec<(WallKey, WallKey)> = Vec::new();

        for (key, wall) in self.walls.iter() {
            let pair = ordered_pair(wall.start, wall.end);
            match first_by_pair.get(&pair) {
                Some(&keep) => duplicates.push((keep, key)),
                None => {
                    first_by_pair.insert(pair, key);
                }
            }
        }

        for &(keep, dup) in &duplicates {
            let length = self.wall_length(keep).unwrap_or(0.0);
            let keep_start = self.walls[keep].start;
            let Some(removed) = self.remove_wall(dup) else {
                continue;
            };
            let reversed = removed.start != keep_start;
            let survivor = &mut self.walls[keep];
            survivor.items.extend(removed.items.into_iter().map(|item| {
                if reversed {
                    WallItem {
                        pos: length - item.pos,
                        ..item
                    }
                } else {
                    item
                }
            }));
            survivor.sort_items();
        }

        duplicates.len()
    }

    /// Replaces pairs of collinear walls meeting at a degree-2 node with one
    /// wall, deleting the middle node.
    ///
    /// The lower-slot wall's thickness and kind are kept. Items are re-based
    /// onto the merged wall, measured from its new start node.
    pub fn merge_collinear_chains(&mut self, epsilon: f64, max_iterations: usize) -> usize {
        let mut count = 0;
        for _ in 0..max_iterations {
            let Some((node, w1, w2)) = self.find_collinear_joint(epsilon) else {
                break;
            };
            if !self.merge_at_joint(node, w1, w2) {
                break;
            }
            count += 1;
        }
        count
    }

    fn find_collinear_joint(&self, epsilon: f64) -> Option<(NodeKey, WallKey, WallKey)> {
        for (nk, node) in self.nodes.iter() {
            let [w1, w2] = self.walls_at(nk) else {
                continue;
            };
            let (w1, w2) = if w1 < w2 { (*w1, *w2) } else { (*w2, *w1) };
            let (Some(a), Some(b)) = (self.other_end(w1, nk), self.other_end(w2, nk)) else {
                continue;
            };
            if a == b {
                continue;
            }
            let (Some(pa), Some(pb)) = (self.node_point(a), self.node_point(b)) else {
                continue;
            };
            let here = nalgebra::Point2::new(node.x, node.y);
            let (da, db) = (pa - here, pb - here);
            // Opposite directions only; folding back is not a straight chain.
            if da.dot(&db) < 0.0 && are_collinear(&da, &db, epsilon) {
                return Some((nk, w1, w2));
            }
        }
        None
    }

    fn merge_at_joint(&mut self, node: NodeKey, w1: WallKey, w2: WallKey) -> bool {
        let (Some(a), Some(b)) = (self.other_end(w1, node), self.other_end(w2, node)) else {
            return false;
        };
        let (Some(len1), Some(len2)) = (self.wall_length(w1), self.wall_length(w2)) else {
            return false;
        };
        let (Some(first), Some(second)) = (self.remove_wall(w1), self.remove_wall(w2)) else {
            return false;
        };

        // New wall runs a → node → b. Distances measured from `a`.
        let mut items: Vec<WallItem> = first
            .items
            .iter()
            .map(|item| {
                let pos = if first.start == a { item.pos } else { len1 - item.pos };
                WallItem { pos, ..*item }
            })
            .collect();
        items.extend(second.items.iter().map(|item| {
            let from_node = if second.start == node { item.pos } else { len2 - item.pos };
            WallItem {
                pos: len1 + from_node,
                ..*item
            }
        }));

        let Ok(merged) = self.add_wall(a, b, first.thickness, first.kind) else {
            return false;
        };
        let wall = &mut self.walls[merged];
        wall.items = items;
        wall.sort_items();

        self.node_to_walls.remove(&node);
        self.nodes.remove(node);
        true
    }

    /// Re-places the items of every wall.
    fn refit_all_items(&mut self, config: &PlanConfig) -> Refit {
        let keys: Vec<WallKey> = self.walls.keys().collect();
        let mut total = Refit::default();
        for key in keys {
            let Some(length) = self.wall_length(key) else {
                continue;
            };
            let wall = &mut self.walls[key];
            if wall.items.is_empty() {
                continue;
            }
            let outcome = refit(&mut wall.items, length, wall.thickness, &config.placement);
            total.dropped += outcome.dropped;
            total.adjusted += outcome.adjusted;
        }
        total
    }
}
