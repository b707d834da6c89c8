// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial index for tolerance-based node lookup and merging.
//!
//! Uses a grid-based spatial hash for O(1) average-case nearest-node queries.
//! This backs node unification, where nodes within the merge tolerance are
//! identified as the same point.

use rustc_hash::FxHashMap;

use crate::graph::WallGraph;
use crate::keys::NodeKey;

/// A spatial hash grid for fast tolerance-based node lookup.
///
/// The grid divides the plane into square cells of side `cell_size`. Lookups
/// check the 3x3 neighborhood of cells for candidates within tolerance.
#[derive(Debug)]
pub struct SpatialIndex {
    cell_size: f64,
    grid: FxHashMap<(i64, i64), Vec<(NodeKey, f64, f64)>>,
}

impl SpatialIndex {
    /// Creates a new spatial index with the given cell size.
    ///
    /// `cell_size` should be >= the tolerance used for queries.
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size: cell_size.max(1e-10),
            grid: FxHashMap::default(),
        }
    }

    /// Builds a spatial index from all nodes in a graph.
    pub fn from_graph(graph: &WallGraph, cell_size: f64) -> Self {
        let mut index = Self::new(cell_size);
        for (key, node) in graph.nodes() {
            index.insert(key, node.x, node.y);
        }
        index
    }

    /// Inserts a node key at the given coordinates.
    pub fn insert(&mut self, key: NodeKey, x: f64, y: f64) {
        let cell = self.cell_coords(x, y);
        self.grid.entry(cell).or_default().push((key, x, y));
    }

    /// Finds the nearest indexed node within `tolerance` of `(x, y)`.
    ///
    /// Equal distances resolve to the smaller key, so the answer does not
    /// depend on hash iteration order. The tolerance should be <= `cell_size`.
    pub fn find_near(&self, x: f64, y: f64, tolerance: f64) -> Option<NodeKey> {
        let (cx, cy) = self.cell_coords(x, y);
        let tol_sq = tolerance * tolerance;
        let mut best: Option<(f64, NodeKey)> = None;

        // Search 3x3 neighborhood
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(entries) = self.grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &(key, nx, ny) in entries {
                    let dist_sq = (nx - x).powi(2) + (ny - y).powi(2);
                    if dist_sq > tol_sq {
                        continue;
                    }
                    let better = match best {
                        None => true,
                        Some((d, k)) => dist_sq < d || (dist_sq == d && key < k),
                    };
                    if better {
                        best = Some((dist_sq, key));
                    }
                }
            }
        }

        best.map(|(_, key)| key)
    }

    fn cell_coords(&self, x: f64, y: f64) -> (i64, i64) {
        (
            (x / self.cell_size).floor() as i64,
            (y / self.cell_size).floor() as i64,
        )
    }
}

impl WallGraph {
    /// Collapses every node within `tolerance` of an earlier node into it.
    ///
    /// Nodes are visited in slot order; each one either joins the nearest
    /// surviving node within tolerance or becomes a survivor itself. Wall
    /// endpoints are repointed through [`WallGraph::merge_nodes`].
    ///
    /// Returns the number of nodes removed.
    pub fn unify_nodes(&mut self, tolerance: f64) -> usize {
        let mut survivors = SpatialIndex::new(tolerance);
        let mut merged = 0;

        let keys: Vec<NodeKey> = self.nodes.keys().collect();
        for key in keys {
            let Some(node) = self.nodes.get(key).copied() else {
                continue;
            };
            match survivors.find_near(node.x, node.y, tolerance) {
                Some(keep) if self.merge_nodes(keep, key).is_ok() => merged += 1,
                _ => survivors.insert(key, node.x, node.y),
            }
        }

        merged
    }
}
