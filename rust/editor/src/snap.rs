// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Pointer snapping against the wall graph.
//!
//! Candidates are wall endpoints, wall midpoints and caller-supplied feature
//! points (columns, stairs). In nearest-only mode the closest candidate wins.
//! Otherwise the X and Y coordinates are searched independently, so the
//! pointer can align with one candidate horizontally and another vertically.
//! Radii are given in screen pixels and converted with the current zoom.
//!
//! During a drag the first snapped result is locked in and returned as is
//! until the pointer leaves its neighbourhood, so equal-distance candidates
//! cannot make the cursor flicker.

use std::ops::{BitOr, BitOrAssign};

use floorkit_topology::{NodeKey, WallGraph, WallKey};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// What a snapped position is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapKind {
    Endpoint,
    Midpoint,
    /// Aligned with a candidate along one axis.
    Extension,
    Grid,
    /// Aligned with two different candidates, one per axis.
    Intersection,
}

/// Enabled snap categories as a bit set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapMask {
    bits: u16,
}

impl SnapMask {
    pub const NONE: SnapMask = SnapMask { bits: 0 };
    pub const ENDPOINT: SnapMask = SnapMask { bits: 1 << 0 };
    pub const MIDPOINT: SnapMask = SnapMask { bits: 1 << 1 };
    pub const ENDPOINT_EXTENSION: SnapMask = SnapMask { bits: 1 << 2 };
    pub const MIDPOINT_EXTENSION: SnapMask = SnapMask { bits: 1 << 3 };
    pub const NEAREST_ONLY: SnapMask = SnapMask { bits: 1 << 4 };
    pub const GRID: SnapMask = SnapMask { bits: 1 << 5 };

    pub fn bits(&self) -> u16 {
        self.bits
    }

    pub fn contains(&self, other: SnapMask) -> bool {
        self.bits & other.bits == other.bits
    }

    pub fn set(&mut self, other: SnapMask, enabled: bool) {
        if enabled {
            self.bits |= other.bits;
        } else {
            self.bits &= !other.bits;
        }
    }

    pub fn toggle(&mut self, other: SnapMask) {
        self.bits ^= other.bits;
    }
}

impl Default for SnapMask {
    fn default() -> Self {
        Self::ENDPOINT | Self::MIDPOINT | Self::ENDPOINT_EXTENSION | Self::MIDPOINT_EXTENSION
    }
}

impl BitOr for SnapMask {
    type Output = SnapMask;

    fn bitor(self, rhs: SnapMask) -> SnapMask {
        SnapMask {
            bits: self.bits | rhs.bits,
        }
    }
}

impl BitOrAssign for SnapMask {
    fn bitor_assign(&mut self, rhs: SnapMask) {
        self.bits |= rhs.bits;
    }
}

/// Snap radii and categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    pub mask: SnapMask,
    /// Search radius for nearest-only snapping, in pixels.
    pub snap_radius_px: f64,
    /// Search radius for axis alignment, in pixels.
    pub extension_radius_px: f64,
    /// Pointer travel that engages and releases the drag lock, in pixels.
    pub unlock_distance_px: f64,
    /// Grid spacing in plan units.
    pub grid: f64,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            mask: SnapMask::default(),
            snap_radius_px: 15.0,
            extension_radius_px: 8.0,
            unlock_distance_px: 10.0,
            grid: 10.0,
        }
    }
}

/// The gesture in progress; decides which candidates are excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditMode {
    #[default]
    Idle,
    DrawWall,
    /// The node and the midpoints of its walls move with the pointer.
    DragNode(NodeKey),
    /// Both endpoints of the wall and every midpoint attached to them move.
    DragWall(WallKey),
    PlaceItem,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapResult {
    pub position: Point2<f64>,
    pub snapped: bool,
    pub kind: Option<SnapKind>,
    /// Candidates the position is aligned with, for drawing guide lines.
    pub alignment_origins: Vec<Point2<f64>>,
}

impl SnapResult {
    fn unsnapped(raw: Point2<f64>) -> Self {
        Self {
            position: raw,
            snapped: false,
            kind: None,
            alignment_origins: Vec::new(),
        }
    }

    fn at(position: Point2<f64>, kind: SnapKind, origins: Vec<Point2<f64>>) -> Self {
        Self {
            position,
            snapped: true,
            kind: Some(kind),
            alignment_origins: origins,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    point: Point2<f64>,
    kind: SnapKind,
}

#[derive(Debug, Clone)]
struct DragLock {
    /// Pointer position when the lock engaged.
    anchor: Point2<f64>,
    result: SnapResult,
}

/// Resolves raw pointer positions to snapped positions.
#[derive(Debug, Clone)]
pub struct SnapEngine {
    config: SnapConfig,
    zoom: f64,
    drag_origin: Option<Point2<f64>>,
    lock: Option<DragLock>,
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(SnapConfig::default())
    }
}

impl SnapEngine {
    pub fn new(config: SnapConfig) -> Self {
        Self {
            config,
            zoom: 1.0,
            drag_origin: None,
            lock: None,
        }
    }

    pub fn config(&self) -> &SnapConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut SnapConfig {
        &mut self.config
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Sets pixels per plan unit. Non-positive values are ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom;
        }
    }

    /// Starts a drag at `origin`, clearing any previous lock.
    pub fn begin_drag(&mut self, origin: Point2<f64>) {
        self.drag_origin = Some(origin);
        self.lock = None;
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
        self.lock = None;
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn snap(&mut self, graph: &WallGraph, raw: Point2<f64>, mode: EditMode) -> SnapResult {
        self.snap_with_features(graph, raw, mode, &[])
    }

    /// Snaps against the graph plus extra feature points.
    ///
    /// Feature points snap like endpoints and come last in tie-breaking.
    pub fn snap_with_features(
        &mut self,
        graph: &WallGraph,
        raw: Point2<f64>,
        mode: EditMode,
        features: &[Point2<f64>],
    ) -> SnapResult {
        let Some(origin) = self.drag_origin else {
            return self.resolve(graph, raw, mode, features);
        };
        let unlock = self.config.unlock_distance_px / self.zoom;

        if let Some(lock) = &self.lock {
            if (raw - lock.anchor).norm() <= unlock {
                return lock.result.clone();
            }
            tracing::trace!(x = raw.x, y = raw.y, "snap lock released");
            self.lock = None;
        }

        let result = self.resolve(graph, raw, mode, features);
        let lockable = result.snapped && result.kind != Some(SnapKind::Grid);
        if lockable && (raw - origin).norm() > unlock {
            tracing::trace!(kind = ?result.kind, "snap locked");
            self.lock = Some(DragLock {
                anchor: raw,
                result: result.clone(),
            });
        }
        result
    }

    fn resolve(
        &self,
        graph: &WallGraph,
        raw: Point2<f64>,
        mode: EditMode,
        features: &[Point2<f64>],
    ) -> SnapResult {
        let mask = self.config.mask;
        let candidates = collect_candidates(graph, mode, features);

        let snapped = if mask.contains(SnapMask::NEAREST_ONLY) {
            self.nearest(&candidates, raw)
        } else {
            self.aligned(&candidates, raw)
        };
        if let Some(result) = snapped {
            return result;
        }

        if mask.contains(SnapMask::GRID) && self.config.grid > 0.0 {
            let g = self.config.grid;
            let position = Point2::new((raw.x / g).round() * g, (raw.y / g).round() * g);
            return SnapResult::at(position, SnapKind::Grid, Vec::new());
        }

        SnapResult::unsnapped(raw)
    }

    fn nearest(&self, candidates: &[Candidate], raw: Point2<f64>) -> Option<SnapResult> {
        let radius = self.config.snap_radius_px / self.zoom;
        let mask = self.config.mask;
        candidates
            .iter()
            .filter(|c| match c.kind {
                SnapKind::Midpoint => mask.contains(SnapMask::MIDPOINT),
                _ => mask.contains(SnapMask::ENDPOINT),
            })
            .map(|c| (c, (c.point - raw).norm()))
            .filter(|(_, d)| *d <= radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| SnapResult::at(c.point, c.kind, vec![c.point]))
    }

    fn aligned(&self, candidates: &[Candidate], raw: Point2<f64>) -> Option<SnapResult> {
        let radius = self.config.extension_radius_px / self.zoom;
        let mask = self.config.mask;
        let enabled: Vec<&Candidate> = candidates
            .iter()
            .filter(|c| match c.kind {
                SnapKind::Midpoint => mask.contains(SnapMask::MIDPOINT_EXTENSION),
                _ => mask.contains(SnapMask::ENDPOINT_EXTENSION),
            })
            .collect();

        // A candidate close on both axes is a direct hit.
        let direct = enabled
            .iter()
            .filter(|c| (c.point.x - raw.x).abs() <= radius && (c.point.y - raw.y).abs() <= radius)
            .min_by(|a, b| (a.point - raw).norm().total_cmp(&(b.point - raw).norm()));
        if let Some(c) = direct {
            return Some(SnapResult::at(c.point, c.kind, vec![c.point]));
        }

        let best_on = |axis: fn(&Point2<f64>) -> f64| {
            enabled
                .iter()
                .map(|c| (*c, (axis(&c.point) - axis(&raw)).abs()))
                .filter(|(_, d)| *d <= radius)
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(c, _)| *c)
        };
        let best_x = best_on(|p: &Point2<f64>| p.x);
        let best_y = best_on(|p: &Point2<f64>| p.y);

        match (best_x, best_y) {
            (Some(cx), Some(cy)) => Some(SnapResult::at(
                Point2::new(cx.point.x, cy.point.y),
                SnapKind::Intersection,
                vec![cx.point, cy.point],
            )),
            (Some(cx), None) => Some(SnapResult::at(
                Point2::new(cx.point.x, raw.y),
                SnapKind::Extension,
                vec![cx.point],
            )),
            (None, Some(cy)) => Some(SnapResult::at(
                Point2::new(raw.x, cy.point.y),
                SnapKind::Extension,
                vec![cy.point],
            )),
            (None, None) => None,
        }
    }
}

/// Candidates in tie-break order: endpoints by node slot, then midpoints by
/// wall slot, then feature points.
fn collect_candidates(graph: &WallGraph, mode: EditMode, features: &[Point2<f64>]) -> Vec<Candidate> {
    let moving_nodes: Vec<NodeKey> = match mode {
        EditMode::DragNode(node) => vec![node],
        EditMode::DragWall(wall) => graph
            .wall(wall)
            .map(|w| vec![w.start, w.end])
            .unwrap_or_default(),
        _ => Vec::new(),
    };

    let mut candidates = Vec::with_capacity(graph.node_count() + graph.wall_count() + features.len());
    for (key, node) in graph.nodes() {
        if !moving_nodes.contains(&key) {
            candidates.push(Candidate {
                point: Point2::new(node.x, node.y),
                kind: SnapKind::Endpoint,
            });
        }
    }
    for (key, wall) in graph.walls() {
        if moving_nodes.iter().any(|n| wall.has_endpoint(*n)) {
            continue;
        }
        if let Some(segment) = graph.wall_segment(key) {
            candidates.push(Candidate {
                point: segment.midpoint(),
                kind: SnapKind::Midpoint,
            });
        }
    }
    candidates.extend(features.iter().map(|&point| Candidate {
        point,
        kind: SnapKind::Endpoint,
    }));
    candidates
}
