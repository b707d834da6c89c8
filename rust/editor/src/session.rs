// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edit operations with undo history.
//!
//! An [`EditSession`] is the single writer of a [`FloorPlan`]. Every
//! operation validates its input, mutates the graph, then normalizes and
//! re-detects rooms before returning. An operation that fails or is refused
//! leaves the plan and the history as they were.
//!
//! Undo restores a [`PlanFile`] snapshot, which rebuilds the graph: node and
//! wall keys obtained before an undo or redo are stale afterwards.

use std::collections::VecDeque;

use floorkit_topology::{
    Error, FloorPlan, ItemKind, NodeKey, PlacementRequest, PlanFile, ResizeAnchor, Room, WallGraph,
    WallItem, WallKey, WallKind,
};
use nalgebra::Point2;

use crate::config::EditorConfig;
use crate::error::{EditError, Result};
use crate::snap::{EditMode, SnapEngine, SnapResult};

#[derive(Debug, Clone)]
pub struct EditSession {
    plan: FloorPlan,
    snap: SnapEngine,
    mode: EditMode,
    undo: VecDeque<PlanFile>,
    redo: Vec<PlanFile>,
    history_limit: usize,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditSession {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            plan: FloorPlan::new(config.plan),
            snap: SnapEngine::new(config.snap),
            mode: EditMode::Idle,
            undo: VecDeque::new(),
            redo: Vec::new(),
            history_limit: config.history_limit,
        }
    }

    // --- Read access for the renderer ---

    pub fn plan(&self) -> &FloorPlan {
        &self.plan
    }

    pub fn graph(&self) -> &WallGraph {
        &self.plan.graph
    }

    pub fn rooms(&self) -> &[Room] {
        &self.plan.rooms
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn snap_engine(&self) -> &SnapEngine {
        &self.snap
    }

    pub fn snap_engine_mut(&mut self) -> &mut SnapEngine {
        &mut self.snap
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Number of operations that can be undone.
    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    // --- Pointer interaction ---

    /// Enters `mode` with a drag starting at `origin`.
    pub fn begin_drag(&mut self, mode: EditMode, origin: Point2<f64>) {
        self.mode = mode;
        self.snap.begin_drag(origin);
    }

    pub fn end_drag(&mut self) {
        self.mode = EditMode::Idle;
        self.snap.end_drag();
    }

    pub fn set_mode(&mut self, mode: EditMode) {
        self.mode = mode;
    }

    pub fn snap(&mut self, raw: Point2<f64>) -> SnapResult {
        self.snap.snap(&self.plan.graph, raw, self.mode)
    }

    // --- Walls and nodes ---

    /// Draws a wall between two points, reusing nodes within the merge
    /// tolerance. Returns `false` when both ends land on the same node.
    pub fn draw_wall(&mut self, start: Point2<f64>, end: Point2<f64>, kind: WallKind) -> Result<bool> {
        let tolerance = self.plan.config.topology.merge_tolerance;
        let thickness = self.plan.config.topology.default_thickness;

        let graph = &self.plan.graph;
        if (end - start).norm() <= tolerance {
            return Ok(false);
        }
        if let (Some(a), Some(b)) = (
            graph.find_node_near(&start, tolerance),
            graph.find_node_near(&end, tolerance),
        ) {
            if a == b {
                return Ok(false);
            }
        }

        self.edit("draw_wall", |plan| {
            let a = plan.graph.node_at_or_insert(&start, tolerance);
            let b = plan.graph.node_at_or_insert(&end, tolerance);
            plan.graph.add_wall(a, b, thickness, kind)?;
            Ok(Some(true))
        })
        .map(|drawn| drawn.unwrap_or(false))
    }

    /// Moves a node. Items on its walls keep their distance from the far end.
    pub fn move_node(&mut self, node: NodeKey, to: Point2<f64>) -> Result<()> {
        if !self.plan.graph.contains_node(node) {
            return Err(Error::NodeNotFound(node).into());
        }

        self.edit("move_node", |plan| {
            let placement = &plan.config.placement;
            let graph = &mut plan.graph;
            let incident: Vec<(WallKey, f64, ResizeAnchor)> = graph
                .walls_at(node)
                .iter()
                .filter_map(|&w| {
                    let wall = graph.wall(w)?;
                    let anchor = if wall.start == node {
                        ResizeAnchor::End
                    } else {
                        ResizeAnchor::Start
                    };
                    Some((w, graph.wall_length(w)?, anchor))
                })
                .collect();

            graph.move_node(node, to.x, to.y)?;
            for (wall, old_length, anchor) in incident {
                let dropped = graph.resize_wall_items(wall, old_length, anchor, placement)?;
                if dropped > 0 {
                    tracing::debug!(?wall, dropped, "items dropped by node move");
                }
            }
            Ok(Some(()))
        })
        .map(|_| ())
    }

    pub fn delete_wall(&mut self, wall: WallKey) -> Result<()> {
        if !self.plan.graph.contains_wall(wall) {
            return Err(Error::WallNotFound(wall).into());
        }
        self.edit("delete_wall", |plan| {
            plan.graph.remove_wall(wall);
            Ok(Some(()))
        })
        .map(|_| ())
    }

    /// Deletes a node and every wall attached to it.
    pub fn delete_node(&mut self, node: NodeKey) -> Result<()> {
        if !self.plan.graph.contains_node(node) {
            return Err(Error::NodeNotFound(node).into());
        }
        self.edit("delete_node", |plan| {
            plan.graph.remove_node(node);
            Ok(Some(()))
        })
        .map(|_| ())
    }

    pub fn set_wall_kind(&mut self, wall: WallKey, kind: WallKind) -> Result<()> {
        if !self.plan.graph.contains_wall(wall) {
            return Err(Error::WallNotFound(wall).into());
        }
        self.edit("set_wall_kind", |plan| {
            plan.graph.set_wall_kind(wall, kind)?;
            Ok(Some(()))
        })
        .map(|_| ())
    }

    /// Changes a wall's thickness. Returns `None` for a non-positive
    /// thickness, otherwise the number of items that no longer fit.
    pub fn set_wall_thickness(&mut self, wall: WallKey, thickness: f64) -> Result<Option<usize>> {
        if !self.plan.graph.contains_wall(wall) {
            return Err(Error::WallNotFound(wall).into());
        }
        if !(thickness > 0.0 && thickness.is_finite()) {
            return Ok(None);
        }
        self.edit("set_wall_thickness", |plan| {
            Ok(plan
                .graph
                .set_wall_thickness(wall, thickness, &plan.config.placement)?)
        })
    }

    // --- Doors, windows, vents ---

    /// Places an item near `pos` on a wall. Returns `None` if it does not fit.
    pub fn place_item(
        &mut self,
        wall: WallKey,
        kind: ItemKind,
        pos: f64,
        width: f64,
        fixed_width: bool,
    ) -> Result<Option<WallItem>> {
        let request = PlacementRequest {
            pos,
            width,
            fixed_width,
        };
        self.edit("place_item", |plan| {
            Ok(plan
                .graph
                .place_item(wall, kind, &request, &plan.config.placement)?)
        })
    }

    /// Drags an item along its wall. Returns `None` and leaves it in place if
    /// it cannot go near `pos`.
    pub fn move_item(&mut self, wall: WallKey, index: usize, pos: f64) -> Result<Option<WallItem>> {
        self.edit("move_item", |plan| {
            Ok(plan
                .graph
                .move_item(wall, index, pos, &plan.config.placement)?)
        })
    }

    pub fn remove_item(&mut self, wall: WallKey, index: usize) -> Result<WallItem> {
        let removed = self.edit("remove_item", |plan| Ok(Some(plan.graph.remove_item(wall, index)?)))?;
        removed.ok_or(EditError::Topology(Error::ItemNotFound { wall, index }))
    }

    // --- Rooms ---

    pub fn rename_room(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        if index >= self.plan.rooms.len() {
            return Err(EditError::RoomNotFound(index));
        }
        let name = name.into();
        self.edit("rename_room", |plan| {
            plan.rooms[index].name = name;
            Ok(Some(()))
        })
        .map(|_| ())
    }

    /// Moves a room's label; the new position must lie inside the room.
    pub fn move_room_label(&mut self, index: usize, to: Point2<f64>) -> Result<()> {
        let room = self
            .plan
            .rooms
            .get(index)
            .ok_or(EditError::RoomNotFound(index))?;
        if !floorkit_topology::polygon::contains(&room.polygon, &to) {
            return Err(EditError::LabelOutsideRoom {
                room: index,
                x: to.x,
                y: to.y,
            });
        }
        self.edit("move_room_label", |plan| {
            plan.rooms[index].set_center(to);
            Ok(Some(()))
        })
        .map(|_| ())
    }

    // --- History ---

    /// Reverts the last operation. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        let Some(previous) = self.undo.pop_back() else {
            return Ok(false);
        };
        let current = self.plan.snapshot();
        if let Err(e) = self.plan.restore(&previous) {
            self.undo.push_back(previous);
            return Err(e.into());
        }
        self.redo.push(current);
        self.snap.end_drag();
        self.mode = EditMode::Idle;
        tracing::debug!(undo = self.undo.len(), redo = self.redo.len(), "undo");
        Ok(true)
    }

    /// Re-applies the last undone operation.
    pub fn redo(&mut self) -> Result<bool> {
        let Some(next) = self.redo.pop() else {
            return Ok(false);
        };
        let current = self.plan.snapshot();
        if let Err(e) = self.plan.restore(&next) {
            self.redo.push(next);
            return Err(e.into());
        }
        self.push_undo(current);
        self.snap.end_drag();
        self.mode = EditMode::Idle;
        tracing::debug!(undo = self.undo.len(), redo = self.redo.len(), "redo");
        Ok(true)
    }

    // --- Persistence ---

    /// Replaces the plan with one loaded from JSON and clears the history.
    pub fn load(&mut self, json: &str) -> Result<()> {
        let plan = FloorPlan::from_json(json, self.plan.config.clone())?;
        self.plan = plan;
        self.undo.clear();
        self.redo.clear();
        self.end_drag();
        tracing::info!(
            nodes = self.plan.graph.node_count(),
            walls = self.plan.graph.wall_count(),
            rooms = self.plan.rooms.len(),
            "plan loaded"
        );
        Ok(())
    }

    pub fn save(&self) -> Result<String> {
        Ok(self.plan.to_json()?)
    }

    // --- Internals ---

    /// Runs `op` and commits it if it returned `Some`.
    ///
    /// On commit the plan is normalized and its rooms re-detected, and the
    /// state before `op` becomes the newest undo step. If `op` fails or
    /// refuses, the plan is put back as it was, keys included.
    fn edit<T>(
        &mut self,
        name: &'static str,
        op: impl FnOnce(&mut FloorPlan) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let before = self.plan.clone();
        let value = match op(&mut self.plan) {
            Ok(Some(value)) => value,
            Ok(None) => {
                self.plan = before;
                return Ok(None);
            }
            Err(e) => {
                self.plan = before;
                tracing::debug!(op = name, error = %e, "edit rolled back");
                return Err(e);
            }
        };

        let report = self.plan.refresh();
        self.push_undo(before.snapshot());
        self.redo.clear();
        tracing::debug!(
            op = name,
            ?report,
            rooms = self.plan.rooms.len(),
            undo = self.undo.len(),
            "edit committed"
        );
        Ok(Some(value))
    }

    fn push_undo(&mut self, snapshot: PlanFile) {
        if self.history_limit == 0 {
            return;
        }
        while self.undo.len() >= self.history_limit {
            self.undo.pop_front();
        }
        self.undo.push_back(snapshot);
    }
}
