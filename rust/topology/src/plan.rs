// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A wall graph together with its detected rooms.

use crate::config::PlanConfig;
use crate::error::Result;
use crate::graph::WallGraph;
use crate::normalize::NormalizeReport;
use crate::rooms::{detect_rooms, Room, RoomHint};
use crate::serialization::PlanFile;

/// Normalized wall graph plus the rooms it encloses.
///
/// Outside of a [`FloorPlan::refresh`] call the graph is always normalized
/// and `rooms` always matches it.
#[derive(Debug, Clone, Default)]
pub struct FloorPlan {
    pub graph: WallGraph,
    pub rooms: Vec<Room>,
    pub config: PlanConfig,
}

impl FloorPlan {
    pub fn new(config: PlanConfig) -> Self {
        Self {
            graph: WallGraph::new(),
            rooms: Vec::new(),
            config,
        }
    }

    /// Loads a plan file, normalizes it and detects rooms, seeding room
    /// identity from the stored room records.
    pub fn from_plan(plan: &PlanFile, config: PlanConfig) -> Result<Self> {
        let graph = WallGraph::from_plan(plan, &config.topology)?;
        let mut floor = Self {
            graph,
            rooms: Vec::new(),
            config,
        };
        floor.refresh_with(&plan.room_hints());
        Ok(floor)
    }

    pub fn from_json(json: &str, config: PlanConfig) -> Result<Self> {
        Self::from_plan(&PlanFile::from_json(json)?, config)
    }

    /// Re-normalizes the graph and re-detects rooms, carrying names and
    /// label positions over from the current rooms.
    pub fn refresh(&mut self) -> NormalizeReport {
        let hints: Vec<RoomHint> = self.rooms.iter().map(Room::hint).collect();
        self.refresh_with(&hints)
    }

    fn refresh_with(&mut self, hints: &[RoomHint]) -> NormalizeReport {
        let report = self.graph.normalize(&self.config);
        self.rooms = detect_rooms(&self.graph, hints, &self.config.rooms);
        report
    }

    /// Total area of all rooms, in reporting units.
    pub fn total_area(&self) -> f64 {
        self.rooms.iter().map(|r| r.area).sum()
    }

    /// Captures the plan for undo.
    pub fn snapshot(&self) -> PlanFile {
        self.graph.to_plan(&self.rooms)
    }

    /// Replaces the plan with a previously captured snapshot.
    ///
    /// Node and wall keys handed out before the call are invalidated.
    pub fn restore(&mut self, snapshot: &PlanFile) -> Result<()> {
        let graph = WallGraph::from_plan(snapshot, &self.config.topology)?;
        self.graph = graph;
        self.refresh_with(&snapshot.room_hints());
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        self.snapshot().to_json()
    }
}
