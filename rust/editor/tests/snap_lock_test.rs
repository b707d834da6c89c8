// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drag locking keeps the snapped position stable.

use floorkit_editor::{EditMode, SnapConfig, SnapEngine, SnapKind};
use floorkit_topology::{WallGraph, WallKind};
use nalgebra::Point2;

fn corner() -> WallGraph {
    let mut graph = WallGraph::new();
    let a = graph.add_node(0.0, 0.0);
    let b = graph.add_node(100.0, 0.0);
    let c = graph.add_node(100.0, 100.0);
    graph.add_wall(a, b, 10.0, WallKind::Normal).unwrap();
    graph.add_wall(b, c, 10.0, WallKind::Normal).unwrap();
    graph
}

fn engine() -> SnapEngine {
    SnapEngine::new(SnapConfig {
        unlock_distance_px: 20.0,
        ..SnapConfig::default()
    })
}

#[test]
fn locked_result_is_returned_verbatim() {
    let graph = corner();
    let mut engine = engine();
    engine.begin_drag(Point2::new(50.0, 50.0));

    let first = engine.snap(&graph, Point2::new(97.0, 52.0), EditMode::DrawWall);
    assert_eq!(first.kind, Some(SnapKind::Midpoint));
    assert_eq!(first.position, Point2::new(100.0, 50.0));
    assert!(engine.is_locked());

    for raw in [
        Point2::new(99.0, 55.0),
        Point2::new(94.0, 48.0),
        Point2::new(97.0, 62.0),
    ] {
        assert_eq!(engine.snap(&graph, raw, EditMode::DrawWall), first);
    }

    // Without the lock the last position would align with the corner instead.
    let fresh = self::engine().snap(&graph, Point2::new(97.0, 62.0), EditMode::DrawWall);
    assert_eq!(fresh.kind, Some(SnapKind::Extension));
    assert_ne!(fresh, first);
}

#[test]
fn lock_releases_beyond_unlock_distance() {
    let graph = corner();
    let mut engine = engine();
    engine.begin_drag(Point2::new(50.0, 50.0));

    let first = engine.snap(&graph, Point2::new(97.0, 52.0), EditMode::DrawWall);
    let moved = engine.snap(&graph, Point2::new(120.0, 52.0), EditMode::DrawWall);

    assert_ne!(moved, first);
    assert_eq!(moved.kind, Some(SnapKind::Extension));
    assert_eq!(moved.position, Point2::new(120.0, 50.0));
}

#[test]
fn no_lock_near_drag_origin_or_outside_a_drag() {
    let graph = corner();
    let mut engine = engine();

    engine.snap(&graph, Point2::new(97.0, 52.0), EditMode::Idle);
    assert!(!engine.is_locked());

    engine.begin_drag(Point2::new(95.0, 50.0));
    engine.snap(&graph, Point2::new(97.0, 52.0), EditMode::DrawWall);
    assert!(!engine.is_locked());

    engine.end_drag();
    assert!(!engine.is_locked());
}
