// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Edit sessions: drawing, editing, undo and persistence.

use approx::assert_relative_eq;
use floorkit_editor::{EditError, EditSession, EditorConfig};
use floorkit_topology::{ItemKind, NodeKey, WallKey, WallKind};
use nalgebra::Point2;

fn p(x: f64, y: f64) -> Point2<f64> {
    Point2::new(x, y)
}

fn square_session() -> EditSession {
    let mut session = EditSession::default();
    let corners = [p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0), p(0.0, 100.0)];
    for i in 0..4 {
        assert!(session
            .draw_wall(corners[i], corners[(i + 1) % 4], WallKind::Normal)
            .unwrap());
    }
    session
}

fn node(session: &EditSession, x: f64, y: f64) -> NodeKey {
    session
        .graph()
        .find_node_near(&p(x, y), 1e-6)
        .expect("node exists")
}

fn wall(session: &EditSession, a: (f64, f64), b: (f64, f64)) -> WallKey {
    let graph = session.graph();
    graph
        .find_wall_between(node(session, a.0, a.1), node(session, b.0, b.1))
        .expect("wall exists")
}

#[test]
fn drawing_a_closed_square_makes_a_room() {
    let session = square_session();
    assert_eq!(session.graph().node_count(), 4);
    assert_eq!(session.graph().wall_count(), 4);
    assert_eq!(session.rooms().len(), 1);
    assert_relative_eq!(session.rooms()[0].area, 1.0);
    assert_eq!(session.undo_depth(), 4);
}

#[test]
fn degenerate_wall_is_refused_without_history() {
    let mut session = square_session();
    assert!(!session
        .draw_wall(p(0.1, 0.0), p(0.0, 0.2), WallKind::Normal)
        .unwrap());
    assert_eq!(session.undo_depth(), 4);
}

#[test]
fn undo_and_redo_walk_the_history() {
    let mut session = square_session();

    assert!(session.undo().unwrap());
    assert_eq!(session.graph().wall_count(), 3);
    assert!(session.rooms().is_empty());
    assert!(session.can_redo());

    assert!(session.redo().unwrap());
    assert_eq!(session.graph().wall_count(), 4);
    assert_eq!(session.rooms().len(), 1);

    // A new edit discards the redo branch.
    session.undo().unwrap();
    session
        .draw_wall(p(0.0, 100.0), p(0.0, 0.0), WallKind::Glass)
        .unwrap();
    assert!(!session.can_redo());
    assert!(!session.redo().unwrap());
}

#[test]
fn history_is_bounded() {
    let mut session = EditSession::new(EditorConfig {
        history_limit: 2,
        ..EditorConfig::default()
    });
    for x in [0.0, 100.0, 200.0] {
        session
            .draw_wall(p(x, 0.0), p(x + 100.0, 0.0), WallKind::Normal)
            .unwrap();
    }
    assert_eq!(session.undo_depth(), 2);
    assert!(session.undo().unwrap());
    assert!(session.undo().unwrap());
    assert!(!session.undo().unwrap());
}

#[test]
fn room_name_survives_node_moves_and_undo() {
    let mut session = square_session();
    session.rename_room(0, "Office").unwrap();

    let corner = node(&session, 100.0, 100.0);
    session.move_node(corner, p(130.0, 100.0)).unwrap();
    assert_eq!(session.rooms()[0].name, "Office");
    assert!(session.rooms()[0].area > 1.0);

    session.undo().unwrap();
    assert_eq!(session.rooms()[0].name, "Office");
    assert_relative_eq!(session.rooms()[0].area, 1.0);

    session.undo().unwrap();
    assert_eq!(session.rooms()[0].name, "Room");
}

#[test]
fn room_errors_leave_plan_untouched() {
    let mut session = square_session();
    let before = session.save().unwrap();

    assert!(matches!(
        session.rename_room(3, "Nope"),
        Err(EditError::RoomNotFound(3))
    ));
    assert!(matches!(
        session.move_room_label(0, p(150.0, 50.0)),
        Err(EditError::LabelOutsideRoom { room: 0, .. })
    ));
    assert_eq!(session.save().unwrap(), before);
    assert_eq!(session.undo_depth(), 4);

    session.move_room_label(0, p(20.0, 30.0)).unwrap();
    assert_relative_eq!(session.rooms()[0].center, p(20.0, 30.0), epsilon = 1e-9);
}

#[test]
fn failed_item_edits_keep_plan_keys_and_history() {
    let mut session = square_session();
    let bottom = wall(&session, (0.0, 0.0), (100.0, 0.0));
    session
        .place_item(bottom, ItemKind::Door, 50.0, 60.0, true)
        .unwrap()
        .expect("door fits");
    session.undo().unwrap();
    assert!(session.can_redo());

    // Undo rebuilt the graph, so look the wall up again.
    let bottom = wall(&session, (0.0, 0.0), (100.0, 0.0));
    let before = session.save().unwrap();
    let depth = session.undo_depth();

    assert!(matches!(
        session.remove_item(bottom, 0),
        Err(EditError::Topology(_))
    ));
    assert!(matches!(
        session.move_item(bottom, 2, 30.0),
        Err(EditError::Topology(_))
    ));
    assert!(session
        .place_item(bottom, ItemKind::Window, 50.0, 500.0, true)
        .unwrap()
        .is_none());

    assert_eq!(session.save().unwrap(), before);
    assert_eq!(session.undo_depth(), depth);
    assert!(session.can_redo());
    assert!(session.graph().contains_wall(bottom));
    session
        .place_item(bottom, ItemKind::Window, 50.0, 40.0, true)
        .unwrap()
        .expect("window fits");
}

#[test]
fn items_follow_their_wall_when_a_node_moves() {
    let mut session = square_session();
    let bottom = wall(&session, (0.0, 0.0), (100.0, 0.0));

    let door = session
        .place_item(bottom, ItemKind::Door, 50.0, 60.0, true)
        .unwrap()
        .expect("door fits");
    assert_relative_eq!(door.pos, 50.0);

    // Too wide for what is left of the wall.
    let depth = session.undo_depth();
    assert!(session
        .place_item(bottom, ItemKind::Window, 80.0, 70.0, true)
        .unwrap()
        .is_none());
    assert_eq!(session.undo_depth(), depth);

    let far = node(&session, 100.0, 0.0);
    session.move_node(far, p(200.0, 0.0)).unwrap();

    let bottom = wall(&session, (0.0, 0.0), (200.0, 0.0));
    let items = &session.graph().wall(bottom).unwrap().items;
    assert_eq!(items.len(), 1);
    assert_relative_eq!(items[0].pos, 50.0);

    let removed = session.remove_item(bottom, 0).unwrap();
    assert_eq!(removed.kind, ItemKind::Door);
    assert!(matches!(
        session.remove_item(bottom, 0),
        Err(EditError::Topology(_))
    ));
}

#[test]
fn thickness_and_kind_edits() {
    let mut session = square_session();
    let left = wall(&session, (0.0, 100.0), (0.0, 0.0));

    session.set_wall_kind(left, WallKind::Balcony).unwrap();
    assert_eq!(session.graph().wall(left).unwrap().kind, WallKind::Balcony);

    assert_eq!(session.set_wall_thickness(left, 0.0).unwrap(), None);
    assert_eq!(session.set_wall_thickness(left, 20.0).unwrap(), Some(0));
    assert_eq!(session.graph().wall(left).unwrap().thickness, 20.0);
}

#[test]
fn save_and_load_round_trip() {
    let mut session = square_session();
    session.rename_room(0, "Hall").unwrap();
    let json = session.save().unwrap();

    let mut reloaded = EditSession::default();
    reloaded.load(&json).unwrap();
    assert_eq!(reloaded.rooms()[0].name, "Hall");
    assert!(!reloaded.can_undo());
    assert_eq!(reloaded.save().unwrap(), json);

    assert!(reloaded.load("not json").is_err());
    assert_eq!(reloaded.save().unwrap(), json);
}

#[test]
fn session_snaps_to_existing_corners() {
    let mut session = square_session();
    let result = session.snap(p(97.0, 103.0));
    assert!(result.snapped);
    assert_eq!(result.position, p(100.0, 100.0));
}
