//! End-to-end editing scenarios.

mod common;

use cardsmith_core::config::HistoryConfig;
use cardsmith_core::factory::{self, ShapeRecipe};
use cardsmith_core::objects::{Axis, Geometry, PhotoShape, TextContent};
use cardsmith_core::{
    CardDocument, DesignObject, EditorError, HistoryManager, ManualClock, ObjectKind, Role, Side,
    Surface,
};
use common::{config_for, controller, rect};
use kurbo::{Point, Size};
use std::sync::Arc;

#[test]
fn grid_snap_rounds_drag_position() {
    let (mut ctl, _) = controller(400.0, 300.0);
    ctl.config_mut().grid.enabled = true;
    ctl.config_mut().grid.cell_size = 10.0;
    let id = ctl.add_object(rect(0.0, 0.0, 20.0, 20.0)).unwrap();
    ctl.select(id).unwrap();

    ctl.drag_move(id, Point::new(103.0, 207.0)).unwrap();
    ctl.end_drag(id).unwrap();

    assert_eq!(ctl.get(id).unwrap().geometry.position(), Point::new(100.0, 210.0));
}

#[test]
fn left_edge_aligns_to_neighbour_right_edge() {
    let (mut ctl, _) = controller(300.0, 200.0);
    ctl.add_object(rect(50.0, 0.0, 100.0, 20.0)).unwrap();
    let b = ctl.add_object(rect(0.0, 120.0, 40.0, 30.0)).unwrap();
    ctl.select(b).unwrap();

    let outcome = ctl.drag_move(b, Point::new(148.0, 120.0)).unwrap();
    assert!((ctl.get(b).unwrap().geometry.left - 150.0).abs() < f64::EPSILON);
    assert!(outcome.matches.iter().any(|m| m.axis == Axis::Vertical));

    let guides = ctl
        .surface()
        .scene
        .query_all(|o| o.role == Role::Guideline { axis: Axis::Vertical });
    assert_eq!(guides.len(), 1);
    assert!((guides[0].geometry.left - 150.0).abs() < f64::EPSILON);

    ctl.end_drag(b).unwrap();
    assert!(ctl.surface().scene.query_all(|o| o.role.is_transient()).is_empty());
    assert!((ctl.get(b).unwrap().geometry.left - 150.0).abs() < f64::EPSILON);
}

#[test]
fn undo_then_commit_truncates_branch() {
    let mut surface = Surface::new(Side::Front, Size::new(300.0, 200.0));
    let mut history = HistoryManager::new(
        &surface,
        &HistoryConfig::default(),
        Arc::new(ManualClock::new()),
    )
    .unwrap();
    let s0 = surface.snapshot().unwrap();

    surface.scene.add_object(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
    history.commit(&surface, true).unwrap();
    let s1 = surface.snapshot().unwrap();
    for _ in 0..2 {
        surface.scene.add_object(rect(0.0, 0.0, 10.0, 10.0)).unwrap();
        history.commit(&surface, true).unwrap();
    }
    assert_eq!(history.len(), 4);
    assert_eq!(history.pointer(), 3);

    history.undo(&mut surface).unwrap();
    history.undo(&mut surface).unwrap();
    assert_eq!(history.pointer(), 1);

    surface.scene.add_object(rect(5.0, 5.0, 10.0, 10.0)).unwrap();
    history.commit(&surface, true).unwrap();
    assert_eq!(history.len(), 3);
    assert!(!history.can_redo());

    history.undo(&mut surface).unwrap();
    assert_eq!(surface.snapshot().unwrap(), s1);
    history.undo(&mut surface).unwrap();
    assert_eq!(surface.snapshot().unwrap(), s0);
}

#[test]
fn circular_photo_placeholder_geometry() {
    let obj = factory::build(
        &ShapeRecipe::PhotoPlaceholder {
            shape: PhotoShape::Circle,
        },
        Size::new(300.0, 200.0),
        1.0,
    );
    let radius = obj.geometry.width / 2.0;
    assert!((radius - 30.0).abs() < f64::EPSILON);
    assert!((obj.geometry.left - (150.0 - 30.0)).abs() < f64::EPSILON);
    assert!((obj.geometry.top - (100.0 - 30.0)).abs() < f64::EPSILON);
}

#[test]
fn text_resize_rewraps_instead_of_stretching() {
    let (mut ctl, _) = controller(300.0, 200.0);
    let content =
        TextContent::new("The quick brown fox jumps over the lazy dog").with_font_size(20.0);
    let mut text = DesignObject::new(ObjectKind::TextBox(content), Geometry::new(10.0, 10.0, 150.0, 0.0));
    text.reflow();
    let id = ctl.add_object(text).unwrap();
    let lines_before = {
        let obj = ctl.get(id).unwrap();
        obj.text().unwrap().line_count(obj.geometry.width)
    };

    assert!(ctl.scale_object(id, 1.5, 1.0).unwrap());
    ctl.end_resize(id).unwrap();

    let obj = ctl.get(id).unwrap();
    assert!((obj.geometry.width - 225.0).abs() < 1e-9);
    assert!((obj.geometry.scale_x - 1.0).abs() < f64::EPSILON);
    assert!((obj.geometry.scale_y - 1.0).abs() < f64::EPSILON);
    assert!((obj.text().unwrap().font_size - 20.0).abs() < f64::EPSILON);
    let lines_after = obj.text().unwrap().line_count(obj.geometry.width);
    assert_eq!(lines_before, 4);
    assert_eq!(lines_after, 3);
}

#[test]
fn deleting_only_page_is_rejected() {
    let mut doc =
        CardDocument::with_clock(config_for(300.0, 200.0), Arc::new(ManualClock::new())).unwrap();
    let names_before: Vec<_> = doc.pages().iter().map(|p| p.name.clone()).collect();

    assert!(matches!(doc.delete_page(0), Err(EditorError::LastPage)));
    assert_eq!(doc.page_count(), 1);
    let names_after: Vec<_> = doc.pages().iter().map(|p| p.name.clone()).collect();
    assert_eq!(names_before, names_after);
}
