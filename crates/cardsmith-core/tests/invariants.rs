//! Lock, bounds, page-count and alignment invariants.

mod common;

use cardsmith_core::constraints::is_in_bounds;
use cardsmith_core::factory::ShapeRecipe;
use cardsmith_core::objects::{Geometry, ObjectKind, ObjectPatch, PhotoShape, TextContent};
use cardsmith_core::{CardDocument, DesignObject, ManualClock};
use common::{config_for, controller, rect};
use kurbo::Point;
use std::sync::Arc;

const PROPOSALS: [f64; 9] = [-500.0, -10.0, -0.5, 0.0, 37.3, 150.0, 299.0, 301.0, 1e6];

#[test]
fn locked_objects_never_move() {
    let (mut ctl, _) = controller(300.0, 200.0);
    let id = ctl.add_object(rect(40.0, 60.0, 30.0, 20.0)).unwrap();
    ctl.select(id).unwrap();
    ctl.set_locked(id, true).unwrap();

    for x in PROPOSALS {
        for y in PROPOSALS {
            let outcome = ctl.drag_move(id, Point::new(x, y)).unwrap();
            assert!(!outcome.accepted);
            assert_eq!(ctl.get(id).unwrap().geometry.position(), Point::new(40.0, 60.0));
        }
    }
    ctl.end_drag(id).unwrap();
    ctl.update_object(id, &ObjectPatch::position(0.0, 0.0)).unwrap();
    ctl.move_object(id, Point::new(5.0, 5.0)).unwrap();
    assert_eq!(ctl.get(id).unwrap().geometry.position(), Point::new(40.0, 60.0));
}

#[test]
fn unlocked_objects_stay_in_bounds() {
    let (mut ctl, _) = controller(300.0, 200.0);
    ctl.config_mut().grid.enabled = true;
    let size = ctl.surface().size();
    let ids = vec![
        ctl.create(&ShapeRecipe::rectangle()).unwrap(),
        ctl.create(&ShapeRecipe::Star { points: 5 }).unwrap(),
        ctl.create(&ShapeRecipe::text("Employee name")).unwrap(),
        ctl.create(&ShapeRecipe::photo(PhotoShape::Heart)).unwrap(),
        ctl.add_object(rect(0.0, 0.0, 280.0, 190.0)).unwrap(),
    ];

    for &id in &ids {
        ctl.select(id).unwrap();
        for x in PROPOSALS {
            for y in PROPOSALS {
                ctl.drag_move(id, Point::new(x, y)).unwrap();
                assert!(is_in_bounds(ctl.get(id).unwrap(), size));
            }
        }
        ctl.end_drag(id).unwrap();

        for scale in [0.5, 1.0, 2.5, 40.0] {
            ctl.scale_object(id, scale, scale * 0.8).unwrap();
            assert!(is_in_bounds(ctl.get(id).unwrap(), size));
            ctl.end_resize(id).unwrap();
            assert!(is_in_bounds(ctl.get(id).unwrap(), size));
        }
    }
}

#[test]
fn page_count_never_drops_below_one() {
    let mut doc =
        CardDocument::with_clock(config_for(300.0, 200.0), Arc::new(ManualClock::new())).unwrap();
    doc.add_page().unwrap();
    doc.add_page().unwrap();
    for _ in 0..5 {
        let _ = doc.delete_page(0);
        assert!(doc.page_count() >= 1);
        assert!(doc.current_page() < doc.page_count());
    }
    assert_eq!(doc.page_count(), 1);
}

/// Two candidates inside the threshold on the same axis: the closer one
/// wins even though the farther one comes later in z-order.
#[test]
fn closest_alignment_candidate_wins() {
    let (mut ctl, _) = controller(300.0, 200.0);
    let moving = ctl.add_object(rect(0.0, 170.0, 20.0, 20.0)).unwrap();
    let near = ctl.add_object(rect(61.0, 0.0, 40.0, 10.0)).unwrap();
    ctl.add_object(rect(103.5, 30.0, 5.0, 10.0)).unwrap();
    ctl.select(moving).unwrap();

    let outcome = ctl.drag_move(moving, Point::new(100.0, 170.0)).unwrap();
    assert_eq!(outcome.matches.len(), 1);
    assert_eq!(outcome.matches[0].source, Some(near));
    assert!((outcome.position.x - 101.0).abs() < f64::EPSILON);
}

/// Rounding the font up on a uniform resize can make the reflowed block
/// taller than the surface; the font shrinks instead of keeping a scale.
#[test]
fn text_resize_fits_by_layout_not_scale() {
    let (mut ctl, _) = controller(300.0, 200.0);
    let content = TextContent::new("A\nB\nC\nD\nE\nF\nG").with_font_size(20.0);
    let mut text = DesignObject::new(ObjectKind::TextBox(content), Geometry::new(0.0, 0.0, 100.0, 0.0));
    text.reflow();
    let id = ctl.add_object(text).unwrap();

    assert!(ctl.scale_object(id, 1.23, 1.23).unwrap());
    ctl.end_resize(id).unwrap();

    let obj = ctl.get(id).unwrap();
    assert!(obj.geometry.has_unit_scale());
    assert!((obj.text().unwrap().font_size - 24.0).abs() < f64::EPSILON);
    assert!(is_in_bounds(obj, ctl.surface().size()));
}

#[test]
fn oversized_text_patch_is_fitted() {
    let (mut ctl, _) = controller(300.0, 200.0);
    let id = ctl.create(&ShapeRecipe::text("Visitor pass")).unwrap();
    let patch = ObjectPatch {
        width: Some(900.0),
        ..ObjectPatch::default()
    };
    ctl.update_object(id, &patch).unwrap();

    let obj = ctl.get(id).unwrap();
    assert!(obj.geometry.has_unit_scale());
    assert!(obj.geometry.width <= 300.0);
    assert!(is_in_bounds(obj, ctl.surface().size()));
}
