//! Keeps objects inside their surface and converts text scaling into
//! layout changes.

use crate::objects::{DesignObject, SCALE_EPSILON};
use kurbo::{Point, Size};

/// Clamp a proposed top-left so the scaled box stays inside `surface`.
///
/// Objects larger than the surface are pinned to the origin.
pub fn clamp_position(proposed: Point, scaled: Size, surface: Size) -> Point {
    let max_left = (surface.width - scaled.width).max(0.0);
    let max_top = (surface.height - scaled.height).max(0.0);
    Point::new(
        proposed.x.clamp(0.0, max_left),
        proposed.y.clamp(0.0, max_top),
    )
}

/// Apply a proposed move to `object`. Returns whether the move was accepted.
///
/// Locked objects are put back at `anchor` (their position when selected).
pub fn enforce_move(
    object: &mut DesignObject,
    proposed: Point,
    anchor: Option<Point>,
    surface: Size,
) -> bool {
    if object.locked {
        if let Some(anchor) = anchor {
            object.geometry.set_position(anchor);
        }
        log::warn!("Rejected move of locked object {}", object.id());
        return false;
    }
    let scaled = Size::new(object.geometry.scaled_width(), object.geometry.scaled_height());
    object
        .geometry
        .set_position(clamp_position(proposed, scaled, surface));
    true
}

/// Keep a scale-resize inside the surface.
///
/// Negative `left`/`top` are clamped to zero, then both scale factors are
/// reduced by the same ratio until the box fits.
pub fn enforce_scale(object: &mut DesignObject, surface: Size) {
    let g = &mut object.geometry;
    g.left = g.left.max(0.0);
    g.top = g.top.max(0.0);

    let width = g.scaled_width();
    let height = g.scaled_height();
    let mut factor: f64 = 1.0;
    if width > 0.0 {
        factor = factor.min((surface.width - g.left).max(0.0) / width);
    }
    if height > 0.0 {
        factor = factor.min((surface.height - g.top).max(0.0) / height);
    }
    if factor < 1.0 {
        g.scale_x *= factor;
        g.scale_y *= factor;
    }
}

/// Bake the scale of a text box into its layout on resize commit.
///
/// A non-uniform scale becomes a width change so the text re-wraps. A uniform
/// scale becomes a new font size. Returns whether anything changed.
pub fn commit_resize(object: &mut DesignObject) -> bool {
    if !object.is_text() || object.geometry.has_unit_scale() {
        return false;
    }
    let g = object.geometry;
    let uniform = (g.scale_x - g.scale_y).abs() <= SCALE_EPSILON;
    let factor = if uniform {
        g.scale_x.abs().max(g.scale_y.abs())
    } else {
        g.scale_x.abs()
    };
    if uniform {
        if let Some(text) = object.text_mut() {
            text.font_size = (text.font_size * factor).round().max(1.0);
        }
    }
    object.geometry.width = g.width * factor;
    object.geometry.scale_x = 1.0;
    object.geometry.scale_y = 1.0;
    object.reflow();
    true
}

/// Fit an unscaled text box inside the surface through its layout.
///
/// The width is capped at the surface width. If the wrapped block is still
/// taller than the surface the font shrinks until it fits. Returns whether
/// anything changed.
pub fn fit_text(object: &mut DesignObject, surface: Size) -> bool {
    if !object.is_text() || !object.geometry.has_unit_scale() {
        return false;
    }
    let mut changed = false;
    if object.geometry.width > surface.width {
        object.geometry.width = surface.width.max(0.0);
        object.reflow();
        changed = true;
    }
    while object.geometry.height > surface.height && object.geometry.height > 0.0 {
        let ratio = surface.height / object.geometry.height;
        let Some(text) = object.text_mut() else {
            break;
        };
        if text.font_size <= 1.0 {
            break;
        }
        text.font_size = (text.font_size * ratio).floor().min(text.font_size - 1.0).max(1.0);
        object.reflow();
        changed = true;
    }
    if changed {
        log::debug!("Fitted text {} into surface", object.id());
    }
    changed
}

/// Whether the object's scaled box lies within the surface.
pub fn is_in_bounds(object: &DesignObject, surface: Size) -> bool {
    let b = object.bounds();
    let eps = 1e-6;
    b.x0 >= -eps && b.y0 >= -eps && b.x1 <= surface.width + eps && b.y1 <= surface.height + eps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Geometry, ObjectKind, TextContent};

    const SURFACE: Size = Size::new(300.0, 200.0);

    fn rect(left: f64, top: f64, width: f64, height: f64) -> DesignObject {
        DesignObject::new(
            ObjectKind::Rectangle { corner_radius: 0.0 },
            Geometry::new(left, top, width, height),
        )
    }

    fn text_box(width: f64) -> DesignObject {
        let content =
            TextContent::new("The quick brown fox jumps over the lazy dog").with_font_size(20.0);
        let mut obj = DesignObject::new(ObjectKind::TextBox(content), Geometry::new(0.0, 0.0, width, 0.0));
        obj.reflow();
        obj
    }

    #[test]
    fn test_move_is_clamped() {
        let mut obj = rect(0.0, 0.0, 50.0, 40.0);
        assert!(enforce_move(&mut obj, Point::new(-20.0, 500.0), None, SURFACE));
        assert_eq!(obj.geometry.position(), Point::new(0.0, 160.0));

        assert!(enforce_move(&mut obj, Point::new(280.0, -1.0), None, SURFACE));
        assert_eq!(obj.geometry.position(), Point::new(250.0, 0.0));
    }

    #[test]
    fn test_clamp_uses_scaled_size() {
        let mut obj = rect(0.0, 0.0, 50.0, 40.0);
        obj.geometry.scale_x = 2.0;
        enforce_move(&mut obj, Point::new(290.0, 0.0), None, SURFACE);
        assert!((obj.geometry.left - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_oversized_object_pinned_to_origin() {
        let mut obj = rect(0.0, 0.0, 400.0, 40.0);
        enforce_move(&mut obj, Point::new(30.0, 10.0), None, SURFACE);
        assert_eq!(obj.geometry.position(), Point::new(0.0, 10.0));
    }

    #[test]
    fn test_locked_object_restores_anchor() {
        let mut obj = rect(10.0, 20.0, 50.0, 40.0);
        obj.locked = true;
        obj.geometry.left = 90.0;
        let accepted = enforce_move(&mut obj, Point::new(100.0, 100.0), Some(Point::new(10.0, 20.0)), SURFACE);
        assert!(!accepted);
        assert_eq!(obj.geometry.position(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_scale_reduced_proportionally() {
        let mut obj = rect(200.0, 100.0, 50.0, 50.0);
        obj.geometry.scale_x = 4.0;
        obj.geometry.scale_y = 4.0;
        enforce_scale(&mut obj, SURFACE);
        assert!((obj.geometry.scale_x - 0.5).abs() < 1e-9);
        assert!((obj.geometry.scale_y - 0.5).abs() < 1e-9);
        assert!(is_in_bounds(&obj, SURFACE));
    }

    #[test]
    fn test_scale_clamps_negative_origin() {
        let mut obj = rect(-10.0, -5.0, 20.0, 20.0);
        enforce_scale(&mut obj, SURFACE);
        assert_eq!(obj.geometry.position(), Point::ZERO);
    }

    #[test]
    fn test_zero_size_scale_does_not_panic() {
        let mut obj = rect(10.0, 10.0, 0.0, 0.0);
        obj.geometry.scale_x = 3.0;
        enforce_scale(&mut obj, SURFACE);
        assert!((obj.geometry.scale_x - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_text_horizontal_stretch_rewraps() {
        let mut obj = text_box(150.0);
        let lines_before = obj.text().unwrap().line_count(obj.geometry.width);
        obj.geometry.scale_x = 1.5;
        assert!(commit_resize(&mut obj));

        assert!((obj.geometry.width - 225.0).abs() < 1e-9);
        assert!((obj.geometry.scale_x - 1.0).abs() < f64::EPSILON);
        assert!((obj.text().unwrap().font_size - 20.0).abs() < f64::EPSILON);
        let lines_after = obj.text().unwrap().line_count(obj.geometry.width);
        assert_eq!((lines_before, lines_after), (4, 3));
    }

    #[test]
    fn test_text_uniform_scale_changes_font() {
        let mut obj = text_box(150.0);
        obj.geometry.scale_x = 1.26;
        obj.geometry.scale_y = 1.26;
        assert!(commit_resize(&mut obj));
        assert!((obj.text().unwrap().font_size - 25.0).abs() < f64::EPSILON);
        assert!(obj.geometry.has_unit_scale());
    }

    #[test]
    fn test_fit_text_caps_width_and_font() {
        let mut obj = text_box(150.0);
        obj.geometry.scale_x = 3.0;
        obj.geometry.scale_y = 3.0;
        assert!(commit_resize(&mut obj));
        assert!((obj.text().unwrap().font_size - 60.0).abs() < f64::EPSILON);

        assert!(fit_text(&mut obj, SURFACE));
        assert!(obj.geometry.has_unit_scale());
        assert!(obj.geometry.width <= SURFACE.width);
        assert!(obj.geometry.height <= SURFACE.height);
        assert!(obj.text().unwrap().font_size < 60.0);
    }

    #[test]
    fn test_fit_text_leaves_fitting_text_alone() {
        let mut obj = text_box(150.0);
        assert!(!fit_text(&mut obj, SURFACE));
        let mut shape = rect(0.0, 0.0, 400.0, 400.0);
        assert!(!fit_text(&mut shape, SURFACE));
    }

    #[test]
    fn test_non_text_commit_keeps_scale() {
        let mut obj = rect(0.0, 0.0, 10.0, 10.0);
        obj.geometry.scale_x = 2.0;
        assert!(!commit_resize(&mut obj));
        assert!((obj.geometry.scale_x - 2.0).abs() < f64::EPSILON);
    }
}
