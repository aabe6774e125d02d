//! Snap functionality: grid rounding and edge/center alignment between
//! objects.

use crate::config::EditorConfig;
use crate::objects::{
    Axis, DesignObject, Geometry, ObjectId, ObjectKind, PaintStyle, Role, SerializableColor,
};
use kurbo::{Point, Rect, Size};

/// Guide line color (magenta, as in most layout tools).
pub const GUIDE_COLOR: SerializableColor = SerializableColor {
    r: 0xff,
    g: 0x00,
    b: 0xff,
    a: 0xff,
};

/// Result of a grid snap.
#[derive(Debug, Clone, Copy)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was snapped.
    pub snapped_x: bool,
    /// Whether the Y coordinate was snapped.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if !(grid_size > 0.0) {
        return SnapResult::none(point);
    }
    SnapResult {
        point: Point::new(
            (point.x / grid_size).round() * grid_size,
            (point.y / grid_size).round() * grid_size,
        ),
        snapped_x: true,
        snapped_y: true,
    }
}

/// A reference line the moving object was aligned to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentMatch {
    /// Orientation of the guide: `Vertical` aligns x, `Horizontal` aligns y.
    pub axis: Axis,
    /// The reference coordinate the object was snapped onto.
    pub coordinate: f64,
    /// Distance between the object's edge and the reference before snapping.
    pub distance: f64,
    /// The object providing the reference, `None` for the surface center.
    pub source: Option<ObjectId>,
}

/// Result of running a proposed move through grid and alignment snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    /// Top-left after snapping (not yet clamped).
    pub position: Point,
    /// At most one match per axis.
    pub matches: Vec<AlignmentMatch>,
}

impl SnapOutcome {
    pub fn is_aligned(&self, axis: Axis) -> bool {
        self.matches.iter().any(|m| m.axis == axis)
    }
}

/// Left, center and right of a rect.
fn x_lines(rect: Rect) -> [f64; 3] {
    [rect.x0, rect.center().x, rect.x1]
}

/// Top, middle and bottom of a rect.
fn y_lines(rect: Rect) -> [f64; 3] {
    [rect.y0, rect.center().y, rect.y1]
}

/// Closest reference within `threshold` for one axis.
///
/// Returns the offset to apply and the match. Ties keep the first candidate
/// seen.
fn best_on_axis(
    axis: Axis,
    moving: [f64; 3],
    references: impl Iterator<Item = (f64, Option<ObjectId>)>,
    threshold: f64,
) -> Option<(f64, AlignmentMatch)> {
    let mut best: Option<(f64, AlignmentMatch)> = None;
    for (reference, source) in references {
        for edge in moving {
            let distance = (edge - reference).abs();
            if distance >= threshold {
                continue;
            }
            if best.is_some_and(|(_, m)| distance >= m.distance) {
                continue;
            }
            best = Some((
                reference - edge,
                AlignmentMatch {
                    axis,
                    coordinate: reference,
                    distance,
                    source,
                },
            ));
        }
    }
    best
}

/// Align a moving box against the other objects and the surface center.
///
/// Guides and other transient objects are ignored, as are zero-size axes.
pub fn align(
    moving_id: ObjectId,
    proposed: Rect,
    objects: &[DesignObject],
    surface: Size,
    threshold: f64,
) -> SnapOutcome {
    let others: Vec<&DesignObject> = objects
        .iter()
        .filter(|o| o.id() != moving_id && !o.role.is_transient())
        .collect();
    let center = Point::new(surface.width / 2.0, surface.height / 2.0);
    let mut position = proposed.origin();
    let mut matches = Vec::new();

    if proposed.width() > 0.0 {
        let references = others
            .iter()
            .filter(|o| o.geometry.scaled_width() > 0.0)
            .flat_map(|o| x_lines(o.bounds()).map(|x| (x, Some(o.id()))))
            .chain(std::iter::once((center.x, None)));
        if let Some((dx, m)) = best_on_axis(Axis::Vertical, x_lines(proposed), references, threshold) {
            position.x += dx;
            matches.push(m);
        }
    }
    if proposed.height() > 0.0 {
        let references = others
            .iter()
            .filter(|o| o.geometry.scaled_height() > 0.0)
            .flat_map(|o| y_lines(o.bounds()).map(|y| (y, Some(o.id()))))
            .chain(std::iter::once((center.y, None)));
        if let Some((dy, m)) =
            best_on_axis(Axis::Horizontal, y_lines(proposed), references, threshold)
        {
            position.y += dy;
            matches.push(m);
        }
    }

    for m in &matches {
        log::debug!("Aligned {:?} at {:.1} (distance {:.2})", m.axis, m.coordinate, m.distance);
    }
    SnapOutcome { position, matches }
}

/// Run a proposed move through grid snapping then alignment.
pub fn snap_move(
    object: &DesignObject,
    proposed: Point,
    objects: &[DesignObject],
    surface: Size,
    config: &EditorConfig,
) -> SnapOutcome {
    let mut position = proposed;
    if config.grid.enabled {
        position = snap_to_grid(position, config.grid.cell_size).point;
    }
    if !config.alignment.enabled {
        return SnapOutcome {
            position,
            matches: Vec::new(),
        };
    }
    let size = Size::new(object.geometry.scaled_width(), object.geometry.scaled_height());
    align(
        object.id(),
        Rect::from_origin_size(position, size),
        objects,
        surface,
        config.alignment.threshold,
    )
}

/// Build a transient guide line spanning the surface.
pub fn guide_line(axis: Axis, coordinate: f64, surface: Size) -> DesignObject {
    let (geometry, end) = match axis {
        Axis::Vertical => (
            Geometry::new(coordinate, 0.0, 0.0, surface.height),
            Point::new(0.0, surface.height),
        ),
        Axis::Horizontal => (
            Geometry::new(0.0, coordinate, surface.width, 0.0),
            Point::new(surface.width, 0.0),
        ),
    };
    DesignObject::new(
        ObjectKind::Line {
            start: Point::ZERO,
            end,
        },
        geometry,
    )
    .with_style(PaintStyle {
        dash: vec![4.0, 4.0],
        ..PaintStyle::stroked(GUIDE_COLOR, 1.0)
    })
    .with_role(Role::Guideline { axis })
}
