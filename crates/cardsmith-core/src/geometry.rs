//! Point generation for polygonal shapes.
//!
//! All generators return points in a local frame whose bounding box starts
//! at the origin, so the caller can place the shape by its top-left corner.

use kurbo::{Point, Rect};
use std::f64::consts::PI;

/// Number of samples used to approximate a heart outline.
pub const HEART_SAMPLES: usize = 48;

/// Vertices of a regular polygon with `sides` sides inscribed in a circle of
/// `radius`, first vertex pointing up.
pub fn regular_polygon_points(sides: usize, radius: f64) -> Vec<Point> {
    let sides = sides.max(3);
    let points = (0..sides)
        .map(|i| {
            let angle = -PI / 2.0 + 2.0 * PI * i as f64 / sides as f64;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    normalize_to_origin(points)
}

/// Vertices of a star alternating between `outer` and `inner` radius.
pub fn star_points(spikes: usize, outer: f64, inner: f64) -> Vec<Point> {
    let spikes = spikes.max(3);
    let step = PI / spikes as f64;
    let points = (0..spikes * 2)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -PI / 2.0 + step * i as f64;
            Point::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();
    normalize_to_origin(points)
}

/// Isosceles triangle filling a `width` x `height` box.
pub fn triangle_points(width: f64, height: f64) -> Vec<Point> {
    vec![
        Point::new(width / 2.0, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ]
}

/// Heart outline sampled from the classic parametric curve and scaled to
/// fit a `size` x `size` box.
pub fn heart_points(size: f64, samples: usize) -> Vec<Point> {
    let samples = samples.max(8);
    let raw: Vec<Point> = (0..samples)
        .map(|i| {
            let t = 2.0 * PI * i as f64 / samples as f64;
            let x = 16.0 * t.sin().powi(3);
            let y = -(13.0 * t.cos()
                - 5.0 * (2.0 * t).cos()
                - 2.0 * (3.0 * t).cos()
                - (4.0 * t).cos());
            Point::new(x, y)
        })
        .collect();

    let bounds = points_bounds(&raw).unwrap_or(Rect::ZERO);
    let extent = bounds.width().max(bounds.height());
    if extent <= f64::EPSILON {
        return Vec::new();
    }
    let scale = size / extent;
    raw.into_iter()
        .map(|p| Point::new((p.x - bounds.x0) * scale, (p.y - bounds.y0) * scale))
        .collect()
}

/// Axis-aligned bounds of a point set.
pub fn points_bounds(points: &[Point]) -> Option<Rect> {
    let first = points.first()?;
    let mut rect = Rect::from_points(*first, *first);
    for p in &points[1..] {
        rect = rect.union_pt(*p);
    }
    Some(rect)
}

/// Translate a point set so its bounding box starts at the origin.
fn normalize_to_origin(points: Vec<Point>) -> Vec<Point> {
    let Some(bounds) = points_bounds(&points) else {
        return points;
    };
    points
        .into_iter()
        .map(|p| Point::new(p.x - bounds.x0, p.y - bounds.y0))
        .collect()
}
