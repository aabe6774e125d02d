//! Creation recipes for new design objects.
//!
//! Each recipe is a pure function of the surface size, zoom level and
//! recipe parameters. Fixed pixel caps are divided by the zoom so a new
//! object has the same on-screen size at any zoom; proportional caps are
//! fractions of the surface and ignore zoom. Missing or invalid size
//! parameters fall back to the computed defaults.

use crate::geometry::{
    HEART_SAMPLES, heart_points, points_bounds, regular_polygon_points, star_points,
    triangle_points,
};
use crate::objects::{
    BarcodeFormat, DesignObject, Geometry, ObjectKind, PaintStyle, PhotoShape, Role,
    SerializableColor, TextContent,
};
use kurbo::{Point, Size};

/// What to create.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeRecipe {
    Rectangle {
        width: Option<f64>,
        height: Option<f64>,
    },
    Circle {
        radius: Option<f64>,
    },
    Ellipse,
    Triangle,
    Polygon {
        sides: usize,
    },
    Star {
        points: usize,
    },
    Heart,
    Line,
    Text {
        text: String,
        font_size: Option<f64>,
    },
    PhotoPlaceholder {
        shape: PhotoShape,
    },
    Barcode {
        format: BarcodeFormat,
        field: String,
    },
    Qr {
        field: String,
    },
    TextVariable {
        field: String,
    },
}

impl ShapeRecipe {
    pub fn rectangle() -> Self {
        ShapeRecipe::Rectangle {
            width: None,
            height: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        ShapeRecipe::Text {
            text: text.into(),
            font_size: None,
        }
    }

    pub fn photo(shape: PhotoShape) -> Self {
        ShapeRecipe::PhotoPlaceholder { shape }
    }
}

fn effective_zoom(zoom: f64) -> f64 {
    if zoom.is_finite() && zoom > 0.0 { zoom } else { 1.0 }
}

fn valid(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

fn centered(surface: Size, width: f64, height: f64) -> Geometry {
    Geometry::new(
        (surface.width - width) / 2.0,
        (surface.height - height) / 2.0,
        width,
        height,
    )
}

fn polygon(points: Vec<Point>, surface: Size) -> DesignObject {
    let bounds = points_bounds(&points).unwrap_or_default();
    DesignObject::new(
        ObjectKind::Polygon { points },
        centered(surface, bounds.width(), bounds.height()),
    )
}

fn placeholder_style() -> PaintStyle {
    PaintStyle {
        fill: Some(SerializableColor::new(0xe5, 0xe7, 0xeb, 255)),
        stroke: Some(SerializableColor::new(0x9c, 0xa3, 0xaf, 255)),
        stroke_width: 1.0,
        dash: vec![6.0, 4.0],
        ..PaintStyle::default()
    }
}

fn text_object(content: TextContent, surface: Size) -> DesignObject {
    let width = content
        .natural_width()
        .min(surface.width * 0.8)
        .max(content.font_size);
    let mut object = DesignObject::new(ObjectKind::TextBox(content), centered(surface, width, 0.0))
        .with_style(PaintStyle::filled(SerializableColor::black()));
    object.reflow();
    object.geometry.top = ((surface.height - object.geometry.height) / 2.0).max(0.0);
    object
}

/// Radius of a new circular photo placeholder.
pub fn photo_radius(surface: Size, zoom: f64) -> f64 {
    (40.0 / effective_zoom(zoom))
        .min(surface.width * 0.15)
        .min(surface.height * 0.15)
}

/// Build the object for a photo placeholder of the given mask shape.
///
/// Circle-like masks sit in a square box around the surface center;
/// rectangular masks use a portrait box.
pub fn photo_placeholder(shape: PhotoShape, surface: Size, zoom: f64) -> DesignObject {
    let r = photo_radius(surface, zoom);
    let d = 2.0 * r;
    let mut object = match shape {
        PhotoShape::Circle => DesignObject::new(
            ObjectKind::Ellipse,
            Geometry::new(surface.width / 2.0 - r, surface.height / 2.0 - r, d, d),
        ),
        PhotoShape::Rectangle | PhotoShape::RoundedRectangle => {
            let width = d;
            let height = (d * 1.25).min(surface.height * 0.6);
            let corner_radius = if shape == PhotoShape::RoundedRectangle {
                width * 0.1
            } else {
                0.0
            };
            DesignObject::new(
                ObjectKind::Rectangle { corner_radius },
                centered(surface, width, height),
            )
        }
        PhotoShape::Hexagon => polygon(regular_polygon_points(6, r), surface),
        PhotoShape::Star => polygon(star_points(5, r, r * 0.5), surface),
        PhotoShape::Heart => polygon(heart_points(d, HEART_SAMPLES), surface),
    };
    object.style = placeholder_style();
    object.role = Role::PhotoPlaceholder {
        shape,
        mask_url: None,
    };
    object
}

/// Build a new object for `recipe` on a surface of `surface` pixels.
pub fn build(recipe: &ShapeRecipe, surface: Size, zoom: f64) -> DesignObject {
    let zoom = effective_zoom(zoom);
    let (w, h) = (surface.width, surface.height);

    let object = match recipe {
        ShapeRecipe::Rectangle { width, height } => {
            let width = valid(*width).unwrap_or((100.0 / zoom).min(w * 0.4)).min(w);
            let height = valid(*height).unwrap_or((60.0 / zoom).min(h * 0.4)).min(h);
            DesignObject::new(
                ObjectKind::Rectangle { corner_radius: 0.0 },
                centered(surface, width, height),
            )
        }
        ShapeRecipe::Circle { radius } => {
            let r = valid(*radius)
                .unwrap_or((50.0 / zoom).min(w * 0.2).min(h * 0.2))
                .min(w / 2.0)
                .min(h / 2.0);
            DesignObject::new(ObjectKind::Ellipse, centered(surface, 2.0 * r, 2.0 * r))
        }
        ShapeRecipe::Ellipse => {
            let width = (120.0 / zoom).min(w * 0.4);
            let height = (width * 0.6).min(h * 0.4);
            DesignObject::new(ObjectKind::Ellipse, centered(surface, width, height))
        }
        ShapeRecipe::Triangle => {
            let size = (80.0 / zoom).min(w * 0.3).min(h * 0.4);
            polygon(triangle_points(size, size), surface)
        }
        ShapeRecipe::Polygon { sides } => {
            let r = (50.0 / zoom).min(w * 0.2).min(h * 0.2);
            polygon(regular_polygon_points(*sides, r), surface)
        }
        ShapeRecipe::Star { points } => {
            let r = (50.0 / zoom).min(w * 0.2).min(h * 0.2);
            polygon(star_points(*points, r, r * 0.5), surface)
        }
        ShapeRecipe::Heart => {
            let size = (80.0 / zoom).min(w * 0.3).min(h * 0.4);
            polygon(heart_points(size, HEART_SAMPLES), surface)
        }
        ShapeRecipe::Line => {
            let length = (150.0 / zoom).min(w * 0.5);
            DesignObject::new(
                ObjectKind::Line {
                    start: Point::ZERO,
                    end: Point::new(length, 0.0),
                },
                centered(surface, length, 0.0),
            )
            .with_style(PaintStyle::stroked(SerializableColor::black(), 2.0))
        }
        ShapeRecipe::Text { text, font_size } => {
            let mut content = TextContent::new(text.clone());
            if let Some(size) = valid(*font_size) {
                content.font_size = size;
            }
            text_object(content, surface)
        }
        ShapeRecipe::PhotoPlaceholder { shape } => photo_placeholder(*shape, surface, zoom),
        ShapeRecipe::Barcode { format, field } => {
            let width = (160.0 / zoom).min(w * 0.6);
            let height = (50.0 / zoom).min(h * 0.3);
            DesignObject::new(
                ObjectKind::Rectangle { corner_radius: 0.0 },
                centered(surface, width, height),
            )
            .with_style(placeholder_style())
            .with_role(Role::Barcode { format: *format })
            .with_field_name(field.clone())
        }
        ShapeRecipe::Qr { field } => {
            let size = (80.0 / zoom).min(w * 0.3).min(h * 0.4);
            DesignObject::new(
                ObjectKind::Rectangle { corner_radius: 0.0 },
                centered(surface, size, size),
            )
            .with_style(placeholder_style())
            .with_role(Role::Qr)
            .with_field_name(field.clone())
        }
        ShapeRecipe::TextVariable { field } => {
            text_object(TextContent::new(format!("{{{{{field}}}}}")), surface)
                .with_role(Role::TextVariable)
                .with_field_name(field.clone())
        }
    };
    log::debug!(
        "Built {} ({:.1} x {:.1}) at zoom {}",
        object.kind.name(),
        object.geometry.width,
        object.geometry.height,
        zoom
    );
    object
}
