//! Design objects: the nodes of a surface's scene graph.

mod style;
mod text;

pub use style::{
    GradientDescriptor, GradientKind, GradientStop, PaintStyle, SerializableColor, Shadow,
};
pub use text::{CHAR_WIDTH_FACTOR, DEFAULT_LINE_HEIGHT, FontWeight, TextAlign, TextContent};

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for design objects.
pub type ObjectId = Uuid;

/// Scale changes smaller than this are treated as no change.
pub const SCALE_EPSILON: f64 = 0.01;

/// Position, size and transform in surface-local pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "unit_scale")]
    pub scale_x: f64,
    #[serde(default = "unit_scale")]
    pub scale_y: f64,
    /// Rotation in degrees.
    #[serde(default)]
    pub angle: f64,
}

fn unit_scale() -> f64 {
    1.0
}

impl Geometry {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
        }
    }

    pub fn scaled_width(&self) -> f64 {
        self.width * self.scale_x.abs()
    }

    pub fn scaled_height(&self) -> f64 {
        self.height * self.scale_y.abs()
    }

    pub fn position(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn set_position(&mut self, position: Point) {
        self.left = position.x;
        self.top = position.y;
    }

    /// Bounding box of the scaled object.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.left,
            self.top,
            self.left + self.scaled_width(),
            self.top + self.scaled_height(),
        )
    }

    pub fn has_unit_scale(&self) -> bool {
        (self.scale_x - 1.0).abs() <= SCALE_EPSILON && (self.scale_y - 1.0).abs() <= SCALE_EPSILON
    }

    /// Whether every field is a finite number.
    pub fn is_finite(&self) -> bool {
        [
            self.left,
            self.top,
            self.width,
            self.height,
            self.scale_x,
            self.scale_y,
            self.angle,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// Orientation of a guide line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// A vertical line at a fixed x.
    Vertical,
    /// A horizontal line at a fixed y.
    Horizontal,
}

/// Mask shape of a photo placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoShape {
    #[default]
    Rectangle,
    RoundedRectangle,
    Circle,
    Hexagon,
    Star,
    Heart,
}

/// Symbology of a barcode placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BarcodeFormat {
    #[default]
    Code128,
    Code39,
    Ean13,
}

/// Semantic role of an object.
///
/// Each role carries only the data meaningful for it, so callers match
/// exhaustively instead of probing flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Role {
    /// Ordinary user content.
    #[default]
    Content,
    /// Background image covering the surface.
    Background,
    /// Gradient fill covering the surface.
    GradientBackground(GradientDescriptor),
    /// Alignment guide shown during a drag.
    Guideline { axis: Axis },
    /// Slot for a per-record photo.
    PhotoPlaceholder {
        shape: PhotoShape,
        #[serde(default)]
        mask_url: Option<String>,
    },
    /// Slot for a per-record barcode.
    Barcode { format: BarcodeFormat },
    /// Slot for a per-record QR code.
    Qr,
    /// Rendered barcode pixels; regenerated from the placeholder.
    BarcodeVisual,
    /// Rendered QR pixels; regenerated from the placeholder.
    QrVisual,
    /// Text bound to a per-record field.
    TextVariable,
}

impl Role {
    /// Transient objects never enter history snapshots.
    pub fn is_transient(&self) -> bool {
        matches!(self, Role::Guideline { .. })
    }

    /// Objects written to the persistence store.
    pub fn is_persisted(&self) -> bool {
        !matches!(
            self,
            Role::Guideline { .. } | Role::BarcodeVisual | Role::QrVisual
        )
    }

    /// Background objects sit at z-order 0.
    pub fn is_background(&self) -> bool {
        matches!(self, Role::Background | Role::GradientBackground(_))
    }

    pub fn is_selectable(&self) -> bool {
        !self.is_background() && !self.is_transient()
    }

    /// Placeholders bind to external per-record data.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self,
            Role::PhotoPlaceholder { .. } | Role::Barcode { .. } | Role::Qr | Role::TextVariable
        )
    }
}

/// Reference to a decoded raster image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageSource {
    /// URL or asset key the host resolves.
    pub src: String,
    pub natural_width: f64,
    pub natural_height: f64,
}

/// Shape-specific data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ObjectKind {
    Rectangle {
        #[serde(default)]
        corner_radius: f64,
    },
    Ellipse,
    /// Closed polygon; points are local to the object's top-left corner.
    Polygon { points: Vec<Point> },
    /// Straight segment; points are local to the object's top-left corner.
    Line { start: Point, end: Point },
    TextBox(TextContent),
    Image(ImageSource),
}

impl ObjectKind {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            ObjectKind::Rectangle { .. } => "rectangle",
            ObjectKind::Ellipse => "ellipse",
            ObjectKind::Polygon { .. } => "polygon",
            ObjectKind::Line { .. } => "line",
            ObjectKind::TextBox(_) => "text",
            ObjectKind::Image(_) => "image",
        }
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignObject {
    pub(crate) id: ObjectId,
    pub kind: ObjectKind,
    pub geometry: Geometry,
    pub style: PaintStyle,
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_name: Option<String>,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Hit-test bounds as of the last `set_coords`.
    #[serde(skip)]
    coords: Option<Rect>,
}

fn default_visible() -> bool {
    true
}

impl DesignObject {
    pub fn new(kind: ObjectKind, geometry: Geometry) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            geometry,
            style: PaintStyle::default(),
            role: Role::Content,
            field_name: None,
            layer_name: None,
            locked: false,
            visible: true,
            coords: None,
        }
    }

    pub fn with_style(mut self, style: PaintStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn with_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Assign a fresh id, used when duplicating or pasting.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
        self.coords = None;
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::TextBox(_))
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.kind {
            ObjectKind::TextBox(text) => Some(text),
            _ => None,
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            ObjectKind::TextBox(text) => Some(text),
            _ => None,
        }
    }

    /// Current bounds from live geometry.
    pub fn bounds(&self) -> Rect {
        self.geometry.bounds()
    }

    /// Refresh the cached hit-test bounds from the live geometry.
    pub fn set_coords(&mut self) {
        self.coords = Some(self.geometry.bounds());
    }

    /// Bounds used for hit testing.
    pub fn coords(&self) -> Rect {
        self.coords.unwrap_or_else(|| self.geometry.bounds())
    }

    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.visible && self.coords().inflate(tolerance, tolerance).contains(point)
    }

    /// Recompute a text box's height from its wrapped layout.
    pub fn reflow(&mut self) {
        if let ObjectKind::TextBox(text) = &self.kind {
            self.geometry.height = text.layout_height(self.geometry.width);
        }
    }

    /// Apply a partial update. Returns whether anything changed.
    pub fn apply_patch(&mut self, patch: &ObjectPatch) -> bool {
        let before_geometry = self.geometry;
        let before_style = self.style.clone();
        let before_kind = self.kind.clone();
        let before_names = (self.field_name.clone(), self.layer_name.clone());

        let g = &mut self.geometry;
        set_if(&mut g.left, patch.left);
        set_if(&mut g.top, patch.top);
        set_if(&mut g.width, patch.width.filter(|w| *w >= 0.0));
        set_if(&mut g.height, patch.height.filter(|h| *h >= 0.0));
        set_if(&mut g.scale_x, patch.scale_x);
        set_if(&mut g.scale_y, patch.scale_y);
        set_if(&mut g.angle, patch.angle);

        if let Some(fill) = patch.fill {
            self.style.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.style.stroke = stroke;
        }
        set_if(&mut self.style.stroke_width, patch.stroke_width);
        set_if(&mut self.style.opacity, patch.opacity.map(|o| o.clamp(0.0, 1.0)));
        if let Some(dash) = &patch.dash {
            self.style.dash.clone_from(dash);
        }
        if let Some(name) = &patch.field_name {
            self.field_name.clone_from(name);
        }
        if let Some(name) = &patch.layer_name {
            self.layer_name.clone_from(name);
        }

        if let Some(text) = self.text_mut() {
            if let Some(content) = &patch.text {
                text.text.clone_from(content);
            }
            set_if(&mut text.font_size, patch.font_size.filter(|s| *s > 0.0));
        }
        self.reflow();

        self.geometry != before_geometry
            || self.style != before_style
            || self.kind != before_kind
            || (self.field_name.clone(), self.layer_name.clone()) != before_names
    }
}

fn set_if(slot: &mut f64, value: Option<f64>) {
    if let Some(v) = value.filter(|v| v.is_finite()) {
        *slot = v;
    }
}

/// Partial geometry/style/content update.
///
/// `None` leaves a property untouched. Nested options clear a value when the
/// inner option is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectPatch {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub angle: Option<f64>,
    pub fill: Option<Option<SerializableColor>>,
    pub stroke: Option<Option<SerializableColor>>,
    pub stroke_width: Option<f64>,
    pub opacity: Option<f64>,
    pub dash: Option<Vec<f64>>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub field_name: Option<Option<String>>,
    pub layer_name: Option<Option<String>>,
}

impl ObjectPatch {
    pub fn position(left: f64, top: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            ..Self::default()
        }
    }

    pub fn fill(color: Option<SerializableColor>) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}
