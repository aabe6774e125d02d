//! Paint styles, colors and gradients.

use peniko::Color;
use serde::{Deserialize, Serialize};

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub color: SerializableColor,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Paint properties of a design object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintStyle {
    /// Fill color (None = no fill).
    pub fill: Option<SerializableColor>,
    /// Stroke color (None = no stroke).
    pub stroke: Option<SerializableColor>,
    pub stroke_width: f64,
    /// Dash pattern; empty means solid.
    #[serde(default)]
    pub dash: Vec<f64>,
    #[serde(default)]
    pub shadow: Option<Shadow>,
    /// Overall opacity (0.0 = fully transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f64,
}

fn default_opacity() -> f64 {
    1.0
}

impl PaintStyle {
    /// Filled shape without outline.
    pub fn filled(color: SerializableColor) -> Self {
        Self {
            fill: Some(color),
            ..Self::default()
        }
    }

    /// Outline without fill.
    pub fn stroked(color: SerializableColor, width: f64) -> Self {
        Self {
            fill: None,
            stroke: Some(color),
            stroke_width: width,
            ..Self::default()
        }
    }

    /// Get the fill color with opacity applied.
    pub fn fill_with_opacity(&self) -> Option<Color> {
        self.fill.map(|c| with_opacity(c, self.opacity))
    }

    /// Get the stroke color with opacity applied.
    pub fn stroke_with_opacity(&self) -> Option<Color> {
        self.stroke.map(|c| with_opacity(c, self.opacity))
    }
}

fn with_opacity(color: SerializableColor, opacity: f64) -> Color {
    let alpha = (f64::from(color.a) * opacity.clamp(0.0, 1.0)) as u8;
    Color::from_rgba8(color.r, color.g, color.b, alpha)
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            fill: Some(SerializableColor::new(0x3b, 0x82, 0xf6, 255)),
            stroke: None,
            stroke_width: 0.0,
            dash: Vec::new(),
            shadow: None,
            opacity: 1.0,
        }
    }
}

/// One color stop of a gradient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0 to 1.0.
    pub offset: f64,
    pub color: SerializableColor,
}

/// Gradient geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GradientKind {
    /// Linear gradient at an angle in degrees (0 = left to right).
    Linear { angle: f64 },
    /// Radial gradient from the surface center.
    Radial,
}

/// Gradient descriptor used for surface backgrounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientDescriptor {
    pub kind: GradientKind,
    pub stops: Vec<GradientStop>,
}

impl GradientDescriptor {
    /// Two-stop linear gradient.
    pub fn linear(angle: f64, from: SerializableColor, to: SerializableColor) -> Self {
        Self {
            kind: GradientKind::Linear { angle },
            stops: vec![
                GradientStop { offset: 0.0, color: from },
                GradientStop { offset: 1.0, color: to },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        let peniko_color: Color = color.into();
        assert_eq!(SerializableColor::from(peniko_color), color);
    }

    #[test]
    fn test_opacity_applied_to_fill() {
        let mut style = PaintStyle::filled(SerializableColor::black());
        style.opacity = 0.5;
        let fill = style.fill_with_opacity().unwrap();
        assert_eq!(fill.to_rgba8().a, 127);
        assert!(style.stroke_with_opacity().is_none());
    }
}
