//! Boundary with the asset pipeline.
//!
//! The host resolves files or URLs to decoded images. The engine hands out a
//! ticket when a load starts and inserts the image only when the ticket is
//! completed with a successful decode.

use crate::objects::{DesignObject, Geometry, ImageSource, ObjectId, ObjectKind, PaintStyle, Role};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by the asset pipeline.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("Failed to decode image {src}: {reason}")]
    Decode { src: String, reason: String },
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Image has zero size: {0}")]
    Empty(String),
}

/// A decoded image handle with its natural pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedImage {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

impl DecodedImage {
    pub fn new(src: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }

    fn natural_size(&self) -> Result<Size, AssetError> {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0 {
            Ok(Size::new(self.width, self.height))
        } else {
            Err(AssetError::Empty(self.src.clone()))
        }
    }
}

/// Where a loaded image goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePlacement {
    /// A new content image fitted inside the surface.
    Content,
    /// The surface's background image, covering the whole surface.
    Background,
    /// Fill of an existing photo placeholder.
    PhotoFill(ObjectId),
}

/// Handle for an in-flight image load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket(pub(crate) u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Fraction of the surface a new content image may cover.
pub const CONTENT_IMAGE_FRACTION: f64 = 0.5;

/// Build a content image scaled down to fit half the surface, centered.
pub fn content_image(image: &DecodedImage, surface: Size) -> Result<DesignObject, AssetError> {
    let natural = image.natural_size()?;
    let fit = (surface.width * CONTENT_IMAGE_FRACTION / natural.width)
        .min(surface.height * CONTENT_IMAGE_FRACTION / natural.height)
        .min(1.0);
    let mut geometry = Geometry::new(0.0, 0.0, natural.width, natural.height);
    geometry.scale_x = fit;
    geometry.scale_y = fit;
    geometry.left = (surface.width - geometry.scaled_width()) / 2.0;
    geometry.top = (surface.height - geometry.scaled_height()) / 2.0;
    Ok(DesignObject::new(image_kind(image, natural), geometry).with_style(image_style()))
}

/// Build a background image stretched over the whole surface.
pub fn background_image(image: &DecodedImage, surface: Size) -> Result<DesignObject, AssetError> {
    let natural = image.natural_size()?;
    let mut geometry = Geometry::new(0.0, 0.0, natural.width, natural.height);
    geometry.scale_x = surface.width / natural.width;
    geometry.scale_y = surface.height / natural.height;
    Ok(DesignObject::new(image_kind(image, natural), geometry)
        .with_style(image_style())
        .with_role(Role::Background))
}

/// Build an image that fills the box of a photo placeholder.
pub fn photo_fill(image: &DecodedImage, placeholder: &DesignObject) -> Result<DesignObject, AssetError> {
    let natural = image.natural_size()?;
    let target = placeholder.bounds();
    let mut geometry = Geometry::new(target.x0, target.y0, natural.width, natural.height);
    geometry.scale_x = target.width() / natural.width;
    geometry.scale_y = target.height() / natural.height;
    let mut object = DesignObject::new(image_kind(image, natural), geometry).with_style(image_style());
    object.role = placeholder.role.clone();
    object.field_name.clone_from(&placeholder.field_name);
    Ok(object)
}

fn image_kind(image: &DecodedImage, natural: Size) -> ObjectKind {
    ObjectKind::Image(ImageSource {
        src: image.src.clone(),
        natural_width: natural.width,
        natural_height: natural.height,
    })
}

fn image_style() -> PaintStyle {
    PaintStyle {
        fill: None,
        ..PaintStyle::default()
    }
}
