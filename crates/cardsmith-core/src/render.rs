//! Boundary with the rendering surface.
//!
//! The engine never rasterizes. Mutations queue `SurfaceEvent`s which the
//! host drains into its renderer.

use crate::objects::{DesignObject, ObjectId};
use crate::surface::Side;

/// A change the renderer needs to hear about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    ObjectAdded(ObjectId),
    ObjectRemoved(ObjectId),
    /// Objects changed in place, or the whole list was replaced.
    RepaintRequested,
}

/// Implemented by the host's renderer.
pub trait RenderSurface {
    fn add_object(&mut self, side: Side, object: &DesignObject);
    fn remove_object(&mut self, side: Side, id: ObjectId);
    fn request_repaint(&mut self, side: Side);
}
