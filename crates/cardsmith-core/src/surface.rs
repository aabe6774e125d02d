//! Printable surfaces and their serialized snapshots.

use crate::config::SurfaceConfig;
use crate::error::{EditorError, EditorResult};
use crate::objects::{
    DesignObject, Geometry, GradientDescriptor, ObjectKind, PaintStyle, Role, SerializableColor,
};
use crate::scene::{SceneGraph, ensure_unique_ids};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Which face of the card a surface represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Front,
    Back,
}

/// Background paint of a surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid { color: SerializableColor },
    Gradient(GradientDescriptor),
}

impl Background {
    pub fn solid(color: SerializableColor) -> Self {
        Background::Solid { color }
    }
}

impl Default for Background {
    fn default() -> Self {
        Background::solid(SerializableColor::white())
    }
}

/// Serialized form of a surface's content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceState {
    pub objects: Vec<DesignObject>,
    #[serde(default)]
    pub background: Background,
}

/// Immutable serialized copy of a surface, compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot(String);

impl Snapshot {
    /// Serialize a state.
    ///
    /// Non-finite geometry is refused: JSON would write it as `null` and the
    /// snapshot could never be read back.
    pub fn from_state(state: &SurfaceState) -> EditorResult<Self> {
        if let Some(object) = state.objects.iter().find(|o| !o.geometry.is_finite()) {
            return Err(EditorError::CorruptSnapshot(format!(
                "non-finite geometry on object {}",
                object.id()
            )));
        }
        Ok(Self(serde_json::to_string(state)?))
    }

    /// Wrap previously serialized JSON without parsing it.
    pub fn from_json(json: impl Into<String>) -> Self {
        Self(json.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse back into a state.
    ///
    /// Object ids must be unique within the state.
    pub fn to_state(&self) -> EditorResult<SurfaceState> {
        let state: SurfaceState =
            serde_json::from_str(&self.0).map_err(|e| EditorError::CorruptSnapshot(e.to_string()))?;
        ensure_unique_ids(&state.objects)?;
        Ok(state)
    }
}

/// One printable face.
#[derive(Debug, Clone)]
pub struct Surface {
    side: Side,
    size: Size,
    pub background: Background,
    pub scene: SceneGraph,
}

impl Surface {
    pub fn new(side: Side, size: Size) -> Self {
        Self {
            side,
            size,
            background: Background::default(),
            scene: SceneGraph::new(),
        }
    }

    /// Surface sized from physical dimensions.
    pub fn from_config(side: Side, config: &SurfaceConfig) -> Self {
        let mut surface = Self::new(side, config.pixel_size());
        surface.background = Background::solid(config.default_background);
        surface
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn width(&self) -> f64 {
        self.size.width
    }

    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// Snapshot for history: transient objects stripped.
    pub fn snapshot(&self) -> EditorResult<Snapshot> {
        Snapshot::from_state(&self.state_filtered(|o| !o.role.is_transient()))
    }

    /// State for the persistence store: non-persisted objects stripped.
    pub fn persisted_state(&self) -> SurfaceState {
        self.state_filtered(|o| o.role.is_persisted())
    }

    fn state_filtered(&self, keep: impl Fn(&DesignObject) -> bool) -> SurfaceState {
        SurfaceState {
            objects: self.scene.iter().filter(|o| keep(o)).cloned().collect(),
            background: self.background.clone(),
        }
    }

    /// Replace content from a snapshot.
    ///
    /// The snapshot is fully parsed before anything is touched, so a corrupt
    /// snapshot leaves the surface unchanged.
    pub fn restore(&mut self, snapshot: &Snapshot) -> EditorResult<()> {
        let state = snapshot.to_state()?;
        self.load_state(state)
    }

    /// Replace content from a parsed state. Nothing changes on error.
    pub fn load_state(&mut self, state: SurfaceState) -> EditorResult<()> {
        self.scene.replace_all(state.objects)?;
        self.scene.strip_transient();
        self.scene.set_coords_all();
        self.background = state.background;
        Ok(())
    }

    /// Empty the surface and reset the background.
    pub fn reset(&mut self, background: Background) {
        self.scene.clear();
        self.background = background;
    }

    /// Apply a background. Gradients are realised as a full-surface object
    /// at z-order 0; a solid color removes it.
    pub fn apply_background(&mut self, background: Background) -> EditorResult<()> {
        self.scene
            .remove_where(|o| matches!(o.role, Role::GradientBackground(_)));
        if let Background::Gradient(gradient) = &background {
            let fill = DesignObject::new(
                ObjectKind::Rectangle { corner_radius: 0.0 },
                Geometry::new(0.0, 0.0, self.size.width, self.size.height),
            )
            .with_style(PaintStyle {
                fill: None,
                ..PaintStyle::default()
            })
            .with_role(Role::GradientBackground(gradient.clone()));
            self.scene.add_object(fill)?;
        }
        self.background = background;
        Ok(())
    }
}
