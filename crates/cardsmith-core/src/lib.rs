//! Cardsmith Core Library
//!
//! Live editing engine for print-card layouts: scene graph, constraint
//! enforcement, alignment and grid snapping, undo history, and the
//! front/back surface and page manager. Rendering, storage backends and the
//! asset pipeline are reached through the boundaries in `render`,
//! `persistence` and `assets`.

pub mod assets;
pub mod config;
pub mod constraints;
pub mod controller;
pub mod document;
pub mod error;
pub mod factory;
pub mod geometry;
pub mod history;
pub mod objects;
pub mod persistence;
pub mod render;
pub mod scene;
pub mod snap;
pub mod surface;
pub mod timer;

pub use assets::{AssetError, DecodedImage, ImagePlacement, LoadTicket};
pub use config::EditorConfig;
pub use controller::{MoveOutcome, SurfaceController};
pub use document::{CardDocument, ExportJob, Page};
pub use error::{EditorError, EditorResult};
pub use factory::ShapeRecipe;
pub use history::HistoryManager;
pub use objects::{DesignObject, Geometry, ObjectId, ObjectKind, ObjectPatch, Role};
pub use persistence::{MemoryStorage, PersistedDocument, Storage, StorageError};
pub use render::{RenderSurface, SurfaceEvent};
pub use scene::{SceneGraph, ZOrder};
pub use snap::{AlignmentMatch, SnapOutcome};
pub use surface::{Background, Side, Snapshot, Surface};
pub use timer::{Clock, ManualClock, SystemClock};
