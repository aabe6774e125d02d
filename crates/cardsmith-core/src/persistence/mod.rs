//! Persisted document format and storage backends.
//!
//! The top-level `objects` and `background` mirror the first page so
//! single-page consumers can read the file unchanged. Page-aware readers use
//! the reserved `__pages` array.

mod file;
mod memory;

pub use file::{CARD_SUFFIX, FileStorage};
pub use memory::MemoryStorage;

use crate::error::EditorResult;
use crate::objects::DesignObject;
use crate::scene::ensure_unique_ids;
use crate::surface::{Background, SurfaceState};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Key of the page array in the persisted JSON.
pub const PAGES_KEY: &str = "__pages";

/// One page entry of a persisted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: Uuid,
    pub name: String,
    /// Content of the page; `None` for a page that was never edited.
    #[serde(default)]
    pub snapshot: Option<SurfaceState>,
}

/// A document as handed to the persistence store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedDocument {
    pub objects: Vec<DesignObject>,
    #[serde(default)]
    pub background: Background,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back: Option<SurfaceState>,
    #[serde(rename = "__pages", default, skip_serializing_if = "Vec::is_empty")]
    pub pages: Vec<PageRecord>,
}

impl PersistedDocument {
    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Content of the first page, read from `__pages` when present and the
    /// top-level mirror otherwise.
    pub fn first_page(&self) -> SurfaceState {
        self.pages
            .first()
            .and_then(|p| p.snapshot.clone())
            .unwrap_or_else(|| SurfaceState {
                objects: self.objects.clone(),
                background: self.background.clone(),
            })
    }

    /// Check that every surface in the document (top-level mirror, back
    /// side, each page) has unique object ids.
    pub fn check_layout(&self) -> EditorResult<()> {
        ensure_unique_ids(&self.objects)?;
        if let Some(back) = &self.back {
            ensure_unique_ids(&back.objects)?;
        }
        for state in self.pages.iter().filter_map(|p| p.snapshot.as_ref()) {
            ensure_unique_ids(&state.objects)?;
        }
        Ok(())
    }
}

/// Drop objects that are never written to storage (guides and rendered
/// barcode/QR visuals).
pub fn persisted_only(mut state: SurfaceState) -> SurfaceState {
    state.objects.retain(|o| o.role.is_persisted());
    state
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Invalid card layout: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async storage operations.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Document storage backend.
///
/// Documents come back exactly as they were saved; rehydrating them into
/// live objects is the caller's job.
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &PersistedDocument) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a document.
    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDocument>>;

    /// Delete a document.
    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all document IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Geometry, ObjectKind, Role};

    fn rect(role: Role) -> DesignObject {
        DesignObject::new(
            ObjectKind::Rectangle { corner_radius: 0.0 },
            Geometry::new(0.0, 0.0, 10.0, 10.0),
        )
        .with_role(role)
    }

    #[test]
    fn test_pages_key_name() {
        let doc = PersistedDocument {
            objects: Vec::new(),
            background: Background::default(),
            back: None,
            pages: vec![PageRecord {
                id: Uuid::new_v4(),
                name: "Page 1".to_string(),
                snapshot: None,
            }],
        };
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get(PAGES_KEY).is_some());
        assert!(value.get("back").is_none());
    }

    #[test]
    fn test_single_page_document_reads_top_level() {
        let json = r##"{"objects": [], "background": {"type": "solid", "color": {"r": 0, "g": 0, "b": 0, "a": 255}}}"##;
        let doc = PersistedDocument::from_json(json).unwrap();
        assert!(doc.pages.is_empty());
        let first = doc.first_page();
        assert!(first.objects.is_empty());
        assert_ne!(first.background, Background::default());
    }

    #[test]
    fn test_persisted_only_filters_visuals() {
        let state = SurfaceState {
            objects: vec![
                rect(Role::Content),
                rect(Role::BarcodeVisual),
                rect(Role::QrVisual),
                rect(Role::Barcode {
                    format: Default::default(),
                }),
            ],
            background: Background::default(),
        };
        let filtered = persisted_only(state);
        assert_eq!(filtered.objects.len(), 2);
    }
}
