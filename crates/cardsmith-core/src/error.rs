//! Error types for the editing engine.

use crate::objects::ObjectId;
use thiserror::Error;

/// Errors surfaced by editing operations.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("Object not found: {0}")]
    ObjectNotFound(ObjectId),
    #[error("Duplicate object id: {0}")]
    DuplicateObject(ObjectId),
    #[error("Page index {index} out of range ({count} pages)")]
    PageOutOfRange { index: usize, count: usize },
    #[error("Cannot delete the last remaining page")]
    LastPage,
    #[error("Document has no back side")]
    NoBackSide,
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Asset error: {0}")]
    Asset(#[from] crate::assets::AssetError),
    #[error("Unknown asset load ticket: {0}")]
    UnknownTicket(u64),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for editing operations.
pub type EditorResult<T> = Result<T, EditorError>;
