//! In-memory storage implementation.
//!
//! Documents are held as serialized JSON, the same bytes `FileStorage`
//! writes, so a load always goes through the persisted format.

use super::{BoxFuture, PersistedDocument, Storage, StorageError, StorageResult};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Documents = BTreeMap<String, String>;

/// Process-local card storage, for tests and hosts without a disk.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<Documents>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.read().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw JSON stored under `id`.
    pub fn raw(&self, id: &str) -> Option<String> {
        self.read().ok()?.get(id).cloned()
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, Documents>> {
        self.documents
            .read()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, Documents>> {
        self.documents
            .write()
            .map_err(|e| StorageError::Other(format!("Lock error: {}", e)))
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &PersistedDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let json = document
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()));
        Box::pin(async move {
            let json = json?;
            self.write()?.insert(id.clone(), json);
            log::debug!("Stored card {} in memory", id);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let json = self
                .read()?
                .get(&id)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(id.clone()))?;
            let document = PersistedDocument::from_json(&json)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            document
                .check_layout()
                .map_err(|e| StorageError::Invalid(format!("{id}: {e}")))?;
            Ok(document)
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            self.write()?.remove(&id);
            Ok(())
        })
    }

    /// Ids in lexical order.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move { Ok(self.read()?.keys().cloned().collect()) })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move { Ok(self.read()?.contains_key(&id)) })
    }
}
