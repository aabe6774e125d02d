//! Card files on disk.
//!
//! Each card lives in `<id>.card.json` under one directory. Writes go to a
//! sibling temp file first and are renamed into place, so a reader never
//! sees half a card.

use super::{BoxFuture, PersistedDocument, Storage, StorageError, StorageResult};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Suffix of card files.
pub const CARD_SUFFIX: &str = ".card.json";
const TEMP_SUFFIX: &str = ".card.json.tmp";

/// Directory of card files.
pub struct FileStorage {
    base_path: PathBuf,
}

/// Map an id to a file stem that cannot leave the directory.
fn file_stem(id: &str) -> String {
    id.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

fn io_error(action: &str, path: &Path, err: io::Error) -> StorageError {
    StorageError::Io(format!("Failed to {action} {}: {err}", path.display()))
}

impl FileStorage {
    /// Open the card directory at `base_path`, creating it if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).map_err(|e| io_error("create", &base_path, e))?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Path of the card file for `id`.
    pub fn card_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}{CARD_SUFFIX}", file_stem(id)))
    }

    fn temp_path(&self, id: &str) -> PathBuf {
        self.base_path.join(format!("{}{TEMP_SUFFIX}", file_stem(id)))
    }

    fn read_card(path: &Path, id: String) -> StorageResult<PersistedDocument> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StorageError::NotFound(id)),
            Err(e) => return Err(io_error("read", path, e)),
        };
        let document = PersistedDocument::from_json(&json)
            .map_err(|e| StorageError::Serialization(format!("{}: {e}", path.display())))?;
        document
            .check_layout()
            .map_err(|e| StorageError::Invalid(format!("{}: {e}", path.display())))?;
        Ok(document)
    }
}

impl Storage for FileStorage {
    fn save(&self, id: &str, document: &PersistedDocument) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.card_path(id);
        let temp = self.temp_path(id);
        let json = document
            .to_json_pretty()
            .map_err(|e| StorageError::Serialization(e.to_string()));
        Box::pin(async move {
            fs::write(&temp, json?).map_err(|e| io_error("write", &temp, e))?;
            fs::rename(&temp, &path).map_err(|e| io_error("replace", &path, e))?;
            log::debug!("Saved card to {}", path.display());
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PersistedDocument>> {
        let path = self.card_path(id);
        let id = id.to_string();
        Box::pin(async move { Self::read_card(&path, id) })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.card_path(id);
        Box::pin(async move {
            match fs::remove_file(&path) {
                Err(e) if e.kind() != io::ErrorKind::NotFound => Err(io_error("delete", &path, e)),
                _ => Ok(()),
            }
        })
    }

    /// Ids of the stored cards, sorted. Leftover temp files are ignored.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let entries =
                fs::read_dir(&self.base_path).map_err(|e| io_error("list", &self.base_path, e))?;
            let mut ids: Vec<String> = entries
                .flatten()
                .filter_map(|entry| {
                    let name = entry.file_name().into_string().ok()?;
                    name.strip_suffix(CARD_SUFFIX).map(str::to_string)
                })
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let path = self.card_path(id);
        Box::pin(async move { Ok(path.is_file()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{DesignObject, Geometry, ObjectKind};
    use crate::persistence::block_on;
    use crate::surface::{Background, SurfaceState};
    use tempfile::tempdir;

    fn card(objects: Vec<DesignObject>) -> PersistedDocument {
        PersistedDocument {
            objects,
            background: Background::default(),
            back: None,
            pages: Vec::new(),
        }
    }

    fn ellipse() -> DesignObject {
        DesignObject::new(ObjectKind::Ellipse, Geometry::new(5.0, 5.0, 20.0, 20.0))
    }

    #[test]
    fn test_save_load_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        block_on(storage.save("badge", &card(vec![ellipse()]))).unwrap();
        assert!(dir.path().join("badge.card.json").exists());
        assert!(!dir.path().join("badge.card.json.tmp").exists());
        let loaded = block_on(storage.load("badge")).unwrap();
        assert_eq!(loaded.objects.len(), 1);

        block_on(storage.delete("badge")).unwrap();
        assert!(!block_on(storage.exists("badge")).unwrap());
        block_on(storage.delete("badge")).unwrap();
    }

    #[test]
    fn test_ids_cannot_escape_directory() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("cards")).unwrap();
        block_on(storage.save("../escape", &card(Vec::new()))).unwrap();
        assert!(storage.card_path("../escape").starts_with(storage.base_path()));
        assert_eq!(block_on(storage.list()).unwrap(), vec!["___escape".to_string()]);
    }

    #[test]
    fn test_list_skips_temp_and_foreign_files() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        block_on(storage.save("visitor", &card(Vec::new()))).unwrap();
        block_on(storage.save("staff", &card(Vec::new()))).unwrap();
        fs::write(dir.path().join("crash.card.json.tmp"), "{").unwrap();
        fs::write(dir.path().join("notes.json"), "{}").unwrap();

        assert_eq!(block_on(storage.list()).unwrap(), vec!["staff", "visitor"]);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested")).unwrap();
        assert!(matches!(
            block_on(storage.load("nope")),
            Err(StorageError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn test_load_rejects_duplicate_ids_on_back() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        let logo = ellipse();
        let mut document = card(Vec::new());
        document.back = Some(SurfaceState {
            objects: vec![logo.clone(), logo],
            background: Background::default(),
        });
        block_on(storage.save("broken", &document)).unwrap();

        assert!(matches!(
            block_on(storage.load("broken")),
            Err(StorageError::Invalid(_))
        ));
    }

    #[test]
    fn test_load_reports_unparsable_card() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        fs::write(storage.card_path("torn"), "{\"objects\": [").unwrap();
        assert!(matches!(
            block_on(storage.load("torn")),
            Err(StorageError::Serialization(_))
        ));
    }
}
