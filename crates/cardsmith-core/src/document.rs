//! Card document: front and back surfaces plus the page list.
//!
//! Pages paginate the front surface only. Switching pages stores the live
//! front content into the current page entry, loads the target entry and
//! restarts the front history, so page switches are not undoable.

use crate::config::EditorConfig;
use crate::controller::SurfaceController;
use crate::error::{EditorError, EditorResult};
use crate::persistence::{PageRecord, PersistedDocument, persisted_only};
use crate::surface::{Background, Side, Snapshot, SurfaceState};
use crate::timer::{Clock, SystemClock};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// A named page of front-side content.
#[derive(Debug, Clone)]
pub struct Page {
    pub id: Uuid,
    pub name: String,
    /// Stored content; `None` until the page is first left.
    pub snapshot: Option<Snapshot>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            snapshot: None,
        }
    }
}

/// Everything the print pipeline needs to reproduce the editor output.
#[derive(Debug, Clone, Serialize)]
pub struct ExportJob {
    pub width_mm: f64,
    pub height_mm: f64,
    pub dpi: f64,
    /// Front content of every page, in page order.
    pub pages: Vec<SurfaceState>,
    pub back: Option<SurfaceState>,
}

/// A card document being edited.
#[derive(Debug)]
pub struct CardDocument {
    config: EditorConfig,
    clock: Arc<dyn Clock>,
    front: SurfaceController,
    back: Option<SurfaceController>,
    pages: Vec<Page>,
    current_page: usize,
    active_side: Side,
}

impl CardDocument {
    /// Empty single-page document using the wall clock.
    pub fn new(config: EditorConfig) -> EditorResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: EditorConfig, clock: Arc<dyn Clock>) -> EditorResult<Self> {
        config.validate()?;
        let front = SurfaceController::new(Side::Front, config.clone(), clock.clone())?;
        Ok(Self {
            config,
            clock,
            front,
            back: None,
            pages: vec![Page::new("Page 1")],
            current_page: 0,
            active_side: Side::Front,
        })
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn front(&self) -> &SurfaceController {
        &self.front
    }

    pub fn front_mut(&mut self) -> &mut SurfaceController {
        &mut self.front
    }

    pub fn back(&self) -> Option<&SurfaceController> {
        self.back.as_ref()
    }

    pub fn back_mut(&mut self) -> Option<&mut SurfaceController> {
        self.back.as_mut()
    }

    pub fn has_back(&self) -> bool {
        self.back.is_some()
    }

    pub fn active_side(&self) -> Side {
        self.active_side
    }

    /// Controller of the side being edited.
    pub fn active(&self) -> &SurfaceController {
        match (self.active_side, &self.back) {
            (Side::Back, Some(back)) => back,
            _ => &self.front,
        }
    }

    pub fn active_mut(&mut self) -> &mut SurfaceController {
        match (self.active_side, &mut self.back) {
            (Side::Back, Some(back)) => back,
            _ => &mut self.front,
        }
    }

    pub fn set_active_side(&mut self, side: Side) -> EditorResult<()> {
        if side == Side::Back && self.back.is_none() {
            return Err(EditorError::NoBackSide);
        }
        self.active_side = side;
        Ok(())
    }

    /// Create or dispose the back surface.
    pub fn set_has_back(&mut self, enabled: bool) -> EditorResult<()> {
        match (enabled, self.back.is_some()) {
            (true, false) => {
                self.back = Some(SurfaceController::new(
                    Side::Back,
                    self.config.clone(),
                    self.clock.clone(),
                )?);
                log::debug!("Back side enabled");
            }
            (false, true) => {
                self.back = None;
                self.active_side = Side::Front;
                log::debug!("Back side disposed");
            }
            _ => {}
        }
        Ok(())
    }

    // --- Pages ---

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    fn check_index(&self, index: usize) -> EditorResult<()> {
        if index >= self.pages.len() {
            log::warn!("Page index {} out of range ({} pages)", index, self.pages.len());
            return Err(EditorError::PageOutOfRange {
                index,
                count: self.pages.len(),
            });
        }
        Ok(())
    }

    /// Store the live front content into the current page entry.
    fn store_current(&mut self) -> EditorResult<()> {
        let snapshot = self.front.snapshot()?;
        self.pages[self.current_page].snapshot = Some(snapshot);
        Ok(())
    }

    fn load_page(&mut self, index: usize) -> EditorResult<()> {
        self.front.load(self.pages[index].snapshot.as_ref())?;
        self.current_page = index;
        log::debug!("Switched to page {} ({})", index, self.pages[index].name);
        Ok(())
    }

    pub fn select_page(&mut self, index: usize) -> EditorResult<()> {
        self.check_index(index)?;
        self.store_current()?;
        self.load_page(index)
    }

    /// Append an empty page and switch to it. Returns its index.
    pub fn add_page(&mut self) -> EditorResult<usize> {
        self.store_current()?;
        let index = self.pages.len();
        self.pages.push(Page::new(format!("Page {}", index + 1)));
        self.load_page(index)?;
        Ok(index)
    }

    /// Copy a page right after itself and switch to the copy.
    pub fn duplicate_page(&mut self, index: usize) -> EditorResult<usize> {
        self.check_index(index)?;
        self.store_current()?;
        let source = &self.pages[index];
        let copy = Page {
            id: Uuid::new_v4(),
            name: format!("{} (copy)", source.name),
            snapshot: source.snapshot.clone(),
        };
        self.pages.insert(index + 1, copy);
        if self.current_page > index {
            self.current_page += 1;
        }
        self.load_page(index + 1)?;
        Ok(index + 1)
    }

    /// Delete a page. The last remaining page cannot be deleted.
    pub fn delete_page(&mut self, index: usize) -> EditorResult<()> {
        self.check_index(index)?;
        if self.pages.len() == 1 {
            log::warn!("Refused to delete the last page");
            return Err(EditorError::LastPage);
        }
        // Parse the page that becomes current before changing anything.
        if index == self.current_page {
            let next = if index == 0 { 1 } else { index - 1 };
            if let Some(snapshot) = &self.pages[next].snapshot {
                snapshot.to_state()?;
            }
        }

        self.pages.remove(index);
        if index < self.current_page {
            self.current_page -= 1;
        } else if index == self.current_page {
            self.load_page(self.current_page.saturating_sub(1))?;
        }
        Ok(())
    }

    pub fn rename_page(&mut self, index: usize, name: impl Into<String>) -> EditorResult<()> {
        self.check_index(index)?;
        self.pages[index].name = name.into();
        Ok(())
    }

    // --- Persistence and export ---

    /// Content of every page, the current one taken from the live surface.
    fn page_states(&mut self) -> EditorResult<Vec<Option<SurfaceState>>> {
        self.store_current()?;
        self.pages
            .iter()
            .map(|page| page.snapshot.as_ref().map(Snapshot::to_state).transpose())
            .collect()
    }

    /// Build the document handed to the persistence store.
    pub fn to_persisted(&mut self) -> EditorResult<PersistedDocument> {
        let states = self.page_states()?;
        let pages: Vec<PageRecord> = self
            .pages
            .iter()
            .zip(states)
            .map(|(page, state)| PageRecord {
                id: page.id,
                name: page.name.clone(),
                snapshot: state.map(persisted_only),
            })
            .collect();
        let first = pages
            .first()
            .and_then(|p| p.snapshot.clone())
            .unwrap_or_else(|| self.empty_state());
        let back = match &mut self.back {
            Some(back) => {
                back.flush_history()?;
                Some(back.surface().persisted_state())
            }
            None => None,
        };
        Ok(PersistedDocument {
            objects: first.objects,
            background: first.background,
            back,
            pages,
        })
    }

    /// Rehydrate a persisted document. Documents without a page list load
    /// as a single page.
    pub fn from_persisted(
        document: &PersistedDocument,
        config: EditorConfig,
        clock: Arc<dyn Clock>,
    ) -> EditorResult<Self> {
        let mut doc = Self::with_clock(config, clock)?;
        if document.pages.is_empty() {
            doc.front.load_state(document.first_page())?;
        } else {
            doc.pages = document
                .pages
                .iter()
                .map(|record| -> EditorResult<Page> {
                    let snapshot = record.snapshot.as_ref().map(Snapshot::from_state).transpose()?;
                    Ok(Page {
                        id: record.id,
                        name: record.name.clone(),
                        snapshot,
                    })
                })
                .collect::<EditorResult<Vec<_>>>()?;
            doc.load_page(0)?;
        }
        if let Some(back) = &document.back {
            doc.set_has_back(true)?;
            if let Some(controller) = doc.back.as_mut() {
                controller.load_state(back.clone())?;
            }
        }
        log::debug!("Loaded document with {} page(s)", doc.pages.len());
        Ok(doc)
    }

    fn empty_state(&self) -> SurfaceState {
        SurfaceState {
            objects: Vec::new(),
            background: Background::solid(self.config.surface.default_background),
        }
    }

    /// Describe the document for the print pipeline. Geometry is exactly the
    /// in-editor geometry.
    pub fn export_job(&mut self, dpi: f64) -> EditorResult<ExportJob> {
        let pages = self
            .page_states()?
            .into_iter()
            .map(|state| state.map(persisted_only).unwrap_or_else(|| self.empty_state()))
            .collect();
        let back = match &mut self.back {
            Some(back) => {
                back.flush_history()?;
                Some(back.surface().persisted_state())
            }
            None => None,
        };
        Ok(ExportJob {
            width_mm: self.config.surface.width_mm,
            height_mm: self.config.surface.height_mm,
            dpi,
            pages,
            back,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::ShapeRecipe;
    use crate::timer::ManualClock;

    fn document() -> CardDocument {
        CardDocument::with_clock(EditorConfig::default(), Arc::new(ManualClock::new())).unwrap()
    }

    #[test]
    fn test_new_document_has_one_page() {
        let doc = document();
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.current_page(), 0);
        assert!(!doc.has_back());
    }

    #[test]
    fn test_pages_keep_their_content() {
        let mut doc = document();
        let first = doc.front_mut().create(&ShapeRecipe::rectangle()).unwrap();
        assert_eq!(doc.add_page().unwrap(), 1);
        assert!(doc.front().surface().scene.is_empty());
        assert_eq!(doc.front().history().len(), 1);

        doc.select_page(0).unwrap();
        assert!(doc.front().get(first).is_some());
        assert!(doc.front().selection().is_empty());
        assert!(!doc.front().history().can_undo());
    }

    #[test]
    fn test_duplicate_page() {
        let mut doc = document();
        let id = doc.front_mut().create(&ShapeRecipe::rectangle()).unwrap();
        doc.add_page().unwrap();
        assert_eq!(doc.duplicate_page(0).unwrap(), 1);
        assert_eq!(doc.page_count(), 3);
        assert_eq!(doc.current_page(), 1);
        assert_eq!(doc.pages()[1].name, "Page 1 (copy)");
        assert!(doc.front().get(id).is_some());
    }

    #[test]
    fn test_delete_last_page_rejected() {
        let mut doc = document();
        assert!(matches!(doc.delete_page(0), Err(EditorError::LastPage)));
        assert_eq!(doc.page_count(), 1);
        assert!(matches!(
            doc.delete_page(3),
            Err(EditorError::PageOutOfRange { index: 3, count: 1 })
        ));
    }

    #[test]
    fn test_delete_shifts_current_index() {
        let mut doc = document();
        doc.add_page().unwrap();
        doc.add_page().unwrap();
        assert_eq!(doc.current_page(), 2);
        doc.delete_page(0).unwrap();
        assert_eq!(doc.current_page(), 1);
        assert_eq!(doc.pages()[1].name, "Page 3");
    }

    #[test]
    fn test_delete_current_page_loads_previous() {
        let mut doc = document();
        let id = doc.front_mut().create(&ShapeRecipe::rectangle()).unwrap();
        doc.add_page().unwrap();
        doc.delete_page(1).unwrap();
        assert_eq!(doc.current_page(), 0);
        assert!(doc.front().get(id).is_some());
    }

    #[test]
    fn test_rename_page() {
        let mut doc = document();
        doc.rename_page(0, "Front design").unwrap();
        assert_eq!(doc.pages()[0].name, "Front design");
        assert!(doc.rename_page(1, "x").is_err());
    }

    #[test]
    fn test_back_side_toggle() {
        let mut doc = document();
        assert!(matches!(
            doc.set_active_side(Side::Back),
            Err(EditorError::NoBackSide)
        ));
        doc.set_has_back(true).unwrap();
        doc.set_active_side(Side::Back).unwrap();
        let id = doc.active_mut().create(&ShapeRecipe::rectangle()).unwrap();
        assert_eq!(doc.active().side(), Side::Back);
        assert!(doc.front().get(id).is_none());

        doc.set_has_back(false).unwrap();
        assert_eq!(doc.active_side(), Side::Front);
        assert!(doc.back().is_none());
    }

    #[test]
    fn test_export_job() {
        let mut doc = document();
        doc.front_mut().create(&ShapeRecipe::rectangle()).unwrap();
        doc.add_page().unwrap();
        let job = doc.export_job(300.0).unwrap();
        assert_eq!(job.pages.len(), 2);
        assert_eq!(job.pages[0].objects.len(), 1);
        assert!(job.pages[1].objects.is_empty());
        assert!((job.width_mm - 85.6).abs() < f64::EPSILON);
        assert!(job.back.is_none());
    }
}
