//! Editing controller for one surface.
//!
//! A `SurfaceController` owns a surface and its history and routes every
//! edit through the constraint enforcer, the snap engine and the history
//! manager. The document holds one for the front and optionally one for the
//! back; both run the same code.

use crate::assets::{self, AssetError, DecodedImage, ImagePlacement, LoadTicket};
use crate::config::EditorConfig;
use crate::constraints::{commit_resize, enforce_move, enforce_scale, fit_text};
use crate::error::{EditorError, EditorResult};
use crate::factory::{self, ShapeRecipe};
use crate::history::HistoryManager;
use crate::objects::{DesignObject, ObjectId, ObjectPatch, PhotoShape, Role};
use crate::render::{RenderSurface, SurfaceEvent};
use crate::scene::ZOrder;
use crate::snap::{self, AlignmentMatch};
use crate::surface::{Background, Side, Snapshot, Surface, SurfaceState};
use crate::timer::Clock;
use kurbo::{Point, Vec2};
use std::collections::HashMap;
use std::sync::Arc;

/// Offset applied to duplicated and pasted objects.
pub const DUPLICATE_OFFSET: f64 = 10.0;

/// Result of one drag step.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOutcome {
    /// Final top-left after snapping and clamping.
    pub position: Point,
    /// False when the object is locked and the move was rejected.
    pub accepted: bool,
    /// Alignment matches shown as guide lines.
    pub matches: Vec<AlignmentMatch>,
}

/// Controller for a single surface.
#[derive(Debug)]
pub struct SurfaceController {
    surface: Surface,
    history: HistoryManager,
    config: EditorConfig,
    zoom: f64,
    selection: Vec<ObjectId>,
    /// Position of each selected object when it was selected or last committed.
    anchors: HashMap<ObjectId, Point>,
    guides: Vec<ObjectId>,
    events: Vec<SurfaceEvent>,
    pending_loads: HashMap<u64, ImagePlacement>,
    next_ticket: u64,
    clipboard: Option<DesignObject>,
}

impl SurfaceController {
    pub fn new(side: Side, config: EditorConfig, clock: Arc<dyn Clock>) -> EditorResult<Self> {
        let surface = Surface::from_config(side, &config.surface);
        let history = HistoryManager::new(&surface, &config.history, clock)?;
        Ok(Self {
            surface,
            history,
            config,
            zoom: 1.0,
            selection: Vec::new(),
            anchors: HashMap::new(),
            guides: Vec::new(),
            events: Vec::new(),
            pending_loads: HashMap::new(),
            next_ticket: 1,
            clipboard: None,
        })
    }

    pub fn side(&self) -> Side {
        self.surface.side()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EditorConfig {
        &mut self.config
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() && zoom > 0.0 {
            self.zoom = zoom;
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&DesignObject> {
        self.surface.scene.get(id)
    }

    fn get_mut(&mut self, id: ObjectId) -> EditorResult<&mut DesignObject> {
        self.surface
            .scene
            .get_mut(id)
            .ok_or(EditorError::ObjectNotFound(id))
    }

    /// Ids of the current guide lines.
    pub fn guides(&self) -> &[ObjectId] {
        &self.guides
    }

    // --- Structural edits (immediate commits) ---

    /// Record any pending in-place edit as its own entry so the structural
    /// change that follows is undoable on its own.
    fn begin_structural(&mut self) -> EditorResult<()> {
        self.history.flush(&self.surface)?;
        Ok(())
    }

    /// Insert an object on top and record it in history.
    pub fn add_object(&mut self, object: DesignObject) -> EditorResult<ObjectId> {
        self.begin_structural()?;
        let id = self.surface.scene.add_object(object)?;
        self.events.push(SurfaceEvent::ObjectAdded(id));
        self.history.commit(&self.surface, true)?;
        Ok(id)
    }

    /// Build an object from a recipe, add it and select it.
    pub fn create(&mut self, recipe: &ShapeRecipe) -> EditorResult<ObjectId> {
        let object = factory::build(recipe, self.surface.size(), self.zoom);
        let id = self.add_object(object)?;
        self.select(id)?;
        Ok(id)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> EditorResult<DesignObject> {
        self.begin_structural()?;
        let removed = self.surface.scene.remove_object(id)?;
        self.deselect(id);
        self.events.push(SurfaceEvent::ObjectRemoved(id));
        self.history.commit(&self.surface, true)?;
        Ok(removed)
    }

    /// Remove every selected object as a single history entry.
    pub fn remove_selected(&mut self) -> EditorResult<usize> {
        self.begin_structural()?;
        let ids = std::mem::take(&mut self.selection);
        self.anchors.clear();
        let mut count = 0;
        for id in ids {
            if self.surface.scene.remove_object(id).is_ok() {
                self.events.push(SurfaceEvent::ObjectRemoved(id));
                count += 1;
            }
        }
        if count > 0 {
            self.history.commit(&self.surface, true)?;
        }
        Ok(count)
    }

    pub fn reorder(&mut self, id: ObjectId, direction: ZOrder) -> EditorResult<bool> {
        self.begin_structural()?;
        let moved = self.surface.scene.reorder(id, direction)?;
        if moved {
            self.events.push(SurfaceEvent::RepaintRequested);
            self.history.commit(&self.surface, true)?;
        }
        Ok(moved)
    }

    pub fn set_locked(&mut self, id: ObjectId, locked: bool) -> EditorResult<bool> {
        self.begin_structural()?;
        let object = self.get_mut(id)?;
        if object.locked == locked {
            return Ok(false);
        }
        object.locked = locked;
        let position = object.geometry.position();
        if self.anchors.contains_key(&id) {
            self.anchors.insert(id, position);
        }
        self.history.commit(&self.surface, true)?;
        Ok(true)
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> EditorResult<bool> {
        self.begin_structural()?;
        let object = self.get_mut(id)?;
        if object.visible == visible {
            return Ok(false);
        }
        object.visible = visible;
        self.events.push(SurfaceEvent::RepaintRequested);
        self.history.commit(&self.surface, true)?;
        Ok(true)
    }

    pub fn set_background(&mut self, background: Background) -> EditorResult<()> {
        self.begin_structural()?;
        let before = self.gradient_ids();
        self.surface.apply_background(background)?;
        let after = self.gradient_ids();
        for id in before.iter().filter(|id| !after.contains(id)) {
            self.events.push(SurfaceEvent::ObjectRemoved(*id));
        }
        for id in after.iter().filter(|id| !before.contains(id)) {
            self.events.push(SurfaceEvent::ObjectAdded(*id));
        }
        self.events.push(SurfaceEvent::RepaintRequested);
        self.history.commit(&self.surface, true)?;
        Ok(())
    }

    fn gradient_ids(&self) -> Vec<ObjectId> {
        self.surface
            .scene
            .query_all(|o| matches!(o.role, Role::GradientBackground(_)))
            .into_iter()
            .map(DesignObject::id)
            .collect()
    }

    /// Copy an object with a fresh id, offset and clamped into the surface.
    ///
    /// Backgrounds and guides cannot be duplicated.
    pub fn duplicate_object(&mut self, id: ObjectId) -> EditorResult<Option<ObjectId>> {
        let source = self
            .surface
            .scene
            .get(id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        if !source.role.is_selectable() {
            return Ok(None);
        }
        let copy = self.offset_copy(source.clone());
        let new_id = self.add_object(copy)?;
        Ok(Some(new_id))
    }

    fn offset_copy(&self, mut object: DesignObject) -> DesignObject {
        object.regenerate_id();
        object.locked = false;
        let target = object.geometry.position() + Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        enforce_move(&mut object, target, None, self.surface.size());
        object
    }

    pub fn copy(&mut self, id: ObjectId) -> EditorResult<bool> {
        let object = self
            .surface
            .scene
            .get(id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        if !object.role.is_selectable() {
            return Ok(false);
        }
        self.clipboard = Some(object.clone());
        Ok(true)
    }

    /// Paste the clipboard as a new object. Repeated pastes cascade.
    pub fn paste(&mut self) -> EditorResult<Option<ObjectId>> {
        let Some(source) = self.clipboard.clone() else {
            return Ok(None);
        };
        let copy = self.offset_copy(source);
        if let Some(clipboard) = &mut self.clipboard {
            clipboard.geometry.set_position(copy.geometry.position());
        }
        let id = self.add_object(copy)?;
        self.select(id)?;
        Ok(Some(id))
    }

    pub fn clipboard(&self) -> Option<&DesignObject> {
        self.clipboard.as_ref()
    }

    pub fn set_clipboard(&mut self, object: Option<DesignObject>) {
        self.clipboard = object;
    }

    /// Swap a photo placeholder's mask shape, keeping its box, z-index and
    /// bindings.
    pub fn replace_photo_shape(&mut self, id: ObjectId, shape: PhotoShape) -> EditorResult<Option<ObjectId>> {
        let index = self
            .surface
            .scene
            .index_of(id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        let old = &self.surface.scene.objects()[index];
        let Role::PhotoPlaceholder { mask_url, .. } = &old.role else {
            return Ok(None);
        };
        let mask_url = mask_url.clone();
        self.begin_structural()?;
        let old = &self.surface.scene.objects()[index];

        let mut replacement = factory::photo_placeholder(shape, self.surface.size(), self.zoom);
        replacement.role = Role::PhotoPlaceholder {
            shape,
            mask_url,
        };
        let target = old.bounds();
        let g = &mut replacement.geometry;
        g.left = target.x0;
        g.top = target.y0;
        g.angle = old.geometry.angle;
        if g.width > 0.0 {
            g.scale_x = target.width() / g.width;
        }
        if g.height > 0.0 {
            g.scale_y = target.height() / g.height;
        }
        replacement.field_name.clone_from(&old.field_name);
        replacement.layer_name.clone_from(&old.layer_name);
        replacement.locked = old.locked;
        replacement.visible = old.visible;

        let was_selected = self.selection.contains(&id);
        self.surface.scene.remove_object(id)?;
        self.deselect(id);
        let new_id = self.surface.scene.insert_at(index, replacement)?;
        self.events.push(SurfaceEvent::ObjectRemoved(id));
        self.events.push(SurfaceEvent::ObjectAdded(new_id));
        if was_selected {
            self.select(new_id)?;
        }
        self.history.commit(&self.surface, true)?;
        log::debug!("Replaced photo placeholder {id} with {shape:?} shape {new_id}");
        Ok(Some(new_id))
    }

    // --- In-place edits (debounced commits) ---

    /// Apply a partial update. Locked objects keep their position and scale.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> EditorResult<bool> {
        let size = self.surface.size();
        let object = self.get_mut(id)?;
        let changed = if object.locked {
            let patch = ObjectPatch {
                left: None,
                top: None,
                scale_x: None,
                scale_y: None,
                angle: None,
                ..patch.clone()
            };
            object.apply_patch(&patch)
        } else {
            let changed = object.apply_patch(patch);
            if changed {
                fit_text(object, size);
                let position = object.geometry.position();
                enforce_move(object, position, None, size);
                enforce_scale(object, size);
                object.set_coords();
            }
            changed
        };
        if changed {
            self.events.push(SurfaceEvent::RepaintRequested);
            self.history.commit(&self.surface, false)?;
        }
        Ok(changed)
    }

    /// Replace a text box's content (one debounced entry per typing pause).
    pub fn set_text(&mut self, id: ObjectId, text: impl Into<String>) -> EditorResult<bool> {
        self.update_object(id, &ObjectPatch::text(text))
    }

    // --- Selection ---

    pub fn selection(&self) -> &[ObjectId] {
        &self.selection
    }

    /// Make `id` the only selected object and remember its position.
    pub fn select(&mut self, id: ObjectId) -> EditorResult<bool> {
        let object = self
            .surface
            .scene
            .get(id)
            .ok_or(EditorError::ObjectNotFound(id))?;
        if !object.role.is_selectable() {
            return Ok(false);
        }
        let position = object.geometry.position();
        self.selection = vec![id];
        self.anchors.clear();
        self.anchors.insert(id, position);
        Ok(true)
    }

    /// Select every visible selectable object.
    pub fn select_all(&mut self) -> usize {
        self.anchors.clear();
        self.selection = self
            .surface
            .scene
            .iter()
            .filter(|o| o.role.is_selectable() && o.visible)
            .map(|o| {
                self.anchors.insert(o.id(), o.geometry.position());
                o.id()
            })
            .collect();
        self.selection.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.anchors.clear();
    }

    fn deselect(&mut self, id: ObjectId) {
        self.selection.retain(|s| *s != id);
        self.anchors.remove(&id);
    }

    /// Selectable objects under `point`, topmost first.
    pub fn objects_at_point(&self, point: Point) -> Vec<ObjectId> {
        let tolerance = 2.0 / self.zoom;
        self.surface.scene.objects_at_point(point, tolerance)
    }

    // --- Drag and resize ---

    fn clear_guides(&mut self) {
        for id in std::mem::take(&mut self.guides) {
            if self.surface.scene.remove_object(id).is_ok() {
                self.events.push(SurfaceEvent::ObjectRemoved(id));
            }
        }
    }

    /// Move an object during a drag: grid snap, alignment, then clamp.
    ///
    /// Guide lines from the previous step are replaced by the current
    /// matches. A locked object stays at its anchor.
    pub fn drag_move(&mut self, id: ObjectId, proposed: Point) -> EditorResult<MoveOutcome> {
        self.clear_guides();
        let size = self.surface.size();
        let anchor = self.anchors.get(&id).copied();
        let object = self
            .surface
            .scene
            .get(id)
            .ok_or(EditorError::ObjectNotFound(id))?;

        if !(proposed.x.is_finite() && proposed.y.is_finite()) {
            log::warn!("Rejected non-finite move of {id}");
            return Ok(MoveOutcome {
                position: object.geometry.position(),
                accepted: false,
                matches: Vec::new(),
            });
        }

        if object.locked {
            let object = self.get_mut(id)?;
            enforce_move(object, proposed, anchor, size);
            return Ok(MoveOutcome {
                position: object.geometry.position(),
                accepted: false,
                matches: Vec::new(),
            });
        }

        let outcome = snap::snap_move(object, proposed, self.surface.scene.objects(), size, &self.config);
        let object = self.get_mut(id)?;
        enforce_move(object, outcome.position, anchor, size);
        let position = object.geometry.position();

        for m in &outcome.matches {
            let guide = snap::guide_line(m.axis, m.coordinate, size);
            let guide_id = self.surface.scene.add_object(guide)?;
            self.guides.push(guide_id);
            self.events.push(SurfaceEvent::ObjectAdded(guide_id));
        }
        self.events.push(SurfaceEvent::RepaintRequested);
        Ok(MoveOutcome {
            position,
            accepted: true,
            matches: outcome.matches,
        })
    }

    /// Finish a drag: drop guides, refresh hit-test bounds, record history.
    pub fn end_drag(&mut self, id: ObjectId) -> EditorResult<()> {
        self.clear_guides();
        let object = self.get_mut(id)?;
        object.set_coords();
        let position = object.geometry.position();
        if self.anchors.contains_key(&id) {
            self.anchors.insert(id, position);
        }
        self.events.push(SurfaceEvent::RepaintRequested);
        self.history.commit(&self.surface, false)?;
        Ok(())
    }

    /// Move without drag bookkeeping (keyboard nudge, inspector edit).
    pub fn move_object(&mut self, id: ObjectId, proposed: Point) -> EditorResult<MoveOutcome> {
        let outcome = self.drag_move(id, proposed)?;
        self.end_drag(id)?;
        Ok(outcome)
    }

    /// Scale during a resize drag, reduced to stay inside the surface.
    pub fn scale_object(&mut self, id: ObjectId, scale_x: f64, scale_y: f64) -> EditorResult<bool> {
        if !(scale_x.is_finite() && scale_y.is_finite()) {
            return Ok(false);
        }
        let size = self.surface.size();
        let object = self.get_mut(id)?;
        if object.locked {
            log::warn!("Rejected resize of locked object {id}");
            return Ok(false);
        }
        object.geometry.scale_x = scale_x;
        object.geometry.scale_y = scale_y;
        enforce_scale(object, size);
        self.events.push(SurfaceEvent::RepaintRequested);
        Ok(true)
    }

    /// Finish a resize: bake text scale into layout, clamp, record history.
    pub fn end_resize(&mut self, id: ObjectId) -> EditorResult<()> {
        let size = self.surface.size();
        let object = self.get_mut(id)?;
        commit_resize(object);
        fit_text(object, size);
        let position = object.geometry.position();
        enforce_move(object, position, None, size);
        enforce_scale(object, size);
        object.set_coords();
        self.events.push(SurfaceEvent::RepaintRequested);
        self.history.commit(&self.surface, false)?;
        Ok(())
    }

    // --- History ---

    pub fn undo(&mut self) -> EditorResult<bool> {
        self.clear_guides();
        let changed = self.history.undo(&mut self.surface)?;
        if changed {
            self.after_reload();
        }
        Ok(changed)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        self.clear_guides();
        let changed = self.history.redo(&mut self.surface)?;
        if changed {
            self.after_reload();
        }
        Ok(changed)
    }

    /// Record a debounced commit whose window has elapsed.
    pub fn tick(&mut self) -> EditorResult<bool> {
        self.history.tick(&self.surface)
    }

    /// Record any pending debounced commit now.
    pub fn flush_history(&mut self) -> EditorResult<bool> {
        self.history.flush(&self.surface)
    }

    fn after_reload(&mut self) {
        self.guides.clear();
        let scene = &self.surface.scene;
        self.selection.retain(|id| scene.contains(*id));
        self.anchors.retain(|id, _| scene.contains(*id));
        self.events.push(SurfaceEvent::RepaintRequested);
    }

    // --- Pages and persistence ---

    /// Snapshot of the current content, pending edits included.
    pub fn snapshot(&mut self) -> EditorResult<Snapshot> {
        self.flush_history()?;
        self.surface.snapshot()
    }

    /// Load a page snapshot (or an empty surface) and restart history.
    ///
    /// A corrupt snapshot is reported and the surface is left as it was.
    pub fn load(&mut self, snapshot: Option<&Snapshot>) -> EditorResult<()> {
        let state = match snapshot {
            Some(snapshot) => snapshot.to_state()?,
            None => SurfaceState {
                objects: Vec::new(),
                background: Background::solid(self.config.surface.default_background),
            },
        };
        self.load_state(state)
    }

    /// Replace the content from a parsed state and restart history.
    pub fn load_state(&mut self, state: SurfaceState) -> EditorResult<()> {
        self.surface.load_state(state)?;
        self.clear_selection();
        self.guides.clear();
        self.history.reset(&self.surface)?;
        self.events.push(SurfaceEvent::RepaintRequested);
        Ok(())
    }

    // --- Assets ---

    /// Start an image load; the host completes it with `complete_image`.
    pub fn request_image(&mut self, placement: ImagePlacement) -> LoadTicket {
        let ticket = LoadTicket(self.next_ticket);
        self.next_ticket += 1;
        self.pending_loads.insert(ticket.0, placement);
        ticket
    }

    pub fn pending_loads(&self) -> usize {
        self.pending_loads.len()
    }

    /// Insert a decoded image. A failed decode inserts nothing.
    pub fn complete_image(
        &mut self,
        ticket: LoadTicket,
        result: Result<DecodedImage, AssetError>,
    ) -> EditorResult<ObjectId> {
        let placement = self
            .pending_loads
            .remove(&ticket.0)
            .ok_or(EditorError::UnknownTicket(ticket.0))?;
        let image = result.inspect_err(|e| log::warn!("Image load {} failed: {e}", ticket.0))?;
        let size = self.surface.size();
        self.begin_structural()?;

        match placement {
            ImagePlacement::Content => {
                let object = assets::content_image(&image, size)?;
                self.add_object(object)
            }
            ImagePlacement::Background => {
                let object = assets::background_image(&image, size)?;
                for old in self.surface.scene.remove_where(|o| o.role == Role::Background) {
                    self.events.push(SurfaceEvent::ObjectRemoved(old.id()));
                }
                self.add_object(object)
            }
            ImagePlacement::PhotoFill(target) => {
                let index = self
                    .surface
                    .scene
                    .index_of(target)
                    .ok_or(EditorError::ObjectNotFound(target))?;
                let object = assets::photo_fill(&image, &self.surface.scene.objects()[index])?;
                self.surface.scene.remove_object(target)?;
                self.deselect(target);
                let id = self.surface.scene.insert_at(index, object)?;
                self.events.push(SurfaceEvent::ObjectRemoved(target));
                self.events.push(SurfaceEvent::ObjectAdded(id));
                self.history.commit(&self.surface, true)?;
                Ok(id)
            }
        }
    }

    // --- Rendering ---

    pub fn drain_events(&mut self) -> Vec<SurfaceEvent> {
        std::mem::take(&mut self.events)
    }

    /// Deliver queued events to a renderer. Returns how many were delivered.
    pub fn flush_render(&mut self, target: &mut dyn RenderSurface) -> usize {
        let side = self.side();
        let events = self.drain_events();
        for event in &events {
            match *event {
                SurfaceEvent::ObjectAdded(id) => {
                    if let Some(object) = self.surface.scene.get(id) {
                        target.add_object(side, object);
                    }
                }
                SurfaceEvent::ObjectRemoved(id) => target.remove_object(side, id),
                SurfaceEvent::RepaintRequested => target.request_repaint(side),
            }
        }
        events.len()
    }
}
