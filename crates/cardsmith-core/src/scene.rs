//! Ordered object store for one surface.
//!
//! List order is z-order (back to front). Background objects are kept in a
//! contiguous block at the bottom of the list.

use crate::error::{EditorError, EditorResult};
use crate::objects::{DesignObject, ObjectId, ObjectPatch};
use kurbo::Point;
use std::collections::HashSet;

/// Direction for z-order changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// One layer towards the front.
    Forward,
    /// One layer towards the back.
    Backward,
    /// Topmost.
    ToFront,
    /// Bottommost above any background.
    ToBack,
}

/// The scene graph of a surface.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    objects: Vec<DesignObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in z-order (back to front).
    pub fn iter(&self) -> impl Iterator<Item = &DesignObject> {
        self.objects.iter()
    }

    pub fn objects(&self) -> &[DesignObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&DesignObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut DesignObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|o| o.id() == id)
    }

    /// Number of background objects at the bottom of the list.
    pub fn background_count(&self) -> usize {
        self.objects
            .iter()
            .take_while(|o| o.role.is_background())
            .count()
    }

    /// Add an object on top (backgrounds go to z-order 0).
    pub fn add_object(&mut self, object: DesignObject) -> EditorResult<ObjectId> {
        let index = if object.role.is_background() {
            0
        } else {
            self.objects.len()
        };
        self.insert_at(index, object)
    }

    /// Insert an object at a z-index, keeping backgrounds at the bottom.
    pub fn insert_at(&mut self, index: usize, object: DesignObject) -> EditorResult<ObjectId> {
        let id = object.id();
        if self.contains(id) {
            return Err(EditorError::DuplicateObject(id));
        }
        let index = if object.role.is_background() {
            0
        } else {
            index.clamp(self.background_count(), self.objects.len())
        };
        self.objects.insert(index, object);
        Ok(id)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> EditorResult<DesignObject> {
        let index = self.index_of(id).ok_or(EditorError::ObjectNotFound(id))?;
        Ok(self.objects.remove(index))
    }

    /// Remove every object matching `predicate`, returning them in order.
    pub fn remove_where(&mut self, predicate: impl Fn(&DesignObject) -> bool) -> Vec<DesignObject> {
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.objects).into_iter().partition(|o| predicate(o));
        self.objects = kept;
        removed
    }

    /// Drop guide lines and any other transient objects.
    pub fn strip_transient(&mut self) -> usize {
        self.remove_where(|o| o.role.is_transient()).len()
    }

    /// Apply a partial update. Returns whether the object changed.
    pub fn update_object(&mut self, id: ObjectId, patch: &ObjectPatch) -> EditorResult<bool> {
        let object = self.get_mut(id).ok_or(EditorError::ObjectNotFound(id))?;
        Ok(object.apply_patch(patch))
    }

    /// All objects matching `predicate`, in z-order.
    pub fn query_all(&self, predicate: impl Fn(&DesignObject) -> bool) -> Vec<&DesignObject> {
        self.objects.iter().filter(|o| predicate(o)).collect()
    }

    /// Change an object's z-order. Returns whether it moved.
    ///
    /// Backgrounds never move, and nothing moves beneath them.
    pub fn reorder(&mut self, id: ObjectId, direction: ZOrder) -> EditorResult<bool> {
        let pos = self.index_of(id).ok_or(EditorError::ObjectNotFound(id))?;
        if self.objects[pos].role.is_background() {
            return Ok(false);
        }
        let floor = self.background_count();
        let top = self.objects.len() - 1;
        let target = match direction {
            ZOrder::Forward => (pos + 1).min(top),
            ZOrder::Backward => pos.saturating_sub(1).max(floor),
            ZOrder::ToFront => top,
            ZOrder::ToBack => floor,
        };
        if target == pos {
            return Ok(false);
        }
        let object = self.objects.remove(pos);
        self.objects.insert(target, object);
        Ok(true)
    }

    /// Replace the whole list, moving backgrounds to the bottom.
    ///
    /// A list with a repeated id is refused and the scene is left as it was.
    pub fn replace_all(&mut self, objects: Vec<DesignObject>) -> EditorResult<()> {
        ensure_unique_ids(&objects)?;
        let (mut backgrounds, rest): (Vec<_>, Vec<_>) =
            objects.into_iter().partition(|o| o.role.is_background());
        backgrounds.extend(rest);
        self.objects = backgrounds;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Refresh the cached hit-test bounds of every object.
    pub fn set_coords_all(&mut self) {
        for object in &mut self.objects {
            object.set_coords();
        }
    }

    /// Selectable objects under a point, front to back.
    pub fn objects_at_point(&self, point: Point, tolerance: f64) -> Vec<ObjectId> {
        self.objects
            .iter()
            .rev()
            .filter(|o| o.role.is_selectable() && o.hit_test(point, tolerance))
            .map(DesignObject::id)
            .collect()
    }
}

/// Fail on the first id that appears twice.
pub fn ensure_unique_ids(objects: &[DesignObject]) -> EditorResult<()> {
    let mut seen = HashSet::with_capacity(objects.len());
    match objects.iter().find(|o| !seen.insert(o.id())) {
        Some(duplicate) => {
            log::warn!("Rejected object list with duplicate id {}", duplicate.id());
            Err(EditorError::DuplicateObject(duplicate.id()))
        }
        None => Ok(()),
    }
}
