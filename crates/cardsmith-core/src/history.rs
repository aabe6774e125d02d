//! Undo/redo history of one surface.
//!
//! History is a list of snapshots plus a pointer to the current one. Commits
//! either happen at once or after a trailing debounce window; undo flushes a
//! pending debounced commit first so the latest edit is never lost.

use crate::config::HistoryConfig;
use crate::error::EditorResult;
use crate::surface::{Snapshot, Surface};
use crate::timer::{Clock, DebounceTimer};
use std::sync::Arc;

/// Snapshot history for a single surface.
#[derive(Debug)]
pub struct HistoryManager {
    snapshots: Vec<Snapshot>,
    pointer: usize,
    max_depth: usize,
    timer: DebounceTimer,
    clock: Arc<dyn Clock>,
}

impl HistoryManager {
    /// Start a history whose only entry is the surface's current state.
    pub fn new(surface: &Surface, config: &HistoryConfig, clock: Arc<dyn Clock>) -> EditorResult<Self> {
        Ok(Self {
            snapshots: vec![surface.snapshot()?],
            pointer: 0,
            max_depth: config.max_depth.max(1),
            timer: DebounceTimer::new(config.debounce()),
            clock,
        })
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshots[self.pointer]
    }

    pub fn can_undo(&self) -> bool {
        self.pointer > 0 || self.timer.is_pending()
    }

    pub fn can_redo(&self) -> bool {
        self.pointer + 1 < self.snapshots.len()
    }

    pub fn has_pending(&self) -> bool {
        self.timer.is_pending()
    }

    /// Record the surface state.
    ///
    /// A debounced commit (re)starts the timer and is recorded by `tick` or
    /// `flush`. An immediate commit supersedes any pending one. Returns
    /// whether a new entry was recorded.
    pub fn commit(&mut self, surface: &Surface, immediate: bool) -> EditorResult<bool> {
        if !immediate {
            self.timer.schedule(self.clock.now());
            return Ok(false);
        }
        self.timer.cancel();
        self.record(surface)
    }

    /// Record a pending debounced commit whose window has elapsed.
    pub fn tick(&mut self, surface: &Surface) -> EditorResult<bool> {
        if !self.timer.is_due(self.clock.now()) {
            return Ok(false);
        }
        self.timer.cancel();
        self.record(surface)
    }

    /// Record a pending debounced commit now.
    pub fn flush(&mut self, surface: &Surface) -> EditorResult<bool> {
        if !self.timer.cancel() {
            return Ok(false);
        }
        self.record(surface)
    }

    fn record(&mut self, surface: &Surface) -> EditorResult<bool> {
        let snapshot = surface.snapshot()?;
        if snapshot == self.snapshots[self.pointer] {
            return Ok(false);
        }
        self.snapshots.truncate(self.pointer + 1);
        self.snapshots.push(snapshot);
        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
        }
        self.pointer = self.snapshots.len() - 1;
        log::debug!(
            "History commit: {} entries, pointer {}",
            self.snapshots.len(),
            self.pointer
        );
        Ok(true)
    }

    /// Step back one entry. Returns whether the surface changed.
    ///
    /// On a corrupt snapshot the error is returned and neither the pointer
    /// nor the surface is modified.
    pub fn undo(&mut self, surface: &mut Surface) -> EditorResult<bool> {
        self.flush(surface)?;
        if self.pointer == 0 {
            return Ok(false);
        }
        surface.restore(&self.snapshots[self.pointer - 1])?;
        self.pointer -= 1;
        log::debug!("Undo to entry {}", self.pointer);
        Ok(true)
    }

    /// Step forward one entry. Returns whether the surface changed.
    pub fn redo(&mut self, surface: &mut Surface) -> EditorResult<bool> {
        if !self.can_redo() {
            return Ok(false);
        }
        surface.restore(&self.snapshots[self.pointer + 1])?;
        self.pointer += 1;
        log::debug!("Redo to entry {}", self.pointer);
        Ok(true)
    }

    /// Discard everything and start over from the surface's current state.
    pub fn reset(&mut self, surface: &Surface) -> EditorResult<()> {
        let snapshot = surface.snapshot()?;
        self.timer.cancel();
        self.snapshots = vec![snapshot];
        self.pointer = 0;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn replace_entry(&mut self, index: usize, snapshot: Snapshot) {
        self.snapshots[index] = snapshot;
    }
}
