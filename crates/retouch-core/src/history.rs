//! Bounded undo history of whole-image snapshots.
//!
//! Undo restores a previously archived raster rather than inverting an
//! operation. The stack is LIFO with no redo; when full, the oldest entry is
//! evicted.

use std::collections::VecDeque;

use crate::raster::Raster;

/// Most-recent-first stack of archived rasters.
#[derive(Debug, Clone)]
pub struct UndoStack {
    entries: VecDeque<Raster>,
    capacity: usize,
}

impl UndoStack {
    /// Create an empty stack. A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Archive a raster, evicting the oldest entry past capacity.
    /// Returns the evicted raster, if any.
    pub fn push(&mut self, raster: Raster) -> Option<Raster> {
        self.entries.push_front(raster);
        if self.entries.len() > self.capacity {
            let evicted = self.entries.pop_back();
            tracing::debug!(capacity = self.capacity, "undo history full, evicted oldest entry");
            return evicted;
        }
        None
    }

    /// Remove and return the most recent entry.
    pub fn pop(&mut self) -> Option<Raster> {
        self.entries.pop_front()
    }

    /// Most recent entry without removing it.
    pub fn peek(&self) -> Option<&Raster> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Raster> {
        self.entries.iter()
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new(10)
    }
}
