//! Live position markers
//!
//! A [`Marker`] is a handle to an offset owned by a buffer. The buffer shifts
//! every live marker on each mutation, so holders never recompute offsets.
//!
//! Shift rules for an edit at `p` removing `r` chars and inserting `n`:
//!
//! ```text
//! removal   m >= p + r      -> m - r
//!           p <= m < p + r  -> p        (clamped to removal start)
//! insertion m >= p          -> m + n    (insert at or before the marker)
//! ```

use crate::operation::ChangeEvent;
use std::cell::Cell;
use std::rc::{Rc, Weak};

/// Self-adjusting offset into a buffer.
///
/// Clones share the same position. Dropping every clone releases the
/// buffer's reference.
#[derive(Debug, Clone)]
pub struct Marker {
    offset: Rc<Cell<usize>>,
}

impl Marker {
    /// Current char offset.
    pub fn offset(&self) -> usize {
        self.offset.get()
    }

    /// Move the marker. Callers must keep `offset` within the document.
    pub fn set_offset(&self, offset: usize) {
        self.offset.set(offset);
    }
}

/// Registry of live markers held by a buffer implementation.
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Weak<Cell<usize>>>,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new marker at `offset`.
    pub fn create(&mut self, offset: usize) -> Marker {
        let cell = Rc::new(Cell::new(offset));
        self.markers.push(Rc::downgrade(&cell));
        Marker { offset: cell }
    }

    /// Number of markers still referenced by a holder.
    pub fn live_count(&self) -> usize {
        self.markers.iter().filter(|m| m.strong_count() > 0).count()
    }

    /// Shift all live markers for `event` and drop released ones.
    pub fn shift(&mut self, event: &ChangeEvent) {
        let start = event.offset;
        let removed_end = start + event.removed_len;
        let inserted = event.inserted.chars().count();

        self.markers.retain(|weak| {
            let Some(cell) = weak.upgrade() else {
                return false;
            };

            let mut m = cell.get();
            if m >= removed_end {
                m -= event.removed_len;
            } else if m > start {
                m = start;
            }
            if m >= start {
                m += inserted;
            }
            cell.set(m);
            true
        });
    }

    /// Clamp every marker into `0..=len` (used for whole-content loads).
    pub fn clamp(&mut self, len: usize) {
        self.markers.retain(|weak| match weak.upgrade() {
            Some(cell) => {
                cell.set(cell.get().min(len));
                true
            }
            None => false,
        });
    }
}
