//! Operations: the only channel of change between the local buffer and the
//! remote engine.
//!
//! Every operation is expressed against offsets valid in the document state
//! immediately before it is applied. A composite local edit (replace) is
//! decomposed into a remove followed by an insert, which is the order the
//! buffer reports them in.
//!
//! # Example
//!
//! ```rust
//! use synckit_bridge::{ChangeEvent, Operation};
//!
//! let event = ChangeEvent::new(1, 1, "XY");
//! let ops: Vec<Operation> = event.operations().collect();
//!
//! assert_eq!(
//!     ops,
//!     vec![Operation::remove(1, 1), Operation::insert(1, "XY")]
//! );
//! ```

use crate::buffer::TextBuffer;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// A single edit against the shared document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Operation {
    /// Insert `text` before char `offset`.
    Insert { offset: usize, text: String },

    /// Remove `len` chars starting at `offset`.
    Remove { offset: usize, len: usize },
}

impl Operation {
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Operation::Insert {
            offset,
            text: text.into(),
        }
    }

    pub fn remove(offset: usize, len: usize) -> Self {
        Operation::Remove { offset, len }
    }

    /// Start offset of the operation.
    pub fn offset(&self) -> usize {
        match self {
            Operation::Insert { offset, .. } | Operation::Remove { offset, .. } => *offset,
        }
    }

    /// Apply this operation to a buffer.
    ///
    /// Fails with [`SyncError::OutOfBounds`](crate::SyncError::OutOfBounds)
    /// when the range does not fit the buffer's current content.
    pub fn apply_to<B: TextBuffer + ?Sized>(&self, buffer: &mut B) -> Result<()> {
        match self {
            Operation::Insert { offset, text } => buffer.replace(*offset, 0, text),
            Operation::Remove { offset, len } => buffer.replace(*offset, *len, ""),
        }
    }
}

/// Mutation report emitted by a [`TextBuffer`] after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Char offset where the change starts
    pub offset: usize,

    /// Number of chars removed at `offset`
    pub removed_len: usize,

    /// Text inserted at `offset` after the removal
    pub inserted: String,
}

impl ChangeEvent {
    pub fn new(offset: usize, removed_len: usize, inserted: impl Into<String>) -> Self {
        Self {
            offset,
            removed_len,
            inserted: inserted.into(),
        }
    }

    /// True when the event neither removed nor inserted anything.
    pub fn is_empty(&self) -> bool {
        self.removed_len == 0 && self.inserted.is_empty()
    }

    /// Decompose into outbound operations: remove first, then insert.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        let remove = (self.removed_len > 0).then(|| Operation::remove(self.offset, self.removed_len));
        let insert =
            (!self.inserted.is_empty()).then(|| Operation::insert(self.offset, self.inserted.clone()));
        remove.into_iter().chain(insert)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::RopeBuffer;
    use crate::SyncError;

    #[test]
    fn test_pure_insert() {
        let ops: Vec<_> = ChangeEvent::new(3, 0, "abc").operations().collect();
        assert_eq!(ops, vec![Operation::insert(3, "abc")]);
    }

    #[test]
    fn test_pure_remove() {
        let ops: Vec<_> = ChangeEvent::new(2, 4, "").operations().collect();
        assert_eq!(ops, vec![Operation::remove(2, 4)]);
    }

    #[test]
    fn test_replace_orders_remove_first() {
        let ops: Vec<_> = ChangeEvent::new(1, 1, "XY").operations().collect();
        assert_eq!(ops, vec![Operation::remove(1, 1), Operation::insert(1, "XY")]);
    }

    #[test]
    fn test_empty_event_yields_nothing() {
        let event = ChangeEvent::new(0, 0, "");
        assert!(event.is_empty());
        assert_eq!(event.operations().count(), 0);
    }

    #[test]
    fn test_apply_to_buffer() {
        let mut buffer = RopeBuffer::from_str("abc");
        Operation::remove(1, 1).apply_to(&mut buffer).unwrap();
        Operation::insert(1, "XY").apply_to(&mut buffer).unwrap();
        assert_eq!(buffer.content(), "aXYc");
    }

    #[test]
    fn test_apply_out_of_bounds() {
        let mut buffer = RopeBuffer::from_str("abc");
        let result = Operation::remove(2, 5).apply_to(&mut buffer);
        assert_eq!(
            result,
            Err(SyncError::OutOfBounds {
                offset: 2,
                len: 5,
                doc_len: 3
            })
        );
        assert_eq!(buffer.content(), "abc");
    }

    #[test]
    fn test_serde_tagging() {
        let json = serde_json::to_string(&Operation::insert(0, "Z")).unwrap();
        assert_eq!(json, r#"{"type":"insert","offset":0,"text":"Z"}"#);

        let op: Operation = serde_json::from_str(r#"{"type":"remove","offset":2,"len":1}"#).unwrap();
        assert_eq!(op, Operation::remove(2, 1));
    }
}
