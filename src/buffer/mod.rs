//! Text Buffer contract
//!
//! The bridge never owns the editor's text storage; it talks to it through
//! [`TextBuffer`]. A buffer:
//!
//! - addresses text by zero-based char offsets
//! - applies `replace(offset, len, text)`, failing when the range does not fit
//! - reports every mutation synchronously to its listeners, including the
//!   mutations the bridge itself performs
//! - hands out live [`Marker`]s that it keeps valid across edits
//!
//! [`RopeBuffer`] is the crate's implementation on top of `ropey`.

mod marker;
mod rope;

pub use marker::{Marker, MarkerSet};
pub use rope::RopeBuffer;

use crate::error::Result;
use crate::operation::ChangeEvent;

/// Handle returned by [`TextBuffer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) u64);

/// Callback invoked after each buffer mutation.
pub type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// Mutable, listenable text storage owned by the host editor.
pub trait TextBuffer {
    /// Full text of the buffer.
    fn content(&self) -> String;

    /// Replace the whole content (snapshot load).
    ///
    /// Listeners see a single event covering the old content. Markers are
    /// clamped to the new length rather than shifted.
    fn set_content(&mut self, text: &str);

    /// Length in chars.
    fn len_chars(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len_chars() == 0
    }

    /// Remove `len` chars at `offset`, then insert `text` there.
    fn replace(&mut self, offset: usize, len: usize, text: &str) -> Result<()>;

    /// Register a listener for change events.
    fn subscribe(&mut self, listener: ChangeListener) -> ListenerId;

    /// Remove a listener. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: ListenerId);

    /// Create a live marker at `offset` (clamped to the current length).
    fn create_marker(&mut self, offset: usize) -> Marker;
}
