//! Rope-backed [`TextBuffer`].

use super::{ChangeListener, ListenerId, Marker, MarkerSet, TextBuffer};
use crate::error::{Result, SyncError};
use crate::operation::ChangeEvent;
use ropey::Rope;

/// Local text buffer backed by `ropey::Rope`.
///
/// O(log n) edits, synchronous change notification, self-adjusting markers.
///
/// # Example
///
/// ```rust
/// use synckit_bridge::{RopeBuffer, TextBuffer};
///
/// let mut buffer = RopeBuffer::from_str("hello world");
/// let marker = buffer.create_marker(5);
///
/// buffer.replace(0, 0, "XYZ").unwrap();
/// assert_eq!(marker.offset(), 8);
/// assert_eq!(buffer.content(), "XYZhello world");
/// ```
#[derive(Default)]
pub struct RopeBuffer {
    rope: Rope,
    markers: MarkerSet,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener: u64,
}

impl RopeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            ..Self::default()
        }
    }

    /// Underlying rope, for read-only access.
    pub fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, event: &ChangeEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }
}

impl std::fmt::Debug for RopeBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RopeBuffer")
            .field("len_chars", &self.rope.len_chars())
            .field("markers", &self.markers.live_count())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl TextBuffer for RopeBuffer {
    fn content(&self) -> String {
        self.rope.to_string()
    }

    fn set_content(&mut self, text: &str) {
        let event = ChangeEvent::new(0, self.rope.len_chars(), text);
        self.rope = Rope::from_str(text);
        self.markers.clamp(self.rope.len_chars());
        self.notify(&event);
    }

    fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    fn replace(&mut self, offset: usize, len: usize, text: &str) -> Result<()> {
        let doc_len = self.rope.len_chars();
        let end = offset.checked_add(len).filter(|end| *end <= doc_len);
        let Some(end) = end else {
            return Err(SyncError::OutOfBounds {
                offset,
                len,
                doc_len,
            });
        };

        if len == 0 && text.is_empty() {
            return Ok(());
        }

        self.rope.remove(offset..end);
        self.rope.insert(offset, text);

        let event = ChangeEvent::new(offset, len, text);
        self.markers.shift(&event);
        self.notify(&event);
        Ok(())
    }

    fn subscribe(&mut self, listener: ChangeListener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    fn create_marker(&mut self, offset: usize) -> Marker {
        self.markers.create(offset.min(self.rope.len_chars()))
    }
}
