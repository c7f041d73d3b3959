/// Remote cursor overlay
///
/// Maps each remote participant to a live [`Marker`] in the local buffer.
/// Markers are created on a participant's first cursor notification, moved
/// on later ones, and shifted by the buffer on every edit. Entries live for
/// the whole session.
use super::clock::IncreasingClock;
use crate::buffer::{Marker, TextBuffer};
use crate::engine::ParticipantId;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Cursor position broadcast on the engine's cursor channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorUpdate {
    pub participant: ParticipantId,
    pub offset: usize,

    /// Sender's cursor clock
    pub clock: u64,
}

impl CursorUpdate {
    pub fn new(participant: ParticipantId, offset: usize, clock: u64) -> Self {
        Self {
            participant,
            offset,
            clock,
        }
    }
}

/// Rendering surface for remote carets.
///
/// The overlay only decides which participant sits at which offset; colors
/// and drawing belong to the host.
pub trait OverlayPainter {
    fn register_or_update_marker(&mut self, participant: &ParticipantId, offset: usize);

    /// Also requested after remote edits shift existing carets; read live
    /// offsets from [`CursorOverlay::cursors`] when repainting.
    fn request_repaint(&mut self);
}

/// Headless hosts.
impl OverlayPainter for () {
    fn register_or_update_marker(&mut self, _participant: &ParticipantId, _offset: usize) {}

    fn request_repaint(&mut self) {}
}

/// Participant → marker map for one document.
#[derive(Debug)]
pub struct CursorOverlay<P> {
    self_id: ParticipantId,
    cursors: HashMap<ParticipantId, Marker>,
    clock: IncreasingClock,
    painter: P,
}

impl<P: OverlayPainter> CursorOverlay<P> {
    pub fn new(self_id: ParticipantId, painter: P) -> Self {
        Self {
            self_id,
            cursors: HashMap::new(),
            clock: IncreasingClock::new(),
            painter,
        }
    }

    /// Identity used to filter our own broadcasts.
    pub fn self_id(&self) -> &ParticipantId {
        &self.self_id
    }

    /// Stamp the local caret position for broadcasting.
    pub fn local_update(&self, offset: usize) -> CursorUpdate {
        CursorUpdate::new(self.self_id.clone(), offset, self.clock.tick())
    }

    /// Place `participant`'s caret at `offset`.
    ///
    /// Our own id is ignored. Offsets past the end of the buffer are clamped
    /// to its length. Returns whether the overlay changed.
    pub fn on_remote_caret_move<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        participant: &ParticipantId,
        offset: usize,
    ) -> bool {
        if *participant == self.self_id {
            tracing::trace!(%participant, offset, "ignoring own cursor echo");
            return false;
        }
        self.place(buffer, participant, offset)
    }

    /// Apply a clocked update from the engine's cursor channel.
    ///
    /// The engine owns delivery order, so the update is placed like
    /// [`on_remote_caret_move`](Self::on_remote_caret_move); its clock only
    /// advances our own, keeping local stamps ahead of everything observed.
    pub fn apply_update<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        update: &CursorUpdate,
    ) -> bool {
        if update.participant == self.self_id {
            tracing::trace!(participant = %update.participant, "ignoring own cursor echo");
            return false;
        }

        self.clock.observe(update.clock);
        self.place(buffer, &update.participant, update.offset)
    }

    fn place<B: TextBuffer + ?Sized>(
        &mut self,
        buffer: &mut B,
        participant: &ParticipantId,
        offset: usize,
    ) -> bool {
        let len = buffer.len_chars();
        let offset = if offset > len {
            tracing::debug!(%participant, offset, len, "clamping remote cursor to document end");
            len
        } else {
            offset
        };

        match self.cursors.entry(participant.clone()) {
            Entry::Occupied(entry) => entry.into_mut().set_offset(offset),
            Entry::Vacant(entry) => {
                entry.insert(buffer.create_marker(offset));
            }
        }

        self.painter.register_or_update_marker(participant, offset);
        self.painter.request_repaint();
        true
    }

    /// Current offset of a participant's caret.
    pub fn cursor(&self, participant: &ParticipantId) -> Option<usize> {
        self.cursors.get(participant).map(Marker::offset)
    }

    /// All remote carets with their live offsets.
    pub fn cursors(&self) -> impl Iterator<Item = (&ParticipantId, usize)> + '_ {
        self.cursors.iter().map(|(id, m)| (id, m.offset()))
    }

    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    pub fn painter(&self) -> &P {
        &self.painter
    }

    pub fn painter_mut(&mut self) -> &mut P {
        &mut self.painter
    }
}
