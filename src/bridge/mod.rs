//! Sync Bridge: keeps a local [`TextBuffer`] and a [`RemoteEngine`] convergent.
//!
//! ```text
//! buffer change ──► SyncBridge (unless suppressed) ──► engine.send(op)
//! engine inbound ──► SyncBridge ──► buffer.replace (suppressed echo)
//!                              └──► CursorOverlay (remote carets)
//! ```
//!
//! # Threading
//!
//! Everything here runs on the thread that owns the buffer. The bridge holds
//! `Rc`s, so it is `!Send`; the integration layer marshals engine callbacks
//! onto that thread before calling [`SyncBridge::handle_inbound`].
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use synckit_bridge::{
//!     BridgeConfig, DocumentContext, MemoryEngine, RopeBuffer, SyncBridge, TextBuffer,
//! };
//!
//! let doc = DocumentContext::new("doc-1");
//! let hub = MemoryEngine::new(doc.clone(), "abc");
//! let buffer = Rc::new(RefCell::new(RopeBuffer::new()));
//!
//! let mut bridge = SyncBridge::attach(buffer.clone(), hub.clone(), (), BridgeConfig::new(doc))
//!     .unwrap();
//! assert_eq!(buffer.borrow().content(), "abc");
//!
//! // Local edit is forwarded as remove + insert
//! buffer.borrow_mut().replace(1, 1, "XY").unwrap();
//! assert_eq!(hub.content(), "aXYc");
//!
//! // Remote edit is applied without echo
//! bridge.on_remote_insert(0, "Z");
//! assert_eq!(buffer.borrow().content(), "ZaXYc");
//! assert_eq!(hub.sent().len(), 2);
//! ```

mod guard;

pub use guard::{Suppressed, SyncGuard};

use crate::awareness::{CursorOverlay, OverlayPainter};
use crate::buffer::{ListenerId, TextBuffer};
use crate::config::BridgeConfig;
use crate::engine::{Inbound, ParticipantId, RemoteEngine};
use crate::error::Result;
use crate::operation::{ChangeEvent, Operation};
use std::cell::{Cell, Ref, RefCell};
use std::rc::Rc;

/// State shared between the bridge and its buffer listener.
struct EngineLink<E> {
    engine: RefCell<E>,
    guard: SyncGuard,
    attached: Cell<bool>,
}

impl<E: RemoteEngine> EngineLink<E> {
    fn forward(&self, event: &ChangeEvent) {
        if self.guard.is_active() {
            tracing::trace!(offset = event.offset, "suppressing echo of remote edit");
            return;
        }
        if !self.attached.get() {
            tracing::debug!(offset = event.offset, "bridge detached, local edit not forwarded");
            return;
        }

        let Ok(mut engine) = self.engine.try_borrow_mut() else {
            tracing::error!(offset = event.offset, "engine busy, local edit dropped");
            return;
        };
        for op in event.operations() {
            tracing::trace!(?op, "forwarding local edit");
            engine.send(op);
        }
    }
}

/// Bridge between one editor buffer and one shared document session.
///
/// Created by [`attach`](Self::attach) when the editor opens a shared
/// document; [`detach`](Self::detach) (or drop) ends the session.
pub struct SyncBridge<B, E, P>
where
    B: TextBuffer + 'static,
    E: RemoteEngine + 'static,
    P: OverlayPainter,
{
    buffer: Rc<RefCell<B>>,
    link: Rc<EngineLink<E>>,
    overlay: CursorOverlay<P>,
    config: BridgeConfig,
    listener: Option<ListenerId>,
    consecutive_failures: u32,
}

impl<B, E, P> SyncBridge<B, E, P>
where
    B: TextBuffer + 'static,
    E: RemoteEngine + 'static,
    P: OverlayPainter,
{
    /// Attach `buffer` to the engine's session for `config.document`.
    ///
    /// The engine's current content replaces the local content when they
    /// differ; that load is a snapshot and produces no operation. The bridge
    /// then subscribes to the buffer. The buffer must not be borrowed while
    /// this runs.
    pub fn attach(
        buffer: Rc<RefCell<B>>,
        mut engine: E,
        painter: P,
        config: BridgeConfig,
    ) -> Result<Self> {
        config.validate()?;
        let session = engine.attach(&config.document)?;

        let link = Rc::new(EngineLink {
            engine: RefCell::new(engine),
            guard: SyncGuard::new(),
            attached: Cell::new(true),
        });

        {
            let mut local = buffer.borrow_mut();
            if local.content() != session.content {
                tracing::info!(
                    document = %config.document.document_id,
                    local_len = local.len_chars(),
                    "replacing local content with remote snapshot"
                );
                let _suppressed = link.guard.suppress();
                local.set_content(&session.content);
            }
        }

        let forwarder = Rc::downgrade(&link);
        let listener = buffer
            .borrow_mut()
            .subscribe(Box::new(move |event: &ChangeEvent| {
                if let Some(link) = forwarder.upgrade() {
                    link.forward(event);
                }
            }));

        tracing::info!(
            participant = %session.participant,
            document = %config.document.document_id,
            "attached to shared document"
        );

        Ok(Self {
            buffer,
            link,
            overlay: CursorOverlay::new(session.participant, painter),
            config,
            listener: Some(listener),
            consecutive_failures: 0,
        })
    }

    /// Forward a local edit to the engine: remove first, then insert.
    ///
    /// Changes the buffer reports reach the engine through the bridge's
    /// subscription; call this only for changes the buffer did not report.
    /// No-op while a remote edit is being applied or after detach.
    pub fn on_local_change(&self, event: &ChangeEvent) {
        self.link.forward(event);
    }

    /// Apply a remote insert to the local buffer without echoing it.
    pub fn on_remote_insert(&mut self, offset: usize, text: &str) {
        self.apply_remote(Operation::insert(offset, text));
    }

    /// Apply a remote removal to the local buffer without echoing it.
    pub fn on_remote_remove(&mut self, offset: usize, len: usize) {
        self.apply_remote(Operation::remove(offset, len));
    }

    fn apply_remote(&mut self, op: Operation) {
        if !self.link.attached.get() {
            tracing::debug!(?op, "bridge detached, remote edit ignored");
            return;
        }

        let result = {
            let _suppressed = self.link.guard.suppress();
            let mut buffer = self.buffer.borrow_mut();
            op.apply_to(&mut *buffer)
        };

        match result {
            Ok(()) => {
                self.consecutive_failures = 0;
                self.repaint_cursors();
            }
            Err(err) => {
                let (kind, size) = match &op {
                    Operation::Insert { text, .. } => ("insert", text.chars().count()),
                    Operation::Remove { len, .. } => ("remove", *len),
                };
                tracing::error!(
                    offset = op.offset(),
                    size,
                    error = %err,
                    "bad location on remote {kind}"
                );
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.maybe_resync();
            }
        }
    }

    fn maybe_resync(&mut self) {
        let Some(limit) = self.config.resync_after_failures else {
            return;
        };
        if self.consecutive_failures < limit {
            return;
        }

        let Ok(mut engine) = self.link.engine.try_borrow_mut() else {
            tracing::error!("engine busy, resync postponed");
            return;
        };
        let snapshot = engine.snapshot(&self.config.document);
        drop(engine);
        match snapshot {
            Ok(content) => {
                tracing::warn!(
                    failures = self.consecutive_failures,
                    document = %self.config.document.document_id,
                    "local document drifted, reloading remote snapshot"
                );
                let suppressed = self.link.guard.suppress();
                self.buffer.borrow_mut().set_content(&content);
                drop(suppressed);
                self.consecutive_failures = 0;
                self.repaint_cursors();
            }
            Err(e) => tracing::warn!("resync snapshot failed: {e}"),
        }
    }

    /// Markers moved under the painter's last known offsets.
    fn repaint_cursors(&mut self) {
        if !self.overlay.is_empty() {
            self.overlay.painter_mut().request_repaint();
        }
    }

    /// Broadcast the local caret position.
    pub fn on_local_caret_move(&self, offset: usize) {
        if !self.link.attached.get() {
            return;
        }
        let Ok(mut engine) = self.link.engine.try_borrow_mut() else {
            tracing::error!(offset, "engine busy, local caret not broadcast");
            return;
        };
        engine.broadcast_cursor(self.overlay.local_update(offset));
    }

    /// Move (or create) a remote participant's caret. Our own id is ignored.
    pub fn on_remote_caret_move(&mut self, participant: &ParticipantId, offset: usize) -> bool {
        if !self.link.attached.get() {
            return false;
        }
        self.overlay
            .on_remote_caret_move(&mut *self.buffer.borrow_mut(), participant, offset)
    }

    /// Dispatch one engine notification.
    pub fn handle_inbound(&mut self, msg: Inbound) {
        match msg {
            Inbound::RemoteInsert { offset, text } => self.on_remote_insert(offset, &text),
            Inbound::RemoteRemove { offset, len } => self.on_remote_remove(offset, len),
            Inbound::RemoteCursor(update) => {
                if self.link.attached.get() {
                    self.overlay
                        .apply_update(&mut *self.buffer.borrow_mut(), &update);
                }
            }
        }
    }

    /// Handle every notification currently queued on `rx`.
    #[cfg(feature = "channel")]
    pub fn drain_inbound(
        &mut self,
        rx: &mut tokio::sync::mpsc::UnboundedReceiver<Inbound>,
    ) -> usize {
        let mut handled = 0;
        while let Ok(msg) = rx.try_recv() {
            self.handle_inbound(msg);
            handled += 1;
        }
        handled
    }

    /// Stop listening to the buffer and leave the session. Idempotent.
    pub fn detach(&mut self) {
        let was_attached = self.link.attached.replace(false);
        self.release_listener();
        if !was_attached {
            return;
        }

        match self.link.engine.try_borrow_mut() {
            Ok(mut engine) => engine.detach(&self.config.document),
            Err(_) => tracing::error!(
                document = %self.config.document.document_id,
                "engine busy, session not closed"
            ),
        }
        tracing::info!(
            participant = %self.overlay.self_id(),
            document = %self.config.document.document_id,
            "detached from shared document"
        );
    }

    /// Unsubscribe from the buffer. While the buffer is borrowed the id is
    /// kept, and the inert listener is removed by a later
    /// [`detach`](Self::detach) or on drop.
    fn release_listener(&mut self) {
        let Some(id) = self.listener.take() else {
            return;
        };
        match self.buffer.try_borrow_mut() {
            Ok(mut buffer) => buffer.unsubscribe(id),
            Err(_) => {
                tracing::warn!("buffer borrowed during detach, unsubscribe deferred");
                self.listener = Some(id);
            }
        }
    }

    pub fn is_attached(&self) -> bool {
        self.link.attached.get()
    }

    /// True only while a remote edit is being written into the buffer.
    pub fn is_suppressing(&self) -> bool {
        self.link.guard.is_active()
    }

    /// Identity the engine assigned at attach.
    pub fn participant(&self) -> &ParticipantId {
        self.overlay.self_id()
    }

    pub fn buffer(&self) -> &Rc<RefCell<B>> {
        &self.buffer
    }

    pub fn engine(&self) -> Ref<'_, E> {
        self.link.engine.borrow()
    }

    pub fn overlay(&self) -> &CursorOverlay<P> {
        &self.overlay
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }
}

impl<B, E, P> Drop for SyncBridge<B, E, P>
where
    B: TextBuffer + 'static,
    E: RemoteEngine + 'static,
    P: OverlayPainter,
{
    fn drop(&mut self) {
        self.detach();
    }
}
