//! In-process shared-document engine.
//!
//! `MemoryEngine` is a loopback implementation of [`RemoteEngine`]: one hub
//! holds the authoritative replica and every cloned handle attaches as its own
//! participant. Operations are applied to the replica in arrival order and
//! queued for the other participants; cursor broadcasts are queued for every
//! participant, the sender included, the way a broadcast channel echoes.
//!
//! Delivery is explicit: the integration layer (or a test) drains a
//! participant's inbox with [`MemoryEngine::take_inbox`] and hands the
//! messages to the bridge on the owning thread.

use super::{DocumentContext, Inbound, ParticipantId, RemoteEngine, Session};
use crate::awareness::CursorUpdate;
use crate::buffer::{RopeBuffer, TextBuffer};
use crate::error::{Result, SyncError};
use crate::operation::Operation;
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

#[derive(Debug)]
struct Hub {
    document: DocumentContext,
    replica: RopeBuffer,
    inboxes: BTreeMap<ParticipantId, VecDeque<Inbound>>,
    log: Vec<(ParticipantId, Operation)>,
    cursors: Vec<CursorUpdate>,
    rejected: usize,
}

impl Hub {
    fn fan_out(&mut self, from: Option<&ParticipantId>, msg: &Inbound) {
        for (id, inbox) in self.inboxes.iter_mut() {
            if Some(id) != from {
                inbox.push_back(msg.clone());
            }
        }
    }

    fn check_document(&self, document: &DocumentContext) -> Result<()> {
        if *document != self.document {
            return Err(SyncError::Engine(format!(
                "unknown document {}",
                document.document_id
            )));
        }
        Ok(())
    }
}

/// Loopback engine handle. Clones share the hub; each clone attaches as a
/// separate participant.
///
/// # Example
///
/// ```rust
/// use synckit_bridge::{DocumentContext, MemoryEngine, Operation, RemoteEngine};
///
/// let doc = DocumentContext::new("doc-1");
/// let mut engine = MemoryEngine::new(doc.clone(), "abc");
///
/// let session = engine.attach(&doc).unwrap();
/// assert_eq!(session.content, "abc");
///
/// engine.send(Operation::insert(3, "d"));
/// assert_eq!(engine.content(), "abcd");
/// ```
#[derive(Debug)]
pub struct MemoryEngine {
    hub: Rc<RefCell<Hub>>,
    participant: Option<ParticipantId>,
}

impl Clone for MemoryEngine {
    /// A clone shares the hub but is not attached.
    fn clone(&self) -> Self {
        Self {
            hub: self.hub.clone(),
            participant: None,
        }
    }
}

impl MemoryEngine {
    pub fn new(document: DocumentContext, content: &str) -> Self {
        Self {
            hub: Rc::new(RefCell::new(Hub {
                document,
                replica: RopeBuffer::from_str(content),
                inboxes: BTreeMap::new(),
                log: Vec::new(),
                cursors: Vec::new(),
                rejected: 0,
            })),
            participant: None,
        }
    }

    /// Participant id of this handle, once attached.
    pub fn participant(&self) -> Option<&ParticipantId> {
        self.participant.as_ref()
    }

    /// Authoritative document text.
    pub fn content(&self) -> String {
        self.hub.borrow().replica.content()
    }

    /// Currently attached participants.
    pub fn attached(&self) -> Vec<ParticipantId> {
        self.hub.borrow().inboxes.keys().cloned().collect()
    }

    /// Every operation accepted so far, with its sender.
    pub fn sent(&self) -> Vec<(ParticipantId, Operation)> {
        self.hub.borrow().log.clone()
    }

    /// Every cursor update broadcast so far.
    pub fn broadcasts(&self) -> Vec<CursorUpdate> {
        self.hub.borrow().cursors.clone()
    }

    /// Number of operations that did not fit the replica.
    pub fn rejected(&self) -> usize {
        self.hub.borrow().rejected
    }

    /// Drain the pending notifications for `participant`.
    pub fn take_inbox(&self, participant: &ParticipantId) -> Vec<Inbound> {
        self.hub
            .borrow_mut()
            .inboxes
            .get_mut(participant)
            .map(|inbox| inbox.drain(..).collect())
            .unwrap_or_default()
    }

    /// Apply an edit on behalf of `from` (attached or not) and queue it for
    /// everyone else.
    pub fn remote_edit(&self, from: &ParticipantId, op: Operation) -> Result<()> {
        let mut hub = self.hub.borrow_mut();
        op.apply_to(&mut hub.replica)?;
        hub.log.push((from.clone(), op.clone()));
        hub.fan_out(Some(from), &op.into());
        Ok(())
    }

    /// Broadcast a cursor position on behalf of any participant.
    pub fn remote_cursor(&self, update: CursorUpdate) {
        let mut hub = self.hub.borrow_mut();
        hub.cursors.push(update.clone());
        hub.fan_out(None, &Inbound::RemoteCursor(update));
    }
}

impl RemoteEngine for MemoryEngine {
    fn attach(&mut self, document: &DocumentContext) -> Result<Session> {
        let mut hub = self.hub.borrow_mut();
        hub.check_document(document)?;

        let participant = self
            .participant
            .get_or_insert_with(ParticipantId::random)
            .clone();
        hub.inboxes.entry(participant.clone()).or_default();

        tracing::debug!(%participant, document = %document.document_id, "participant attached");
        Ok(Session {
            participant,
            content: hub.replica.content(),
        })
    }

    fn detach(&mut self, document: &DocumentContext) {
        if let Some(participant) = self.participant.take() {
            self.hub.borrow_mut().inboxes.remove(&participant);
            tracing::debug!(%participant, document = %document.document_id, "participant detached");
        }
    }

    fn send(&mut self, op: Operation) {
        let Some(from) = self.participant.as_ref() else {
            tracing::debug!(?op, "dropping operation from detached handle");
            return;
        };

        if let Err(e) = self.remote_edit(from, op) {
            tracing::warn!(participant = %from, "engine rejected operation: {e}");
            self.hub.borrow_mut().rejected += 1;
        }
    }

    fn broadcast_cursor(&mut self, update: CursorUpdate) {
        if self.participant.is_none() {
            return;
        }
        self.remote_cursor(update);
    }

    fn snapshot(&mut self, document: &DocumentContext) -> Result<String> {
        let hub = self.hub.borrow();
        hub.check_document(document)?;
        Ok(hub.replica.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> DocumentContext {
        DocumentContext::new("doc-1")
    }

    #[test]
    fn test_attach_assigns_distinct_participants() {
        let mut a = MemoryEngine::new(doc(), "abc");
        let mut b = a.clone();

        let sa = a.attach(&doc()).unwrap();
        let sb = b.attach(&doc()).unwrap();

        assert_ne!(sa.participant, sb.participant);
        assert_eq!(sb.content, "abc");
        assert_eq!(a.attached().len(), 2);
    }

    #[test]
    fn test_attach_unknown_document() {
        let mut engine = MemoryEngine::new(doc(), "");
        let result = engine.attach(&DocumentContext::new("other"));
        assert!(matches!(result, Err(SyncError::Engine(_))));
    }

    #[test]
    fn test_send_fans_out_to_others() {
        let mut a = MemoryEngine::new(doc(), "abc");
        let mut b = a.clone();
        let sa = a.attach(&doc()).unwrap();
        let sb = b.attach(&doc()).unwrap();

        a.send(Operation::insert(0, "Z"));

        assert_eq!(a.content(), "Zabc");
        assert!(a.take_inbox(&sa.participant).is_empty());
        assert_eq!(
            b.take_inbox(&sb.participant),
            vec![Inbound::RemoteInsert {
                offset: 0,
                text: "Z".to_string()
            }]
        );
    }

    #[test]
    fn test_rejected_operation() {
        let mut a = MemoryEngine::new(doc(), "abc");
        a.attach(&doc()).unwrap();

        a.send(Operation::remove(2, 5));
        assert_eq!(a.rejected(), 1);
        assert_eq!(a.content(), "abc");
        assert!(a.sent().is_empty());
    }

    #[test]
    fn test_cursor_broadcast_echoes_to_sender() {
        let mut a = MemoryEngine::new(doc(), "abc");
        let sa = a.attach(&doc()).unwrap();

        let update = CursorUpdate::new(sa.participant.clone(), 2, 1);
        a.broadcast_cursor(update.clone());

        assert_eq!(a.take_inbox(&sa.participant), vec![Inbound::RemoteCursor(update)]);
    }

    #[test]
    fn test_detached_handle_is_inert() {
        let mut a = MemoryEngine::new(doc(), "abc");
        a.attach(&doc()).unwrap();
        a.detach(&doc());

        a.send(Operation::insert(0, "x"));
        a.broadcast_cursor(CursorUpdate::new("ghost".into(), 0, 1));

        assert_eq!(a.content(), "abc");
        assert!(a.attached().is_empty());
        assert!(a.broadcasts().is_empty());
    }

    #[test]
    fn test_snapshot() {
        let mut a = MemoryEngine::new(doc(), "abc");
        a.remote_edit(&"peer".into(), Operation::insert(3, "d")).unwrap();
        assert_eq!(a.snapshot(&doc()).unwrap(), "abcd");
    }
}
