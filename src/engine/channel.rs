//! Channel-backed engine adapter.
//!
//! Outbound calls become [`Outbound`] messages on an unbounded tokio channel,
//! so the thread that owns the buffer never waits on the network. A transport
//! task on the other end forwards them to the real engine.

use super::{DocumentContext, Outbound, RemoteEngine, Session};
use crate::awareness::CursorUpdate;
use crate::error::{Result, SyncError};
use crate::operation::Operation;
use tokio::sync::mpsc;

/// [`RemoteEngine`] that queues requests for a transport task.
///
/// The transport performs the actual join and hands the resulting
/// [`Session`] to [`ChannelEngine::new`]; `attach` then consumes it.
#[derive(Debug)]
pub struct ChannelEngine {
    session: Option<Session>,
    outbound: mpsc::UnboundedSender<Outbound>,
    attached: bool,
}

impl ChannelEngine {
    pub fn new(session: Session) -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let engine = Self {
            session: Some(session),
            outbound,
            attached: false,
        };
        (engine, rx)
    }

    fn push(&self, msg: Outbound) {
        if !self.attached {
            tracing::debug!(?msg, "engine detached, dropping outbound message");
            return;
        }
        if let Err(e) = self.outbound.send(msg) {
            tracing::debug!(msg = ?e.0, "transport closed, dropping outbound message");
        }
    }
}

impl RemoteEngine for ChannelEngine {
    fn attach(&mut self, document: &DocumentContext) -> Result<Session> {
        let session = self.session.take().ok_or(SyncError::Detached)?;
        self.attached = true;
        self.push(Outbound::Attach(document.clone()));
        Ok(session)
    }

    fn detach(&mut self, document: &DocumentContext) {
        self.push(Outbound::Detach(document.clone()));
        self.attached = false;
    }

    fn send(&mut self, op: Operation) {
        self.push(Outbound::Operation(op));
    }

    fn broadcast_cursor(&mut self, update: CursorUpdate) {
        self.push(Outbound::Cursor(update));
    }
}
