//! Remote Engine contract
//!
//! The remote engine holds the authoritative, multi-user copy of the
//! document. Its merge algorithm, transport and persistence are its own
//! business; the bridge only needs:
//!
//! - `attach` / `detach` for the session lifecycle
//! - fire-and-forget `send` for local operations
//! - `broadcast_cursor` for the local caret
//!
//! Inbound traffic ([`Inbound`]) is delivered by the integration layer,
//! already marshaled onto the thread that owns the text buffer.

mod memory;

#[cfg(feature = "channel")]
mod channel;

pub use memory::MemoryEngine;

#[cfg(feature = "channel")]
pub use channel::ChannelEngine;

use crate::awareness::CursorUpdate;
use crate::error::{Result, SyncError};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Engine-assigned identity of a session participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Fresh random id. Only engines should mint these.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Identifies which shared document a bridge attaches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DocumentContext {
    pub document_id: String,
}

impl DocumentContext {
    pub fn new(document_id: impl Into<String>) -> Self {
        Self {
            document_id: document_id.into(),
        }
    }
}

/// Result of a successful attach.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Identity the engine assigned to this participant
    pub participant: ParticipantId,

    /// Current authoritative document text
    pub content: String,
}

/// Notifications the engine delivers to the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    RemoteInsert { offset: usize, text: String },
    RemoteRemove { offset: usize, len: usize },
    RemoteCursor(CursorUpdate),
}

impl From<Operation> for Inbound {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Insert { offset, text } => Inbound::RemoteInsert { offset, text },
            Operation::Remove { offset, len } => Inbound::RemoteRemove { offset, len },
        }
    }
}

/// Requests the bridge makes of the engine, as carried over a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Outbound {
    Attach(DocumentContext),
    Detach(DocumentContext),
    Operation(Operation),
    Cursor(CursorUpdate),
}

/// The bridge's view of the shared-document engine.
pub trait RemoteEngine {
    /// Join the document session and fetch its current content.
    fn attach(&mut self, document: &DocumentContext) -> Result<Session>;

    /// Leave the session so the engine can release its resources.
    fn detach(&mut self, document: &DocumentContext);

    /// Forward a local operation. Must not block on acknowledgment.
    fn send(&mut self, op: Operation);

    fn send_insert(&mut self, offset: usize, text: &str) {
        self.send(Operation::insert(offset, text));
    }

    fn send_remove(&mut self, offset: usize, len: usize) {
        self.send(Operation::remove(offset, len));
    }

    /// Publish the local caret position on the cursor channel.
    fn broadcast_cursor(&mut self, update: CursorUpdate);

    /// Fetch a full snapshot of the document, for resynchronization.
    fn snapshot(&mut self, document: &DocumentContext) -> Result<String> {
        Err(SyncError::Engine(format!(
            "snapshot of {} not supported",
            document.document_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_id_serializes_transparently() {
        let id = ParticipantId::new("alice");
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""alice""#);
        assert_eq!(id.to_string(), "alice");
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(ParticipantId::random(), ParticipantId::random());
    }

    #[test]
    fn test_operation_into_inbound() {
        assert_eq!(
            Inbound::from(Operation::insert(0, "Z")),
            Inbound::RemoteInsert {
                offset: 0,
                text: "Z".to_string()
            }
        );
        assert_eq!(
            Inbound::from(Operation::remove(2, 3)),
            Inbound::RemoteRemove { offset: 2, len: 3 }
        );
    }
}
