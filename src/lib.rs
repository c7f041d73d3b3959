//! SyncKit Bridge - editor-side collaboration plumbing
//!
//! Connects a local, mutable text buffer owned by an editor to a remote
//! shared-document engine that holds the authoritative multi-user state.
//! It implements:
//! - Local edit propagation as insert/remove operations
//! - Echo-free application of remote edits (scoped re-entrancy guard)
//! - Remote participants' carets as live, self-adjusting markers
//! - Attach/detach session lifecycle with snapshot reconciliation
//!
//! Offsets are zero-based char (Unicode scalar value) offsets throughout.
//!
//! # Examples
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use synckit_bridge::{BridgeConfig, DocumentContext, MemoryEngine, RopeBuffer, SyncBridge, TextBuffer};
//!
//! let doc = DocumentContext::new("doc-123");
//! let hub = MemoryEngine::new(doc.clone(), "hello world");
//! let buffer = Rc::new(RefCell::new(RopeBuffer::new()));
//!
//! let mut bridge = SyncBridge::attach(buffer.clone(), hub.clone(), (), BridgeConfig::new(doc)).unwrap();
//!
//! let bob = "bob".into();
//! bridge.on_remote_caret_move(&bob, 5);
//! buffer.borrow_mut().replace(0, 0, "XYZ").unwrap();
//!
//! assert_eq!(bridge.overlay().cursor(&bob), Some(8));
//! assert_eq!(hub.content(), "XYZhello world");
//! ```

pub mod awareness;
pub mod bridge;
pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod operation;
pub mod protocol;

// Re-exports for convenience
pub use awareness::{CursorOverlay, CursorUpdate, OverlayPainter};
pub use bridge::{SyncBridge, SyncGuard};
pub use buffer::{Marker, RopeBuffer, TextBuffer};
pub use config::BridgeConfig;
pub use engine::{
    DocumentContext, Inbound, MemoryEngine, Outbound, ParticipantId, RemoteEngine, Session,
};
pub use error::{Result, SyncError};
pub use operation::{ChangeEvent, Operation};

#[cfg(feature = "channel")]
pub use engine::ChannelEngine;
