//! Error types for the sync bridge.

use thiserror::Error;

/// Errors produced while bridging a local buffer and a remote engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SyncError {
    /// An edit's range does not fit the current document.
    #[error("edit {offset}+{len} out of bounds (document length: {doc_len})")]
    OutOfBounds {
        offset: usize,
        len: usize,
        doc_len: usize,
    },

    /// The bridge or engine session has already been torn down.
    #[error("document session detached")]
    Detached,

    /// The remote engine rejected or failed a request.
    #[error("engine error: {0}")]
    Engine(String),

    /// A wire message could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid bridge configuration.
    #[error("invalid config: {0}")]
    Config(String),
}

impl From<serde_json::Error> for SyncError {
    fn from(e: serde_json::Error) -> Self {
        SyncError::Protocol(e.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SyncError>;
