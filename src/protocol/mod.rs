//! JSON wire format for bridge ↔ engine messages
//!
//! Transports that carry [`Outbound`] requests to an engine and [`Inbound`]
//! notifications back use these helpers so both ends agree on the shape:
//!
//! ```text
//! {"type":"operation","payload":{"type":"insert","offset":0,"text":"Z"}}
//! {"type":"remote_cursor","participant":"bob","offset":4,"clock":7}
//! ```

use crate::engine::{Inbound, Outbound};
use crate::error::Result;

/// Encode a request for the engine.
pub fn encode_outbound(msg: &Outbound) -> Result<String> {
    Ok(serde_json::to_string(msg)?)
}

/// Decode a request on the engine side.
pub fn decode_outbound(json: &str) -> Result<Outbound> {
    Ok(serde_json::from_str(json)?)
}

/// Encode a notification for a bridge.
pub fn encode_inbound(msg: &Inbound) -> Result<String> {
    Ok(serde_json::to_string(msg)?)
}

/// Decode a notification on the bridge side.
pub fn decode_inbound(json: &str) -> Result<Inbound> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CursorUpdate, DocumentContext, Operation, SyncError};

    #[test]
    fn test_outbound_operation_shape() {
        let json = encode_outbound(&Outbound::Operation(Operation::insert(0, "Z"))).unwrap();
        assert_eq!(
            json,
            r#"{"type":"operation","payload":{"type":"insert","offset":0,"text":"Z"}}"#
        );
    }

    #[test]
    fn test_outbound_detach_decodes() {
        let msg = decode_outbound(r#"{"type":"detach","payload":{"document_id":"doc-1"}}"#).unwrap();
        assert_eq!(msg, Outbound::Detach(DocumentContext::new("doc-1")));
    }

    #[test]
    fn test_inbound_cursor_shape() {
        let msg = Inbound::RemoteCursor(CursorUpdate::new("bob".into(), 4, 7));
        let json = encode_inbound(&msg).unwrap();
        assert_eq!(
            json,
            r#"{"type":"remote_cursor","participant":"bob","offset":4,"clock":7}"#
        );
        assert_eq!(decode_inbound(&json).unwrap(), msg);
    }

    #[test]
    fn test_inbound_remove_decodes() {
        let msg = decode_inbound(r#"{"type":"remote_remove","offset":1,"len":2}"#).unwrap();
        assert_eq!(msg, Inbound::RemoteRemove { offset: 1, len: 2 });
    }

    #[test]
    fn test_malformed_message() {
        let result = decode_inbound(r#"{"type":"remote_teleport"}"#);
        assert!(matches!(result, Err(SyncError::Protocol(_))));
    }
}
