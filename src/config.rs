//! Bridge configuration.
//!
//! ```rust
//! use synckit_bridge::BridgeConfig;
//!
//! let config = BridgeConfig::from_json(
//!     r#"{ "document": { "document_id": "notes.md" }, "resync_after_failures": 3 }"#,
//! ).unwrap();
//!
//! assert_eq!(config.document.document_id, "notes.md");
//! assert_eq!(config.resync_after_failures, Some(3));
//! ```

use crate::engine::DocumentContext;
use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Shared document to attach to
    pub document: DocumentContext,

    /// Reload a full snapshot after this many consecutive remote edits fail
    /// to fit the local buffer. `None` never resyncs.
    pub resync_after_failures: Option<u32>,
}

impl BridgeConfig {
    pub fn new(document: DocumentContext) -> Self {
        Self {
            document,
            ..Self::default()
        }
    }

    pub fn with_resync_after(mut self, failures: u32) -> Self {
        self.resync_after_failures = Some(failures);
        self
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SyncError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.resync_after_failures == Some(0) {
            return Err(SyncError::Config(
                "resync_after_failures must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
