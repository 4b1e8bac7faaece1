//! Log batch exports.

use portico_core::ShapedEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A batch of exported log events.
///
/// Recognized by the top-level key `awslogs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogExport {
    /// The export envelope.
    pub awslogs: LogPayload,
}

impl ShapedEvent for LogExport {
    const TAG: &'static str = "log-export";

    fn matches(document: &Value) -> bool {
        document.get("awslogs").is_some()
    }
}

/// The export payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogPayload {
    /// Base64-encoded, gzip-compressed batch of log events, exactly as
    /// delivered on the wire.
    pub data: String,
}
