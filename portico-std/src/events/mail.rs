//! Inbound mail notifications.

use chrono::{DateTime, Utc};
use portico_core::ShapedEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification for a received mail message.
///
/// This shape cannot be told apart from the other `Records[]` envelopes by
/// structure alone, so its predicate intentionally never fires and inputs
/// carrying it are routed to the default handler. The type is still
/// provided so a default handler can decode it explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailNotification {
    /// One record per received message.
    #[serde(rename = "Records", default)]
    pub records: Vec<MailRecord>,
}

impl ShapedEvent for MailNotification {
    const TAG: &'static str = "mail-notification";

    fn matches(_document: &Value) -> bool {
        false
    }
}

/// One received-mail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    /// Originating service identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    /// The receipt envelope.
    pub ses: MailReceipt,
}

/// The `ses` entity of a mail record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailReceipt {
    /// The received message's headers of record.
    pub mail: MailMessage,
}

/// Summary of the received message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailMessage {
    /// Message id assigned by the receiving service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Envelope sender.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Envelope recipients.
    #[serde(default)]
    pub destination: Vec<String>,
    /// When the message was received.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
