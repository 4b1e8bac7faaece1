//! Pub/sub topic delivery notifications.

use chrono::{DateTime, Utc};
use portico_core::ShapedEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification delivering a published topic message.
///
/// Recognized by the path `Records[0].Sns`. Probed after
/// [`BucketNotification`](crate::events::BucketNotification) because both
/// shapes share the `Records[]` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicNotification {
    /// One record per delivered message.
    #[serde(rename = "Records", default)]
    pub records: Vec<TopicRecord>,
}

impl ShapedEvent for TopicNotification {
    const TAG: &'static str = "topic-notification";

    fn matches(document: &Value) -> bool {
        document
            .get("Records")
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .is_some_and(|record| record.get("Sns").is_some())
    }
}

/// One delivery record. Topic records use PascalCase on the wire, unlike
/// the bucket-notification envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicRecord {
    /// Originating service identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    /// Subscription the delivery came through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_subscription_arn: Option<String>,
    /// The delivered message.
    pub sns: TopicMessage,
}

/// The published message itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TopicMessage {
    /// Unique id assigned at publish time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// The topic the message was published to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_arn: Option<String>,
    /// Optional publisher-supplied subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// The message payload.
    #[serde(default)]
    pub message: String,
    /// When the message was published.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}
