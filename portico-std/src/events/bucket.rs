//! Object-storage change notifications.

use chrono::{DateTime, Utc};
use portico_core::ShapedEvent;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Notification emitted when objects in a storage bucket change.
///
/// Recognized by the path `Records[0].s3`. Shares the `Records[]` envelope
/// with [`TopicNotification`](crate::events::TopicNotification), so its
/// matcher must be probed first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketNotification {
    /// One record per touched object.
    #[serde(rename = "Records", default)]
    pub records: Vec<BucketRecord>,
}

impl ShapedEvent for BucketNotification {
    const TAG: &'static str = "bucket-notification";

    fn matches(document: &Value) -> bool {
        document
            .get("Records")
            .and_then(Value::as_array)
            .and_then(|records| records.first())
            .is_some_and(|record| record.get("s3").is_some())
    }
}

/// One object-level change record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRecord {
    /// Originating service identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_source: Option<String>,
    /// Region the bucket lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws_region: Option<String>,
    /// When the change happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_time: Option<DateTime<Utc>>,
    /// Kind of change, e.g. `ObjectCreated:Put`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    /// Which bucket and which object.
    pub s3: StorageEntity,
}

/// The `s3` entity of a change record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageEntity {
    /// The bucket holding the object.
    pub bucket: BucketEntity,
    /// The object that changed.
    pub object: ObjectEntity,
}

/// The bucket a record refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketEntity {
    /// Bucket name.
    pub name: String,
    /// Bucket ARN, when the notifier includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

/// The object a record refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntity {
    /// Object key within the bucket.
    pub key: String,
    /// Object size in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Entity tag of the object version. Notifiers disagree on the casing.
    #[serde(default, alias = "ETag", skip_serializing_if = "Option::is_none")]
    pub e_tag: Option<String>,
    /// Ordering hint across records for the same key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequencer: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::BucketNotification;
    use portico_core::ShapedEvent;
    use serde_json::json;

    #[test]
    fn probe_fires_on_the_records_s3_path() {
        let doc = json!({"Records": [{"s3": {"bucket": {"name": "b"}, "object": {"key": "k"}}}]});
        assert!(BucketNotification::matches(&doc));
    }

    #[test]
    fn probe_rejects_other_record_envelopes() {
        assert!(!BucketNotification::matches(&json!({"Records": [{"Sns": {}}]})));
        assert!(!BucketNotification::matches(&json!({"Records": []})));
        assert!(!BucketNotification::matches(&json!({"Records": {"s3": {}}})));
        assert!(!BucketNotification::matches(&json!({})));
    }

    #[test]
    fn decodes_bucket_and_object_from_the_wire_casing() {
        let doc = json!({
            "Records": [{
                "eventSource": "aws:s3",
                "eventName": "ObjectCreated:Put",
                "s3": {
                    "bucket": {"name": "b"},
                    "object": {"key": "k", "size": 11}
                }
            }]
        });

        let ev: BucketNotification = serde_json::from_value(doc).unwrap();
        assert_eq!(ev.records.len(), 1);
        assert_eq!(ev.records[0].s3.bucket.name, "b");
        assert_eq!(ev.records[0].s3.object.key, "k");
        assert_eq!(ev.records[0].s3.object.size, Some(11));
    }

    #[test]
    fn reencoding_omits_absent_fields() {
        let doc = json!({"Records": [{"s3": {"bucket": {"name": "b"}, "object": {"key": "k"}}}]});
        let ev: BucketNotification = serde_json::from_value(doc.clone()).unwrap();
        assert_eq!(serde_json::to_value(&ev).unwrap(), doc);
    }
}
