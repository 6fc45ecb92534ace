//! # Notification Envelope
//!
//! Wire format of a queue message body as delivered by the notification
//! topic. Two layers of string-encoded JSON sit between the queue body and the
//! event records:
//!
//! ```text
//! queue body ──json──► NotificationEnvelope { Message: String, .. }
//!                                   │
//!                                   └──json──► EventNotification { Records: [..] }
//!                                                        │
//!                                                        └──► s3.object.key / s3.object.size
//! ```
//!
//! Both layers are decoded in sequence. Object keys are carried verbatim; no
//! URL decoding is applied.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::EventRecord;
use crate::errors::EnvelopeError;

/// Event name emitted for every object-creation record.
pub const OBJECT_CREATED_PUT: &str = "ObjectCreated:Put";

/// Event source of object-store records.
pub const OBJECT_STORE_EVENT_SOURCE: &str = "aws:s3";

/// Outer layer: the topic's notification wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NotificationEnvelope {
    /// Always `Notification` for published messages.
    #[serde(rename = "Type", default = "notification_type")]
    pub kind: String,
    /// Topic-assigned message id.
    #[serde(default)]
    pub message_id: String,
    /// Publishing topic.
    #[serde(default)]
    pub topic_arn: String,
    /// Optional subject line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Inner payload, itself serialized JSON.
    pub message: String,
    /// RFC 3339 publish time.
    #[serde(default)]
    pub timestamp: String,
}

fn notification_type() -> String {
    "Notification".to_string()
}

impl NotificationEnvelope {
    /// Wrap an inner message published on `topic_arn`.
    pub fn wrap(topic_arn: impl Into<String>, message: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            kind: notification_type(),
            message_id: Uuid::new_v4().to_string(),
            topic_arn: topic_arn.into(),
            subject: Some("Amazon S3 Notification".to_string()),
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Parse a queue message body.
    pub fn from_body(body: &str) -> Result<Self, EnvelopeError> {
        serde_json::from_str(body).map_err(|e| EnvelopeError::MalformedEnvelope(e.to_string()))
    }

    /// Serialize as a queue message body.
    pub fn to_body(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::MalformedEnvelope(e.to_string()))
    }

    /// Decode the inner notification.
    pub fn notification(&self) -> Result<EventNotification, EnvelopeError> {
        serde_json::from_str(&self.message)
            .map_err(|e| EnvelopeError::MalformedNotification(e.to_string()))
    }
}

/// Inner layer: the object store's event notification.
///
/// `Records` is absent for service test events; that decodes to no records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EventNotification {
    #[serde(rename = "Records", default, skip_serializing_if = "Option::is_none")]
    pub records: Option<Vec<ObjectEventRecord>>,
    /// Present on test events (`s3:TestEvent`).
    #[serde(rename = "Event", default, skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
}

impl EventNotification {
    /// Build a notification carrying `records`.
    pub fn from_records(records: &[EventRecord], region: &str, event_time: &str) -> Self {
        Self {
            records: Some(
                records
                    .iter()
                    .map(|r| ObjectEventRecord::object_created(r, region, event_time))
                    .collect(),
            ),
            event: None,
        }
    }

    /// Serialize to the string carried in the envelope's `Message` field.
    pub fn to_message(&self) -> Result<String, EnvelopeError> {
        serde_json::to_string(self).map_err(|e| EnvelopeError::MalformedNotification(e.to_string()))
    }

    /// Flatten into event records, preserving order.
    #[must_use]
    pub fn event_records(&self) -> Vec<EventRecord> {
        self.records
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(ObjectEventRecord::to_event_record)
            .collect()
    }
}

/// One record of an object-store event notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEventRecord {
    #[serde(default)]
    pub event_version: String,
    #[serde(default)]
    pub event_source: String,
    #[serde(default)]
    pub aws_region: String,
    #[serde(default)]
    pub event_time: String,
    #[serde(default)]
    pub event_name: String,
    pub s3: ObjectEventEntity,
}

impl ObjectEventRecord {
    fn object_created(record: &EventRecord, region: &str, event_time: &str) -> Self {
        Self {
            event_version: "2.1".to_string(),
            event_source: OBJECT_STORE_EVENT_SOURCE.to_string(),
            aws_region: region.to_string(),
            event_time: event_time.to_string(),
            event_name: OBJECT_CREATED_PUT.to_string(),
            s3: ObjectEventEntity {
                bucket: BucketRef {
                    name: record.bucket.clone(),
                    arn: Some(crate::arn::bucket_arn(&record.bucket)),
                },
                object: ObjectRef {
                    key: record.object_key.clone(),
                    size: record.size_bytes,
                },
            },
        }
    }

    fn to_event_record(&self) -> EventRecord {
        EventRecord {
            object_key: self.s3.object.key.clone(),
            size_bytes: self.s3.object.size,
            bucket: self.s3.bucket.name.clone(),
        }
    }
}

/// `s3` section of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEventEntity {
    pub bucket: BucketRef,
    pub object: ObjectRef,
}

/// `s3.bucket` section of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

/// `s3.object` section of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    pub key: String,
    #[serde(default)]
    pub size: u64,
}

/// Decode a queue message body through both nesting layers.
///
/// Records are returned in envelope order.
pub fn decode_event_records(body: &str) -> Result<Vec<EventRecord>, EnvelopeError> {
    let envelope = NotificationEnvelope::from_body(body)?;
    Ok(envelope.notification()?.event_records())
}

/// Encode event records as a queue message body published by `topic_arn`.
pub fn encode_event_records(
    topic_arn: &str,
    records: &[EventRecord],
    region: &str,
    timestamp: &str,
) -> Result<String, EnvelopeError> {
    let message = EventNotification::from_records(records, region, timestamp).to_message()?;
    NotificationEnvelope::wrap(topic_arn, message, timestamp).to_body()
}
