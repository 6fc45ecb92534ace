//! # Core Domain Entities
//!
//! Defines the entities that travel through the ingestion pipeline.
//!
//! ## Clusters
//!
//! - **Delivery**: `EventRecord`, `QueueMessage`, `ReceiptHandle`
//! - **Queue configuration**: `QueueAttributes`, `RedrivePolicy`
//! - **Topology**: `ResourceTopology`, `QueueEndpoint`

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// CLUSTER A: DELIVERY
// =============================================================================

/// One object-creation occurrence reported by the object store.
///
/// Immutable once produced. Never persisted beyond the queue message that
/// carries it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventRecord {
    /// Key of the created object, exactly as the store reported it.
    pub object_key: String,
    /// Size of the created object in bytes.
    pub size_bytes: u64,
    /// Bucket the object was created in.
    pub bucket: String,
}

impl EventRecord {
    /// Create a new event record.
    pub fn new(bucket: impl Into<String>, object_key: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            object_key: object_key.into(),
            size_bytes,
            bucket: bucket.into(),
        }
    }
}

/// Single-use token authorizing deletion of one delivery attempt.
///
/// Opaque to the pipeline. A new handle is issued on every redelivery, which
/// invalidates the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    /// Wrap a raw handle returned by the queue service.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines; handles are several hundred bytes long.
    #[must_use]
    pub fn abbreviated(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(16)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One delivery attempt of a notification envelope.
///
/// The body is never mutated; a redelivery carries the identical body with a
/// higher `delivery_count` and a fresh `receipt_handle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueMessage {
    /// Service-assigned message identifier, stable across redeliveries.
    pub message_id: String,
    /// Credential for acknowledging this delivery attempt.
    pub receipt_handle: ReceiptHandle,
    /// Serialized notification envelope.
    pub body: String,
    /// Number of times this message has been delivered, including this one.
    pub delivery_count: u32,
}

// =============================================================================
// CLUSTER B: QUEUE CONFIGURATION
// =============================================================================

/// Routes a message to a dead-letter queue after repeated failed deliveries.
///
/// Serialized as the JSON document the queue service expects in its
/// `RedrivePolicy` attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedrivePolicy {
    /// ARN of the dead-letter queue.
    pub dead_letter_target_arn: String,
    /// Deliveries allowed before the message is relocated.
    pub max_receive_count: u32,
}

impl RedrivePolicy {
    /// Create a redrive policy targeting `dead_letter_target_arn`.
    pub fn new(dead_letter_target_arn: impl Into<String>, max_receive_count: u32) -> Self {
        Self {
            dead_letter_target_arn: dead_letter_target_arn.into(),
            max_receive_count,
        }
    }

    /// Serialize to the attribute value format.
    pub fn to_attribute(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Attributes applied when a queue is created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueAttributes {
    /// Optional redrive policy.
    pub redrive_policy: Option<RedrivePolicy>,
    /// Visibility timeout override; the service default applies when `None`.
    pub visibility_timeout: Option<Duration>,
}

impl QueueAttributes {
    /// Attributes with a redrive policy.
    pub fn with_redrive(mut self, policy: RedrivePolicy) -> Self {
        self.redrive_policy = Some(policy);
        self
    }

    /// Attributes with a visibility timeout.
    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = Some(timeout);
        self
    }
}

// =============================================================================
// CLUSTER C: TOPOLOGY
// =============================================================================

/// Address and identifier of a created queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueEndpoint {
    /// URL used for data-plane calls.
    pub url: String,
    /// ARN used in policies and subscriptions.
    pub arn: String,
}

/// The full set of resources owned by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTopology {
    /// Notification topic ARN.
    pub topic_arn: String,
    /// Work queue.
    pub queue: QueueEndpoint,
    /// Dead-letter queue.
    pub dead_letter_queue: QueueEndpoint,
    /// Bucket name.
    pub bucket_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redrive_policy_attribute_format() {
        let policy = RedrivePolicy::new("arn:aws:sqs:us-east-1:123456789012:ShippingQueueDLQ", 3);
        let json = policy.to_attribute().unwrap();
        assert_eq!(
            json,
            r#"{"deadLetterTargetArn":"arn:aws:sqs:us-east-1:123456789012:ShippingQueueDLQ","maxReceiveCount":3}"#
        );
    }

    #[test]
    fn test_receipt_handle_abbreviation() {
        let handle = ReceiptHandle::new("AQEBwJnKyrHigUMZj6rYigCgxlaS3SLy0a");
        assert_eq!(handle.abbreviated(), "AQEBwJnKyrHigUMZ");

        let short = ReceiptHandle::new("abc");
        assert_eq!(short.abbreviated(), "abc");
    }

    #[test]
    fn test_queue_attributes_builders() {
        let attrs = QueueAttributes::default()
            .with_redrive(RedrivePolicy::new("arn:dlq", 5))
            .with_visibility_timeout(Duration::from_secs(45));
        assert_eq!(attrs.redrive_policy.unwrap().max_receive_count, 5);
        assert_eq!(attrs.visibility_timeout, Some(Duration::from_secs(45)));
    }
}
