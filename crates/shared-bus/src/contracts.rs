//! # Managed Service Contracts
//!
//! The request/response surface of the four managed services the pipeline
//! depends on. Components are generic over these traits; the runtime binds
//! them to the AWS SDK and tests bind them to [`crate::InMemoryCloud`].
//!
//! Every method fails with a classified [`ServiceError`]; callers decide what
//! each class means for them.

use std::time::Duration;

use async_trait::async_trait;
use shared_types::{
    IdentityError, PolicyDocument, QueueAttributes, QueueEndpoint, QueueMessage, ReceiptHandle,
    ServiceError,
};

/// Event pattern matching every object-creation event.
pub const OBJECT_CREATED_ALL: &str = "s3:ObjectCreated:*";

/// Protocol used when subscribing a queue to a topic.
pub const QUEUE_PROTOCOL: &str = "sqs";

/// One page of an object listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    /// Object keys in this page.
    pub keys: Vec<String>,
    /// Token for the next page; `None` on the last page.
    pub next_token: Option<String>,
}

/// Durable blob storage that emits creation events.
#[async_trait]
pub trait ObjectStoreService: Send + Sync {
    /// Create a bucket. `location_constraint` must be `None` exactly when the
    /// client region is `us-east-1`.
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), ServiceError>;

    /// Publish events matching `events` to `topic_arn`.
    async fn put_bucket_notification(
        &self,
        bucket: &str,
        topic_arn: &str,
        events: &[String],
    ) -> Result<(), ServiceError>;

    /// Store an object.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), ServiceError>;

    /// List one page of keys.
    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ServiceError>;

    /// Delete a batch of keys.
    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ServiceError>;

    /// Delete an empty bucket.
    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError>;
}

/// Publish-subscribe fan-out.
#[async_trait]
pub trait TopicService: Send + Sync {
    /// Create (or look up) a topic; returns its ARN.
    async fn create_topic(&self, name: &str) -> Result<String, ServiceError>;

    /// Subscribe a queue; returns the subscription ARN.
    async fn subscribe_queue(&self, topic_arn: &str, queue_arn: &str)
        -> Result<String, ServiceError>;

    /// Replace the topic's access policy.
    async fn set_topic_policy(
        &self,
        topic_arn: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError>;

    /// Delete a topic and its subscriptions.
    async fn delete_topic(&self, topic_arn: &str) -> Result<(), ServiceError>;
}

/// Durable at-least-once work queue.
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Create (or look up) a queue; returns its URL and ARN.
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<QueueEndpoint, ServiceError>;

    /// Resolve a queue URL by name.
    async fn queue_url(&self, name: &str) -> Result<String, ServiceError>;

    /// Long-poll for up to `max_messages` (1..=10) messages, waiting at most
    /// `wait` when none are visible.
    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: u8,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, ServiceError>;

    /// Acknowledge one delivery attempt.
    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), ServiceError>;

    /// Replace the queue's access policy.
    async fn set_queue_policy(
        &self,
        queue_url: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError>;

    /// Delete a queue and every message in it.
    async fn delete_queue(&self, queue_url: &str) -> Result<(), ServiceError>;
}

/// Caller identity.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Account id of the credentials in use.
    async fn caller_account_id(&self) -> Result<String, IdentityError>;
}
