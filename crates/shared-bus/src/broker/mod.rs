//! # In-Memory Cloud
//!
//! In-process implementation of every managed-service contract, with the
//! delivery semantics the pipeline relies on:
//!
//! - **Queue**: visibility timeout, a fresh receipt handle per delivery, stale
//!   handles rejected, redrive to the dead-letter queue once the receive count
//!   reaches `maxReceiveCount`, long polling.
//! - **Topic**: fan-out to subscribed queues, gated by each queue's policy.
//! - **Object store**: creation events published to the configured topic,
//!   gated by the topic's policy; region/location-constraint rules.
//!
//! Every call is appended to a call log and any operation can be made to fail
//! through fault injection. Time is `tokio::time`, so tests can pause it.

mod bucket;
mod queue;
mod topic;

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{
    IdentityError, PolicyDocument, QueueAttributes, QueueEndpoint, QueueMessage, ReceiptHandle,
    ServiceError,
};
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::debug;

use crate::contracts::{
    IdentityService, ObjectPage, ObjectStoreService, QueueService, TopicService,
};

use bucket::BucketState;
use queue::QueueState;
use topic::TopicState;

/// Default region of a fresh cloud.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default account id of a fresh cloud.
pub const DEFAULT_ACCOUNT_ID: &str = "123456789012";

/// Default visibility timeout applied to queues created without one.
pub const DEFAULT_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

/// Default listing page size.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    /// Service operation name, e.g. `DeleteMessage`.
    pub operation: &'static str,
    /// Primary resource addressed (name, URL, ARN or receipt handle).
    pub resource: String,
}

#[derive(Debug, Clone)]
enum Fault {
    Once(ServiceError),
    Always(ServiceError),
}

#[derive(Debug, Default)]
pub(crate) struct CloudState {
    pub(crate) queues: HashMap<String, QueueState>,
    pub(crate) topics: HashMap<String, TopicState>,
    pub(crate) buckets: HashMap<String, BucketState>,
    pub(crate) rejected_deliveries: u64,
}

/// In-process stand-in for the object store, topic, queue and identity
/// services.
pub struct InMemoryCloud {
    region: String,
    account_id: String,
    page_size: usize,
    state: Mutex<CloudState>,
    calls: Mutex<Vec<CallRecord>>,
    faults: Mutex<HashMap<&'static str, VecDeque<Fault>>>,
    /// Signalled whenever a message is enqueued anywhere.
    activity: Notify,
}

impl InMemoryCloud {
    /// Cloud in the default region and account.
    #[must_use]
    pub fn new() -> Self {
        Self::with_region(DEFAULT_REGION)
    }

    /// Cloud in `region`.
    #[must_use]
    pub fn with_region(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            account_id: DEFAULT_ACCOUNT_ID.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            state: Mutex::new(CloudState::default()),
            calls: Mutex::new(Vec::new()),
            faults: Mutex::new(HashMap::new()),
            activity: Notify::new(),
        }
    }

    /// Override the account id.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Override the listing page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Region the cloud runs in.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Account id returned by the identity service.
    #[must_use]
    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    // =========================================================================
    // FAULT INJECTION & CALL LOG
    // =========================================================================

    /// Fail the next call to `operation` with `error`.
    pub fn fail_once(&self, operation: &'static str, error: ServiceError) {
        self.faults
            .lock()
            .entry(operation)
            .or_default()
            .push_back(Fault::Once(error));
    }

    /// Fail every call to `operation` with `error` until cleared.
    pub fn fail_always(&self, operation: &'static str, error: ServiceError) {
        self.faults
            .lock()
            .entry(operation)
            .or_default()
            .push_back(Fault::Always(error));
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        self.faults.lock().clear();
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CallRecord> {
        self.calls.lock().clone()
    }

    /// Calls to `operation`, in order.
    #[must_use]
    pub fn calls_to(&self, operation: &str) -> Vec<CallRecord> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.operation == operation)
            .cloned()
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    fn enter(&self, operation: &'static str, resource: &str) -> Result<(), ServiceError> {
        self.calls.lock().push(CallRecord {
            operation,
            resource: resource.to_string(),
        });
        let mut faults = self.faults.lock();
        let Some(pending) = faults.get_mut(operation) else {
            return Ok(());
        };
        match pending.front().cloned() {
            Some(Fault::Once(err)) => {
                pending.pop_front();
                debug!(operation, "Injected one-shot fault");
                Err(err)
            }
            Some(Fault::Always(err)) => Err(err),
            None => Ok(()),
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Messages held by queue `name`, visible or in flight.
    #[must_use]
    pub fn queue_depth(&self, name: &str) -> usize {
        self.state
            .lock()
            .queues
            .get(name)
            .map_or(0, QueueState::depth)
    }

    /// Whether a queue named `name` exists.
    #[must_use]
    pub fn has_queue(&self, name: &str) -> bool {
        self.state.lock().queues.contains_key(name)
    }

    /// Whether a topic with this ARN exists.
    #[must_use]
    pub fn has_topic(&self, topic_arn: &str) -> bool {
        self.state.lock().topics.contains_key(topic_arn)
    }

    /// Whether a bucket named `name` exists.
    #[must_use]
    pub fn has_bucket(&self, name: &str) -> bool {
        self.state.lock().buckets.contains_key(name)
    }

    /// Number of objects in bucket `name`.
    #[must_use]
    pub fn object_count(&self, name: &str) -> usize {
        self.state
            .lock()
            .buckets
            .get(name)
            .map_or(0, |b| b.objects.len())
    }

    /// Current policy of queue `name`.
    #[must_use]
    pub fn queue_policy(&self, name: &str) -> Option<PolicyDocument> {
        self.state
            .lock()
            .queues
            .get(name)
            .and_then(|q| q.policy.clone())
    }

    /// Current policy of a topic.
    #[must_use]
    pub fn topic_policy(&self, topic_arn: &str) -> Option<PolicyDocument> {
        self.state
            .lock()
            .topics
            .get(topic_arn)
            .and_then(|t| t.policy.clone())
    }

    /// Queue ARNs subscribed to a topic.
    #[must_use]
    pub fn subscriptions(&self, topic_arn: &str) -> Vec<String> {
        self.state
            .lock()
            .topics
            .get(topic_arn)
            .map(|t| t.subscriptions.iter().map(|s| s.queue_arn.clone()).collect())
            .unwrap_or_default()
    }

    /// Deliveries refused because the target's policy did not allow the source.
    #[must_use]
    pub fn rejected_deliveries(&self) -> u64 {
        self.state.lock().rejected_deliveries
    }

    // =========================================================================
    // DATA-PLANE HELPERS
    // =========================================================================

    /// Enqueue a raw body directly; returns the message id.
    pub fn send_message(&self, queue_url: &str, body: impl Into<String>) -> Result<String, ServiceError> {
        self.enter("SendMessage", queue_url)?;
        let id = {
            let mut state = self.state.lock();
            let queue = queue::by_url_mut(&mut state, queue_url)
                .ok_or_else(|| ServiceError::not_found("SendMessage", queue_url))?;
            queue.enqueue(body.into(), Instant::now())
        };
        self.activity.notify_waiters();
        Ok(id)
    }

    /// Publish a raw message on a topic; returns how many queues accepted it.
    pub fn publish(&self, topic_arn: &str, message: &str) -> Result<usize, ServiceError> {
        self.enter("Publish", topic_arn)?;
        let accepted = {
            let mut state = self.state.lock();
            topic::publish(&mut state, topic_arn, message, Instant::now())?
        };
        if accepted > 0 {
            self.activity.notify_waiters();
        }
        Ok(accepted)
    }

    fn queue_url_for(&self, name: &str) -> String {
        format!(
            "https://sqs.{}.amazonaws.com/{}/{}",
            self.region, self.account_id, name
        )
    }
}

impl Default for InMemoryCloud {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// CONTRACT IMPLEMENTATIONS
// =============================================================================

#[async_trait]
impl QueueService for InMemoryCloud {
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<QueueEndpoint, ServiceError> {
        self.enter("CreateQueue", name)?;
        queue::validate_name(name)?;
        let url = self.queue_url_for(name);
        let arn = shared_types::arn::queue_arn(&self.region, &self.account_id, name);
        let mut state = self.state.lock();
        let queue = state
            .queues
            .entry(name.to_string())
            .or_insert_with(|| QueueState::new(name, url, arn, attributes.clone()));
        Ok(queue.endpoint())
    }

    async fn queue_url(&self, name: &str) -> Result<String, ServiceError> {
        self.enter("GetQueueUrl", name)?;
        self.state
            .lock()
            .queues
            .get(name)
            .map(|q| q.url.clone())
            .ok_or_else(|| ServiceError::not_found("GetQueueUrl", name))
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: u8,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, ServiceError> {
        self.enter("ReceiveMessage", queue_url)?;
        if !(1..=10).contains(&max_messages) {
            return Err(ServiceError::rejected(
                "ReceiveMessage",
                queue_url,
                "InvalidParameterValue",
                format!("MaxNumberOfMessages {max_messages} outside 1..=10"),
            ));
        }
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.activity.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let now = Instant::now();
            let (batch, next_visible) = {
                let mut state = self.state.lock();
                queue::receive(&mut state, queue_url, usize::from(max_messages), now)?
            };
            if !batch.is_empty() || now >= deadline {
                return Ok(batch);
            }

            let wake = next_visible.map_or(deadline, |t| t.min(deadline));
            tokio::select! {
                () = &mut notified => {}
                () = tokio::time::sleep_until(wake) => {}
            }
        }
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), ServiceError> {
        self.enter("DeleteMessage", receipt_handle.as_str())?;
        let mut state = self.state.lock();
        let queue = queue::by_url_mut(&mut state, queue_url)
            .ok_or_else(|| ServiceError::not_found("DeleteMessage", queue_url))?;
        queue.delete(receipt_handle)
    }

    async fn set_queue_policy(
        &self,
        queue_url: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError> {
        self.enter("SetQueueAttributes", queue_url)?;
        let mut state = self.state.lock();
        let queue = queue::by_url_mut(&mut state, queue_url)
            .ok_or_else(|| ServiceError::not_found("SetQueueAttributes", queue_url))?;
        queue.policy = Some(policy.clone());
        Ok(())
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<(), ServiceError> {
        self.enter("DeleteQueue", queue_url)?;
        let mut state = self.state.lock();
        let name = queue::by_url_mut(&mut state, queue_url)
            .map(|q| q.name.clone())
            .ok_or_else(|| ServiceError::not_found("DeleteQueue", queue_url))?;
        state.queues.remove(&name);
        Ok(())
    }
}

#[async_trait]
impl TopicService for InMemoryCloud {
    async fn create_topic(&self, name: &str) -> Result<String, ServiceError> {
        self.enter("CreateTopic", name)?;
        topic::validate_name(name)?;
        let arn = shared_types::arn::topic_arn(&self.region, &self.account_id, name);
        self.state
            .lock()
            .topics
            .entry(arn.clone())
            .or_insert_with(|| TopicState::new(name, &arn));
        Ok(arn)
    }

    async fn subscribe_queue(
        &self,
        topic_arn: &str,
        queue_arn: &str,
    ) -> Result<String, ServiceError> {
        self.enter("Subscribe", topic_arn)?;
        let mut state = self.state.lock();
        let topic = state
            .topics
            .get_mut(topic_arn)
            .ok_or_else(|| ServiceError::not_found("Subscribe", topic_arn))?;
        Ok(topic.subscribe(queue_arn))
    }

    async fn set_topic_policy(
        &self,
        topic_arn: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError> {
        self.enter("SetTopicAttributes", topic_arn)?;
        let mut state = self.state.lock();
        let topic = state
            .topics
            .get_mut(topic_arn)
            .ok_or_else(|| ServiceError::not_found("SetTopicAttributes", topic_arn))?;
        topic.policy = Some(policy.clone());
        Ok(())
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<(), ServiceError> {
        self.enter("DeleteTopic", topic_arn)?;
        self.state
            .lock()
            .topics
            .remove(topic_arn)
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("DeleteTopic", topic_arn))
    }
}

#[async_trait]
impl ObjectStoreService for InMemoryCloud {
    async fn create_bucket(
        &self,
        bucket: &str,
        location_constraint: Option<&str>,
    ) -> Result<(), ServiceError> {
        self.enter("CreateBucket", bucket)?;
        bucket::validate_name(bucket)?;
        bucket::check_location(&self.region, bucket, location_constraint)?;
        self.state
            .lock()
            .buckets
            .entry(bucket.to_string())
            .or_insert_with(BucketState::new);
        Ok(())
    }

    async fn put_bucket_notification(
        &self,
        bucket: &str,
        topic_arn: &str,
        events: &[String],
    ) -> Result<(), ServiceError> {
        self.enter("PutBucketNotificationConfiguration", bucket)?;
        let mut state = self.state.lock();
        bucket::configure_notification(&mut state, bucket, topic_arn, events)
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), ServiceError> {
        self.enter("PutObject", bucket)?;
        let delivered = {
            let mut state = self.state.lock();
            bucket::put_object(&mut state, &self.region, bucket, key, body, Instant::now())?
        };
        if delivered > 0 {
            self.activity.notify_waiters();
        }
        Ok(())
    }

    async fn list_objects(
        &self,
        bucket: &str,
        continuation: Option<String>,
    ) -> Result<ObjectPage, ServiceError> {
        self.enter("ListObjectsV2", bucket)?;
        let state = self.state.lock();
        let stored = state
            .buckets
            .get(bucket)
            .ok_or_else(|| ServiceError::not_found("ListObjectsV2", bucket))?;
        Ok(stored.page(continuation.as_deref(), self.page_size))
    }

    async fn delete_objects(&self, bucket: &str, keys: &[String]) -> Result<(), ServiceError> {
        self.enter("DeleteObjects", bucket)?;
        let mut state = self.state.lock();
        let stored = state
            .buckets
            .get_mut(bucket)
            .ok_or_else(|| ServiceError::not_found("DeleteObjects", bucket))?;
        for key in keys {
            stored.objects.remove(key);
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> Result<(), ServiceError> {
        self.enter("DeleteBucket", bucket)?;
        let mut state = self.state.lock();
        let stored = state
            .buckets
            .get(bucket)
            .ok_or_else(|| ServiceError::not_found("DeleteBucket", bucket))?;
        if !stored.objects.is_empty() {
            return Err(ServiceError::rejected(
                "DeleteBucket",
                bucket,
                "BucketNotEmpty",
                "The bucket you tried to delete is not empty",
            ));
        }
        state.buckets.remove(bucket);
        Ok(())
    }
}

#[async_trait]
impl IdentityService for InMemoryCloud {
    async fn caller_account_id(&self) -> Result<String, IdentityError> {
        self.enter("GetCallerIdentity", &self.account_id)?;
        if self.account_id.is_empty() {
            return Err(IdentityError::MissingAccount);
        }
        Ok(self.account_id.clone())
    }
}
