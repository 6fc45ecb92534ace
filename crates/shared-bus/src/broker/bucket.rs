//! Bucket state, location rules and creation events.

use std::collections::BTreeMap;

use chrono::{SecondsFormat, Utc};
use shared_types::envelope::EventNotification;
use shared_types::{arn, EventRecord, ServiceError};
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{topic, CloudState};
use crate::contracts::{ObjectPage, OBJECT_CREATED_ALL};

/// Service principal the object store publishes as.
pub(crate) const STORE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Region whose buckets are created without a location constraint.
const UNCONSTRAINED_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
struct NotificationRule {
    topic_arn: String,
    events: Vec<String>,
}

impl NotificationRule {
    fn matches_put(&self) -> bool {
        self.events
            .iter()
            .any(|e| e == OBJECT_CREATED_ALL || e == "s3:ObjectCreated:Put")
    }
}

#[derive(Debug)]
pub(crate) struct BucketState {
    notification: Option<NotificationRule>,
    pub(crate) objects: BTreeMap<String, Vec<u8>>,
}

impl BucketState {
    pub(crate) fn new() -> Self {
        Self {
            notification: None,
            objects: BTreeMap::new(),
        }
    }

    /// Keys after `start_after`, in lexicographic order.
    pub(crate) fn page(&self, start_after: Option<&str>, page_size: usize) -> ObjectPage {
        let keys: Vec<String> = self
            .objects
            .keys()
            .filter(|k| start_after.map_or(true, |s| k.as_str() > s))
            .take(page_size + 1)
            .cloned()
            .collect();
        if keys.len() > page_size {
            let page: Vec<String> = keys.into_iter().take(page_size).collect();
            let next_token = page.last().cloned();
            ObjectPage {
                keys: page,
                next_token,
            }
        } else {
            ObjectPage {
                keys,
                next_token: None,
            }
        }
    }
}

/// A location constraint is required outside `us-east-1` and must name the
/// client region; inside `us-east-1` it must be absent.
pub(crate) fn check_location(
    region: &str,
    bucket: &str,
    location_constraint: Option<&str>,
) -> Result<(), ServiceError> {
    match (region == UNCONSTRAINED_REGION, location_constraint) {
        (true, None) => Ok(()),
        (true, Some(_)) => Err(ServiceError::rejected(
            "CreateBucket",
            bucket,
            "InvalidLocationConstraint",
            "The specified location-constraint is not valid",
        )),
        (false, Some(lc)) if lc == region => Ok(()),
        (false, _) => Err(ServiceError::rejected(
            "CreateBucket",
            bucket,
            "IllegalLocationConstraintException",
            format!("The location constraint is incompatible with the region {region}"),
        )),
    }
}

/// Lowercase letters, digits, dots and hyphens; 3..=63 characters; starts and
/// ends with a letter or digit.
pub(crate) fn validate_name(bucket: &str) -> Result<(), ServiceError> {
    let edge_ok = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    let valid = (3..=63).contains(&bucket.len())
        && bucket
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        && edge_ok(bucket.chars().next())
        && edge_ok(bucket.chars().last());
    if valid {
        Ok(())
    } else {
        Err(ServiceError::rejected(
            "CreateBucket",
            bucket,
            "InvalidBucketName",
            "The specified bucket is not valid",
        ))
    }
}

/// The destination topic must exist and its policy must admit this bucket.
pub(crate) fn configure_notification(
    state: &mut CloudState,
    bucket: &str,
    topic_arn: &str,
    events: &[String],
) -> Result<(), ServiceError> {
    if !state.buckets.contains_key(bucket) {
        return Err(ServiceError::not_found("PutBucketNotificationConfiguration", bucket));
    }
    let admitted = state.topics.get(topic_arn).is_some_and(|t| {
        t.policy
            .as_ref()
            .is_some_and(|p| p.allows(STORE_PRINCIPAL, "SNS:Publish", topic_arn, &arn::bucket_arn(bucket)))
    });
    if !admitted {
        return Err(ServiceError::rejected(
            "PutBucketNotificationConfiguration",
            bucket,
            "InvalidArgument",
            format!("Unable to validate the following destination configurations: {topic_arn}"),
        ));
    }
    if let Some(stored) = state.buckets.get_mut(bucket) {
        stored.notification = Some(NotificationRule {
            topic_arn: topic_arn.to_string(),
            events: events.to_vec(),
        });
    }
    Ok(())
}

/// Store an object and emit its creation event. Returns the number of queues
/// the event reached.
pub(crate) fn put_object(
    state: &mut CloudState,
    region: &str,
    bucket: &str,
    key: &str,
    body: Vec<u8>,
    now: Instant,
) -> Result<usize, ServiceError> {
    let stored = state
        .buckets
        .get_mut(bucket)
        .ok_or_else(|| ServiceError::not_found("PutObject", bucket))?;
    let size = body.len() as u64;
    stored.objects.insert(key.to_string(), body);

    let Some(rule) = stored.notification.clone().filter(NotificationRule::matches_put) else {
        return Ok(0);
    };

    let admitted = state.topics.get(&rule.topic_arn).is_some_and(|t| {
        t.policy.as_ref().is_some_and(|p| {
            p.allows(STORE_PRINCIPAL, "SNS:Publish", &rule.topic_arn, &arn::bucket_arn(bucket))
        })
    });
    if !admitted {
        warn!(bucket, topic_arn = %rule.topic_arn, "Topic does not admit bucket; event dropped");
        state.rejected_deliveries += 1;
        return Ok(0);
    }

    let event_time = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let record = EventRecord::new(bucket, key, size);
    let message = EventNotification::from_records(&[record], region, &event_time)
        .to_message()
        .map_err(|e| ServiceError::rejected("PutObject", bucket, "InternalError", e.to_string()))?;
    debug!(bucket, object_key = key, size, "Publishing object creation event");
    topic::publish(state, &rule.topic_arn, &message, now)
}
