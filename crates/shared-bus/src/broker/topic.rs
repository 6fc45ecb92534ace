//! Topic state and fan-out.

use chrono::{SecondsFormat, Utc};
use shared_types::{NotificationEnvelope, PolicyDocument, ServiceError};
use tokio::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use super::CloudState;

const MAX_NAME_LEN: usize = 256;

/// Service principal the topic delivers as.
pub(crate) const TOPIC_PRINCIPAL: &str = "sns.amazonaws.com";

#[derive(Debug, Clone)]
pub(crate) struct Subscription {
    pub(crate) arn: String,
    pub(crate) queue_arn: String,
}

#[derive(Debug)]
pub(crate) struct TopicState {
    pub(crate) name: String,
    pub(crate) arn: String,
    pub(crate) policy: Option<PolicyDocument>,
    pub(crate) subscriptions: Vec<Subscription>,
}

impl TopicState {
    pub(crate) fn new(name: &str, arn: &str) -> Self {
        Self {
            name: name.to_string(),
            arn: arn.to_string(),
            policy: None,
            subscriptions: Vec::new(),
        }
    }

    /// Subscribing the same endpoint twice returns the existing subscription.
    pub(crate) fn subscribe(&mut self, queue_arn: &str) -> String {
        if let Some(existing) = self.subscriptions.iter().find(|s| s.queue_arn == queue_arn) {
            return existing.arn.clone();
        }
        let arn = format!("{}:{}", self.arn, Uuid::new_v4());
        self.subscriptions.push(Subscription {
            arn: arn.clone(),
            queue_arn: queue_arn.to_string(),
        });
        debug!(topic = %self.name, queue_arn, "Queue subscribed");
        arn
    }
}

/// Wrap `message` in a notification envelope and deliver it to every
/// subscribed queue whose policy admits this topic. Returns the number of
/// queues that accepted it.
pub(crate) fn publish(
    state: &mut CloudState,
    topic_arn: &str,
    message: &str,
    now: Instant,
) -> Result<usize, ServiceError> {
    let targets: Vec<String> = state
        .topics
        .get(topic_arn)
        .ok_or_else(|| ServiceError::not_found("Publish", topic_arn))?
        .subscriptions
        .iter()
        .map(|s| s.queue_arn.clone())
        .collect();

    let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let body = NotificationEnvelope::wrap(topic_arn, message, timestamp)
        .to_body()
        .map_err(|e| ServiceError::rejected("Publish", topic_arn, "InvalidParameter", e.to_string()))?;

    let mut accepted = 0;
    for queue_arn in targets {
        let Some(queue) = state.queues.values_mut().find(|q| q.arn == queue_arn) else {
            warn!(topic_arn, queue_arn = %queue_arn, "Subscribed queue no longer exists");
            continue;
        };
        let allowed = queue
            .policy
            .as_ref()
            .is_some_and(|p| p.allows(TOPIC_PRINCIPAL, "sqs:SendMessage", &queue.arn, topic_arn));
        if allowed {
            queue.enqueue(body.clone(), now);
            accepted += 1;
        } else {
            warn!(topic_arn, queue_arn = %queue_arn, "Queue policy does not admit topic; delivery dropped");
            state.rejected_deliveries += 1;
        }
    }
    Ok(accepted)
}

pub(crate) fn validate_name(name: &str) -> Result<(), ServiceError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ServiceError::rejected(
            "CreateTopic",
            name,
            "InvalidParameter",
            "Topic names may contain alphanumerics, hyphens and underscores, up to 256 characters",
        ))
    }
}
