//! Queue state: visibility, receipt handles and redrive.

use shared_types::{QueueAttributes, QueueEndpoint, QueueMessage, ReceiptHandle, ServiceError};
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use super::{CloudState, DEFAULT_VISIBILITY_TIMEOUT};
use shared_types::PolicyDocument;

const MAX_NAME_LEN: usize = 80;

#[derive(Debug)]
pub(crate) struct StoredMessage {
    id: String,
    body: String,
    receive_count: u32,
    visible_at: Instant,
    /// Handle of the latest delivery; earlier handles are stale.
    current_receipt: Option<String>,
}

#[derive(Debug)]
pub(crate) struct QueueState {
    pub(crate) name: String,
    pub(crate) url: String,
    pub(crate) arn: String,
    pub(crate) attributes: QueueAttributes,
    pub(crate) policy: Option<PolicyDocument>,
    messages: Vec<StoredMessage>,
}

impl QueueState {
    pub(crate) fn new(name: &str, url: String, arn: String, attributes: QueueAttributes) -> Self {
        Self {
            name: name.to_string(),
            url,
            arn,
            attributes,
            policy: None,
            messages: Vec::new(),
        }
    }

    pub(crate) fn endpoint(&self) -> QueueEndpoint {
        QueueEndpoint {
            url: self.url.clone(),
            arn: self.arn.clone(),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.messages.len()
    }

    pub(crate) fn enqueue(&mut self, body: String, now: Instant) -> String {
        let id = Uuid::new_v4().to_string();
        self.messages.push(StoredMessage {
            id: id.clone(),
            body,
            receive_count: 0,
            visible_at: now,
            current_receipt: None,
        });
        id
    }

    fn enqueue_moved(&mut self, mut message: StoredMessage, now: Instant) {
        message.receive_count = 0;
        message.visible_at = now;
        message.current_receipt = None;
        self.messages.push(message);
    }

    pub(crate) fn delete(&mut self, receipt: &ReceiptHandle) -> Result<(), ServiceError> {
        let position = self
            .messages
            .iter()
            .position(|m| m.current_receipt.as_deref() == Some(receipt.as_str()));
        match position {
            Some(idx) => {
                self.messages.remove(idx);
                Ok(())
            }
            None => Err(ServiceError::StaleReceipt {
                operation: "DeleteMessage".to_string(),
            }),
        }
    }

    fn max_receive_count(&self) -> Option<(u32, &str)> {
        self.attributes
            .redrive_policy
            .as_ref()
            .map(|p| (p.max_receive_count, p.dead_letter_target_arn.as_str()))
    }
}

pub(crate) fn by_url_mut<'a>(state: &'a mut CloudState, url: &str) -> Option<&'a mut QueueState> {
    state.queues.values_mut().find(|q| q.url == url)
}

/// One non-blocking receive attempt.
///
/// Returns the delivered batch plus the earliest instant at which a currently
/// invisible message becomes visible again.
pub(crate) fn receive(
    state: &mut CloudState,
    url: &str,
    max: usize,
    now: Instant,
) -> Result<(Vec<QueueMessage>, Option<Instant>), ServiceError> {
    let queue = by_url_mut(state, url).ok_or_else(|| ServiceError::not_found("ReceiveMessage", url))?;
    let visibility = queue
        .attributes
        .visibility_timeout
        .unwrap_or(DEFAULT_VISIBILITY_TIMEOUT);
    let redrive = queue
        .max_receive_count()
        .map(|(max, target)| (max, target.to_string()));

    let mut batch = Vec::new();
    let mut relocated = Vec::new();
    let mut idx = 0;
    while idx < queue.messages.len() && batch.len() < max {
        let message = &mut queue.messages[idx];
        if message.visible_at > now {
            idx += 1;
            continue;
        }
        if let Some((limit, _)) = &redrive {
            if message.receive_count >= *limit {
                relocated.push(queue.messages.remove(idx));
                continue;
            }
        }
        message.receive_count += 1;
        message.visible_at = now + visibility;
        let handle = format!("{}#{}", message.id, Uuid::new_v4().simple());
        message.current_receipt = Some(handle.clone());
        batch.push(QueueMessage {
            message_id: message.id.clone(),
            receipt_handle: ReceiptHandle::new(handle),
            body: message.body.clone(),
            delivery_count: message.receive_count,
        });
        idx += 1;
    }

    let next_visible = queue
        .messages
        .iter()
        .map(|m| m.visible_at)
        .filter(|t| *t > now)
        .min();
    let source = queue.name.clone();

    if let Some((_, target_arn)) = redrive {
        for message in relocated {
            match state.queues.values_mut().find(|q| q.arn == target_arn) {
                Some(dlq) => {
                    debug!(queue = %source, message_id = %message.id, "Moved message to dead-letter queue");
                    dlq.enqueue_moved(message, now);
                }
                None => {
                    debug!(queue = %source, message_id = %message.id, "Dead-letter target missing; message dropped");
                }
            }
        }
    }

    Ok((batch, next_visible))
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
            "CreateQueue",
            name,
            "InvalidParameterValue",
            "Queue names may contain alphanumerics, hyphens and underscores, up to 80 characters",
        ))
    }
}
