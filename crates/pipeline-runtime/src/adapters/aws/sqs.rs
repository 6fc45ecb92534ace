//! Work queue adapter over `aws-sdk-sqs`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_sqs::types::{MessageSystemAttributeName, QueueAttributeName};
use aws_sdk_sqs::Client;
use shared_bus::QueueService;
use shared_types::{
    PolicyDocument, QueueAttributes, QueueEndpoint, QueueMessage, ReceiptHandle, ServiceError,
};
use tracing::{debug, warn};

use super::errors::{classify, missing_field};

/// `QueueService` backed by the managed queue service.
#[derive(Clone, Debug)]
pub struct SqsQueues {
    client: Client,
}

impl SqsQueues {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn queue_arn(&self, queue_url: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::QueueArn)
            .send()
            .await
            .map_err(|e| classify("GetQueueAttributes", queue_url, &e))?;
        output
            .attributes()
            .and_then(|attrs| attrs.get(&QueueAttributeName::QueueArn))
            .cloned()
            .ok_or_else(|| missing_field("GetQueueAttributes", queue_url, "QueueArn"))
    }
}

/// Attribute map for `CreateQueue`; `None` when nothing is set.
fn creation_attributes(
    name: &str,
    attributes: &QueueAttributes,
) -> Result<Option<HashMap<QueueAttributeName, String>>, ServiceError> {
    let mut map = HashMap::new();
    if let Some(redrive) = &attributes.redrive_policy {
        let value = redrive.to_attribute().map_err(|e| {
            ServiceError::rejected("CreateQueue", name, "InvalidAttributeValue", e.to_string())
        })?;
        map.insert(QueueAttributeName::RedrivePolicy, value);
    }
    if let Some(timeout) = attributes.visibility_timeout {
        map.insert(
            QueueAttributeName::VisibilityTimeout,
            timeout.as_secs().to_string(),
        );
    }
    Ok((!map.is_empty()).then_some(map))
}

fn to_queue_message(message: &aws_sdk_sqs::types::Message) -> Option<QueueMessage> {
    let (Some(message_id), Some(handle)) = (message.message_id(), message.receipt_handle()) else {
        warn!("Received message without id or receipt handle; skipping");
        return None;
    };
    let delivery_count = message
        .attributes()
        .and_then(|attrs| attrs.get(&MessageSystemAttributeName::ApproximateReceiveCount))
        .and_then(|v| v.parse().ok())
        .unwrap_or(1);
    Some(QueueMessage {
        message_id: message_id.to_string(),
        receipt_handle: ReceiptHandle::new(handle),
        body: message.body().unwrap_or_default().to_string(),
        delivery_count,
    })
}

#[async_trait]
impl QueueService for SqsQueues {
    async fn create_queue(
        &self,
        name: &str,
        attributes: &QueueAttributes,
    ) -> Result<QueueEndpoint, ServiceError> {
        let output = self
            .client
            .create_queue()
            .queue_name(name)
            .set_attributes(creation_attributes(name, attributes)?)
            .send()
            .await
            .map_err(|e| classify("CreateQueue", name, &e))?;
        let url = output
            .queue_url()
            .ok_or_else(|| missing_field("CreateQueue", name, "QueueUrl"))?
            .to_string();
        let arn = self.queue_arn(&url).await?;
        Ok(QueueEndpoint { url, arn })
    }

    async fn queue_url(&self, name: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(name)
            .send()
            .await
            .map_err(|e| classify("GetQueueUrl", name, &e))?;
        output
            .queue_url()
            .map(str::to_string)
            .ok_or_else(|| missing_field("GetQueueUrl", name, "QueueUrl"))
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: u8,
        wait: Duration,
    ) -> Result<Vec<QueueMessage>, ServiceError> {
        let wait_seconds = i32::try_from(wait.as_secs()).unwrap_or(i32::MAX);
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(i32::from(max_messages))
            .wait_time_seconds(wait_seconds)
            .message_system_attribute_names(MessageSystemAttributeName::ApproximateReceiveCount)
            .send()
            .await
            .map_err(|e| classify("ReceiveMessage", queue_url, &e))?;
        let messages: Vec<QueueMessage> = output.messages().iter().filter_map(to_queue_message).collect();
        debug!(queue_url, received = messages.len(), "Receive returned");
        Ok(messages)
    }

    async fn delete_message(
        &self,
        queue_url: &str,
        receipt_handle: &ReceiptHandle,
    ) -> Result<(), ServiceError> {
        self.client
            .delete_message()
            .queue_url(queue_url)
            .receipt_handle(receipt_handle.as_str())
            .send()
            .await
            .map_err(|e| classify("DeleteMessage", queue_url, &e))?;
        Ok(())
    }

    async fn set_queue_policy(
        &self,
        queue_url: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError> {
        let document = policy.to_json().map_err(|e| {
            ServiceError::rejected("SetQueueAttributes", queue_url, "MalformedPolicy", e.to_string())
        })?;
        self.client
            .set_queue_attributes()
            .queue_url(queue_url)
            .attributes(QueueAttributeName::Policy, document)
            .send()
            .await
            .map_err(|e| classify("SetQueueAttributes", queue_url, &e))?;
        Ok(())
    }

    async fn delete_queue(&self, queue_url: &str) -> Result<(), ServiceError> {
        self.client
            .delete_queue()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| classify("DeleteQueue", queue_url, &e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::RedrivePolicy;

    #[test]
    fn test_creation_attributes() {
        assert_eq!(creation_attributes("q", &QueueAttributes::default()).unwrap(), None);

        let attributes = QueueAttributes::default()
            .with_redrive(RedrivePolicy::new("arn:aws:sqs:us-east-1:123456789012:dlq", 3))
            .with_visibility_timeout(Duration::from_secs(45));
        let map = creation_attributes("q", &attributes).unwrap().unwrap();
        assert_eq!(map[&QueueAttributeName::VisibilityTimeout], "45");
        assert!(map[&QueueAttributeName::RedrivePolicy].contains("\"maxReceiveCount\":3"));
    }

    #[test]
    fn test_message_conversion() {
        let message = aws_sdk_sqs::types::Message::builder()
            .message_id("m-1")
            .receipt_handle("rh-1")
            .body("{}")
            .attributes(MessageSystemAttributeName::ApproximateReceiveCount, "2")
            .build();
        let converted = to_queue_message(&message).unwrap();
        assert_eq!(converted.message_id, "m-1");
        assert_eq!(converted.receipt_handle.as_str(), "rh-1");
        assert_eq!(converted.delivery_count, 2);

        let anonymous = aws_sdk_sqs::types::Message::builder().body("{}").build();
        assert!(to_queue_message(&anonymous).is_none());
    }
}
