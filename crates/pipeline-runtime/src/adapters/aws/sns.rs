//! Topic adapter over `aws-sdk-sns`.

use async_trait::async_trait;
use aws_sdk_sns::Client;
use shared_bus::{TopicService, QUEUE_PROTOCOL};
use shared_types::{PolicyDocument, ServiceError};

use super::errors::{classify, missing_field};

/// Topic attribute holding the access policy.
const POLICY_ATTRIBUTE: &str = "Policy";

/// `TopicService` backed by the managed notification service.
#[derive(Clone, Debug)]
pub struct SnsTopics {
    client: Client,
}

impl SnsTopics {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TopicService for SnsTopics {
    async fn create_topic(&self, name: &str) -> Result<String, ServiceError> {
        let output = self
            .client
            .create_topic()
            .name(name)
            .send()
            .await
            .map_err(|e| classify("CreateTopic", name, &e))?;
        output
            .topic_arn()
            .map(str::to_string)
            .ok_or_else(|| missing_field("CreateTopic", name, "TopicArn"))
    }

    async fn subscribe_queue(
        &self,
        topic_arn: &str,
        queue_arn: &str,
    ) -> Result<String, ServiceError> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(QUEUE_PROTOCOL)
            .endpoint(queue_arn)
            .return_subscription_arn(true)
            .send()
            .await
            .map_err(|e| classify("Subscribe", topic_arn, &e))?;
        output
            .subscription_arn()
            .map(str::to_string)
            .ok_or_else(|| missing_field("Subscribe", topic_arn, "SubscriptionArn"))
    }

    async fn set_topic_policy(
        &self,
        topic_arn: &str,
        policy: &PolicyDocument,
    ) -> Result<(), ServiceError> {
        let document = policy.to_json().map_err(|e| {
            ServiceError::rejected("SetTopicAttributes", topic_arn, "MalformedPolicy", e.to_string())
        })?;
        self.client
            .set_topic_attributes()
            .topic_arn(topic_arn)
            .attribute_name(POLICY_ATTRIBUTE)
            .attribute_value(document)
            .send()
            .await
            .map_err(|e| classify("SetTopicAttributes", topic_arn, &e))?;
        Ok(())
    }

    async fn delete_topic(&self, topic_arn: &str) -> Result<(), ServiceError> {
        self.client
            .delete_topic()
            .topic_arn(topic_arn)
            .send()
            .await
            .map_err(|e| classify("DeleteTopic", topic_arn, &e))?;
        Ok(())
    }
}
