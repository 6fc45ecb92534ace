//! Trust policies binding the topology together.
//!
//! Each policy names exactly one principal service, one action, one resource
//! and one source ARN. No wildcards.

use shared_types::arn::bucket_arn;
use shared_types::{PolicyDocument, PolicyStatement};

/// Principal the topic delivers as.
pub const TOPIC_SERVICE_PRINCIPAL: &str = "sns.amazonaws.com";

/// Principal the object store publishes as.
pub const STORE_SERVICE_PRINCIPAL: &str = "s3.amazonaws.com";

/// Lets the topic `topic_arn`, and no other, send into `queue_arn`.
pub fn queue_delivery_policy(queue_arn: &str, topic_arn: &str) -> PolicyDocument {
    PolicyDocument::new(vec![PolicyStatement::allow_from_source(
        "AllowTopicDelivery",
        TOPIC_SERVICE_PRINCIPAL,
        "sqs:SendMessage",
        queue_arn,
        topic_arn,
    )])
}

/// Lets the bucket `bucket`, and no other, publish to `topic_arn`.
///
/// The bucket may not exist yet; the grant is for its name.
pub fn topic_publish_policy(topic_arn: &str, bucket: &str) -> PolicyDocument {
    PolicyDocument::new(vec![PolicyStatement::allow_from_source(
        "AllowBucketPublish",
        STORE_SERVICE_PRINCIPAL,
        "SNS:Publish",
        topic_arn,
        bucket_arn(bucket),
    )])
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::policy::SOURCE_ARN_KEY;

    const QUEUE: &str = "arn:aws:sqs:us-east-1:123456789012:ShippingQueue";
    const TOPIC: &str = "arn:aws:sns:us-east-1:123456789012:NewOrderEvents";

    fn source_arns(policy: &PolicyDocument) -> Vec<String> {
        policy
            .statement
            .iter()
            .flat_map(|s| s.condition.values())
            .filter_map(|entries| entries.get(SOURCE_ARN_KEY).cloned())
            .collect()
    }

    #[test]
    fn test_queue_policy_names_exactly_one_topic() {
        let policy = queue_delivery_policy(QUEUE, TOPIC);
        assert_eq!(policy.statement.len(), 1);
        assert_eq!(source_arns(&policy), vec![TOPIC.to_string()]);
        assert_eq!(policy.resources().collect::<Vec<_>>(), vec![QUEUE]);
        assert!(!policy.to_json().unwrap().contains('*'));
        assert!(policy.allows(TOPIC_SERVICE_PRINCIPAL, "sqs:SendMessage", QUEUE, TOPIC));
        assert!(!policy.allows(
            TOPIC_SERVICE_PRINCIPAL,
            "sqs:SendMessage",
            QUEUE,
            "arn:aws:sns:us-east-1:123456789012:SomeOtherTopic"
        ));
    }

    #[test]
    fn test_topic_policy_names_exactly_one_bucket() {
        let policy = topic_publish_policy(TOPIC, "black-friday-orders-a1b2c3d4");
        assert_eq!(policy.statement.len(), 1);
        assert_eq!(
            source_arns(&policy),
            vec!["arn:aws:s3:::black-friday-orders-a1b2c3d4".to_string()]
        );
        assert_eq!(policy.statement[0].principal.service, STORE_SERVICE_PRINCIPAL);
        assert!(!policy.to_json().unwrap().contains('*'));
        assert!(!policy.allows(
            STORE_SERVICE_PRINCIPAL,
            "SNS:Publish",
            TOPIC,
            "arn:aws:s3:::black-friday-orders-other"
        ));
    }
}
