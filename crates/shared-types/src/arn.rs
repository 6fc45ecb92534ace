//! Resource name construction for the pipeline's managed resources.

/// Partition all resources live in.
pub const PARTITION: &str = "aws";

/// ARN of a notification topic.
#[must_use]
pub fn topic_arn(region: &str, account_id: &str, topic_name: &str) -> String {
    format!("arn:{PARTITION}:sns:{region}:{account_id}:{topic_name}")
}

/// ARN of a queue.
#[must_use]
pub fn queue_arn(region: &str, account_id: &str, queue_name: &str) -> String {
    format!("arn:{PARTITION}:sqs:{region}:{account_id}:{queue_name}")
}

/// ARN of a bucket. Buckets are global: no region or account segment.
#[must_use]
pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:{PARTITION}:s3:::{bucket}")
}

/// Last `:`-separated segment of an ARN (the resource name).
#[must_use]
pub fn resource_name(arn: &str) -> &str {
    arn.rsplit(':').next().unwrap_or(arn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arn_formats() {
        assert_eq!(
            topic_arn("us-east-1", "123456789012", "NewOrderEvents"),
            "arn:aws:sns:us-east-1:123456789012:NewOrderEvents"
        );
        assert_eq!(
            queue_arn("eu-west-1", "123456789012", "ShippingQueue"),
            "arn:aws:sqs:eu-west-1:123456789012:ShippingQueue"
        );
        assert_eq!(bucket_arn("orders-1"), "arn:aws:s3:::orders-1");
    }

    #[test]
    fn test_resource_name() {
        assert_eq!(
            resource_name("arn:aws:sqs:eu-west-1:123456789012:ShippingQueueDLQ"),
            "ShippingQueueDLQ"
        );
        assert_eq!(resource_name("plain"), "plain");
    }
}
