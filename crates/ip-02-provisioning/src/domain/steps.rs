//! Ordered steps of setup and teardown.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Setup steps in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupStep {
    CreateTopic,
    CreateDeadLetterQueue,
    CreateQueue,
    GrantTopicDelivery,
    SubscribeQueue,
    GrantBucketPublish,
    CreateBucket,
    ConfigureNotifications,
}

impl SetupStep {
    /// Every step, in the order setup runs them.
    pub const ALL: [SetupStep; 8] = [
        Self::CreateTopic,
        Self::CreateDeadLetterQueue,
        Self::CreateQueue,
        Self::GrantTopicDelivery,
        Self::SubscribeQueue,
        Self::GrantBucketPublish,
        Self::CreateBucket,
        Self::ConfigureNotifications,
    ];

    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTopic => "create_topic",
            Self::CreateDeadLetterQueue => "create_dead_letter_queue",
            Self::CreateQueue => "create_queue",
            Self::GrantTopicDelivery => "grant_topic_delivery",
            Self::SubscribeQueue => "subscribe_queue",
            Self::GrantBucketPublish => "grant_bucket_publish",
            Self::CreateBucket => "create_bucket",
            Self::ConfigureNotifications => "configure_notifications",
        }
    }
}

impl fmt::Display for SetupStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Teardown steps in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeardownStep {
    DeleteQueue,
    DeleteDeadLetterQueue,
    DeleteTopic,
    DeleteBucket,
}

impl TeardownStep {
    /// Every step, in the order teardown runs them.
    pub const ALL: [TeardownStep; 4] = [
        Self::DeleteQueue,
        Self::DeleteDeadLetterQueue,
        Self::DeleteTopic,
        Self::DeleteBucket,
    ];

    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DeleteQueue => "delete_queue",
            Self::DeleteDeadLetterQueue => "delete_dead_letter_queue",
            Self::DeleteTopic => "delete_topic",
            Self::DeleteBucket => "delete_bucket",
        }
    }
}

impl fmt::Display for TeardownStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_names_match_labels() {
        for step in SetupStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{}\"", step.as_str()));
        }
        for step in TeardownStep::ALL {
            let json = serde_json::to_string(&step).unwrap();
            assert_eq!(json, format!("\"{step}\""));
        }
    }

    #[test]
    fn test_setup_order_ends_with_notifications() {
        assert_eq!(SetupStep::ALL[0], SetupStep::CreateTopic);
        assert_eq!(SetupStep::ALL[7], SetupStep::ConfigureNotifications);
        assert!(SetupStep::CreateDeadLetterQueue < SetupStep::CreateQueue);
    }
}
