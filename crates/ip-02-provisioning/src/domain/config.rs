//! Provisioning configuration
//!
//! Every recognised option is a field here; nothing is read from ambient
//! process state once the orchestrator is constructed.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProvisionError;

/// Region used when none is configured.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Largest `maxReceiveCount` the queue service accepts.
pub const MAX_RECEIVE_COUNT_LIMIT: u32 = 1000;

/// Longest visibility timeout the queue service accepts (12 hours).
pub const MAX_VISIBILITY_TIMEOUT: Duration = Duration::from_secs(43_200);

/// Names of the four managed resources.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNames {
    pub topic: String,
    pub queue: String,
    pub dead_letter_queue: String,
    pub bucket: String,
}

/// Provisioning orchestrator configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisioningConfig {
    /// Notification topic name
    pub topic_name: String,
    /// Work queue name
    pub queue_name: String,
    /// Dead-letter queue name
    pub dead_letter_queue_name: String,
    /// Fixed bucket name; generated from `bucket_prefix` when `None`
    pub bucket_name: Option<String>,
    /// Prefix for generated bucket names
    pub bucket_prefix: String,
    /// Client region; `us-east-1` when `None`
    pub region: Option<String>,
    /// Deliveries before a message moves to the dead-letter queue
    pub max_receive_count: u32,
    /// Work queue visibility timeout; service default when `None`
    pub visibility_timeout: Option<Duration>,
}

impl Default for ProvisioningConfig {
    fn default() -> Self {
        Self {
            topic_name: "NewOrderEvents".to_string(),
            queue_name: "ShippingQueue".to_string(),
            dead_letter_queue_name: "ShippingQueueDLQ".to_string(),
            bucket_name: None,
            bucket_prefix: "black-friday-orders".to_string(),
            region: None,
            max_receive_count: 3,
            visibility_timeout: None,
        }
    }
}

impl ProvisioningConfig {
    /// Validate names and limits.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        for (what, name) in [
            ("topic", &self.topic_name),
            ("queue", &self.queue_name),
            ("dead-letter queue", &self.dead_letter_queue_name),
        ] {
            if !is_valid_queue_or_topic_name(name) {
                return Err(ProvisionError::InvalidConfig(format!(
                    "{what} name {name:?} must be 1-80 alphanumerics, hyphens or underscores"
                )));
            }
        }

        if self.queue_name == self.dead_letter_queue_name {
            return Err(ProvisionError::InvalidConfig(
                "queue and dead-letter queue must have different names".to_string(),
            ));
        }

        if let Some(bucket) = &self.bucket_name {
            if !is_valid_bucket_name(bucket) {
                return Err(ProvisionError::InvalidConfig(format!(
                    "bucket name {bucket:?} is not a valid bucket name"
                )));
            }
        } else if !is_valid_bucket_name(&format!("{}-00000000", self.bucket_prefix)) {
            return Err(ProvisionError::InvalidConfig(format!(
                "bucket prefix {:?} cannot produce a valid bucket name",
                self.bucket_prefix
            )));
        }

        if self.max_receive_count == 0 || self.max_receive_count > MAX_RECEIVE_COUNT_LIMIT {
            return Err(ProvisionError::InvalidConfig(format!(
                "max_receive_count must be between 1 and {MAX_RECEIVE_COUNT_LIMIT}, got {}",
                self.max_receive_count
            )));
        }

        if let Some(timeout) = self.visibility_timeout {
            if timeout > MAX_VISIBILITY_TIMEOUT {
                return Err(ProvisionError::InvalidConfig(format!(
                    "visibility_timeout must be at most {}s, got {}s",
                    MAX_VISIBILITY_TIMEOUT.as_secs(),
                    timeout.as_secs()
                )));
            }
        }

        Ok(())
    }

    /// Configured region, or the fallback.
    pub fn effective_region(&self) -> &str {
        self.region.as_deref().unwrap_or(FALLBACK_REGION)
    }

    /// Resource names for one setup run. Generates a bucket name when none
    /// is configured, so two calls may differ.
    pub fn resolve_names(&self) -> ResourceNames {
        ResourceNames {
            topic: self.topic_name.clone(),
            queue: self.queue_name.clone(),
            dead_letter_queue: self.dead_letter_queue_name.clone(),
            bucket: self
                .bucket_name
                .clone()
                .unwrap_or_else(|| generate_bucket_name(&self.bucket_prefix)),
        }
    }

    /// Builder-style method to fix the bucket name
    pub fn with_bucket_name(mut self, bucket: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket.into());
        self
    }

    /// Builder-style method to set the region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Builder-style method to set the redrive threshold
    pub fn with_max_receive_count(mut self, count: u32) -> Self {
        self.max_receive_count = count;
        self
    }

    /// Builder-style method to set the visibility timeout
    pub fn with_visibility_timeout(mut self, timeout: Duration) -> Self {
        self.visibility_timeout = Some(timeout);
        self
    }
}

/// `<prefix>-<8 hex chars>`.
pub fn generate_bucket_name(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{prefix}-{}", &id[..8])
}

/// Buckets in `us-east-1` are created without a location constraint; every
/// other region requires one naming the region.
pub fn requires_location_constraint(region: &str) -> bool {
    region != FALLBACK_REGION
}

fn is_valid_queue_or_topic_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 80
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn is_valid_bucket_name(name: &str) -> bool {
    let edge = |c: Option<char>| c.is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit());
    (3..=63).contains(&name.len())
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
        && edge(name.chars().next())
        && edge(name.chars().last())
        && !name.contains("..")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_deployment() {
        let config = ProvisioningConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.topic_name, "NewOrderEvents");
        assert_eq!(config.queue_name, "ShippingQueue");
        assert_eq!(config.dead_letter_queue_name, "ShippingQueueDLQ");
        assert_eq!(config.max_receive_count, 3);
        assert_eq!(config.effective_region(), "us-east-1");
    }

    #[test]
    fn test_generated_bucket_name_shape() {
        let name = generate_bucket_name("black-friday-orders");
        assert!(name.starts_with("black-friday-orders-"));
        let suffix = &name["black-friday-orders-".len()..];
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(is_valid_bucket_name(&name));
    }

    #[test]
    fn test_fixed_bucket_name_is_used() {
        let names = ProvisioningConfig::default()
            .with_bucket_name("orders-fixed")
            .resolve_names();
        assert_eq!(names.bucket, "orders-fixed");
    }

    #[test]
    fn test_location_constraint_rule() {
        assert!(!requires_location_constraint("us-east-1"));
        assert!(requires_location_constraint("ap-northeast-3"));
    }

    #[test]
    fn test_visibility_timeout_bounded_locally() {
        assert!(ProvisioningConfig::default()
            .with_visibility_timeout(Duration::ZERO)
            .validate()
            .is_ok());
        assert!(ProvisioningConfig::default()
            .with_visibility_timeout(MAX_VISIBILITY_TIMEOUT)
            .validate()
            .is_ok());
        let err = ProvisioningConfig::default()
            .with_visibility_timeout(MAX_VISIBILITY_TIMEOUT + Duration::from_secs(1))
            .validate()
            .unwrap_err();
        assert!(matches!(err, ProvisionError::InvalidConfig(msg) if msg.contains("visibility_timeout")));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(ProvisioningConfig::default()
            .with_max_receive_count(0)
            .validate()
            .is_err());
        assert!(ProvisioningConfig::default()
            .with_bucket_name("Bad_Bucket")
            .validate()
            .is_err());
        let mut config = ProvisioningConfig::default();
        config.dead_letter_queue_name = config.queue_name.clone();
        assert!(config.validate().is_err());
        let mut config = ProvisioningConfig::default();
        config.topic_name = "has space".into();
        assert!(config.validate().is_err());
    }
}
