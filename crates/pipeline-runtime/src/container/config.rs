//! # Pipeline Configuration
//!
//! Unified configuration for the worker, the orchestrator, telemetry and the
//! service clients.
//!
//! Values come from `IP_*` environment variables on top of defaults that
//! mirror the reference deployment. Nothing is read after startup; every
//! component receives its section explicitly.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use ingest_telemetry::TelemetryConfig;
use ip_01_consumer_worker::{WorkerConfig, WorkerError};
use ip_02_provisioning::{ProvisionError, ProvisioningConfig};
use thiserror::Error;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Service client settings.
    pub aws: AwsSettings,
    /// Consumer worker configuration.
    pub worker: WorkerConfig,
    /// Provisioning orchestrator configuration.
    pub provisioning: ProvisioningConfig,
    /// Logging and tracing configuration.
    pub telemetry: TelemetryConfig,
}

/// Service client settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AwsSettings {
    /// Client region; the SDK default chain decides when `None`.
    pub region: Option<String>,
    /// Endpoint override for local emulators (LocalStack, ElasticMQ).
    pub endpoint_url: Option<String>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error(transparent)]
    Worker(#[from] WorkerError),

    #[error(transparent)]
    Provisioning(#[from] ProvisionError),
}

impl PipelineConfig {
    /// Load configuration from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `IP_TOPIC_NAME`, `IP_QUEUE_NAME`, `IP_DLQ_NAME`: resource names
    /// - `IP_BUCKET_NAME`, `IP_BUCKET_PREFIX`: bucket name or generation prefix
    /// - `IP_MAX_RECEIVE_COUNT`: deliveries before dead-lettering
    /// - `IP_VISIBILITY_TIMEOUT`: work queue visibility timeout in seconds
    /// - `IP_QUEUE_URL`: skip name resolution in the worker
    /// - `IP_MAX_MESSAGES`, `IP_WAIT_SECONDS`: worker batch size and long-poll wait
    /// - `AWS_REGION` or `AWS_DEFAULT_REGION`: client region
    /// - `IP_AWS_ENDPOINT_URL`: endpoint override
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source and validate the result.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let aws = AwsSettings {
            region: get("AWS_REGION").or_else(|| get("AWS_DEFAULT_REGION")),
            endpoint_url: get("IP_AWS_ENDPOINT_URL"),
        };

        let mut provisioning = ProvisioningConfig {
            region: aws.region.clone(),
            ..ProvisioningConfig::default()
        };
        if let Some(name) = get("IP_TOPIC_NAME") {
            provisioning.topic_name = name;
        }
        if let Some(name) = get("IP_QUEUE_NAME") {
            provisioning.queue_name = name;
        }
        if let Some(name) = get("IP_DLQ_NAME") {
            provisioning.dead_letter_queue_name = name;
        }
        provisioning.bucket_name = get("IP_BUCKET_NAME");
        if let Some(prefix) = get("IP_BUCKET_PREFIX") {
            provisioning.bucket_prefix = prefix;
        }
        if let Some(count) = parse(&get, "IP_MAX_RECEIVE_COUNT")? {
            provisioning.max_receive_count = count;
        }
        if let Some(secs) = parse::<u64, _>(&get, "IP_VISIBILITY_TIMEOUT")? {
            provisioning.visibility_timeout = Some(Duration::from_secs(secs));
        }

        let mut worker = WorkerConfig::default().with_queue_name(provisioning.queue_name.clone());
        if let Some(url) = get("IP_QUEUE_URL") {
            worker = worker.with_queue_url(url);
        }
        if let Some(max) = parse(&get, "IP_MAX_MESSAGES")? {
            worker = worker.with_max_messages(max);
        }
        if let Some(secs) = parse::<u64, _>(&get, "IP_WAIT_SECONDS")? {
            worker = worker.with_wait_time(Duration::from_secs(secs));
        }

        let config = Self {
            aws,
            worker,
            provisioning,
            telemetry: TelemetryConfig::from_lookup(&lookup),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fill unset regions with the one the SDK resolved from its default
    /// chain (environment, shared config file, instance metadata).
    ///
    /// Explicitly configured regions are kept. The orchestrator falls back to
    /// its default region only when this is `None` as well.
    pub fn adopt_region(&mut self, resolved: Option<&str>) {
        let Some(resolved) = resolved.filter(|r| !r.trim().is_empty()) else {
            return;
        };
        if self.aws.region.is_none() {
            self.aws.region = Some(resolved.to_string());
        }
        if self.provisioning.region.is_none() {
            self.provisioning.region = Some(resolved.to_string());
        }
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.worker.validate()?;
        self.provisioning.validate()?;
        Ok(())
    }
}

fn parse<T, G>(get: &G, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    var,
                    reason: e.to_string(),
                    value,
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<PipelineConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.aws, AwsSettings::default());
        assert_eq!(config.provisioning, ProvisioningConfig::default());
        assert_eq!(config.worker.queue_name, "ShippingQueue");
        assert_eq!(config.worker.max_messages, 10);
        assert_eq!(config.worker.wait_time, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides_flow_into_sections() {
        let config = load(&[
            ("AWS_DEFAULT_REGION", "eu-west-1"),
            ("IP_QUEUE_NAME", "OrdersQueue"),
            ("IP_BUCKET_NAME", "orders-fixed"),
            ("IP_MAX_RECEIVE_COUNT", "5"),
            ("IP_MAX_MESSAGES", "4"),
            ("IP_WAIT_SECONDS", "20"),
            ("IP_AWS_ENDPOINT_URL", "http://localhost:4566"),
        ])
        .unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.provisioning.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.provisioning.queue_name, "OrdersQueue");
        assert_eq!(config.worker.queue_name, "OrdersQueue");
        assert_eq!(config.provisioning.bucket_name.as_deref(), Some("orders-fixed"));
        assert_eq!(config.provisioning.max_receive_count, 5);
        assert_eq!(config.worker.max_messages, 4);
        assert_eq!(config.aws.endpoint_url.as_deref(), Some("http://localhost:4566"));
    }

    #[test]
    fn test_aws_region_preferred() {
        let config = load(&[("AWS_REGION", "us-west-2"), ("AWS_DEFAULT_REGION", "eu-west-1")]).unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("us-west-2"));
    }

    #[test]
    fn test_resolved_region_fills_unset_sections() {
        let mut config = load(&[]).unwrap();
        config.adopt_region(Some("ap-northeast-3"));
        assert_eq!(config.aws.region.as_deref(), Some("ap-northeast-3"));
        assert_eq!(config.provisioning.region.as_deref(), Some("ap-northeast-3"));
        assert_eq!(config.provisioning.effective_region(), "ap-northeast-3");
    }

    #[test]
    fn test_configured_region_wins_over_resolved() {
        let mut config = load(&[("AWS_REGION", "eu-west-1")]).unwrap();
        config.adopt_region(Some("ap-northeast-3"));
        assert_eq!(config.provisioning.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_no_resolved_region_keeps_fallback() {
        let mut config = load(&[]).unwrap();
        config.adopt_region(None);
        config.adopt_region(Some(" "));
        assert_eq!(config.provisioning.region, None);
        assert_eq!(config.provisioning.effective_region(), "us-east-1");
    }

    #[test]
    fn test_unparseable_value() {
        let err = load(&[("IP_MAX_MESSAGES", "ten")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "IP_MAX_MESSAGES", .. }));
    }

    #[test]
    fn test_out_of_range_values() {
        assert!(matches!(
            load(&[("IP_MAX_MESSAGES", "11")]).unwrap_err(),
            ConfigError::Worker(_)
        ));
        assert!(matches!(
            load(&[("IP_WAIT_SECONDS", "21")]).unwrap_err(),
            ConfigError::Worker(_)
        ));
        assert!(matches!(
            load(&[("IP_MAX_RECEIVE_COUNT", "0")]).unwrap_err(),
            ConfigError::Provisioning(_)
        ));
        assert!(matches!(
            load(&[("IP_VISIBILITY_TIMEOUT", "43201")]).unwrap_err(),
            ConfigError::Provisioning(_)
        ));
    }
}
