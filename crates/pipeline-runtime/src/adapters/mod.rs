//! # Adapter Implementations
//!
//! Concrete implementations of the driven ports:
//! 1. `aws`: the managed-service contracts over the AWS SDK
//! 2. `metrics`: the worker `MetricsRecorder` over the Prometheus registry

pub mod aws;
pub mod metrics;

pub use aws::AwsClients;
pub use metrics::{record_setup, record_teardown, PrometheusRecorder};
