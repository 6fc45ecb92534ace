//! # Provisioning Orchestrator
//!
//! Creates and destroys the ingestion topology: a bucket whose object-created
//! events are published to a topic, which delivers them to a work queue backed
//! by a dead-letter queue.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐ ObjectCreated:* ┌──────────────┐  sqs  ┌──────────────┐
//! │    Bucket    │ ──────────────► │    Topic     │ ────► │  Work Queue  │
//! └──────────────┘                 └──────────────┘       └──────┬───────┘
//!                                                                │ after N deliveries
//!                                                         ┌──────▼───────┐
//!                                                         │     DLQ      │
//!                                                         └──────────────┘
//! ```
//!
//! ## Trust Policies
//!
//! Each grant names exactly one principal service, one action, one resource
//! and one source ARN:
//!
//! - Queue: `sns.amazonaws.com` may `sqs:SendMessage` when the source is the topic.
//! - Topic: `s3.amazonaws.com` may `SNS:Publish` when the source is the bucket.
//!
//! ## Failure Semantics
//!
//! | Operation | On failure |
//! |-----------|------------|
//! | setup     | Stop at the failing step; created resources stay |
//! | teardown  | Record the failure; run the remaining steps |

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    generate_bucket_name, queue_delivery_policy, requires_location_constraint,
    topic_publish_policy, ProvisioningConfig, ResourceNames, SetupReport, SetupStep, StepOutcome,
    TeardownReport, TeardownStep, FALLBACK_REGION,
};
pub use error::ProvisionError;
pub use ports::{CloudServices, ProvisioningApi};
pub use service::Provisioner;
