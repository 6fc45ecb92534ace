//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Provisioning configuration and resource naming
//! - Trust policy construction
//! - Step ordering and outcome reports
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod policy;
pub mod report;
pub mod steps;

pub use config::{
    generate_bucket_name, requires_location_constraint, ProvisioningConfig, ResourceNames,
    FALLBACK_REGION,
};
pub use policy::{queue_delivery_policy, topic_publish_policy};
pub use report::{SetupReport, StepOutcome, TeardownReport};
pub use steps::{SetupStep, TeardownStep};
