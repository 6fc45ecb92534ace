//! Error types for the provisioning orchestrator

use shared_types::{IdentityError, ServiceError};
use thiserror::Error;

use crate::domain::{SetupStep, TeardownStep};

/// Errors that can occur while provisioning or removing the topology
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProvisionError {
    #[error("Invalid provisioning configuration: {0}")]
    InvalidConfig(String),

    #[error("Setup step {step} failed: {source}")]
    SetupStep {
        step: SetupStep,
        #[source]
        source: ServiceError,
    },

    #[error("Teardown step {step} failed: {source}")]
    TeardownStep {
        step: TeardownStep,
        #[source]
        source: ServiceError,
    },

    #[error("Teardown step {step} failed: {source}")]
    Identity {
        step: TeardownStep,
        #[source]
        source: IdentityError,
    },
}
