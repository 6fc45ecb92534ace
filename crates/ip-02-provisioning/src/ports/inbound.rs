//! Inbound Ports (Driving Ports)

use async_trait::async_trait;

use crate::domain::{SetupReport, TeardownReport};
use crate::error::ProvisionError;

/// Provisioning orchestrator API (Driving Port)
///
/// Not reentrant: setup and teardown assume exclusive access to the
/// topology and must not run concurrently against it.
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// Create the topology in dependency order, stopping at the first
    /// failure. Never rolls back.
    async fn setup(&self) -> SetupReport;

    /// Remove the topology, attempting every step regardless of earlier
    /// failures. Refuses to run without a bucket name.
    async fn teardown(&self, bucket: &str) -> Result<TeardownReport, ProvisionError>;
}
