//! Inbound Ports (Driving Ports)
//!
//! The API the runtime uses to drive a consumer worker.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{CycleReport, RunSummary};
use crate::error::WorkerError;

/// Consumer worker API (Driving Port)
#[async_trait]
pub trait ConsumerApi: Send + Sync {
    /// Run one polling cycle: receive, process each message, acknowledge.
    async fn run_cycle(&self) -> Result<CycleReport, WorkerError>;

    /// Poll until `shutdown` carries `true` (or its sender is dropped).
    ///
    /// Never returns early because of a processing, decode or service error.
    async fn run(&self, shutdown: watch::Receiver<bool>) -> RunSummary;
}
