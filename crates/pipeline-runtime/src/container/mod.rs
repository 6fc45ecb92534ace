//! # Service Container
//!
//! Holds the loaded configuration and the service clients built from it.

pub mod config;

pub use config::{AwsSettings, ConfigError, PipelineConfig};

use std::sync::Arc;

use ip_02_provisioning::CloudServices;

use crate::adapters::aws::{AwsClients, SqsQueues};

/// Configuration plus connected clients.
pub struct ServiceContainer {
    pub config: PipelineConfig,
    pub clients: AwsClients,
}

impl ServiceContainer {
    /// Connect the service clients described by `config`.
    ///
    /// The region the clients resolved is written back into `config`, so the
    /// orchestrator builds ARNs and bucket locations for the same region the
    /// clients talk to.
    pub async fn connect(mut config: PipelineConfig) -> Self {
        let clients = AwsClients::connect(&config.aws).await;
        config.adopt_region(clients.region.as_deref());
        Self { config, clients }
    }

    /// Work queue client for the worker.
    pub fn queues(&self) -> Arc<SqsQueues> {
        self.clients.queues.clone()
    }

    /// All four services for the orchestrator.
    pub fn cloud_services(&self) -> CloudServices {
        self.clients.cloud_services()
    }
}
