//! Integration flows across the provisioning orchestrator, the in-memory
//! cloud and the consumer worker.

pub mod flows;
pub mod lifecycle;
pub mod redrive;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use ip_01_consumer_worker::WorkerConfig;
    use ip_02_provisioning::{CloudServices, Provisioner, ProvisioningApi, ProvisioningConfig};
    use shared_bus::InMemoryCloud;
    use shared_types::ResourceTopology;

    pub const BUCKET: &str = "black-friday-orders-test0001";

    pub fn provisioning() -> ProvisioningConfig {
        ProvisioningConfig::default().with_bucket_name(BUCKET)
    }

    /// Worker that never blocks on an empty queue.
    pub fn worker_config() -> WorkerConfig {
        WorkerConfig::default().with_wait_time(Duration::ZERO)
    }

    /// A fresh cloud with the full topology provisioned.
    pub async fn provisioned(config: ProvisioningConfig) -> (Arc<InMemoryCloud>, ResourceTopology) {
        let cloud = Arc::new(InMemoryCloud::new());
        let provisioner = Provisioner::new(CloudServices::from_shared(cloud.clone()), config).unwrap();
        let report = provisioner.setup().await;
        let topology = report.topology.expect("setup should succeed");
        cloud.clear_calls();
        (cloud, topology)
    }
}
