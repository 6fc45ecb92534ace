//! Outbound Ports (Driven Ports)
//!
//! The orchestrator drives all four managed services.

use std::sync::Arc;

pub use shared_bus::{IdentityService, ObjectStoreService, QueueService, TopicService};

/// Handles to the managed services the orchestrator drives.
#[derive(Clone)]
pub struct CloudServices {
    pub object_store: Arc<dyn ObjectStoreService>,
    pub topics: Arc<dyn TopicService>,
    pub queues: Arc<dyn QueueService>,
    pub identity: Arc<dyn IdentityService>,
}

impl CloudServices {
    /// All four services backed by one implementation.
    pub fn from_shared<C>(cloud: Arc<C>) -> Self
    where
        C: ObjectStoreService + TopicService + QueueService + IdentityService + 'static,
    {
        Self {
            object_store: cloud.clone(),
            topics: cloud.clone(),
            queues: cloud.clone(),
            identity: cloud,
        }
    }
}
