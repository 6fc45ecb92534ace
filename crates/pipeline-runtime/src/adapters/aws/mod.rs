//! # Managed Service Adapters
//!
//! Implement the `shared-bus` contracts over the AWS SDK clients. Every SDK
//! failure is classified into a `ServiceError` before it leaves this module.
//!
//! ```text
//! QueueService        ──► SqsQueues      (aws-sdk-sqs)
//! TopicService        ──► SnsTopics      (aws-sdk-sns)
//! ObjectStoreService  ──► S3ObjectStore  (aws-sdk-s3)
//! IdentityService     ──► StsIdentity    (aws-sdk-sts)
//! ```

pub mod errors;
pub mod s3;
pub mod sns;
pub mod sqs;
pub mod sts;

use std::sync::Arc;

use aws_config::BehaviorVersion;
use aws_sdk_sqs::config::Region;
use ip_02_provisioning::CloudServices;
use tracing::info;

use crate::container::AwsSettings;

pub use s3::S3ObjectStore;
pub use sns::SnsTopics;
pub use sqs::SqsQueues;
pub use sts::StsIdentity;

/// One client per managed service, sharing a loaded SDK configuration.
#[derive(Clone, Debug)]
pub struct AwsClients {
    /// Region resolved by the SDK default chain, if any.
    pub region: Option<String>,
    pub queues: Arc<SqsQueues>,
    pub topics: Arc<SnsTopics>,
    pub object_store: Arc<S3ObjectStore>,
    pub identity: Arc<StsIdentity>,
}

impl AwsClients {
    /// Load the default credential and region chain, then build the clients.
    ///
    /// An endpoint override also switches the object store to path-style
    /// addressing, which local emulators require.
    pub async fn connect(settings: &AwsSettings) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &settings.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &settings.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(settings.endpoint_url.is_some())
            .build();

        info!(
            region = shared.region().map(|r| r.as_ref()).unwrap_or("unset"),
            endpoint = settings.endpoint_url.as_deref().unwrap_or("default"),
            "Service clients configured"
        );

        Self {
            region: shared.region().map(|r| r.to_string()),
            queues: Arc::new(SqsQueues::new(aws_sdk_sqs::Client::new(&shared))),
            topics: Arc::new(SnsTopics::new(aws_sdk_sns::Client::new(&shared))),
            object_store: Arc::new(S3ObjectStore::new(aws_sdk_s3::Client::from_conf(s3_config))),
            identity: Arc::new(StsIdentity::new(aws_sdk_sts::Client::new(&shared))),
        }
    }

    /// Bundle the clients for the provisioning orchestrator.
    pub fn cloud_services(&self) -> CloudServices {
        CloudServices {
            object_store: self.object_store.clone(),
            topics: self.topics.clone(),
            queues: self.queues.clone(),
            identity: self.identity.clone(),
        }
    }
}
