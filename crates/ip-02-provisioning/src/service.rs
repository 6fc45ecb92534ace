//! Provisioning Orchestrator Service
//!
//! ## Setup (fail fast, no rollback)
//!
//! ```text
//! 1 topic ─► 2 DLQ ─► 3 queue(+redrive) ─► 4 queue policy(topic) ─► 5 subscribe
//!        ─► 6 topic policy(bucket) ─► 7 bucket ─► 8 bucket notifications
//! ```
//!
//! ## Teardown (best effort, absent counts as done)
//!
//! ```text
//! queue ─► DLQ ─► topic (ARN from account id) ─► empty + delete bucket
//! ```

use std::future::Future;

use async_trait::async_trait;
use shared_bus::{OBJECT_CREATED_ALL, QUEUE_PROTOCOL};
use shared_types::{
    arn, QueueAttributes, QueueEndpoint, RedrivePolicy, ResourceTopology, ServiceError,
};
use tracing::{error, info, warn};

use crate::domain::{
    queue_delivery_policy, requires_location_constraint, topic_publish_policy,
    ProvisioningConfig, ResourceNames, SetupReport, SetupStep, StepOutcome, TeardownReport,
    TeardownStep,
};
use crate::error::ProvisionError;
use crate::ports::{CloudServices, ProvisioningApi};

/// Provisioning orchestrator
pub struct Provisioner {
    services: CloudServices,
    config: ProvisioningConfig,
}

impl Provisioner {
    /// Create an orchestrator; fails if the configuration is invalid.
    pub fn new(services: CloudServices, config: ProvisioningConfig) -> Result<Self, ProvisionError> {
        config.validate()?;
        if config.region.is_none() {
            warn!(
                region = config.effective_region(),
                "No region configured; using default"
            );
        }
        Ok(Self { services, config })
    }

    /// Active configuration.
    pub fn config(&self) -> &ProvisioningConfig {
        &self.config
    }

    /// Run one setup step and record it in `report`.
    async fn step<T, F>(
        &self,
        step: SetupStep,
        report: &mut SetupReport,
        call: F,
    ) -> Result<T, ProvisionError>
    where
        F: Future<Output = Result<T, ServiceError>> + Send,
    {
        match call.await {
            Ok(value) => {
                info!(step = %step, "Setup step complete");
                report.completed.push(step);
                Ok(value)
            }
            Err(source) => {
                error!(step = %step, error = %source, "Setup step failed; aborting setup");
                Err(ProvisionError::SetupStep { step, source })
            }
        }
    }

    async fn create_topology(
        &self,
        names: &ResourceNames,
        report: &mut SetupReport,
    ) -> Result<ResourceTopology, ProvisionError> {
        let svc = &self.services;
        let region = self.config.effective_region();

        let topic_arn = self
            .step(SetupStep::CreateTopic, report, svc.topics.create_topic(&names.topic))
            .await?;
        info!(topic_arn = %topic_arn, "Topic created");

        let dead_letter_queue = self
            .step(
                SetupStep::CreateDeadLetterQueue,
                report,
                svc.queues
                    .create_queue(&names.dead_letter_queue, &QueueAttributes::default()),
            )
            .await?;
        info!(dlq_arn = %dead_letter_queue.arn, "Dead-letter queue created");

        let mut attributes = QueueAttributes::default().with_redrive(RedrivePolicy::new(
            dead_letter_queue.arn.clone(),
            self.config.max_receive_count,
        ));
        if let Some(timeout) = self.config.visibility_timeout {
            attributes = attributes.with_visibility_timeout(timeout);
        }
        let queue: QueueEndpoint = self
            .step(
                SetupStep::CreateQueue,
                report,
                svc.queues.create_queue(&names.queue, &attributes),
            )
            .await?;
        info!(queue_url = %queue.url, "Work queue created");

        let delivery_policy = queue_delivery_policy(&queue.arn, &topic_arn);
        self.step(
            SetupStep::GrantTopicDelivery,
            report,
            svc.queues.set_queue_policy(&queue.url, &delivery_policy),
        )
        .await?;

        let subscription_arn = self
            .step(
                SetupStep::SubscribeQueue,
                report,
                svc.topics.subscribe_queue(&topic_arn, &queue.arn),
            )
            .await?;
        info!(subscription_arn = %subscription_arn, protocol = QUEUE_PROTOCOL, "Queue subscribed to topic");

        let publish_policy = topic_publish_policy(&topic_arn, &names.bucket);
        self.step(
            SetupStep::GrantBucketPublish,
            report,
            svc.topics.set_topic_policy(&topic_arn, &publish_policy),
        )
        .await?;

        let location = requires_location_constraint(region).then_some(region);
        self.step(
            SetupStep::CreateBucket,
            report,
            svc.object_store.create_bucket(&names.bucket, location),
        )
        .await?;
        info!(bucket = %names.bucket, region, "Bucket created");

        let events = [OBJECT_CREATED_ALL.to_string()];
        self.step(
            SetupStep::ConfigureNotifications,
            report,
            svc.object_store
                .put_bucket_notification(&names.bucket, &topic_arn, &events),
        )
        .await?;

        Ok(ResourceTopology {
            topic_arn,
            queue,
            dead_letter_queue,
            bucket_name: names.bucket.clone(),
        })
    }

    async fn delete_queue_named(&self, step: TeardownStep, name: &str) -> StepOutcome {
        let queues = &self.services.queues;
        let result = match queues.queue_url(name).await {
            Ok(url) => queues.delete_queue(&url).await,
            Err(e) => Err(e),
        };
        absorb_not_found(step, name, result)
    }

    async fn delete_topic(&self) -> StepOutcome {
        let step = TeardownStep::DeleteTopic;
        let account_id = match self.services.identity.caller_account_id().await {
            Ok(id) => id,
            Err(source) => {
                error!(step = %step, error = %source, "Cannot resolve account id; topic not deleted");
                return StepOutcome::Failed(ProvisionError::Identity { step, source });
            }
        };
        let topic_arn = arn::topic_arn(
            self.config.effective_region(),
            &account_id,
            &self.config.topic_name,
        );
        let result = self.services.topics.delete_topic(&topic_arn).await;
        absorb_not_found(step, &topic_arn, result)
    }

    /// Delete every object page by page, then the bucket.
    async fn delete_bucket(&self, bucket: &str, report: &mut TeardownReport) -> StepOutcome {
        let step = TeardownStep::DeleteBucket;
        let store = &self.services.object_store;
        let mut continuation = None;
        loop {
            let page = match store.list_objects(bucket, continuation.take()).await {
                Ok(page) => page,
                Err(e) => return absorb_not_found(step, bucket, Err(e)),
            };
            if !page.keys.is_empty() {
                if let Err(e) = store.delete_objects(bucket, &page.keys).await {
                    return absorb_not_found(step, bucket, Err(e));
                }
                report.objects_deleted += page.keys.len();
            }
            match page.next_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        info!(bucket, objects = report.objects_deleted, "Bucket emptied");
        absorb_not_found(step, bucket, store.delete_bucket(bucket).await)
    }
}

/// Map a deletion result: not-found is success, anything else is reported.
fn absorb_not_found(step: TeardownStep, resource: &str, result: Result<(), ServiceError>) -> StepOutcome {
    match result {
        Ok(()) => {
            info!(step = %step, resource, "Deleted");
            StepOutcome::Removed
        }
        Err(e) if e.is_not_found() => {
            warn!(step = %step, resource, "Does not exist; skipping");
            StepOutcome::AlreadyAbsent
        }
        Err(source) => {
            error!(step = %step, resource, error = %source, "Delete failed; continuing teardown");
            StepOutcome::Failed(ProvisionError::TeardownStep { step, source })
        }
    }
}

#[async_trait]
impl ProvisioningApi for Provisioner {
    async fn setup(&self) -> SetupReport {
        let names = self.config.resolve_names();
        info!(
            topic = %names.topic,
            queue = %names.queue,
            dlq = %names.dead_letter_queue,
            bucket = %names.bucket,
            region = self.config.effective_region(),
            "Setting up infrastructure"
        );

        let mut report = SetupReport::new(names.bucket.clone());
        match self.create_topology(&names, &mut report).await {
            Ok(topology) => {
                info!(bucket = %topology.bucket_name, "Infrastructure setup complete");
                report.topology = Some(topology);
            }
            Err(e) => {
                error!(
                    completed = report.completed.len(),
                    error = %e,
                    "Infrastructure setup failed; created resources were left in place"
                );
                report.failure = Some(e);
            }
        }
        report
    }

    async fn teardown(&self, bucket: &str) -> Result<TeardownReport, ProvisionError> {
        let bucket = bucket.trim();
        if bucket.is_empty() {
            return Err(ProvisionError::InvalidConfig(
                "teardown requires a bucket name".to_string(),
            ));
        }
        warn!(bucket, "Destroying infrastructure; this permanently deletes all resources");

        let mut report = TeardownReport::new(bucket);

        let outcome = self
            .delete_queue_named(TeardownStep::DeleteQueue, &self.config.queue_name)
            .await;
        report.record(TeardownStep::DeleteQueue, outcome);

        let outcome = self
            .delete_queue_named(
                TeardownStep::DeleteDeadLetterQueue,
                &self.config.dead_letter_queue_name,
            )
            .await;
        report.record(TeardownStep::DeleteDeadLetterQueue, outcome);

        let outcome = self.delete_topic().await;
        report.record(TeardownStep::DeleteTopic, outcome);

        let outcome = self.delete_bucket(bucket, &mut report).await;
        report.record(TeardownStep::DeleteBucket, outcome);

        if report.succeeded() {
            info!(bucket, "Infrastructure destruction complete");
        } else {
            error!(bucket, "Infrastructure destruction finished with failures");
        }
        Ok(report)
    }
}
