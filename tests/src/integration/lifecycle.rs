//! # Topology Lifecycle
//!
//! Setup, rerun, use and teardown of the full topology through the runtime
//! command layer.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use ip_02_provisioning::{CloudServices, StepOutcome, TeardownStep};
    use pipeline_runtime::{run_setup, run_teardown, setup_summary, teardown_summary};
    use shared_bus::{InMemoryCloud, ObjectStoreService, OBJECT_CREATED_ALL};
    use shared_types::ServiceError;

    use crate::integration::fixtures::{provisioning, BUCKET};

    #[tokio::test]
    async fn test_setup_rerun_then_teardown_twice() {
        let cloud = Arc::new(InMemoryCloud::new().with_page_size(3));
        let services = CloudServices::from_shared(cloud.clone());

        let first = run_setup(services.clone(), provisioning()).await.unwrap();
        let second = run_setup(services.clone(), provisioning()).await.unwrap();
        assert!(first.succeeded());
        assert!(second.succeeded());
        assert_eq!(first.topology, second.topology);
        assert_eq!(cloud.subscriptions(&first.topology.unwrap().topic_arn).len(), 1);

        for i in 0..7 {
            cloud
                .put_object(BUCKET, &format!("order-{i}.json"), b"{}".to_vec(), "application/json")
                .await
                .unwrap();
        }

        let teardown = run_teardown(services.clone(), provisioning(), BUCKET)
            .await
            .unwrap();
        assert!(teardown.succeeded());
        assert_eq!(teardown.objects_deleted, 7);
        assert!(teardown
            .steps
            .iter()
            .all(|(_, outcome)| *outcome == StepOutcome::Removed));
        assert!(!cloud.has_bucket(BUCKET));
        assert!(!cloud.has_queue("ShippingQueue"));
        assert!(!cloud.has_queue("ShippingQueueDLQ"));

        let again = run_teardown(services, provisioning(), BUCKET).await.unwrap();
        assert!(again.succeeded());
        assert!(again
            .steps
            .iter()
            .all(|(_, outcome)| *outcome == StepOutcome::AlreadyAbsent));
        assert!(teardown_summary(&again).contains("destruction complete"));
    }

    #[tokio::test]
    async fn test_partial_setup_is_cleaned_by_teardown() {
        let cloud = Arc::new(InMemoryCloud::new());
        let services = CloudServices::from_shared(cloud.clone());
        cloud.fail_once(
            "PutBucketNotificationConfiguration",
            ServiceError::transient("PutBucketNotificationConfiguration", BUCKET, "throttled"),
        );

        let report = run_setup(services.clone(), provisioning()).await.unwrap();
        assert!(!report.succeeded());
        assert!(setup_summary(&report).contains(BUCKET));
        assert!(cloud.has_bucket(BUCKET));

        let teardown = run_teardown(services, provisioning(), BUCKET).await.unwrap();
        assert!(teardown.succeeded());
        assert!(!cloud.has_bucket(BUCKET));
        assert!(!cloud.has_queue("ShippingQueue"));
    }

    #[tokio::test]
    async fn test_foreign_bucket_cannot_publish_to_topic() {
        let cloud = Arc::new(InMemoryCloud::new());
        let services = CloudServices::from_shared(cloud.clone());
        let report = run_setup(services, provisioning()).await.unwrap();
        let topology = report.topology.unwrap();

        cloud.create_bucket("someone-elses-bucket", None).await.unwrap();
        let refused = cloud
            .put_bucket_notification(
                "someone-elses-bucket",
                &topology.topic_arn,
                &[OBJECT_CREATED_ALL.to_string()],
            )
            .await
            .unwrap_err();
        assert!(matches!(refused, ServiceError::Rejected { .. }));

        cloud
            .put_object("someone-elses-bucket", "order-x.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
    }

    #[tokio::test]
    async fn test_teardown_failure_is_reported_per_step() {
        let cloud = Arc::new(InMemoryCloud::new());
        let services = CloudServices::from_shared(cloud.clone());
        run_setup(services.clone(), provisioning()).await.unwrap();
        cloud.fail_once(
            "DeleteTopic",
            ServiceError::rejected("DeleteTopic", "NewOrderEvents", "AuthorizationError", "denied"),
        );

        let report = run_teardown(services, provisioning(), BUCKET).await.unwrap();

        assert!(!report.succeeded());
        let failed: Vec<TeardownStep> = report
            .steps
            .iter()
            .filter(|(_, outcome)| !outcome.is_satisfied())
            .map(|(step, _)| *step)
            .collect();
        assert_eq!(failed, vec![TeardownStep::DeleteTopic]);
        assert!(!cloud.has_bucket(BUCKET));
        assert!(teardown_summary(&report).contains("finished with failures"));
    }
}
