//! # Redrive Flows
//!
//! Messages whose processing keeps failing are redelivered until the
//! maximum receive count, then moved to the dead-letter queue untouched.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use ip_01_consumer_worker::{
        ConsumerApi, ConsumerWorker, DeliveryContext, HandlerError, MessageOutcome,
        RecordHandler, UnackReason,
    };
    use shared_bus::{ObjectStoreService, QueueService};
    use shared_types::{decode_event_records, EventRecord};

    use crate::integration::fixtures::{provisioned, provisioning, worker_config, BUCKET};

    const VISIBILITY: Duration = Duration::from_secs(5);

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Fails until the given delivery attempt, then succeeds.
    struct FlakyHandler {
        succeed_on: u32,
        attempts: AtomicU32,
    }

    impl FlakyHandler {
        fn new(succeed_on: u32) -> Self {
            Self {
                succeed_on,
                attempts: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl RecordHandler for FlakyHandler {
        async fn handle(
            &self,
            _record: &EventRecord,
            context: &DeliveryContext,
        ) -> Result<(), HandlerError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if context.delivery_count < self.succeed_on {
                return Err(HandlerError::Unavailable("warehouse offline".into()));
            }
            Ok(())
        }
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    #[tokio::test(start_paused = true)]
    async fn test_poison_message_reaches_dlq_after_three_deliveries() {
        let (cloud, topology) =
            provisioned(provisioning().with_visibility_timeout(VISIBILITY)).await;
        cloud
            .put_object(BUCKET, "order-poison.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        let handler = Arc::new(FlakyHandler::new(u32::MAX));
        let worker = ConsumerWorker::new(cloud.clone(), handler.clone(), worker_config()).unwrap();

        for _ in 0..3 {
            let report = worker.run_cycle().await.unwrap();
            assert_eq!(report.redelivering(), 1);
            assert!(matches!(
                &report.outcomes[0].1,
                MessageOutcome::Unacknowledged(UnackReason::HandlerFailed { object_key, .. })
                    if object_key == "order-poison.json"
            ));
            tokio::time::advance(VISIBILITY).await;
        }

        let report = worker.run_cycle().await.unwrap();
        assert!(report.is_idle());
        assert_eq!(handler.attempts.load(Ordering::SeqCst), 3);
        assert!(cloud.calls_to("DeleteMessage").is_empty());
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
        assert_eq!(cloud.queue_depth("ShippingQueueDLQ"), 1);

        // The dead-lettered body is the original envelope.
        let parked = cloud
            .receive_messages(&topology.dead_letter_queue.url, 1, Duration::ZERO)
            .await
            .unwrap();
        let records = decode_event_records(&parked[0].body).unwrap();
        assert_eq!(records[0].object_key, "order-poison.json");
        assert_eq!(records[0].bucket, BUCKET);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_recovers_before_redrive() {
        let (cloud, _topology) =
            provisioned(provisioning().with_visibility_timeout(VISIBILITY)).await;
        cloud
            .put_object(BUCKET, "order-retry.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        let worker = ConsumerWorker::new(
            cloud.clone(),
            Arc::new(FlakyHandler::new(2)),
            worker_config(),
        )
        .unwrap();

        let first = worker.run_cycle().await.unwrap();
        assert_eq!(first.redelivering(), 1);

        // Still invisible: nothing to receive yet.
        assert!(worker.run_cycle().await.unwrap().is_idle());

        tokio::time::advance(VISIBILITY).await;
        let second = worker.run_cycle().await.unwrap();
        assert_eq!(
            second.outcomes[0].1,
            MessageOutcome::Acknowledged { records: 1 }
        );
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
        assert_eq!(cloud.queue_depth("ShippingQueueDLQ"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_body_is_dead_lettered() {
        let (cloud, topology) =
            provisioned(provisioning().with_visibility_timeout(VISIBILITY)).await;
        cloud
            .send_message(&topology.queue.url, "not an envelope")
            .unwrap();

        let worker = ConsumerWorker::new(
            cloud.clone(),
            Arc::new(FlakyHandler::new(1)),
            worker_config(),
        )
        .unwrap();

        for _ in 0..3 {
            let report = worker.run_cycle().await.unwrap();
            assert!(matches!(
                report.outcomes[0].1,
                MessageOutcome::Unacknowledged(UnackReason::Malformed(_))
            ));
            tokio::time::advance(VISIBILITY).await;
        }
        assert!(worker.run_cycle().await.unwrap().is_idle());
        assert_eq!(cloud.queue_depth("ShippingQueueDLQ"), 1);
    }
}
