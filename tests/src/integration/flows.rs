//! # Object-Created Flows
//!
//! An object written to the bucket travels as a creation event through the
//! topic into the work queue, and the worker acknowledges it only after every
//! record in the envelope was handled.
//!
//! ```text
//! put_object ──► Bucket ──► Topic ──► ShippingQueue ──► ConsumerWorker ──► delete
//! ```

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use ip_01_consumer_worker::{
        ConsumerApi, ConsumerWorker, DeliveryContext, HandlerError, MessageOutcome,
        OrderLogHandler, RecordHandler, WorkerMetrics,
    };
    use shared_bus::{InMemoryCloud, ObjectStoreService, QueueService};
    use shared_types::{encode_event_records, EventRecord, QueueMessage};
    use tokio::sync::watch;

    use crate::integration::fixtures::{provisioned, provisioning, worker_config, BUCKET};

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    /// Keeps the keys it saw, in order.
    #[derive(Default)]
    struct KeyCollector {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RecordHandler for KeyCollector {
        async fn handle(
            &self,
            record: &EventRecord,
            _context: &DeliveryContext,
        ) -> Result<(), HandlerError> {
            self.keys.lock().push(record.object_key.clone());
            Ok(())
        }
    }

    /// Simulates a second consumer picking the message up while the first
    /// one is still handling it.
    struct SlowHandler {
        cloud: Arc<InMemoryCloud>,
        queue_url: String,
        visibility: Duration,
        taken: Mutex<Option<QueueMessage>>,
    }

    #[async_trait]
    impl RecordHandler for SlowHandler {
        async fn handle(
            &self,
            _record: &EventRecord,
            context: &DeliveryContext,
        ) -> Result<(), HandlerError> {
            if context.delivery_count == 1 {
                tokio::time::advance(self.visibility).await;
                let batch = self
                    .cloud
                    .receive_messages(&self.queue_url, 1, Duration::ZERO)
                    .await
                    .map_err(|e| HandlerError::Unavailable(e.to_string()))?;
                *self.taken.lock() = batch.into_iter().next();
            }
            Ok(())
        }
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    #[tokio::test]
    async fn test_uploaded_order_is_processed_and_acknowledged() {
        let (cloud, _topology) = provisioned(provisioning()).await;
        cloud
            .put_object(BUCKET, "order-1001.json", br#"{"id":1001}"#.to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(cloud.queue_depth("ShippingQueue"), 1);

        let handler = Arc::new(KeyCollector::default());
        let worker = ConsumerWorker::new(cloud.clone(), handler.clone(), worker_config()).unwrap();
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(
            report.outcomes[0].1,
            MessageOutcome::Acknowledged { records: 1 }
        );
        assert_eq!(*handler.keys.lock(), vec!["order-1001.json".to_string()]);
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
        assert_eq!(cloud.queue_depth("ShippingQueueDLQ"), 0);
    }

    #[tokio::test]
    async fn test_multi_record_envelope_handled_in_order() {
        let (cloud, topology) = provisioned(provisioning()).await;
        let records = vec![
            EventRecord::new(BUCKET, "order-a.json", 10),
            EventRecord::new(BUCKET, "order-b.json", 20),
            EventRecord::new(BUCKET, "order-c.json", 30),
        ];
        let body = encode_event_records(
            &topology.topic_arn,
            &records,
            "us-east-1",
            "2026-11-27T00:00:00.000Z",
        )
        .unwrap();
        cloud.send_message(&topology.queue.url, body).unwrap();

        let handler = Arc::new(KeyCollector::default());
        let worker = ConsumerWorker::new(cloud.clone(), handler.clone(), worker_config()).unwrap();
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(report.acknowledged(), 1);
        assert_eq!(
            *handler.keys.lock(),
            vec!["order-a.json", "order-b.json", "order-c.json"]
        );
        assert_eq!(cloud.calls_to("DeleteMessage").len(), 1);
    }

    #[tokio::test]
    async fn test_batch_of_uploads_drained_in_one_cycle() {
        let (cloud, _topology) = provisioned(provisioning()).await;
        for i in 0..4 {
            cloud
                .put_object(BUCKET, &format!("order-{i}.json"), b"{}".to_vec(), "application/json")
                .await
                .unwrap();
        }

        let handler = Arc::new(KeyCollector::default());
        let worker = ConsumerWorker::new(cloud.clone(), handler.clone(), worker_config()).unwrap();
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(report.received(), 4);
        assert_eq!(report.acknowledged(), 4);
        assert_eq!(handler.keys.lock().len(), 4);
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_delivery_ack_is_tolerated() {
        let visibility = Duration::from_secs(5);
        let (cloud, topology) =
            provisioned(provisioning().with_visibility_timeout(visibility)).await;
        cloud
            .put_object(BUCKET, "order-slow.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();

        let handler = Arc::new(SlowHandler {
            cloud: cloud.clone(),
            queue_url: topology.queue.url.clone(),
            visibility,
            taken: Mutex::new(None),
        });
        let worker = ConsumerWorker::new(cloud.clone(), handler.clone(), worker_config()).unwrap();
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(
            report.outcomes[0].1,
            MessageOutcome::AlreadyAcknowledged { records: 1 }
        );
        // The other consumer still holds the live delivery.
        assert_eq!(cloud.queue_depth("ShippingQueue"), 1);
        let taken = handler.taken.lock().take().expect("second delivery");
        assert_eq!(taken.delivery_count, 2);
        cloud
            .delete_message(&topology.queue.url, &taken.receipt_handle)
            .await
            .unwrap();
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
    }

    #[tokio::test]
    async fn test_worker_runs_until_shutdown() {
        let (cloud, _topology) = provisioned(provisioning()).await;
        let metrics = Arc::new(WorkerMetrics::new());
        let worker = ConsumerWorker::new(
            cloud.clone(),
            Arc::new(OrderLogHandler::new()),
            worker_config().with_wait_time(Duration::from_millis(50)),
        )
        .unwrap()
        .with_metrics(metrics.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let running = tokio::spawn(async move { worker.run(shutdown_rx).await });

        for i in 0..3 {
            cloud
                .put_object(BUCKET, &format!("order-{i}.json"), b"{}".to_vec(), "application/json")
                .await
                .unwrap();
        }
        while metrics.snapshot().messages_acknowledged < 3 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        shutdown_tx.send(true).unwrap();

        let summary = running.await.unwrap();
        assert_eq!(summary.acknowledged, 3);
        assert_eq!(summary.failed_cycles, 0);
        assert_eq!(cloud.queue_depth("ShippingQueue"), 0);
    }
}
