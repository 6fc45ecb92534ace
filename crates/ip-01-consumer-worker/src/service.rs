//! Consumer Worker Service
//!
//! Drains the work queue with at-least-once processing:
//!
//! ```text
//!            ┌────────────── empty ──────────────┐
//!            ▼                                    │
//!   ┌──────────────┐  batch   ┌──────────────┐    │
//!   │   Polling    │ ───────► │  Processing  │ ───┘ (batch drained)
//!   └──────────────┘          └──────┬───────┘
//!                                    │ per message
//!                    decode ─► handle records ─► delete (ack)
//!                       │            │
//!                       └── fail ────┴──► leave for redelivery
//! ```
//!
//! A message is deleted only after every record in it was handled. Anything
//! else leaves it on the queue; after `maxReceiveCount` deliveries the queue
//! service moves it to the dead-letter queue on its own.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use shared_types::{decode_event_records, QueueMessage};
use tokio::sync::{watch, OnceCell};
use tracing::{debug, error, info, warn};

use crate::domain::{CycleReport, MessageOutcome, RunSummary, UnackReason, WorkerConfig};
use crate::error::WorkerError;
use crate::metrics::{MetricsRecorder, NoOpMetrics};
use crate::ports::{ConsumerApi, DeliveryContext, QueueService, RecordHandler};

/// Consumer worker implementation
///
/// Implements the `ConsumerApi` port over an injected queue and handler.
pub struct ConsumerWorker<Q: QueueService, H: RecordHandler> {
    /// Work queue (driven port)
    queue: Arc<Q>,
    /// Per-record side effect (driven port)
    handler: Arc<H>,
    config: WorkerConfig,
    metrics: Arc<dyn MetricsRecorder>,
    /// Queue URL, resolved on first use
    queue_url: OnceCell<String>,
}

impl<Q: QueueService, H: RecordHandler> ConsumerWorker<Q, H> {
    /// Create a worker; fails if the configuration is out of bounds.
    pub fn new(queue: Arc<Q>, handler: Arc<H>, config: WorkerConfig) -> Result<Self, WorkerError> {
        config.validate()?;
        let queue_url = match &config.queue_url {
            Some(url) => OnceCell::new_with(Some(url.clone())),
            None => OnceCell::new(),
        };
        Ok(Self {
            queue,
            handler,
            config,
            metrics: Arc::new(NoOpMetrics),
            queue_url,
        })
    }

    /// Attach a metrics recorder.
    pub fn with_metrics(mut self, metrics: Arc<dyn MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Resolve the queue URL by name once; failures are retried next cycle.
    pub async fn queue_url(&self) -> Result<&str, WorkerError> {
        let url = self
            .queue_url
            .get_or_try_init(|| async {
                let url = self
                    .queue
                    .queue_url(&self.config.queue_name)
                    .await
                    .map_err(|source| WorkerError::QueueResolution {
                        queue: self.config.queue_name.clone(),
                        source,
                    })?;
                info!(queue = %self.config.queue_name, url = %url, "Resolved work queue");
                Ok::<_, WorkerError>(url)
            })
            .await?;
        Ok(url.as_str())
    }

    async fn cycle(&self, shutdown: Option<&watch::Receiver<bool>>) -> Result<CycleReport, WorkerError> {
        let url = self.queue_url().await?;

        let started = Instant::now();
        let messages = self
            .queue
            .receive_messages(url, self.config.max_messages, self.config.wait_time)
            .await
            .map_err(|source| WorkerError::Receive {
                queue: self.config.queue_name.clone(),
                source,
            })?;
        self.metrics.record_poll(started.elapsed(), messages.len());

        if messages.is_empty() {
            info!(queue = %self.config.queue_name, "No orders, waiting");
            return Ok(CycleReport::idle());
        }
        info!(queue = %self.config.queue_name, count = messages.len(), "Received messages");

        let mut report = CycleReport::default();
        for message in &messages {
            let outcome = if shutdown.is_some_and(|rx| *rx.borrow()) {
                debug!(message_id = %message.message_id, "Shutdown requested; leaving message for redelivery");
                self.metrics.record_unacknowledged(UnackReason::ShuttingDown.label());
                MessageOutcome::Unacknowledged(UnackReason::ShuttingDown)
            } else {
                self.process_message(url, message).await
            };
            report.push(message.message_id.clone(), outcome);
        }
        Ok(report)
    }

    /// Decode, handle every record in order, then acknowledge.
    async fn process_message(&self, url: &str, message: &QueueMessage) -> MessageOutcome {
        let records = match decode_event_records(&message.body) {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    message_id = %message.message_id,
                    delivery_count = message.delivery_count,
                    error = %e,
                    "Malformed envelope; leaving message for redelivery"
                );
                let reason = UnackReason::Malformed(e.to_string());
                self.metrics.record_unacknowledged(reason.label());
                return MessageOutcome::Unacknowledged(reason);
            }
        };

        let context = DeliveryContext {
            message_id: message.message_id.clone(),
            delivery_count: message.delivery_count,
        };
        for record in &records {
            if let Err(e) = self.handler.handle(record, &context).await {
                warn!(
                    message_id = %message.message_id,
                    object_key = %record.object_key,
                    delivery_count = message.delivery_count,
                    error = %e,
                    "Record processing failed; leaving message for redelivery"
                );
                let reason = UnackReason::HandlerFailed {
                    object_key: record.object_key.clone(),
                    reason: e.to_string(),
                };
                self.metrics.record_unacknowledged(reason.label());
                return MessageOutcome::Unacknowledged(reason);
            }
            self.metrics.record_record_processed();
        }

        match self.queue.delete_message(url, &message.receipt_handle).await {
            Ok(()) => {
                info!(
                    message_id = %message.message_id,
                    records = records.len(),
                    "Done and deleted"
                );
                self.metrics.record_acknowledged(records.len());
                MessageOutcome::Acknowledged {
                    records: records.len(),
                }
            }
            Err(e) if e.is_ignorable_on_delete() => {
                warn!(
                    message_id = %message.message_id,
                    receipt_handle = %message.receipt_handle.abbreviated(),
                    error = %e,
                    "Delivery already superseded; delete ignored"
                );
                self.metrics.record_stale_ack();
                MessageOutcome::AlreadyAcknowledged {
                    records: records.len(),
                }
            }
            Err(e) => {
                error!(
                    message_id = %message.message_id,
                    receipt_handle = %message.receipt_handle.abbreviated(),
                    error = %e,
                    "Delete failed; message will be redelivered"
                );
                self.metrics.record_service_error(e.operation());
                MessageOutcome::AckFailed(e.to_string())
            }
        }
    }
}

#[async_trait]
impl<Q: QueueService, H: RecordHandler> ConsumerApi for ConsumerWorker<Q, H> {
    async fn run_cycle(&self) -> Result<CycleReport, WorkerError> {
        self.cycle(None).await
    }

    async fn run(&self, mut shutdown: watch::Receiver<bool>) -> RunSummary {
        info!(queue = %self.config.queue_name, "Worker listening");
        let mut summary = RunSummary::default();

        loop {
            if *shutdown.borrow() || shutdown.has_changed().is_err() {
                break;
            }
            match self.cycle(Some(&shutdown)).await {
                Ok(report) => summary.absorb(&report),
                Err(e) => {
                    error!(error = %e, "Polling cycle failed; polling again");
                    self.metrics.record_service_error(e.operation());
                    summary.absorb_failure();
                    tokio::select! {
                        _ = tokio::time::sleep(self.config.retry_pause) => {}
                        _ = shutdown.changed() => {}
                    }
                }
            }
        }

        info!(
            cycles = summary.cycles,
            acknowledged = summary.acknowledged,
            "Worker stopped"
        );
        summary
    }
}
