//! Metrics hooks for the polling loop
//!
//! Provides instrumentation points for monitoring throughput, acknowledgement
//! failures and poll latency.
//!
//! ## Usage
//!
//! ```ignore
//! use ip_01_consumer_worker::metrics::{WorkerMetrics, MetricsRecorder};
//!
//! let metrics = Arc::new(WorkerMetrics::new());
//! let worker = ConsumerWorker::new(queue, handler, config)?.with_metrics(metrics.clone());
//! worker.run_cycle().await?;
//! println!("{:?}", metrics.snapshot());
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Lock-free counters for one worker
#[derive(Default)]
pub struct WorkerMetrics {
    /// Receive calls that returned
    pub polls: AtomicU64,
    /// Receive calls that returned no messages
    pub empty_polls: AtomicU64,
    /// Messages received
    pub messages_received: AtomicU64,
    /// Messages deleted
    pub messages_acknowledged: AtomicU64,
    /// Messages left for redelivery
    pub messages_unacknowledged: AtomicU64,
    /// Event records handed to the handler successfully
    pub records_processed: AtomicU64,
    /// Deletes answered with a stale handle or missing queue
    pub stale_acknowledgements: AtomicU64,
    /// Failed service calls
    pub service_errors: AtomicU64,
    /// Cumulative receive latency in nanoseconds
    pub poll_time_ns: AtomicU64,
}

impl WorkerMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            polls: self.polls.load(Ordering::Relaxed),
            empty_polls: self.empty_polls.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_acknowledged: self.messages_acknowledged.load(Ordering::Relaxed),
            messages_unacknowledged: self.messages_unacknowledged.load(Ordering::Relaxed),
            records_processed: self.records_processed.load(Ordering::Relaxed),
            stale_acknowledgements: self.stale_acknowledgements.load(Ordering::Relaxed),
            service_errors: self.service_errors.load(Ordering::Relaxed),
            avg_poll_ns: self.avg_poll_time_ns(),
        }
    }

    /// Average receive latency in nanoseconds
    pub fn avg_poll_time_ns(&self) -> u64 {
        let total = self.poll_time_ns.load(Ordering::Relaxed);
        let count = self.polls.load(Ordering::Relaxed);
        if count > 0 {
            total / count
        } else {
            0
        }
    }
}

/// Point-in-time metrics snapshot
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub polls: u64,
    pub empty_polls: u64,
    pub messages_received: u64,
    pub messages_acknowledged: u64,
    pub messages_unacknowledged: u64,
    pub records_processed: u64,
    pub stale_acknowledgements: u64,
    pub service_errors: u64,
    pub avg_poll_ns: u64,
}

/// Trait for custom metrics recording implementations
///
/// Implement this trait to export worker metrics to Prometheus or another
/// backend.
pub trait MetricsRecorder: Send + Sync {
    /// A receive call returned `received` messages after `latency`.
    fn record_poll(&self, latency: Duration, received: usize);

    /// A message was deleted after processing `records` records.
    fn record_acknowledged(&self, records: usize);

    /// A message was left for redelivery.
    fn record_unacknowledged(&self, reason: &str);

    /// A delete reported the delivery as already superseded.
    fn record_stale_ack(&self);

    /// One record was processed.
    fn record_record_processed(&self);

    /// A service call failed.
    fn record_service_error(&self, operation: &str);
}

/// No-op metrics recorder for when metrics are disabled
#[derive(Default)]
pub struct NoOpMetrics;

impl MetricsRecorder for NoOpMetrics {
    fn record_poll(&self, _: Duration, _: usize) {}
    fn record_acknowledged(&self, _: usize) {}
    fn record_unacknowledged(&self, _: &str) {}
    fn record_stale_ack(&self) {}
    fn record_record_processed(&self) {}
    fn record_service_error(&self, _: &str) {}
}

impl MetricsRecorder for WorkerMetrics {
    fn record_poll(&self, latency: Duration, received: usize) {
        self.polls.fetch_add(1, Ordering::Relaxed);
        self.poll_time_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
        if received == 0 {
            self.empty_polls.fetch_add(1, Ordering::Relaxed);
        }
        self.messages_received
            .fetch_add(received as u64, Ordering::Relaxed);
    }

    fn record_acknowledged(&self, _records: usize) {
        self.messages_acknowledged.fetch_add(1, Ordering::Relaxed);
    }

    fn record_unacknowledged(&self, _reason: &str) {
        self.messages_unacknowledged.fetch_add(1, Ordering::Relaxed);
    }

    fn record_stale_ack(&self) {
        self.stale_acknowledgements.fetch_add(1, Ordering::Relaxed);
    }

    fn record_record_processed(&self) {
        self.records_processed.fetch_add(1, Ordering::Relaxed);
    }

    fn record_service_error(&self, _operation: &str) {
        self.service_errors.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_initialization() {
        let snapshot = WorkerMetrics::new().snapshot();
        assert_eq!(snapshot, MetricsSnapshot::default());
    }

    #[test]
    fn test_record_polls() {
        let metrics = WorkerMetrics::new();
        metrics.record_poll(Duration::from_millis(10), 0);
        metrics.record_poll(Duration::from_millis(30), 3);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.polls, 2);
        assert_eq!(snapshot.empty_polls, 1);
        assert_eq!(snapshot.messages_received, 3);
        assert_eq!(snapshot.avg_poll_ns, 20_000_000);
    }

    #[test]
    fn test_acknowledgement_counters() {
        let metrics = WorkerMetrics::new();
        metrics.record_acknowledged(2);
        metrics.record_unacknowledged("malformed");
        metrics.record_stale_ack();
        metrics.record_service_error("ReceiveMessage");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.messages_acknowledged, 1);
        assert_eq!(snapshot.messages_unacknowledged, 1);
        assert_eq!(snapshot.stale_acknowledgements, 1);
        assert_eq!(snapshot.service_errors, 1);
    }
}
