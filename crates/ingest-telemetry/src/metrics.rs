//! Prometheus metrics for the ingestion pipeline.
//!
//! All metrics follow the naming convention: `ip_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., ip_worker_polls_total)
//! - **Histogram**: Distribution of values (e.g., ip_worker_poll_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Histogram, HistogramOpts, Opts, Registry,
    TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // WORKER METRICS
    // =========================================================================

    /// Receive calls that returned
    pub static ref WORKER_POLLS: Counter = Counter::new(
        "ip_worker_polls_total",
        "Total receive calls that returned"
    ).expect("metric creation failed");

    /// Receive calls that returned nothing
    pub static ref WORKER_EMPTY_POLLS: Counter = Counter::new(
        "ip_worker_empty_polls_total",
        "Receive calls that returned no messages"
    ).expect("metric creation failed");

    /// Receive latency, long-poll wait included
    pub static ref WORKER_POLL_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "ip_worker_poll_duration_seconds",
            "Time spent in receive calls"
        ).buckets(exponential_buckets(0.005, 2.0, 13).expect("valid buckets"))
    ).expect("metric creation failed");

    pub static ref MESSAGES_RECEIVED: Counter = Counter::new(
        "ip_worker_messages_received_total",
        "Messages received from the work queue"
    ).expect("metric creation failed");

    pub static ref MESSAGES_ACKNOWLEDGED: Counter = Counter::new(
        "ip_worker_messages_acknowledged_total",
        "Messages deleted after processing"
    ).expect("metric creation failed");

    /// Messages left for redelivery
    pub static ref MESSAGES_UNACKNOWLEDGED: CounterVec = CounterVec::new(
        Opts::new("ip_worker_messages_unacknowledged_total", "Messages left for redelivery"),
        &["reason"]  // reason: malformed/handler_failed/shutdown/ack_failed
    ).expect("metric creation failed");

    pub static ref RECORDS_PROCESSED: Counter = Counter::new(
        "ip_worker_records_processed_total",
        "Event records handled successfully"
    ).expect("metric creation failed");

    /// Deletes answered with a stale handle or a missing queue
    pub static ref STALE_ACKNOWLEDGEMENTS: Counter = Counter::new(
        "ip_worker_stale_acknowledgements_total",
        "Deletes that found the delivery already superseded"
    ).expect("metric creation failed");

    // =========================================================================
    // SERVICE AND PROVISIONING METRICS
    // =========================================================================

    /// Failed calls to managed services
    pub static ref SERVICE_ERRORS: CounterVec = CounterVec::new(
        Opts::new("ip_service_errors_total", "Failed managed-service calls"),
        &["operation"]
    ).expect("metric creation failed");

    /// Setup and teardown step outcomes
    pub static ref PROVISIONING_STEPS: CounterVec = CounterVec::new(
        Opts::new("ip_provisioning_steps_total", "Provisioning step outcomes"),
        &["phase", "step", "outcome"]  // phase: setup/teardown
    ).expect("metric creation failed");
}

/// Handle proving the metrics were registered
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors newly registered by this call.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; collectors already present are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Worker
        Box::new(WORKER_POLLS.clone()),
        Box::new(WORKER_EMPTY_POLLS.clone()),
        Box::new(WORKER_POLL_DURATION.clone()),
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(MESSAGES_ACKNOWLEDGED.clone()),
        Box::new(MESSAGES_UNACKNOWLEDGED.clone()),
        Box::new(RECORDS_PROCESSED.clone()),
        Box::new(STALE_ACKNOWLEDGEMENTS.clone()),
        // Services and provisioning
        Box::new(SERVICE_ERRORS.clone()),
        Box::new(PROVISIONING_STEPS.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_repeatable() {
        assert!(register_metrics().is_ok());
        let again = register_metrics().unwrap();
        assert_eq!(again.registered(), 0);
    }

    #[test]
    fn test_encoded_output_names_metrics() {
        register_metrics().unwrap();
        WORKER_POLLS.inc();
        MESSAGES_UNACKNOWLEDGED.with_label_values(&["malformed"]).inc();
        PROVISIONING_STEPS
            .with_label_values(&["setup", "create_topic", "completed"])
            .inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("ip_worker_polls_total"));
        assert!(text.contains("reason=\"malformed\""));
        assert!(text.contains("step=\"create_topic\""));
    }

    #[test]
    fn test_histogram_observation() {
        let before = WORKER_POLL_DURATION.get_sample_count();
        WORKER_POLL_DURATION.observe(0.25);
        assert!(WORKER_POLL_DURATION.get_sample_count() > before);
    }
}
