//! Prometheus-backed metrics recorder.

use std::time::Duration;

use ingest_telemetry::metrics::{
    MESSAGES_ACKNOWLEDGED, MESSAGES_RECEIVED, MESSAGES_UNACKNOWLEDGED, PROVISIONING_STEPS,
    RECORDS_PROCESSED, SERVICE_ERRORS, STALE_ACKNOWLEDGEMENTS, WORKER_EMPTY_POLLS, WORKER_POLLS,
    WORKER_POLL_DURATION,
};
use ip_01_consumer_worker::MetricsRecorder;
use ip_02_provisioning::{SetupReport, SetupStep, TeardownReport};

/// Forwards worker events to the global Prometheus registry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrometheusRecorder;

impl MetricsRecorder for PrometheusRecorder {
    fn record_poll(&self, latency: Duration, received: usize) {
        WORKER_POLLS.inc();
        WORKER_POLL_DURATION.observe(latency.as_secs_f64());
        if received == 0 {
            WORKER_EMPTY_POLLS.inc();
        }
        MESSAGES_RECEIVED.inc_by(received as f64);
    }

    fn record_acknowledged(&self, _records: usize) {
        MESSAGES_ACKNOWLEDGED.inc();
    }

    fn record_unacknowledged(&self, reason: &str) {
        MESSAGES_UNACKNOWLEDGED.with_label_values(&[reason]).inc();
    }

    fn record_stale_ack(&self) {
        STALE_ACKNOWLEDGEMENTS.inc();
    }

    fn record_record_processed(&self) {
        RECORDS_PROCESSED.inc();
    }

    fn record_service_error(&self, operation: &str) {
        SERVICE_ERRORS.with_label_values(&[operation]).inc();
    }
}

/// Count each setup step as completed, failed or skipped.
pub fn record_setup(report: &SetupReport) {
    let failed = report.failed_step();
    for step in SetupStep::ALL {
        let outcome = if report.completed.contains(&step) {
            "completed"
        } else if failed == Some(step) {
            "failed"
        } else {
            "skipped"
        };
        PROVISIONING_STEPS
            .with_label_values(&["setup", step.as_str(), outcome])
            .inc();
    }
}

/// Count each teardown step by outcome.
pub fn record_teardown(report: &TeardownReport) {
    for (step, outcome) in &report.steps {
        PROVISIONING_STEPS
            .with_label_values(&["teardown", step.as_str(), outcome.label()])
            .inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ip_02_provisioning::{StepOutcome, TeardownStep};

    fn step_count(phase: &str, step: &str, outcome: &str) -> f64 {
        PROVISIONING_STEPS
            .with_label_values(&[phase, step, outcome])
            .get()
    }

    #[test]
    fn test_worker_events_reach_registry() {
        let before = MESSAGES_RECEIVED.get();
        let recorder = PrometheusRecorder;
        recorder.record_poll(Duration::from_millis(20), 3);
        recorder.record_unacknowledged("handler_failed");
        recorder.record_service_error("DeleteMessage");

        assert!(MESSAGES_RECEIVED.get() >= before + 3.0);
        assert!(
            MESSAGES_UNACKNOWLEDGED
                .with_label_values(&["handler_failed"])
                .get()
                >= 1.0
        );
        assert!(SERVICE_ERRORS.with_label_values(&["DeleteMessage"]).get() >= 1.0);
    }

    #[test]
    fn test_teardown_outcomes_are_labelled() {
        let before = step_count("teardown", "delete_topic", "already_absent");
        let report = TeardownReport {
            bucket_name: "orders".into(),
            steps: vec![(TeardownStep::DeleteTopic, StepOutcome::AlreadyAbsent)],
            objects_deleted: 0,
        };
        record_teardown(&report);
        assert!(step_count("teardown", "delete_topic", "already_absent") >= before + 1.0);
    }
}
