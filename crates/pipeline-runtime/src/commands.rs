//! # Commands
//!
//! The three entry points behind the subcommands. Each takes its services
//! explicitly, so the same code runs against the managed services or the
//! in-memory cloud.

use std::fmt::Write as _;
use std::sync::Arc;

use ip_01_consumer_worker::{
    ConsumerApi, ConsumerWorker, MetricsRecorder, OrderLogHandler, RunSummary, WorkerConfig,
    WorkerError,
};
use ip_02_provisioning::{
    CloudServices, ProvisionError, Provisioner, ProvisioningApi, ProvisioningConfig, SetupReport,
    TeardownReport,
};
use shared_bus::QueueService;
use tokio::sync::watch;
use tracing::info;

use crate::adapters::{record_setup, record_teardown};

/// Run the consumer worker until `shutdown` fires.
pub async fn run_worker<Q>(
    queue: Arc<Q>,
    config: WorkerConfig,
    metrics: Arc<dyn MetricsRecorder>,
    shutdown: watch::Receiver<bool>,
) -> Result<RunSummary, WorkerError>
where
    Q: QueueService + 'static,
{
    let worker =
        ConsumerWorker::new(queue, Arc::new(OrderLogHandler::new()), config)?.with_metrics(metrics);
    info!(
        queue = worker
            .config()
            .queue_url
            .as_deref()
            .unwrap_or(&worker.config().queue_name),
        max_messages = worker.config().max_messages,
        wait_seconds = worker.config().wait_time.as_secs(),
        "Worker started, polling for messages"
    );

    let summary = worker.run(shutdown).await;
    info!(
        cycles = summary.cycles,
        acknowledged = summary.acknowledged,
        redelivering = summary.redelivering,
        failed_cycles = summary.failed_cycles,
        "Worker stopped"
    );
    Ok(summary)
}

/// Create the topology.
pub async fn run_setup(
    services: CloudServices,
    config: ProvisioningConfig,
) -> Result<SetupReport, ProvisionError> {
    let provisioner = Provisioner::new(services, config)?;
    let report = provisioner.setup().await;
    record_setup(&report);
    Ok(report)
}

/// Delete the topology.
pub async fn run_teardown(
    services: CloudServices,
    config: ProvisioningConfig,
    bucket: &str,
) -> Result<TeardownReport, ProvisionError> {
    let provisioner = Provisioner::new(services, config)?;
    let report = provisioner.teardown(bucket).await?;
    record_teardown(&report);
    Ok(report)
}

/// Operator-facing summary of a setup run.
pub fn setup_summary(report: &SetupReport) -> String {
    let mut out = String::new();
    match (&report.topology, &report.failure) {
        (Some(topology), _) => {
            let _ = writeln!(out, "Infrastructure setup complete");
            let _ = writeln!(out, "  Topic ARN:   {}", topology.topic_arn);
            let _ = writeln!(out, "  Queue URL:   {}", topology.queue.url);
            let _ = writeln!(out, "  Queue ARN:   {}", topology.queue.arn);
            let _ = writeln!(out, "  DLQ ARN:     {}", topology.dead_letter_queue.arn);
            let _ = writeln!(out, "  Bucket:      {}", topology.bucket_name);
            let _ = writeln!(
                out,
                "Tear down with: ingest-pipeline teardown {}",
                topology.bucket_name
            );
        }
        (None, failure) => {
            let _ = writeln!(out, "Infrastructure setup FAILED");
            if let Some(error) = failure {
                let _ = writeln!(out, "  Error: {error}");
            }
            let completed: Vec<&str> = report.completed.iter().map(|s| s.as_str()).collect();
            let _ = writeln!(out, "  Completed steps (left in place): {}", completed.join(", "));
            let _ = writeln!(out, "  Bucket name for teardown: {}", report.bucket_name);
        }
    }
    out
}

/// Operator-facing summary of a teardown run.
pub fn teardown_summary(report: &TeardownReport) -> String {
    let mut out = String::new();
    for (step, outcome) in &report.steps {
        match outcome {
            ip_02_provisioning::StepOutcome::Failed(e) => {
                let _ = writeln!(out, "  {step}: failed ({e})");
            }
            other => {
                let _ = writeln!(out, "  {step}: {}", other.label());
            }
        }
    }
    let _ = writeln!(out, "  Objects deleted: {}", report.objects_deleted);
    if report.succeeded() {
        let _ = writeln!(out, "Infrastructure destruction complete");
    } else {
        let _ = writeln!(out, "Infrastructure destruction finished with failures");
    }
    out
}
