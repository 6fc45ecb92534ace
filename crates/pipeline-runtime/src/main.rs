//! # Ingest Pipeline
//!
//! Entry point for the worker, setup and teardown commands.
//!
//! ## Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from the environment and apply flag overrides
//! 3. Initialize telemetry
//! 4. Connect the service clients
//! 5. Run the command; the worker runs until Ctrl+C

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use ingest_telemetry::{init_telemetry, TelemetryConfig};
use pipeline_runtime::adapters::PrometheusRecorder;
use pipeline_runtime::{
    run_setup, run_teardown, run_worker, setup_summary, teardown_summary, Cli, Command,
    PipelineConfig, ServiceContainer, TEARDOWN_USAGE,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Refuse before touching anything remote
    let teardown_bucket = match &cli.command {
        Command::Teardown { bucket: None } => {
            eprintln!("{TEARDOWN_USAGE}");
            return Ok(ExitCode::from(2));
        }
        Command::Teardown { bucket: Some(b) } => Some(b.clone()),
        _ => None,
    };

    let mut config = PipelineConfig::from_env().context("Invalid configuration")?;
    apply_overrides(&mut config, &cli.command);
    config.validate().context("Invalid configuration")?;

    let telemetry: TelemetryConfig = config
        .telemetry
        .clone()
        .with_component(cli.command.component());
    let _telemetry = init_telemetry(telemetry)
        .await
        .context("Failed to initialize telemetry")?;

    let container = ServiceContainer::connect(config).await;

    match cli.command {
        Command::Worker { .. } => {
            let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Shutdown requested; finishing current poll");
                        let _ = shutdown_tx.send(true);
                    }
                    Err(e) => {
                        // A dropped sender stops the worker, so keep it alive.
                        error!(error = %e, "Cannot listen for Ctrl+C; worker runs until killed");
                        std::future::pending::<()>().await;
                        drop(shutdown_tx);
                    }
                }
            });

            run_worker(
                container.queues(),
                container.config.worker.clone(),
                Arc::new(PrometheusRecorder),
                shutdown_rx,
            )
            .await
            .context("Worker failed to start")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Setup { .. } => {
            let report = run_setup(
                container.cloud_services(),
                container.config.provisioning.clone(),
            )
            .await
            .context("Setup refused")?;
            print!("{}", setup_summary(&report));
            Ok(if report.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Teardown { .. } => {
            let bucket = teardown_bucket.unwrap_or_default();
            let report = run_teardown(
                container.cloud_services(),
                container.config.provisioning.clone(),
                &bucket,
            )
            .await
            .context("Teardown refused")?;
            print!("{}", teardown_summary(&report));
            if !report.succeeded() {
                error!(bucket = %bucket, "Some resources could not be deleted");
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Command-line flags win over environment variables.
fn apply_overrides(config: &mut PipelineConfig, command: &Command) {
    match command {
        Command::Worker {
            queue_url,
            max_messages,
            wait_seconds,
        } => {
            if let Some(url) = queue_url {
                config.worker.queue_url = Some(url.clone());
            }
            if let Some(max) = max_messages {
                config.worker.max_messages = *max;
            }
            if let Some(secs) = wait_seconds {
                config.worker.wait_time = Duration::from_secs(*secs);
            }
        }
        Command::Setup { bucket: Some(bucket) } => {
            config.provisioning.bucket_name = Some(bucket.clone());
        }
        Command::Setup { bucket: None } | Command::Teardown { .. } => {}
    }
}
