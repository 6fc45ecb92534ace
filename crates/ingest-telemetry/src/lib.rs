//! # Ingest Telemetry
//!
//! Observability for the ingestion pipeline.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` text or JSON lines on stdout
//! - **Traces**: OpenTelemetry OTLP export, enabled by configuring an endpoint
//! - **Metrics**: Prometheus counters and histograms in a global registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ingest_telemetry::{TelemetryConfig, init_telemetry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = TelemetryConfig::from_env().with_component("worker");
//!     let _guard = init_telemetry(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_EXPORTER_OTLP_ENDPOINT` | unset | OTLP collector; export disabled when unset |
//! | `OTEL_SERVICE_NAME` | `ingest-pipeline` | Service name in traces |
//! | `RUST_LOG` / `IP_LOG_LEVEL` | `info` | Log filter |
//! | `IP_JSON_LOGS` | `false` (`true` in containers) | JSON log lines |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::{TelemetryConfig, DEFAULT_SERVICE_NAME};
pub use metrics::{encode_metrics, register_metrics, MetricsHandle};
pub use tracing_setup::TracingGuard;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid telemetry configuration: {0}")]
    Config(String),
}

/// Initialize logging, tracing and metrics.
///
/// Returns a guard that must be held for the lifetime of the application.
/// When dropped, it flushes pending spans.
pub async fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    let tracing = tracing_setup::init_tracing(&config).await?;

    Ok(TelemetryGuard {
        tracing,
        _metrics: metrics,
    })
}

/// Guard that keeps telemetry active. Drop to flush and shut down.
pub struct TelemetryGuard {
    tracing: TracingGuard,
    _metrics: MetricsHandle,
}

impl TelemetryGuard {
    /// Whether spans are exported over OTLP.
    pub fn exporting_spans(&self) -> bool {
        self.tracing.exporting()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry");
    }
}
