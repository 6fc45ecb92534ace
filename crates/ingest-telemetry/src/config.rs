//! Telemetry configuration from environment variables.

use std::env;

/// Default service name attached to spans.
pub const DEFAULT_SERVICE_NAME: &str = "ingest-pipeline";

/// Configuration for logging, tracing and metrics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name for traces and logs
    pub service_name: String,

    /// Component running in this process (worker, setup, teardown)
    pub component: String,

    /// OTLP endpoint; span export is disabled when `None`
    pub otlp_endpoint: Option<String>,

    /// Log filter directive (trace, debug, info, warn, error or a full
    /// `EnvFilter` expression)
    pub log_level: String,

    /// Whether to write logs to stdout at all
    pub console_output: bool,

    /// Whether logs are JSON lines instead of human-readable text
    pub json_logs: bool,

    /// Deployment environment label
    pub environment: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            component: "worker".to_string(),
            otlp_endpoint: None,
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            environment: "development".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: ingest-pipeline)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT`: enables span export when set
    /// - `RUST_LOG` or `IP_LOG_LEVEL`: Log filter (default: info)
    /// - `IP_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `IP_JSON_LOGS`: JSON logs (default: true inside containers)
    /// - `IP_ENVIRONMENT`: Environment label (default: development)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let is_container =
            lookup("KUBERNETES_SERVICE_HOST").is_some() || lookup("DOCKER_CONTAINER").is_some();

        Self {
            service_name: lookup("OTEL_SERVICE_NAME").unwrap_or(defaults.service_name),
            component: defaults.component,
            otlp_endpoint: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").filter(|v| !v.trim().is_empty()),
            log_level: lookup("RUST_LOG")
                .or_else(|| lookup("IP_LOG_LEVEL"))
                .unwrap_or(defaults.log_level),
            console_output: lookup("IP_CONSOLE_OUTPUT")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
            json_logs: lookup("IP_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(is_container),
            environment: lookup("IP_ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Builder-style method to name the running component
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = component.into();
        self
    }

    /// Service name including the component.
    pub fn full_service_name(&self) -> String {
        format!("{}-{}", self.service_name, self.component)
    }
}
