//! Error types for the consumer worker

use shared_types::ServiceError;
use thiserror::Error;

/// Errors that end a single polling cycle.
///
/// None of these stop the worker loop; the loop reports them and polls again.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid worker configuration: {0}")]
    InvalidConfig(String),

    #[error("Cannot resolve URL of queue {queue}: {source}")]
    QueueResolution {
        queue: String,
        #[source]
        source: ServiceError,
    },

    #[error("Receive from queue {queue} failed: {source}")]
    Receive {
        queue: String,
        #[source]
        source: ServiceError,
    },
}

impl WorkerError {
    /// Service operation that failed, for metrics labels.
    pub fn operation(&self) -> &str {
        match self {
            Self::InvalidConfig(_) => "Configure",
            Self::QueueResolution { source, .. } | Self::Receive { source, .. } => source.operation(),
        }
    }
}

/// Errors raised by a record handler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    #[error("Record {object_key} rejected: {reason}")]
    Rejected { object_key: String, reason: String },

    #[error("Downstream unavailable: {0}")]
    Unavailable(String),
}
