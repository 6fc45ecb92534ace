//! # IP-01 Consumer Worker
//!
//! Drains the work queue with at-least-once processing and explicit
//! acknowledgement.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): Pure logic, no I/O
//!   - `WorkerConfig`: Batch size, long-poll wait, queue address
//!   - `CycleReport`, `MessageOutcome`: What each cycle did
//!
//! - **Ports Layer** (`ports/`): Trait definitions
//!   - `ConsumerApi`: Driving port (inbound API)
//!   - `QueueService`, `RecordHandler`: Driven ports
//!
//! - **Service Layer** (`service`): Orchestration
//!   - `ConsumerWorker`: Implements `ConsumerApi`
//!
//! - **Adapters Layer** (`adapters/`): Bundled record handlers
//!   - `OrderLogHandler`: Reports each order file
//!
//! ## Invariants
//!
//! - A message is deleted only after every record in it was handled.
//! - Records within one message are handled in envelope order.
//! - Decode and handler failures never stop the loop; the message is left
//!   for redelivery and eventually reaches the dead-letter queue.
//! - A stale receipt handle on delete is logged, never fatal.
//! - Shutdown is observed between polls and before each message; a poll in
//!   progress is allowed to finish.
//!
//! ## Usage Example
//!
//! ```ignore
//! use ip_01_consumer_worker::{ConsumerApi, ConsumerWorker, OrderLogHandler, WorkerConfig};
//! use std::sync::Arc;
//!
//! let worker = ConsumerWorker::new(queue, Arc::new(OrderLogHandler), WorkerConfig::default())?;
//! let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! tokio::spawn(async move { worker.run(shutdown_rx).await });
//! ```

pub mod adapters;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::OrderLogHandler;
pub use domain::{CycleReport, MessageOutcome, RunSummary, UnackReason, WorkerConfig};
pub use error::{HandlerError, WorkerError};
pub use metrics::{MetricsRecorder, MetricsSnapshot, NoOpMetrics, WorkerMetrics};
pub use ports::{ConsumerApi, DeliveryContext, RecordHandler};
pub use service::ConsumerWorker;
