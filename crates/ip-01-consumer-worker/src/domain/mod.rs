//! Domain Layer - Pure business logic
//!
//! This layer contains:
//! - Worker configuration and its limits
//! - Message and cycle outcomes
//!
//! RULES:
//! - No I/O operations
//! - No async code

pub mod config;
pub mod outcome;

pub use config::{WorkerConfig, MAX_BATCH_SIZE, MAX_WAIT_TIME};
pub use outcome::{CycleReport, MessageOutcome, RunSummary, UnackReason};
