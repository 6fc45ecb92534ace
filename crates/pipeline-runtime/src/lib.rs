//! # Pipeline Runtime Library
//!
//! Wiring for the `ingest-pipeline` binary, exposed as a library for testing.
//!
//! ## Modular Structure
//!
//! - `adapters/` - Managed-service clients and the Prometheus recorder
//! - `container/` - Configuration loading and client construction
//! - `commands` - Worker, setup and teardown entry points
//! - `cli` - Argument parsing
//!
//! ## Flow
//!
//! ```text
//! producer ──PutObject──► Bucket ──ObjectCreated──► Topic ──► Work Queue ──► worker
//!                                                                │
//!                                                  3 failed deliveries
//!                                                                ▼
//!                                                        Dead-letter queue
//! ```

#![allow(clippy::module_name_repetitions)]

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod container;

pub use cli::{Cli, Command, TEARDOWN_USAGE};
pub use commands::{run_setup, run_teardown, run_worker, setup_summary, teardown_summary};
pub use container::{AwsSettings, ConfigError, PipelineConfig, ServiceContainer};
