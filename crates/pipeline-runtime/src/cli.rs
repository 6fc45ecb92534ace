//! Command-line interface.

use clap::{Parser, Subcommand};

/// Printed when `teardown` is invoked without a bucket.
pub const TEARDOWN_USAGE: &str = "\
Please provide the bucket name created by setup.
Usage: ingest-pipeline teardown <BUCKET>
Example: ingest-pipeline teardown black-friday-orders-a1b2c3d4";

/// Event-driven order ingestion pipeline
#[derive(Debug, Parser)]
#[command(name = "ingest-pipeline", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
pub enum Command {
    /// Poll the work queue and process order files until interrupted
    Worker {
        /// Queue URL; resolved from the queue name when omitted
        #[arg(long)]
        queue_url: Option<String>,

        /// Messages requested per receive (1-10)
        #[arg(long)]
        max_messages: Option<u8>,

        /// Long-poll wait in seconds (0-20)
        #[arg(long)]
        wait_seconds: Option<u64>,
    },

    /// Create the topic, queues, policies, bucket and notifications
    Setup {
        /// Bucket name; generated from the prefix when omitted
        #[arg(long)]
        bucket: Option<String>,
    },

    /// Delete every resource created by setup
    Teardown {
        /// Bucket created by setup
        bucket: Option<String>,
    },
}

impl Command {
    /// Component label for logs and traces.
    pub fn component(&self) -> &'static str {
        match self {
            Self::Worker { .. } => "worker",
            Self::Setup { .. } => "setup",
            Self::Teardown { .. } => "teardown",
        }
    }
}
