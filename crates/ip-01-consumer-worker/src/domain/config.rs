//! Consumer worker configuration and validation
//!
//! # Example
//!
//! ```ignore
//! use ip_01_consumer_worker::domain::WorkerConfig;
//!
//! let config = WorkerConfig::default()
//!     .with_queue_name("ShippingQueue")
//!     .with_wait_time(Duration::from_secs(10));
//! config.validate()?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WorkerError;

/// Largest batch the queue service returns per receive.
pub const MAX_BATCH_SIZE: u8 = 10;

/// Longest long-poll wait the queue service accepts.
pub const MAX_WAIT_TIME: Duration = Duration::from_secs(20);

/// Consumer worker configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Name of the work queue; resolved to a URL before the first poll.
    pub queue_name: String,
    /// Pre-resolved queue URL; skips name resolution when set.
    pub queue_url: Option<String>,
    /// Messages requested per receive (1 to 10)
    pub max_messages: u8,
    /// Long-poll wait per receive (0 to 20 seconds)
    pub wait_time: Duration,
    /// Pause after a failed receive before polling again
    pub retry_pause: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            queue_name: "ShippingQueue".to_string(),
            queue_url: None,
            max_messages: MAX_BATCH_SIZE,
            wait_time: Duration::from_secs(10),
            retry_pause: Duration::from_secs(1),
        }
    }
}

impl WorkerConfig {
    /// Validate against the queue service's limits
    pub fn validate(&self) -> Result<(), WorkerError> {
        if self.queue_name.is_empty() && self.queue_url.is_none() {
            return Err(WorkerError::InvalidConfig(
                "either queue_name or queue_url must be set".to_string(),
            ));
        }

        if self.max_messages == 0 || self.max_messages > MAX_BATCH_SIZE {
            return Err(WorkerError::InvalidConfig(format!(
                "max_messages must be between 1 and {MAX_BATCH_SIZE}, got {}",
                self.max_messages
            )));
        }

        if self.wait_time > MAX_WAIT_TIME {
            return Err(WorkerError::InvalidConfig(format!(
                "wait_time must be at most {}s, got {}s",
                MAX_WAIT_TIME.as_secs(),
                self.wait_time.as_secs()
            )));
        }

        Ok(())
    }

    /// Builder-style method to set the queue name
    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    /// Builder-style method to set a pre-resolved queue URL
    pub fn with_queue_url(mut self, url: impl Into<String>) -> Self {
        self.queue_url = Some(url.into());
        self
    }

    /// Builder-style method to set the batch size
    pub fn with_max_messages(mut self, max: u8) -> Self {
        self.max_messages = max;
        self
    }

    /// Builder-style method to set the long-poll wait
    pub fn with_wait_time(mut self, wait: Duration) -> Self {
        self.wait_time = wait;
        self
    }

    /// Builder-style method to set the retry pause
    pub fn with_retry_pause(mut self, pause: Duration) -> Self {
        self.retry_pause = pause;
        self
    }
}
