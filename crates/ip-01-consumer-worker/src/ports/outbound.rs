//! Outbound Ports (Driven Ports)
//!
//! Dependencies of the consumer worker: the work queue it drains and the
//! domain-specific handler it runs for every event record.

use async_trait::async_trait;
use shared_types::EventRecord;

use crate::error::HandlerError;

pub use shared_bus::QueueService;

/// Delivery metadata handed to the record handler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeliveryContext {
    /// Queue-assigned id, stable across redeliveries.
    pub message_id: String,
    /// Delivery attempt, starting at 1.
    pub delivery_count: u32,
}

/// Per-record side effect (Driven Port)
///
/// Duplicate delivery is possible: the same record may be handed over again
/// after a failed or unacknowledged attempt, and implementations must
/// tolerate that.
#[async_trait]
pub trait RecordHandler: Send + Sync {
    /// Process one record.
    async fn handle(&self, record: &EventRecord, context: &DeliveryContext)
        -> Result<(), HandlerError>;
}
