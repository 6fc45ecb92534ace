//! Record handler that reports each order file it sees.

use async_trait::async_trait;
use shared_types::EventRecord;
use tracing::info;

use crate::error::HandlerError;
use crate::ports::{DeliveryContext, RecordHandler};

/// Logs the key and size of every order file; never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct OrderLogHandler;

impl OrderLogHandler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordHandler for OrderLogHandler {
    async fn handle(
        &self,
        record: &EventRecord,
        context: &DeliveryContext,
    ) -> Result<(), HandlerError> {
        info!(
            object_key = %record.object_key,
            size_bytes = record.size_bytes,
            bucket = %record.bucket,
            message_id = %context.message_id,
            delivery_count = context.delivery_count,
            "Processing order file"
        );
        Ok(())
    }
}
