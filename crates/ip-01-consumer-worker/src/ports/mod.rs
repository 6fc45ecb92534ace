//! Ports Layer
//!
//! Defines the interfaces (traits) for:
//! - Driving Ports (inbound) - API for the runtime
//! - Driven Ports (outbound) - the work queue and the record handler

pub mod inbound;
pub mod outbound;

pub use inbound::ConsumerApi;
pub use outbound::{DeliveryContext, QueueService, RecordHandler};
