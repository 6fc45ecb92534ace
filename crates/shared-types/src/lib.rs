//! # Shared Types Crate
//!
//! Domain entities, wire formats and error types shared by every crate of the
//! ingestion pipeline.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Types that cross a crate boundary live here.
//! - **Wire formats are data**: The notification envelope, the redrive policy
//!   and resource policies are plain serde types with no I/O.
//! - **Classified failures**: Every remote call fails with a `ServiceError`
//!   class that callers map to their own behaviour.

pub mod arn;
pub mod entities;
pub mod envelope;
pub mod errors;
pub mod policy;

pub use entities::*;
pub use envelope::{decode_event_records, encode_event_records, NotificationEnvelope};
pub use errors::*;
pub use policy::{PolicyDocument, PolicyStatement};
