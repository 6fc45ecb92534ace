//! # Shared Bus - Managed Service Contracts
//!
//! The request/response contracts of the object store, notification topic,
//! work queue and identity services, plus `InMemoryCloud`, an in-process
//! implementation of all four.
//!
//! ## Delivery Path
//!
//! ```text
//! ┌──────────────┐  creation event  ┌──────────────┐  envelope  ┌──────────────┐
//! │ Object Store │ ───────────────► │    Topic     │ ─────────► │  Work Queue  │
//! └──────────────┘  (topic policy)  └──────────────┘  (queue    └──────┬───────┘
//!                                                      policy)         │ redrive
//!                                                                      ▼
//!                                                              ┌──────────────┐
//!                                                              │ Dead-Letter Q│
//!                                                              └──────────────┘
//! ```
//!
//! Components depend on the traits in [`contracts`] only; which backend they
//! talk to is decided where they are constructed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod contracts;

pub use broker::{CallRecord, InMemoryCloud};
pub use contracts::{
    IdentityService, ObjectPage, ObjectStoreService, QueueService, TopicService,
    OBJECT_CREATED_ALL, QUEUE_PROTOCOL,
};

/// Largest batch a single receive may return.
pub const MAX_RECEIVE_BATCH: u8 = 10;

/// Longest long-poll wait the queue service accepts.
pub const MAX_WAIT_SECONDS: u64 = 20;
