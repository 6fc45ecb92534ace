//! # Ingestion Pipeline Test Suite
//!
//! Cross-crate tests that drive the whole topology through the in-memory
//! cloud.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs       # Object created → worker acknowledges
//!     ├── redrive.rs     # Failed deliveries → dead-letter queue
//!     └── lifecycle.rs   # Setup, rerun and teardown
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ip-tests
//!
//! # By category
//! cargo test -p ip-tests integration::redrive::
//!
//! # Benchmarks
//! cargo bench -p ip-tests
//! ```

pub mod integration;
