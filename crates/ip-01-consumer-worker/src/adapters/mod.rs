//! Adapters Layer
//!
//! Record handlers shipped with the worker.

pub mod order_logger;

pub use order_logger::OrderLogHandler;
