//! # Observability
//!
//! Structured logging for the gateway.

pub mod logger;

pub use logger::{Logger, Severity};
