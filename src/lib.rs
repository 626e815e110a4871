//! restgate - a generic REST-to-SQL gateway
//!
//! Maps HTTP verbs and URL segments onto parameterized CRUD statements
//! against arbitrary relational tables, without per-table code.

pub mod cli;
pub mod config;
pub mod gateway;
pub mod observability;
