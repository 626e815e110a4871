//! # REST-to-SQL Gateway
//!
//! Translates HTTP verbs and URL segments into parameterized CRUD
//! statements against arbitrary relational tables, without per-table code.

pub mod coerce;
pub mod engine;
pub mod errors;
pub mod handler;
pub mod ident;
pub mod params;
pub mod pkey;
pub mod query;
pub mod response;
pub mod server;

pub use coerce::SqlValue;
pub use engine::{EngineError, ExecOutcome, MemoryEngine, Row, StorageEngine};
pub use errors::{GatewayError, GatewayResult};
pub use handler::Gateway;
pub use params::{ListParams, Pagination, SortDirection};
pub use pkey::PrimaryKeys;
pub use query::Statement;
pub use response::{Envelope, PaginationMeta};
pub use server::GatewayServer;
