//! Parameterized multi-row INSERT gateway.
//!
//! This library validates a table name, column names and a rectangular grid of
//! values, then inserts them with a single bound statement over one dedicated
//! connection (MySQL, PostgreSQL or SQLite).

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;

pub use config::Config;
pub use error::{CrudError, CrudResult, ErrorKind};
pub use gateway::Gateway;
