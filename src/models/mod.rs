//! Data models for the insert gateway.
//!
//! This module re-exports all model types used throughout the crate.

pub mod connection;
pub mod insert;

// Re-export commonly used types
pub use connection::{
    ConnectionConfig, ConnectionConfigError, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_QUERY_TIMEOUT_SECS, DatabaseType,
};
pub use insert::{
    Identifier, InsertOutcome, InsertRequest, MAX_IDENTIFIER_LEN, TableName, ValidatedInsert,
};
