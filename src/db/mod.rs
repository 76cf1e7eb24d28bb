//! Database access layer.
//!
//! This module provides:
//! - The store/session seam the gateway is written against
//! - The sqlx implementation for MySQL, PostgreSQL and SQLite
//! - Parameterized INSERT statement construction
//! - Backend dispatch macros

#[macro_use]
pub mod macros;
pub mod sqlx_store;
pub mod statement;
pub mod store;

pub use sqlx_store::{SqlxConnection, SqlxSession, SqlxStore};
pub use statement::InsertStatement;
pub use store::{Session, Store};
