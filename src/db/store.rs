//! Store abstraction used by the gateway.
//!
//! A [`Store`] opens [`Session`]s; a session is a single live connection owned
//! by one Create call. The production implementation is
//! [`SqlxStore`](crate::db::SqlxStore); tests substitute a recording fake.

use crate::db::statement::InsertStatement;
use crate::error::CrudResult;
use crate::models::DatabaseType;
use std::future::Future;

pub trait Store: Send + Sync {
    type Session: Session;

    /// Dialect used to validate requests and build statements.
    fn db_type(&self) -> DatabaseType;

    /// Display-safe description of the target, for diagnostics.
    fn target(&self) -> String;

    /// Establish a new session.
    fn open(&self) -> impl Future<Output = CrudResult<Self::Session>> + Send;
}

pub trait Session: Send {
    /// Liveness check on a freshly opened session.
    fn ping(&mut self) -> impl Future<Output = CrudResult<()>> + Send;

    /// Execute a non-query statement and return the affected row count.
    fn execute(
        &mut self,
        statement: &InsertStatement,
    ) -> impl Future<Output = CrudResult<u64>> + Send;

    /// Release the session.
    fn close(self) -> impl Future<Output = CrudResult<()>> + Send;
}
