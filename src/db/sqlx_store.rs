//! sqlx-backed store.
//!
//! Opens one dedicated connection per session (no pool) using the
//! database-specific connection types (MySqlConnection, PgConnection,
//! SqliteConnection) so every backend keeps its native type support.
//!
//! # Architecture
//!
//! Backend-specific statement execution lives in the `mysql`, `postgres` and
//! `sqlite` submodules. Their structure is intentionally parallel.

use crate::db::statement::InsertStatement;
use crate::db::store::{Session, Store};
use crate::error::{CrudError, CrudResult};
use crate::models::{ConnectionConfig, DatabaseType};
use sqlx::Connection;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

/// Store that reaches the database through sqlx.
#[derive(Debug, Clone)]
pub struct SqlxStore {
    config: ConnectionConfig,
}

impl SqlxStore {
    pub fn new(config: ConnectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    async fn connect(&self) -> CrudResult<SqlxConnection> {
        let url = self.config.connection_string.as_str();
        let conn = match self.config.db_type {
            DatabaseType::MySQL => {
                let options =
                    MySqlConnectOptions::from_str(url).map_err(CrudError::connect_failure)?;
                SqlxConnection::MySql(
                    MySqlConnection::connect_with(&options)
                        .await
                        .map_err(CrudError::connect_failure)?,
                )
            }
            DatabaseType::PostgreSQL => {
                let options =
                    PgConnectOptions::from_str(url).map_err(CrudError::connect_failure)?;
                SqlxConnection::Postgres(
                    PgConnection::connect_with(&options)
                        .await
                        .map_err(CrudError::connect_failure)?,
                )
            }
            DatabaseType::SQLite => {
                let options =
                    SqliteConnectOptions::from_str(url).map_err(CrudError::connect_failure)?;
                SqlxConnection::SQLite(
                    SqliteConnection::connect_with(&options)
                        .await
                        .map_err(CrudError::connect_failure)?,
                )
            }
        };
        Ok(conn)
    }
}

impl Store for SqlxStore {
    type Session = SqlxSession;

    fn db_type(&self) -> DatabaseType {
        self.config.db_type
    }

    fn target(&self) -> String {
        self.config.masked_connection_string()
    }

    async fn open(&self) -> CrudResult<SqlxSession> {
        let connect_timeout = self.config.connect_timeout;
        debug!(
            db_type = %self.config.db_type,
            database = ?self.config.database,
            timeout_secs = connect_timeout.as_secs(),
            "Opening connection"
        );

        let conn = match timeout(connect_timeout, self.connect()).await {
            Ok(result) => result?,
            Err(_) => return Err(connect_timeout_error("connect", connect_timeout)),
        };

        Ok(SqlxSession {
            conn,
            connect_timeout,
            query_timeout: self.config.query_timeout,
        })
    }
}

/// Database-specific connection.
#[derive(Debug)]
pub enum SqlxConnection {
    MySql(MySqlConnection),
    Postgres(PgConnection),
    SQLite(SqliteConnection),
}

/// A single open connection plus the timeouts that bound it.
#[derive(Debug)]
pub struct SqlxSession {
    conn: SqlxConnection,
    connect_timeout: Duration,
    query_timeout: Duration,
}

impl SqlxSession {
    pub fn db_type(&self) -> DatabaseType {
        match self.conn {
            SqlxConnection::MySql(_) => DatabaseType::MySQL,
            SqlxConnection::Postgres(_) => DatabaseType::PostgreSQL,
            SqlxConnection::SQLite(_) => DatabaseType::SQLite,
        }
    }
}

impl Session for SqlxSession {
    async fn ping(&mut self) -> CrudResult<()> {
        let limit = self.connect_timeout;
        let conn = &mut self.conn;
        let ping = async move {
            impl_session_dispatch!(conn, {
                MySql(c) => c.ping().await,
                Postgres(c) => c.ping().await,
                SQLite(c) => c.ping().await,
            })
        };

        match timeout(limit, ping).await {
            Ok(result) => result.map_err(CrudError::connect_failure),
            Err(_) => Err(connect_timeout_error("ping", limit)),
        }
    }

    async fn execute(&mut self, statement: &InsertStatement) -> CrudResult<u64> {
        let query_timeout = self.query_timeout;
        debug!(
            sql = %statement.sql(),
            params = statement.params().len(),
            timeout_secs = query_timeout.as_secs(),
            "Executing insert"
        );

        impl_session_dispatch!(&mut self.conn, {
            MySql(c) => mysql::execute_insert(c, statement, query_timeout).await,
            Postgres(c) => postgres::execute_insert(c, statement, query_timeout).await,
            SQLite(c) => sqlite::execute_insert(c, statement, query_timeout).await,
        })
    }

    async fn close(self) -> CrudResult<()> {
        let closed = impl_session_dispatch!(self.conn, {
            MySql(c) => c.close().await,
            Postgres(c) => c.close().await,
            SQLite(c) => c.close().await,
        });
        closed.map_err(CrudError::from)
    }
}

fn connect_timeout_error(stage: &str, limit: Duration) -> CrudError {
    CrudError::connection(
        format!("{} timed out after {:?}", stage, limit),
        "Check that the database server is reachable or raise the connect timeout",
    )
}

fn execute_timeout_error(limit: Duration) -> CrudError {
    CrudError::execution(
        format!("insert timed out after {:?}", limit),
        None,
        "The statement may still have been applied; verify before retrying",
    )
}

// =============================================================================
// Database-Specific Implementations
// =============================================================================

mod mysql {
    use super::*;

    pub async fn execute_insert(
        conn: &mut MySqlConnection,
        statement: &InsertStatement,
        query_timeout: Duration,
    ) -> CrudResult<u64> {
        let mut query = sqlx::query(statement.sql());
        for value in statement.params() {
            query = query.bind(value.as_str());
        }

        match timeout(query_timeout, query.execute(conn)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(CrudError::from(e)),
            Err(_) => Err(execute_timeout_error(query_timeout)),
        }
    }
}

mod postgres {
    use super::*;

    pub async fn execute_insert(
        conn: &mut PgConnection,
        statement: &InsertStatement,
        query_timeout: Duration,
    ) -> CrudResult<u64> {
        let mut query = sqlx::query(statement.sql());
        for value in statement.params() {
            query = query.bind(value.as_str());
        }

        match timeout(query_timeout, query.execute(conn)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(CrudError::from(e)),
            Err(_) => Err(execute_timeout_error(query_timeout)),
        }
    }
}

mod sqlite {
    use super::*;

    pub async fn execute_insert(
        conn: &mut SqliteConnection,
        statement: &InsertStatement,
        query_timeout: Duration,
    ) -> CrudResult<u64> {
        let mut query = sqlx::query(statement.sql());
        for value in statement.params() {
            query = query.bind(value.as_str());
        }

        match timeout(query_timeout, query.execute(conn)).await {
            Ok(Ok(r)) => Ok(r.rows_affected()),
            Ok(Err(e)) => Err(CrudError::from(e)),
            Err(_) => Err(execute_timeout_error(query_timeout)),
        }
    }
}
