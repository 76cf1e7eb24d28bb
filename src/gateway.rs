//! Data store gateway.
//!
//! The gateway owns a [`Store`] and performs Create calls against it. Each call
//! walks the same path:
//!
//! ```text
//! Validate -> OpenConnection -> BuildStatement -> Execute -> Release
//! ```
//!
//! Validation failures never touch the store. Every session that was opened
//! is closed before the call returns, whatever the outcome. Nothing is retried.

use crate::db::{InsertStatement, Session, SqlxStore, Store};
use crate::error::{CrudError, CrudResult};
use crate::models::{ConnectionConfig, InsertOutcome, InsertRequest};
use std::time::Instant;
use tracing::{debug, info, warn};

pub struct Gateway<S: Store> {
    store: S,
    diagnostics: bool,
}

impl Gateway<SqlxStore> {
    /// Gateway backed by sqlx for the given connection configuration.
    pub fn from_config(config: ConnectionConfig) -> Self {
        Self::new(SqlxStore::new(config))
    }
}

impl<S: Store> Gateway<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            diagnostics: false,
        }
    }

    /// Emit failure details (masked target, statement text) at `warn` level.
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = enabled;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Open a session and confirm it answers a ping.
    ///
    /// A session that opens but fails the ping is closed before the error is
    /// returned.
    pub async fn open_connection(&self) -> CrudResult<S::Session> {
        let mut session = match self.store.open().await {
            Ok(session) => session,
            Err(e) => {
                self.report_connection_failure(&e);
                return Err(e);
            }
        };

        if let Err(e) = session.ping().await {
            self.report_connection_failure(&e);
            if let Err(close_err) = session.close().await {
                debug!(error = %close_err, "Failed to close session after ping failure");
            }
            return Err(e);
        }

        Ok(session)
    }

    /// Insert `rows` into `table`.
    ///
    /// ```no_run
    /// # async fn run() -> mysql_crud::error::CrudResult<()> {
    /// use mysql_crud::Gateway;
    /// use mysql_crud::models::ConnectionConfig;
    ///
    /// let config = ConnectionConfig::parse("mysql://root@127.0.0.1/TestDatabase")
    ///     .expect("valid url");
    /// let gateway = Gateway::from_config(config);
    /// let outcome = gateway
    ///     .create("TestTable", ["FirstName", "LastName"], [["A", "B"], ["C", "D"]])
    ///     .await?;
    /// assert_eq!(outcome.rows_affected, 2);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create<C, R, V>(
        &self,
        table: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
        rows: impl IntoIterator<Item = R>,
    ) -> CrudResult<InsertOutcome>
    where
        C: Into<String>,
        R: IntoIterator<Item = V>,
        V: Into<String>,
    {
        self.insert(InsertRequest::new(table, columns, rows)).await
    }

    /// Insert a prepared request.
    pub async fn insert(&self, request: InsertRequest) -> CrudResult<InsertOutcome> {
        let table = request.table.clone();
        let validated = match request.validate(self.store.db_type()) {
            Ok(v) => v,
            Err(e) => {
                if self.diagnostics {
                    warn!(table = %table, error = %e, "Rejected insert request");
                } else {
                    debug!(table = %table, error = %e, "Rejected insert request");
                }
                return Err(e);
            }
        };

        let mut session = self.open_connection().await?;

        let statement = InsertStatement::build(validated);
        let start = Instant::now();
        let result = session.execute(&statement).await;
        let execution_time_ms = start.elapsed().as_millis() as u64;

        if let Err(e) = &result {
            self.report_execution_failure(e, &statement);
        }

        let closed = session.close().await;

        let rows_affected = result?;
        if let Err(e) = closed {
            warn!(error = %e, "Failed to close session after successful insert");
        }

        info!(
            table = %table,
            rows = statement.row_count(),
            rows_affected = rows_affected,
            execution_time_ms = execution_time_ms,
            "Insert executed"
        );

        Ok(InsertOutcome {
            table,
            rows_affected,
            execution_time_ms,
        })
    }

    fn report_connection_failure(&self, err: &CrudError) {
        if self.diagnostics {
            warn!(error = %err, target = %self.store.target(), "Could not open connection");
        } else {
            debug!(error = %err, "Could not open connection");
        }
    }

    fn report_execution_failure(&self, err: &CrudError, statement: &InsertStatement) {
        if self.diagnostics {
            warn!(
                error = %err,
                sql_state = ?err.sql_state(),
                sql = %statement.sql(),
                params = statement.params().len(),
                "Insert failed"
            );
        } else {
            debug!(error = %err, "Insert failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::DatabaseType;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    struct Calls {
        opens: usize,
        pings: usize,
        executes: Vec<(String, Vec<String>)>,
        closes: usize,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Fail {
        Nothing,
        Open,
        Ping,
        Execute,
        Close,
    }

    #[derive(Clone)]
    struct FakeStore {
        calls: Arc<Mutex<Calls>>,
        fail: Fail,
    }

    impl FakeStore {
        fn new(fail: Fail) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Calls::default())),
                fail,
            }
        }

        fn calls(&self) -> std::sync::MutexGuard<'_, Calls> {
            self.calls.lock().unwrap()
        }
    }

    struct FakeSession {
        calls: Arc<Mutex<Calls>>,
        fail: Fail,
    }

    impl Store for FakeStore {
        type Session = FakeSession;

        fn db_type(&self) -> DatabaseType {
            DatabaseType::MySQL
        }

        fn target(&self) -> String {
            "fake://store".to_string()
        }

        async fn open(&self) -> CrudResult<FakeSession> {
            self.calls.lock().unwrap().opens += 1;
            if self.fail == Fail::Open {
                return Err(CrudError::connection("refused", "start the server"));
            }
            Ok(FakeSession {
                calls: self.calls.clone(),
                fail: self.fail,
            })
        }
    }

    impl Session for FakeSession {
        async fn ping(&mut self) -> CrudResult<()> {
            self.calls.lock().unwrap().pings += 1;
            if self.fail == Fail::Ping {
                return Err(CrudError::connection("no pong", "check the server"));
            }
            Ok(())
        }

        async fn execute(&mut self, statement: &InsertStatement) -> CrudResult<u64> {
            self.calls
                .lock()
                .unwrap()
                .executes
                .push((statement.sql().to_string(), statement.params().to_vec()));
            if self.fail == Fail::Execute {
                return Err(CrudError::execution(
                    "Table 'T' doesn't exist",
                    Some("42S02".to_string()),
                    "create it",
                ));
            }
            Ok(statement.row_count() as u64)
        }

        async fn close(self) -> CrudResult<()> {
            self.calls.lock().unwrap().closes += 1;
            if self.fail == Fail::Close {
                return Err(CrudError::connection("broken pipe", "ignore"));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_mismatched_columns_issue_no_io() {
        let store = FakeStore::new(Fail::Nothing);
        let gateway = Gateway::new(store.clone());

        let err = gateway
            .create("T", ["A", "B"], [["1", "2", "3"]])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        let calls = store.calls();
        assert_eq!(calls.opens, 0);
        assert_eq!(calls.pings, 0);
        assert!(calls.executes.is_empty());
        assert_eq!(calls.closes, 0);
    }

    #[tokio::test]
    async fn test_invalid_identifier_issues_no_io() {
        let store = FakeStore::new(Fail::Nothing);
        let gateway = Gateway::new(store.clone()).with_diagnostics(true);

        let err = gateway
            .create("TestTable", ["FirstName!?", "LastName"], [["a", "b"]])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(store.calls().opens, 0);
    }

    #[tokio::test]
    async fn test_open_failure_skips_execute() {
        let store = FakeStore::new(Fail::Open);
        let gateway = Gateway::new(store.clone());

        let err = gateway
            .create("T", ["A"], [["1"]])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.is_retryable());
        let calls = store.calls();
        assert_eq!(calls.opens, 1);
        assert!(calls.executes.is_empty());
        assert_eq!(calls.closes, 0);
    }

    #[tokio::test]
    async fn test_ping_failure_skips_execute_and_releases() {
        let store = FakeStore::new(Fail::Ping);
        let gateway = Gateway::new(store.clone()).with_diagnostics(true);

        let err = gateway
            .create("T", ["A"], [["1"]])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        let calls = store.calls();
        assert_eq!(calls.pings, 1);
        assert!(calls.executes.is_empty());
        assert_eq!(calls.closes, 1);
    }

    #[tokio::test]
    async fn test_execute_failure_releases_once() {
        let store = FakeStore::new(Fail::Execute);
        let gateway = Gateway::new(store.clone()).with_diagnostics(true);

        let err = gateway
            .create("T", ["A", "B"], [["1", "2"]])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(err.sql_state(), Some("42S02"));
        let calls = store.calls();
        assert_eq!(calls.executes.len(), 1);
        assert_eq!(calls.closes, 1);
    }

    #[tokio::test]
    async fn test_execute_success_releases_once() {
        let store = FakeStore::new(Fail::Nothing);
        let gateway = Gateway::new(store.clone());

        let outcome = gateway
            .create("T", ["FirstName", "LastName"], [["A", "B"], ["C", "D"]])
            .await
            .unwrap();

        assert_eq!(outcome.table, "T");
        assert_eq!(outcome.rows_affected, 2);

        let calls = store.calls();
        assert_eq!(calls.opens, 1);
        assert_eq!(calls.pings, 1);
        assert_eq!(calls.closes, 1);
        let (sql, params) = &calls.executes[0];
        assert_eq!(
            sql,
            "INSERT INTO `T`(`FirstName`, `LastName`) VALUES (?, ?), (?, ?)"
        );
        assert_eq!(params, &["A", "B", "C", "D"]);
    }

    #[tokio::test]
    async fn test_close_failure_after_success_keeps_outcome() {
        let store = FakeStore::new(Fail::Close);
        let gateway = Gateway::new(store.clone());

        let outcome = gateway.create("T", ["A"], [["1"]]).await.unwrap();

        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(store.calls().closes, 1);
    }

    #[tokio::test]
    async fn test_open_connection_returns_pinged_session() {
        let store = FakeStore::new(Fail::Nothing);
        let gateway = Gateway::new(store.clone());

        let session = gateway.open_connection().await.unwrap();
        assert_eq!(store.calls().pings, 1);
        session.close().await.unwrap();
        assert_eq!(store.calls().closes, 1);
    }

    #[tokio::test]
    async fn test_gateway_is_shareable_across_tasks() {
        let store = FakeStore::new(Fail::Nothing);
        let gateway = Arc::new(Gateway::new(store.clone()));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let gateway = gateway.clone();
                tokio::spawn(async move {
                    gateway
                        .create("T", ["A"], [[format!("value-{i}")]])
                        .await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let calls = store.calls();
        assert_eq!(calls.opens, 4);
        assert_eq!(calls.closes, 4);
    }
}
