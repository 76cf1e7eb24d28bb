//! Error types for the insert gateway.
//!
//! Every failure of a Create call falls into one of three kinds so callers can
//! tell a bad request from an unreachable server from a rejected statement.

use thiserror::Error;

/// Coarse classification of a [`CrudError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected locally; no I/O happened.
    Validation,
    /// The store could not be reached or did not answer the ping.
    Connection,
    /// The statement was sent and failed.
    Execution,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Connection => write!(f, "connection"),
            Self::Execution => write!(f, "execution"),
        }
    }
}

#[derive(Error, Debug)]
pub enum CrudError {
    #[error("Invalid insert request: {message}")]
    Validation { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Statement failed: {message}")]
    Execution {
        message: String,
        /// e.g., "23000" for an integrity constraint violation
        sql_state: Option<String>,
        suggestion: String,
    },
}

impl CrudError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an execution error with optional SQL state.
    pub fn execution(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Execution {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    /// Classify a driver error raised while connecting or pinging.
    ///
    /// Anything that goes wrong before a session is usable is a connection
    /// failure, including server-side errors such as access denied.
    pub fn connect_failure(err: sqlx::Error) -> Self {
        match CrudError::from(err) {
            CrudError::Execution {
                message, sql_state, ..
            } => {
                let message = match sql_state {
                    Some(code) => format!("{} (SQLSTATE: {})", message, code),
                    None => message,
                };
                CrudError::connection(message, "Check the credentials and database name")
            }
            other => other,
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Connection { .. } => ErrorKind::Connection,
            Self::Execution { .. } => ErrorKind::Execution,
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Execution { suggestion, .. } => Some(suggestion),
            Self::Validation { .. } => None,
        }
    }

    /// Get the SQLSTATE code reported by the server, if any.
    pub fn sql_state(&self) -> Option<&str> {
        match self {
            Self::Execution { sql_state, .. } => sql_state.as_deref(),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    ///
    /// Only connectivity failures qualify: an execution failure may already
    /// have had effects, and a validation failure will fail again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Convert sqlx errors to CrudError.
impl From<sqlx::Error> for CrudError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => CrudError::connection(
                msg.to_string(),
                "Check the connection string format and credentials",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                CrudError::execution(
                    db_err.message(),
                    code,
                    "Check the table name, column names and constraints",
                )
            }
            sqlx::Error::PoolTimedOut => {
                CrudError::connection("Timed out acquiring a connection", "Retry later")
            }
            sqlx::Error::PoolClosed => {
                CrudError::connection("Connection pool is closed", "Reconnect to the database")
            }
            sqlx::Error::Io(io_err) => CrudError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => CrudError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => CrudError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::WorkerCrashed => CrudError::connection(
                "Database worker crashed",
                "Reopen the connection and retry",
            ),
            other => CrudError::execution(
                format!("Unexpected database error: {}", other),
                None,
                "Inspect the statement and server logs",
            ),
        }
    }
}

/// Result type alias for gateway operations.
pub type CrudResult<T> = Result<T, CrudError>;
