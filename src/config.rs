//! Configuration handling for the `mysql-crud` binary.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::models::{
    ConnectionConfig, ConnectionConfigError, DEFAULT_CONNECT_TIMEOUT_SECS,
    DEFAULT_QUERY_TIMEOUT_SECS, InsertRequest,
};
use clap::Parser;
use std::time::Duration;

/// Configuration for a single Create call.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mysql-crud",
    about = "Insert rows into a database table with a single parameterized statement",
    version,
    author
)]
pub struct Config {
    /// Database connection URL (mysql://, postgres://, sqlite:).
    #[arg(short = 'd', long = "database", value_name = "URL", env = "CRUD_DATABASE_URL")]
    pub database: String,

    /// Connection timeout in seconds (covers connect and ping)
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "CRUD_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Statement timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_QUERY_TIMEOUT_SECS,
        env = "CRUD_QUERY_TIMEOUT"
    )]
    pub query_timeout: u64,

    /// Log failure details (masked connection target, statement text) at warn level
    #[arg(long, env = "CRUD_DIAGNOSTICS")]
    pub diagnostics: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "CRUD_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "CRUD_JSON_LOGS")]
    pub json_logs: bool,

    /// Target table, optionally schema-qualified
    #[arg(short, long)]
    pub table: String,

    /// Column names. Repeat the flag or separate with commas.
    #[arg(short, long = "column", value_name = "NAME", value_delimiter = ',', required = true)]
    pub columns: Vec<String>,

    /// One row of comma-separated values, kept verbatim (spaces included).
    /// Repeat for multiple rows. Use --rows-json for values containing commas.
    #[arg(short, long = "row", value_name = "VALUES", conflicts_with = "rows_json")]
    pub rows: Vec<String>,

    /// All rows as a JSON array of string arrays, e.g. '[["a","b"],["c","d"]]'
    #[arg(long, value_name = "JSON")]
    pub rows_json: Option<String>,

    /// Print the outcome as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    /// Build the connection configuration for the store.
    pub fn connection_config(&self) -> Result<ConnectionConfig, ConnectionConfigError> {
        Ok(ConnectionConfig::parse(self.database.as_str())?
            .with_connect_timeout(self.connect_timeout_duration())
            .with_query_timeout(self.query_timeout_duration()))
    }

    /// Build the insert request from `--row` or `--rows-json`.
    pub fn insert_request(&self) -> Result<InsertRequest, String> {
        let rows: Vec<Vec<String>> = match &self.rows_json {
            Some(json) => {
                serde_json::from_str(json).map_err(|e| format!("Invalid --rows-json: {e}"))?
            }
            None => self
                .rows
                .iter()
                .map(|row| row.split(',').map(String::from).collect())
                .collect(),
        };

        if rows.is_empty() {
            return Err("At least one --row or --rows-json is required".to_string());
        }

        Ok(InsertRequest::new(
            self.table.as_str(),
            self.columns.iter().map(|c| c.trim()),
            rows,
        ))
    }

    /// Get the connection timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    /// Get the statement timeout as a Duration.
    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatabaseType;

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["mysql-crud", "--database", "mysql://root@127.0.0.1/TestDatabase"];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--table", "T", "--column", "A", "--row", "1"]);
        assert_eq!(config.connect_timeout, DEFAULT_CONNECT_TIMEOUT_SECS);
        assert_eq!(config.query_timeout, DEFAULT_QUERY_TIMEOUT_SECS);
        assert_eq!(config.log_level, "info");
        assert!(!config.diagnostics);
        assert!(!config.json_logs);
    }

    #[test]
    fn test_rows_from_flags() {
        let config = parse(&[
            "--table",
            "TestTable",
            "--column",
            "FirstName,LastName",
            "--row",
            "FirstName3,LastName3",
            "--row",
            "FirstName4,LastName4",
        ]);
        let request = config.insert_request().unwrap();
        assert_eq!(
            request,
            InsertRequest::new(
                "TestTable",
                ["FirstName", "LastName"],
                [["FirstName3", "LastName3"], ["FirstName4", "LastName4"]],
            )
        );
    }

    #[test]
    fn test_row_values_keep_surrounding_spaces() {
        let config = parse(&["--table", "T", "--column", "A,B", "--row", " padded , x"]);
        let request = config.insert_request().unwrap();
        assert_eq!(request.rows, vec![vec![" padded ".to_string(), " x".to_string()]]);
    }

    #[test]
    fn test_rows_from_json() {
        let config = parse(&[
            "--table",
            "T",
            "-c",
            "A",
            "-c",
            "B",
            "--rows-json",
            r#"[["x, y", "O'Brien"]]"#,
        ]);
        let request = config.insert_request().unwrap();
        assert_eq!(request.rows, vec![vec!["x, y".to_string(), "O'Brien".to_string()]]);
    }

    #[test]
    fn test_rows_json_conflicts_with_row() {
        let result = Config::try_parse_from([
            "mysql-crud",
            "--database",
            "sqlite:t.db",
            "--table",
            "T",
            "--column",
            "A",
            "--row",
            "1",
            "--rows-json",
            "[[\"1\"]]",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_rows_rejected() {
        let config = parse(&["--table", "T", "--column", "A"]);
        assert!(config.insert_request().is_err());
    }

    #[test]
    fn test_invalid_rows_json_rejected() {
        let config = parse(&["--table", "T", "--column", "A", "--rows-json", "[1, 2]"]);
        let err = config.insert_request().unwrap_err();
        assert!(err.contains("--rows-json"));
    }

    #[test]
    fn test_connection_config_applies_timeouts() {
        let config = parse(&[
            "--table",
            "T",
            "--column",
            "A",
            "--row",
            "1",
            "--connect-timeout",
            "3",
            "--query-timeout",
            "7",
        ]);
        let conn = config.connection_config().unwrap();
        assert_eq!(conn.db_type, DatabaseType::MySQL);
        assert_eq!(conn.connect_timeout, Duration::from_secs(3));
        assert_eq!(conn.query_timeout, Duration::from_secs(7));
    }
}
