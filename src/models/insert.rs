//! Insert request models.
//!
//! An [`InsertRequest`] is what callers hand to the gateway. It becomes a
//! [`ValidatedInsert`] only after the grid shape, identifiers and parameter
//! count have been checked against the target dialect.

use crate::error::{CrudError, CrudResult};
use crate::models::DatabaseType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Longest identifier accepted (MySQL's limit, the strictest of the three).
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// A table or column name that is safe to quote into SQL text.
///
/// Must start with an ASCII letter or underscore, followed by ASCII letters,
/// digits, underscores or `$`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    pub fn parse(raw: &str) -> CrudResult<Self> {
        if raw.is_empty() {
            return Err(CrudError::validation("Identifier cannot be empty"));
        }
        if raw.len() > MAX_IDENTIFIER_LEN {
            return Err(CrudError::validation(format!(
                "Identifier '{}' exceeds {} characters",
                raw, MAX_IDENTIFIER_LEN
            )));
        }

        let mut chars = raw.chars();
        let first_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
        if !first_ok || !rest_ok {
            return Err(CrudError::validation(format!(
                "Invalid identifier '{}': use letters, digits, '_' or '$', not starting with a digit",
                raw
            )));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn quoted(&self, db_type: DatabaseType) -> String {
        db_type.quote_identifier(&self.0)
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Target table, optionally schema-qualified (`schema.table`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    pub schema: Option<Identifier>,
    pub name: Identifier,
}

impl TableName {
    pub fn parse(raw: &str) -> CrudResult<Self> {
        match raw.split_once('.') {
            Some((schema, name)) => Ok(Self {
                schema: Some(Identifier::parse(schema)?),
                name: Identifier::parse(name)?,
            }),
            None => Ok(Self {
                schema: None,
                name: Identifier::parse(raw)?,
            }),
        }
    }

    pub fn quoted(&self, db_type: DatabaseType) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", schema.quoted(db_type), self.name.quoted(db_type)),
            None => self.name.quoted(db_type),
        }
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A request to insert a rectangular grid of values into one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertRequest {
    pub table: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InsertRequest {
    /// Build a request from anything string-like.
    ///
    /// ```
    /// use mysql_crud::models::InsertRequest;
    ///
    /// let request = InsertRequest::new(
    ///     "TestTable",
    ///     ["FirstName", "LastName"],
    ///     [["Ada", "Lovelace"], ["Alan", "Turing"]],
    /// );
    /// assert_eq!(request.rows.len(), 2);
    /// ```
    pub fn new<C, R, V>(
        table: impl Into<String>,
        columns: impl IntoIterator<Item = C>,
        rows: impl IntoIterator<Item = R>,
    ) -> Self
    where
        C: Into<String>,
        R: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// Total number of values in the grid.
    pub fn value_count(&self) -> usize {
        self.rows.iter().map(Vec::len).sum()
    }

    /// Check the request against `db_type` without touching the database.
    pub fn validate(self, db_type: DatabaseType) -> CrudResult<ValidatedInsert> {
        if self.columns.is_empty() {
            return Err(CrudError::validation("At least one column is required"));
        }
        if self.rows.is_empty() {
            return Err(CrudError::validation("At least one row of values is required"));
        }

        let width = self.columns.len();
        if let Some((index, row)) = self.rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(CrudError::validation(format!(
                "Mismatch between columns and values: {} columns but row {} has {} values",
                width,
                index,
                row.len()
            )));
        }

        let table = TableName::parse(&self.table)?;

        let mut seen = HashSet::with_capacity(width);
        let mut columns = Vec::with_capacity(width);
        for raw in &self.columns {
            let column = Identifier::parse(raw)?;
            if !seen.insert(raw.to_ascii_lowercase()) {
                return Err(CrudError::validation(format!(
                    "Column '{}' is specified more than once",
                    raw
                )));
            }
            columns.push(column);
        }

        let params = width * self.rows.len();
        if params > db_type.max_bind_params() {
            return Err(CrudError::validation(format!(
                "{} values exceed the {} limit of {} bind parameters per statement",
                params,
                db_type,
                db_type.max_bind_params()
            )));
        }

        Ok(ValidatedInsert {
            db_type,
            table,
            columns,
            rows: self.rows,
        })
    }
}

/// An insert request that passed validation for a specific dialect.
#[derive(Debug, Clone)]
pub struct ValidatedInsert {
    pub(crate) db_type: DatabaseType,
    pub(crate) table: TableName,
    pub(crate) columns: Vec<Identifier>,
    pub(crate) rows: Vec<Vec<String>>,
}

impl ValidatedInsert {
    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn columns(&self) -> &[Identifier] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Result of a successful Create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    pub table: String,
    pub rows_affected: u64,
    pub execution_time_ms: u64,
}
