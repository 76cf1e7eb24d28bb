//! INSERT statement construction.
//!
//! Values never enter the SQL text: each one gets a dialect placeholder and is
//! carried separately in bind order (row-major).

use crate::models::{DatabaseType, ValidatedInsert};

/// A multi-row INSERT ready to be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertStatement {
    sql: String,
    params: Vec<String>,
    rows: usize,
    columns: usize,
}

impl InsertStatement {
    /// Build the statement for a validated request.
    ///
    /// Shape: `INSERT INTO t(a, b) VALUES (?, ?), (?, ?)`.
    pub fn build(insert: ValidatedInsert) -> Self {
        let db_type = insert.db_type;
        let columns = insert.columns.len();
        let rows = insert.rows.len();

        let column_list = insert
            .columns
            .iter()
            .map(|c| c.quoted(db_type))
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = format!(
            "INSERT INTO {}({}) VALUES",
            insert.table.quoted(db_type),
            column_list
        );
        for row in 0..rows {
            if row != 0 {
                sql.push(',');
            }
            sql.push_str(" (");
            sql.push_str(&row_placeholders(db_type, row * columns, columns));
            sql.push(')');
        }

        let params = insert.rows.into_iter().flatten().collect();

        Self {
            sql,
            params,
            rows,
            columns,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values in bind order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns
    }
}

fn row_placeholders(db_type: DatabaseType, offset: usize, columns: usize) -> String {
    (offset..offset + columns)
        .map(|i| db_type.placeholder(i))
        .collect::<Vec<_>>()
        .join(", ")
}
