#![allow(dead_code)]

use rusqlite::types::Value;
use rusqlite::Connection;
use sqlforge_core::expr::SqlValue;
use sqlforge_core::render::{Rendered, Statement};
use sqlforge_core::row::{Executor, RawRows};
use sqlforge_derive::Table;

#[derive(Debug, Clone, Table)]
#[table(name = "users")]
pub struct User {
    #[column(primary_key)]
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub email: Option<String>,
    pub active: bool,
    pub score: f64,
}

#[derive(Debug, Clone, Table)]
#[table(name = "orders")]
pub struct Order {
    #[column(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub total: f64,
    pub note: Option<String>,
}

/// Renders with the generic dialect and returns `(sql, text params)`.
pub fn render(statement: &impl Statement) -> (String, Vec<Option<String>>) {
    let rendered = statement.render();
    let params = rendered.text_params();
    (rendered.sql, params)
}

/// Shorthand for a non-NULL text parameter.
pub fn p(text: &str) -> Option<String> {
    Some(text.to_string())
}

/// Runs rendered statements against an in-memory SQLite database.
pub struct SqliteExecutor {
    pub conn: Connection,
}

impl SqliteExecutor {
    pub fn open() -> Self {
        Self {
            conn: Connection::open_in_memory()
                .unwrap_or_else(|e| panic!("cannot open in-memory SQLite: {e}")),
        }
    }

    /// Executes and panics on failure, showing the SQL.
    pub fn run(&mut self, statement: &Rendered) -> RawRows {
        self.execute(statement)
            .unwrap_or_else(|e| panic!("SQLite rejected {}\nError: {e}", statement.sql))
    }
}

fn to_sqlite(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(n) => Value::Integer(*n),
        SqlValue::Real(f) => Value::Real(*f),
        SqlValue::Text(s) => Value::Text(s.clone()),
        SqlValue::Boolean(b) => Value::Integer(i64::from(*b)),
    }
}

fn from_sqlite(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Blob(_) => None,
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
    }
}

impl Executor for SqliteExecutor {
    type Error = rusqlite::Error;

    fn execute(&mut self, statement: &Rendered) -> Result<RawRows, Self::Error> {
        let mut stmt = self.conn.prepare(&statement.sql)?;
        let params = rusqlite::params_from_iter(statement.params.iter().map(to_sqlite));
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        if columns.is_empty() {
            stmt.execute(params)?;
            return Ok(RawRows::new(columns, vec![]));
        }

        let width = columns.len();
        let mut out = Vec::new();
        let mut rows = stmt.query(params)?;
        while let Some(row) = rows.next()? {
            let mut cells = Vec::with_capacity(width);
            for i in 0..width {
                cells.push(from_sqlite(row.get::<_, Value>(i)?));
            }
            out.push(cells);
        }
        Ok(RawRows::new(columns, out))
    }
}
