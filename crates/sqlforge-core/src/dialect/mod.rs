//! SQL Dialect support.
//!
//! Different databases have slightly different SQL syntax. The renderer
//! asks the dialect for its placeholder convention; migrations ask it for
//! identifier quoting, column types and which DDL it supports.

mod generic;
mod postgres;
mod sqlite;

pub use generic::GenericDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;

use crate::types::ScalarType;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the placeholder for the parameter at 1-based `index`.
    fn placeholder(&self, index: usize) -> String {
        let _ = index;
        String::from("?")
    }

    /// Returns the identifier quote character.
    fn identifier_quote(&self) -> char {
        '"'
    }

    /// Quotes an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        let quote = self.identifier_quote();
        let escaped = name.replace(quote, &format!("{quote}{quote}"));
        format!("{quote}{escaped}{quote}")
    }

    /// Maps a scalar type to the column type used in DDL.
    fn column_type(&self, scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::Integer => "INTEGER",
            ScalarType::Real => "REAL",
            ScalarType::Text => "TEXT",
            ScalarType::Boolean => "BOOLEAN",
        }
    }

    /// Returns whether the dialect supports `ALTER TABLE .. DROP COLUMN`.
    fn supports_drop_column(&self) -> bool {
        true
    }
}
