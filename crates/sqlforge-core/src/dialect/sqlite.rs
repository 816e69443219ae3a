//! SQLite dialect.

use super::Dialect;
use crate::types::ScalarType;

/// SQLite dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn column_type(&self, scalar: ScalarType) -> &'static str {
        // SQLite has dynamic typing with type affinity
        match scalar {
            ScalarType::Integer | ScalarType::Boolean => "INTEGER",
            ScalarType::Real => "REAL",
            ScalarType::Text => "TEXT",
        }
    }
}
