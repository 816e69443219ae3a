//! PostgreSQL dialect.

use super::Dialect;
use crate::types::ScalarType;

/// PostgreSQL dialect, with numbered `$n` placeholders.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl PostgresDialect {
    /// Creates a new PostgreSQL dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgresql"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn column_type(&self, scalar: ScalarType) -> &'static str {
        match scalar {
            ScalarType::Integer => "BIGINT",
            ScalarType::Real => "DOUBLE PRECISION",
            ScalarType::Text => "TEXT",
            ScalarType::Boolean => "BOOLEAN",
        }
    }
}
