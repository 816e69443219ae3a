//! Migration state tracking.
//!
//! Applied migrations are recorded in a history table. The statements that
//! read and write it are built with the query layer like any other.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::error::BuildError;
use crate::expr::{Column, SqlExpr};
use crate::query::{delete_from, insert_into, select, Delete, Insert, Order, Select};
use crate::row::{RawRows, RowError};
use crate::schema::TableRef;
use crate::types::TypeTag;

use super::operation::Operation;

/// Name of the history table.
pub const HISTORY_TABLE: &str = "_sqlforge_migrations";

/// Text format of the `applied_at` column.
pub const APPLIED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn history_id() -> Column<String> {
    Column::new(HISTORY_TABLE, "id")
}

fn history_applied_at() -> Column<String> {
    Column::new(HISTORY_TABLE, "applied_at")
}

/// A row of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMigration {
    /// Migration ID.
    pub id: String,
    /// When the migration was applied.
    pub applied_at: DateTime<Utc>,
}

/// Tracks which migrations have been applied.
///
/// # Example
///
/// ```rust
/// use sqlforge_core::migrations::MigrationState;
///
/// let mut state = MigrationState::new();
/// assert!(!state.is_applied("0001_initial"));
///
/// state.mark_applied("0001_initial");
/// assert!(state.is_applied("0001_initial"));
///
/// state.mark_unapplied("0001_initial");
/// assert!(!state.is_applied("0001_initial"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MigrationState {
    applied: HashSet<String>,
}

impl MigrationState {
    /// Creates a new empty migration state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a migration state from a list of applied migration IDs.
    #[must_use]
    pub fn from_applied<I, S>(applied: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            applied: applied.into_iter().map(Into::into).collect(),
        }
    }

    /// Loads the state from the rows returned by [`list_applied`](Self::list_applied).
    pub fn from_rows(rows: &RawRows) -> Result<Self, RowError> {
        let ids = rows
            .iter()
            .map(|row| row.get::<String>("id"))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_applied(ids))
    }

    /// Checks if a migration has been applied.
    #[must_use]
    pub fn is_applied(&self, id: &str) -> bool {
        self.applied.contains(id)
    }

    /// Marks a migration as applied.
    pub fn mark_applied(&mut self, id: impl Into<String>) {
        self.applied.insert(id.into());
    }

    /// Marks a migration as unapplied (rolled back).
    pub fn mark_unapplied(&mut self, id: &str) {
        self.applied.remove(id);
    }

    /// Returns an iterator over all applied migration IDs.
    pub fn applied_migrations(&self) -> impl Iterator<Item = &str> {
        self.applied.iter().map(String::as_str)
    }

    /// Returns the number of applied migrations.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }

    /// The history table.
    #[must_use]
    pub fn history_table() -> TableRef {
        TableRef::builder(HISTORY_TABLE)
            .column("id", TypeTag::TEXT)
            .column("applied_at", TypeTag::TEXT)
            .primary_key("id")
            .build()
    }

    /// Creates the history table if it does not exist.
    #[must_use]
    pub fn create_history_table() -> Operation {
        Operation::create_table_if_not_exists(&Self::history_table())
    }

    /// Records `id` as applied at `applied_at`.
    pub fn record_applied(id: &str, applied_at: DateTime<Utc>) -> Result<Insert, BuildError> {
        insert_into(&Self::history_table())
            .columns((history_id(), history_applied_at()))?
            .values((id, applied_at.format(APPLIED_AT_FORMAT).to_string()))
    }

    /// Removes the record for `id` (for rollback).
    #[must_use]
    pub fn record_unapplied(id: &str) -> Delete {
        delete_from(&Self::history_table()).where_clause(history_id().eq(id))
    }

    /// Lists applied migrations, oldest first.
    #[must_use]
    pub fn list_applied() -> Select {
        select((history_id(), history_applied_at()))
            .from(&Self::history_table())
            .order_by(history_applied_at(), Order::Asc)
            .order_by(history_id(), Order::Asc)
    }

    /// Parses the rows returned by [`list_applied`](Self::list_applied).
    pub fn parse_history(rows: &RawRows) -> Result<Vec<AppliedMigration>, RowError> {
        rows.iter()
            .map(|row| {
                let id = row.get::<String>("id")?;
                let text = row.get::<String>("applied_at")?;
                let applied_at = DateTime::parse_from_rfc3339(&text)
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|_| {
                        NaiveDateTime::parse_from_str(&text, APPLIED_AT_FORMAT).map(|dt| dt.and_utc())
                    })
                    .map_err(|_| RowError::Parse {
                        column: String::from("applied_at"),
                        value: text.clone(),
                        expected: "timestamp",
                    })?;
                Ok(AppliedMigration { id, applied_at })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;
    use crate::render::Statement;
    use chrono::TimeZone;

    #[test]
    fn test_history_statements() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap();
        let insert = MigrationState::record_applied("0001_initial", at).unwrap().render();
        assert_eq!(
            insert.sql,
            "INSERT INTO _sqlforge_migrations (id, applied_at) VALUES (?, ?)"
        );
        assert_eq!(
            insert.text_params(),
            vec![
                Some(String::from("0001_initial")),
                Some(String::from("2026-03-01 12:30:00"))
            ]
        );

        let delete = MigrationState::record_unapplied("0001_initial").render();
        assert_eq!(
            delete.sql,
            "DELETE FROM _sqlforge_migrations WHERE (_sqlforge_migrations.id = ?)"
        );

        assert_eq!(
            MigrationState::list_applied().render().sql,
            "SELECT _sqlforge_migrations.id, _sqlforge_migrations.applied_at \
             FROM _sqlforge_migrations \
             ORDER BY _sqlforge_migrations.applied_at ASC, _sqlforge_migrations.id ASC"
        );
    }

    #[test]
    fn test_create_history_table() {
        let sql = MigrationState::create_history_table()
            .to_sql(&SqliteDialect::new())
            .unwrap();
        assert_eq!(
            sql,
            "CREATE TABLE IF NOT EXISTS \"_sqlforge_migrations\" (\n    \"id\" TEXT PRIMARY KEY,\n    \"applied_at\" TEXT NOT NULL\n)"
        );
    }

    #[test]
    fn test_state_from_history_rows() {
        let rows = RawRows::from_projection(
            &MigrationState::list_applied().projection(),
            vec![
                vec![
                    Some(String::from("0001_initial")),
                    Some(String::from("2026-03-01 12:30:00")),
                ],
                vec![
                    Some(String::from("0002_add_email")),
                    Some(String::from("2026-03-02T08:00:00Z")),
                ],
            ],
        );
        let state = MigrationState::from_rows(&rows).unwrap();
        assert_eq!(state.applied_count(), 2);
        assert!(state.is_applied("0002_add_email"));

        let history = MigrationState::parse_history(&rows).unwrap();
        assert_eq!(
            history[0].applied_at,
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 30, 0).unwrap()
        );
        assert_eq!(
            history[1].applied_at,
            Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_bad_timestamp() {
        let rows = RawRows::new(
            vec![String::from("id"), String::from("applied_at")],
            vec![vec![Some(String::from("x")), Some(String::from("yesterday"))]],
        );
        assert!(matches!(
            MigrationState::parse_history(&rows),
            Err(RowError::Parse { expected: "timestamp", .. })
        ));
    }
}
