//! Migration trait and runner.
//!
//! Provides the `Migration` trait that all migrations implement, and the
//! `MigrationRunner` that orders migrations by their dependencies and
//! turns them into SQL for a dialect.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::dialect::Dialect;
use crate::error::BuildError;
use crate::render::{Rendered, Statement};
use crate::row::Executor;

use super::operation::Operation;
use super::state::MigrationState;

/// Errors that can occur during migration.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The dependency graph has a cycle through these migrations.
    #[error("Circular dependency detected in migrations: {}", .0.join(", "))]
    CircularDependency(Vec<String>),

    /// A migration depends on another that isn't registered.
    #[error("Migration '{migration}' depends on '{dependency}' which doesn't exist")]
    MissingDependency {
        /// The migration with the missing dependency.
        migration: String,
        /// The dependency that's missing.
        dependency: String,
    },

    /// A migration has an operation with no reverse.
    #[error("Migration '{migration}' is not reversible: cannot undo {operation}")]
    NotReversible {
        /// The migration ID.
        migration: String,
        /// The offending operation.
        operation: String,
    },

    /// CREATE TABLE without columns.
    #[error("Table '{0}' has no columns")]
    EmptyTable(String),

    /// The dialect cannot express an operation.
    #[error("{dialect} does not support {operation}")]
    Unsupported {
        /// Dialect name.
        dialect: &'static str,
        /// The operation.
        operation: String,
    },

    /// Building a history statement failed.
    #[error(transparent)]
    Build(#[from] BuildError),

    /// The executor rejected a statement.
    #[error("Migration '{migration}' failed: {message}")]
    Execution {
        /// The migration ID.
        migration: String,
        /// The executor's error message.
        message: String,
    },
}

/// A database migration with typed forward and rollback operations.
///
/// # Example
///
/// ```rust
/// use sqlforge_core::dialect::SqliteDialect;
/// use sqlforge_core::migrations::{ColumnDef, Migration, Operation};
/// use sqlforge_core::schema::TableRef;
/// use sqlforge_core::types::TypeTag;
///
/// pub struct CreateUsers;
///
/// impl Migration for CreateUsers {
///     const ID: &'static str = "0001_create_users";
///
///     fn forward() -> Vec<Operation> {
///         let users = TableRef::builder("users")
///             .column("id", TypeTag::INTEGER)
///             .column("name", TypeTag::TEXT)
///             .primary_key("id")
///             .build();
///         vec![
///             Operation::create_table(&users),
///             Operation::add_column("users", ColumnDef::new("age", TypeTag::INTEGER)),
///         ]
///     }
/// }
///
/// let sql = CreateUsers::rollback_sql(&SqliteDialect::new()).unwrap();
/// assert_eq!(
///     sql,
///     vec![
///         "ALTER TABLE \"users\" DROP COLUMN \"age\"",
///         "DROP TABLE \"users\"",
///     ]
/// );
/// ```
pub trait Migration {
    /// Unique migration identifier (e.g., "0001_initial", "0002_add_email").
    ///
    /// This ID is stored in the history table to track which migrations
    /// have been applied.
    const ID: &'static str;

    /// Dependencies on other migrations (must run first).
    const DEPENDENCIES: &'static [&'static str] = &[];

    /// Operations that apply the migration.
    fn forward() -> Vec<Operation>;

    /// Operations that undo the migration.
    ///
    /// Defaults to the reverse of each forward operation, last first.
    fn rollback() -> Result<Vec<Operation>, MigrationError> {
        reverse_all(Self::ID, &Self::forward())
    }

    /// SQL for the forward operations.
    fn forward_sql(dialect: &dyn Dialect) -> Result<Vec<String>, MigrationError> {
        Self::forward().iter().map(|op| op.to_sql(dialect)).collect()
    }

    /// SQL for the rollback operations.
    fn rollback_sql(dialect: &dyn Dialect) -> Result<Vec<String>, MigrationError> {
        Self::rollback()?.iter().map(|op| op.to_sql(dialect)).collect()
    }
}

fn reverse_all(id: &str, operations: &[Operation]) -> Result<Vec<Operation>, MigrationError> {
    operations
        .iter()
        .rev()
        .map(|op| {
            op.reverse().ok_or_else(|| MigrationError::NotReversible {
                migration: id.to_string(),
                operation: op.describe(),
            })
        })
        .collect()
}

/// A registered migration with runtime-accessible metadata.
pub struct RegisteredMigration {
    /// Migration ID.
    pub id: &'static str,
    /// Dependencies.
    pub dependencies: &'static [&'static str],
    /// Function to get forward operations.
    pub forward: fn() -> Vec<Operation>,
    /// Function to get rollback operations.
    pub rollback: fn() -> Result<Vec<Operation>, MigrationError>,
}

impl RegisteredMigration {
    /// Creates a new registered migration from a `Migration` implementor.
    #[must_use]
    pub fn new<M: Migration>() -> Self {
        Self {
            id: M::ID,
            dependencies: M::DEPENDENCIES,
            forward: M::forward,
            rollback: M::rollback,
        }
    }
}

impl fmt::Debug for RegisteredMigration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredMigration")
            .field("id", &self.id)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Status of a migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// The migration ID.
    pub id: &'static str,
    /// Whether the migration has been applied.
    pub applied: bool,
}

/// Orders migrations by dependency and generates their SQL.
///
/// # Example
///
/// ```rust
/// use sqlforge_core::dialect::SqliteDialect;
/// use sqlforge_core::migrations::{Migration, MigrationRunner, MigrationState, Operation};
///
/// pub struct Initial;
/// impl Migration for Initial {
///     const ID: &'static str = "0001_initial";
///     fn forward() -> Vec<Operation> {
///         vec![Operation::raw_sql_reversible(
///             "CREATE TABLE t (id INTEGER)",
///             "DROP TABLE t",
///         )]
///     }
/// }
///
/// let mut runner = MigrationRunner::new(SqliteDialect::new());
/// runner.register::<Initial>();
///
/// let state = MigrationState::new();
/// assert_eq!(runner.pending_migrations(&state).unwrap().len(), 1);
/// ```
pub struct MigrationRunner<D: Dialect> {
    migrations: Vec<RegisteredMigration>,
    dialect: D,
}

impl<D: Dialect> MigrationRunner<D> {
    /// Creates a new migration runner with the given dialect.
    #[must_use]
    pub fn new(dialect: D) -> Self {
        Self {
            migrations: Vec::new(),
            dialect,
        }
    }

    /// Registers a migration.
    pub fn register<M: Migration>(&mut self) -> &mut Self {
        self.migrations.push(RegisteredMigration::new::<M>());
        self
    }

    /// Returns all registered migrations, in registration order.
    #[must_use]
    pub fn migrations(&self) -> &[RegisteredMigration] {
        &self.migrations
    }

    /// Returns the dialect.
    #[must_use]
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Returns unapplied migrations in dependency order.
    pub fn pending_migrations(
        &self,
        state: &MigrationState,
    ) -> Result<Vec<&RegisteredMigration>, MigrationError> {
        Ok(self
            .sorted_migrations()?
            .into_iter()
            .filter(|m| !state.is_applied(m.id))
            .collect())
    }

    /// Returns the status of all migrations, in registration order.
    #[must_use]
    pub fn status(&self, state: &MigrationState) -> Vec<MigrationStatus> {
        self.migrations
            .iter()
            .map(|m| MigrationStatus {
                id: m.id,
                applied: state.is_applied(m.id),
            })
            .collect()
    }

    /// Returns migrations in dependency order (topological sort).
    ///
    /// Independent migrations keep their registration order.
    pub fn sorted_migrations(&self) -> Result<Vec<&RegisteredMigration>, MigrationError> {
        self.check_dependencies()?;

        let mut in_degree: HashMap<&str, usize> = HashMap::new();
        let mut dependents: HashMap<&str, Vec<&RegisteredMigration>> = HashMap::new();
        for m in &self.migrations {
            in_degree.insert(m.id, m.dependencies.len());
            for dep in m.dependencies {
                dependents.entry(*dep).or_default().push(m);
            }
        }

        // Kahn's algorithm
        let mut queue: VecDeque<&RegisteredMigration> = self
            .migrations
            .iter()
            .filter(|m| m.dependencies.is_empty())
            .collect();
        let mut result = Vec::with_capacity(self.migrations.len());

        while let Some(m) = queue.pop_front() {
            result.push(m);
            for &dependent in dependents.get(m.id).into_iter().flatten() {
                if let Some(deg) = in_degree.get_mut(dependent.id) {
                    *deg -= 1;
                    if *deg == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        if result.len() != self.migrations.len() {
            let ordered: HashSet<&str> = result.iter().map(|m| m.id).collect();
            let cycle = self
                .migrations
                .iter()
                .filter(|m| !ordered.contains(m.id))
                .map(|m| m.id.to_string())
                .collect();
            return Err(MigrationError::CircularDependency(cycle));
        }

        debug!(
            order = ?result.iter().map(|m| m.id).collect::<Vec<_>>(),
            "sorted migrations"
        );
        Ok(result)
    }

    /// Generates SQL for all pending migrations.
    ///
    /// Returns a list of (migration_id, sql_statements) pairs.
    pub fn sql_for_pending(
        &self,
        state: &MigrationState,
    ) -> Result<Vec<(&'static str, Vec<String>)>, MigrationError> {
        let mut result = Vec::new();
        for migration in self.pending_migrations(state)? {
            let sqls = (migration.forward)()
                .iter()
                .map(|op| op.to_sql(&self.dialect))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(
                migration = migration.id,
                statements = sqls.len(),
                "planned forward migration"
            );
            result.push((migration.id, sqls));
        }
        Ok(result)
    }

    /// Generates SQL for rolling back the last `count` applied migrations.
    ///
    /// Returns a list of (migration_id, sql_statements) pairs, most recent
    /// first.
    pub fn sql_for_rollback(
        &self,
        state: &MigrationState,
        count: usize,
    ) -> Result<Vec<(&'static str, Vec<String>)>, MigrationError> {
        let applied: Vec<_> = self
            .sorted_migrations()?
            .into_iter()
            .rev()
            .filter(|m| state.is_applied(m.id))
            .take(count)
            .collect();

        let mut result = Vec::new();
        for migration in applied {
            let operations = (migration.rollback)().inspect_err(|err| {
                warn!(migration = migration.id, error = %err, "cannot roll back migration");
            })?;
            let sqls = operations
                .iter()
                .map(|op| op.to_sql(&self.dialect))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(
                migration = migration.id,
                statements = sqls.len(),
                "planned rollback"
            );
            result.push((migration.id, sqls));
        }
        Ok(result)
    }

    /// Applies all pending migrations through `executor`, recording each in
    /// the history table and in `state`.
    ///
    /// Creates the history table first if needed. Returns the IDs applied,
    /// in order.
    pub fn apply_pending<E>(
        &self,
        executor: &mut E,
        state: &mut MigrationState,
        applied_at: DateTime<Utc>,
    ) -> Result<Vec<&'static str>, MigrationError>
    where
        E: Executor,
        E::Error: fmt::Display,
    {
        let setup = MigrationState::create_history_table().to_sql(&self.dialect)?;
        run(executor, "history", &Rendered::from(setup))?;

        let mut applied = Vec::new();
        for (id, sqls) in self.sql_for_pending(state)? {
            info!(migration = id, "applying migration");
            for sql in sqls {
                debug!(sql = %sql, "executing SQL");
                run(executor, id, &Rendered::from(sql))?;
            }
            let record = MigrationState::record_applied(id, applied_at)?;
            run(executor, id, &record.render_with(&self.dialect))?;
            state.mark_applied(id);
            applied.push(id);
        }
        Ok(applied)
    }

    /// Validates that all dependencies exist and that there are no cycles.
    pub fn validate(&self) -> Result<(), MigrationError> {
        self.sorted_migrations().map(|_| ())
    }

    fn check_dependencies(&self) -> Result<(), MigrationError> {
        let ids: HashSet<&str> = self.migrations.iter().map(|m| m.id).collect();
        for m in &self.migrations {
            for dep in m.dependencies {
                if !ids.contains(dep) {
                    return Err(MigrationError::MissingDependency {
                        migration: m.id.to_string(),
                        dependency: (*dep).to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn run<E>(executor: &mut E, migration: &str, statement: &Rendered) -> Result<(), MigrationError>
where
    E: Executor,
    E::Error: fmt::Display,
{
    executor
        .execute(statement)
        .map(|_| ())
        .map_err(|err| MigrationError::Execution {
            migration: migration.to_string(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;
    use crate::migrations::operation::ColumnDef;
    use crate::row::RawRows;
    use crate::schema::TableRef;
    use crate::types::{ScalarType, TypeTag};

    struct Migration0001;
    impl Migration for Migration0001 {
        const ID: &'static str = "0001_initial";
        fn forward() -> Vec<Operation> {
            let users = TableRef::builder("users")
                .column("id", TypeTag::INTEGER)
                .column("username", TypeTag::TEXT)
                .primary_key("id")
                .build();
            vec![Operation::create_table(&users)]
        }
    }

    struct Migration0002;
    impl Migration for Migration0002 {
        const ID: &'static str = "0002_add_email";
        const DEPENDENCIES: &'static [&'static str] = &["0001_initial"];
        fn forward() -> Vec<Operation> {
            vec![Operation::add_column(
                "users",
                ColumnDef::new("email", TypeTag::optional(ScalarType::Text)),
            )]
        }
    }

    struct Migration0003;
    impl Migration for Migration0003 {
        const ID: &'static str = "0003_drop_email";
        const DEPENDENCIES: &'static [&'static str] = &["0002_add_email"];
        fn forward() -> Vec<Operation> {
            vec![Operation::drop_column("users", "email")]
        }
    }

    struct CycleA;
    impl Migration for CycleA {
        const ID: &'static str = "a";
        const DEPENDENCIES: &'static [&'static str] = &["b"];
        fn forward() -> Vec<Operation> {
            vec![]
        }
    }

    struct CycleB;
    impl Migration for CycleB {
        const ID: &'static str = "b";
        const DEPENDENCIES: &'static [&'static str] = &["a"];
        fn forward() -> Vec<Operation> {
            vec![]
        }
    }

    #[derive(Default)]
    struct Recorder {
        statements: Vec<Rendered>,
    }

    impl Executor for Recorder {
        type Error = std::convert::Infallible;

        fn execute(&mut self, statement: &Rendered) -> Result<RawRows, Self::Error> {
            self.statements.push(statement.clone());
            Ok(RawRows::default())
        }
    }

    #[test]
    fn test_sorted_respects_dependencies() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner
            .register::<Migration0003>()
            .register::<Migration0001>()
            .register::<Migration0002>();
        let ids: Vec<_> = runner
            .sorted_migrations()
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["0001_initial", "0002_add_email", "0003_drop_email"]);
    }

    #[test]
    fn test_missing_dependency() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner.register::<Migration0002>();
        assert!(matches!(
            runner.validate(),
            Err(MigrationError::MissingDependency { ref dependency, .. }) if dependency == "0001_initial"
        ));
    }

    #[test]
    fn test_circular_dependency() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner.register::<CycleA>().register::<CycleB>();
        match runner.validate() {
            Err(MigrationError::CircularDependency(ids)) => assert_eq!(ids, vec!["a", "b"]),
            other => panic!("expected a cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_and_status() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner
            .register::<Migration0001>()
            .register::<Migration0002>();
        let mut state = MigrationState::new();
        state.mark_applied("0001_initial");

        let pending = runner.pending_migrations(&state).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "0002_add_email");

        let status = runner.status(&state);
        assert!(status[0].applied);
        assert!(!status[1].applied);

        let sql = runner.sql_for_pending(&state).unwrap();
        assert_eq!(
            sql,
            vec![(
                "0002_add_email",
                vec![String::from("ALTER TABLE \"users\" ADD COLUMN \"email\" TEXT")]
            )]
        );
    }

    #[test]
    fn test_rollback_sql() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner
            .register::<Migration0001>()
            .register::<Migration0002>();
        let state = MigrationState::from_applied(["0001_initial", "0002_add_email"]);
        let sql = runner.sql_for_rollback(&state, 2).unwrap();
        assert_eq!(sql[0].0, "0002_add_email");
        assert_eq!(sql[0].1, vec!["ALTER TABLE \"users\" DROP COLUMN \"email\""]);
        assert_eq!(sql[1].1, vec!["DROP TABLE \"users\""]);
    }

    #[test]
    fn test_irreversible_rollback() {
        assert!(matches!(
            Migration0003::rollback(),
            Err(MigrationError::NotReversible { ref migration, .. }) if migration == "0003_drop_email"
        ));

        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner
            .register::<Migration0001>()
            .register::<Migration0002>()
            .register::<Migration0003>();
        let state =
            MigrationState::from_applied(["0001_initial", "0002_add_email", "0003_drop_email"]);
        assert!(runner.sql_for_rollback(&state, 1).is_err());
    }

    #[test]
    fn test_apply_pending_records_history() {
        let mut runner = MigrationRunner::new(SqliteDialect::new());
        runner
            .register::<Migration0001>()
            .register::<Migration0002>();
        let mut state = MigrationState::new();
        let mut recorder = Recorder::default();

        let applied = runner
            .apply_pending(&mut recorder, &mut state, DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();
        assert_eq!(applied, vec!["0001_initial", "0002_add_email"]);
        assert!(state.is_applied("0002_add_email"));

        // history table, then per migration: its statements and one record
        assert_eq!(recorder.statements.len(), 5);
        assert!(recorder.statements[0]
            .sql
            .starts_with("CREATE TABLE IF NOT EXISTS \"_sqlforge_migrations\""));
        assert_eq!(
            recorder.statements[2].sql,
            "INSERT INTO _sqlforge_migrations (id, applied_at) VALUES (?, ?)"
        );
        assert_eq!(
            recorder.statements[2].text_params(),
            vec![
                Some(String::from("0001_initial")),
                Some(String::from("1970-01-01 00:00:00"))
            ]
        );

        let again = runner
            .apply_pending(&mut recorder, &mut state, DateTime::<Utc>::UNIX_EPOCH)
            .unwrap();
        assert!(again.is_empty());
    }
}
