//! Migration operations.
//!
//! Schema changes (CREATE TABLE, ADD COLUMN, indexes, ...) plus data
//! statements built with the query layer. DDL text comes from the target
//! [`Dialect`]'s identifier quoting and column types.

use std::fmt;
use std::sync::Arc;

use crate::dialect::Dialect;
use crate::render::Statement;
use crate::schema::{ColumnRef, Table, TableRef};
use crate::types::{ScalarType, TypeTag};

use super::MigrationError;

/// A column definition for CREATE TABLE and ADD COLUMN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Scalar type, mapped through the dialect.
    pub scalar: ScalarType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether this column is the primary key.
    pub primary_key: bool,
}

impl ColumnDef {
    /// Creates a column definition. Optional tags are nullable.
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            scalar: type_tag.scalar(),
            nullable: type_tag.is_optional(),
            primary_key: false,
        }
    }

    /// Marks the column as the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut sql = format!(
            "{} {}",
            dialect.quote_identifier(&self.name),
            dialect.column_type(self.scalar)
        );
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

impl From<&ColumnRef> for ColumnDef {
    fn from(column: &ColumnRef) -> Self {
        Self::new(column.column_name(), column.type_tag())
    }
}

/// Create table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTableOp {
    /// Table name.
    pub name: String,
    /// Column definitions.
    pub columns: Vec<ColumnDef>,
    /// Whether to use IF NOT EXISTS.
    pub if_not_exists: bool,
}

impl CreateTableOp {
    /// Builds the operation from a table reference, marking its primary
    /// key.
    #[must_use]
    pub fn from_table(table: &TableRef) -> Self {
        let columns = table
            .columns()
            .iter()
            .map(|column| {
                let def = ColumnDef::from(column);
                if table.primary_key() == Some(column.column_name()) {
                    def.primary_key()
                } else {
                    def
                }
            })
            .collect();
        Self {
            name: table.name().to_string(),
            columns,
            if_not_exists: false,
        }
    }
}

/// Drop table operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropTableOp {
    /// Table name.
    pub name: String,
    /// Whether to use IF EXISTS.
    pub if_exists: bool,
}

/// Add column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnOp {
    /// Table name.
    pub table: String,
    /// The new column.
    pub column: ColumnDef,
}

/// Drop column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumnOp {
    /// Table name.
    pub table: String,
    /// Column name.
    pub column: String,
}

/// Rename column operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumnOp {
    /// Table name.
    pub table: String,
    /// Current column name.
    pub old_name: String,
    /// New column name.
    pub new_name: String,
}

/// Create index operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIndexOp {
    /// Index name.
    pub name: String,
    /// Table name.
    pub table: String,
    /// Indexed columns, in order.
    pub columns: Vec<String>,
    /// Whether the index is unique.
    pub unique: bool,
}

/// Drop index operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndexOp {
    /// Index name.
    pub name: String,
}

/// A data statement run as part of a migration, rendered with inline
/// literals.
#[derive(Clone)]
pub struct DataOp {
    statement: Arc<dyn Statement + Send + Sync>,
}

impl DataOp {
    /// The wrapped statement.
    #[must_use]
    pub fn statement(&self) -> &dyn Statement {
        self.statement.as_ref()
    }
}

impl fmt::Debug for DataOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataOp")
            .field("sql", &self.statement.render().sql)
            .finish()
    }
}

/// Raw SQL operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSqlOp {
    /// SQL run forward.
    pub up: String,
    /// SQL that undoes `up`, if known.
    pub down: Option<String>,
}

/// All possible migration operations.
#[derive(Debug, Clone)]
pub enum Operation {
    /// Create a new table.
    CreateTable(CreateTableOp),
    /// Drop an existing table.
    DropTable(DropTableOp),
    /// Add a column to an existing table.
    AddColumn(AddColumnOp),
    /// Drop a column from a table.
    DropColumn(DropColumnOp),
    /// Rename a column.
    RenameColumn(RenameColumnOp),
    /// Create an index.
    CreateIndex(CreateIndexOp),
    /// Drop an index.
    DropIndex(DropIndexOp),
    /// Run an INSERT, UPDATE or DELETE built with the query layer.
    Data(DataOp),
    /// Run raw SQL.
    RawSql(RawSqlOp),
}

impl Operation {
    /// Creates a create table operation from a table reference.
    #[must_use]
    pub fn create_table(table: &TableRef) -> Self {
        Self::CreateTable(CreateTableOp::from_table(table))
    }

    /// Creates a create table operation for a `#[derive(Table)]` table.
    #[must_use]
    pub fn create_table_for<T: Table>() -> Self {
        Self::create_table(&T::table_ref())
    }

    /// Creates a create table if not exists operation.
    #[must_use]
    pub fn create_table_if_not_exists(table: &TableRef) -> Self {
        let mut op = CreateTableOp::from_table(table);
        op.if_not_exists = true;
        Self::CreateTable(op)
    }

    /// Creates a drop table operation.
    #[must_use]
    pub fn drop_table(name: impl Into<String>) -> Self {
        Self::DropTable(DropTableOp {
            name: name.into(),
            if_exists: false,
        })
    }

    /// Creates a drop table if exists operation.
    #[must_use]
    pub fn drop_table_if_exists(name: impl Into<String>) -> Self {
        Self::DropTable(DropTableOp {
            name: name.into(),
            if_exists: true,
        })
    }

    /// Creates an add column operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: ColumnDef) -> Self {
        Self::AddColumn(AddColumnOp {
            table: table.into(),
            column,
        })
    }

    /// Creates a drop column operation.
    #[must_use]
    pub fn drop_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::DropColumn(DropColumnOp {
            table: table.into(),
            column: column.into(),
        })
    }

    /// Creates a rename column operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
    ) -> Self {
        Self::RenameColumn(RenameColumnOp {
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
        })
    }

    /// Creates a create index operation.
    #[must_use]
    pub fn create_index<I, C>(name: impl Into<String>, table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self::CreateIndex(CreateIndexOp {
            name: name.into(),
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        })
    }

    /// Creates a create unique index operation.
    #[must_use]
    pub fn create_unique_index<I, C>(
        name: impl Into<String>,
        table: impl Into<String>,
        columns: I,
    ) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        match Self::create_index(name, table, columns) {
            Self::CreateIndex(op) => Self::CreateIndex(CreateIndexOp { unique: true, ..op }),
            other => other,
        }
    }

    /// Creates a drop index operation.
    #[must_use]
    pub fn drop_index(name: impl Into<String>) -> Self {
        Self::DropIndex(DropIndexOp { name: name.into() })
    }

    /// Wraps a data statement.
    #[must_use]
    pub fn data(statement: impl Statement + Send + Sync + 'static) -> Self {
        Self::Data(DataOp {
            statement: Arc::new(statement),
        })
    }

    /// Creates a raw SQL operation.
    #[must_use]
    pub fn raw_sql(sql: impl Into<String>) -> Self {
        Self::RawSql(RawSqlOp {
            up: sql.into(),
            down: None,
        })
    }

    /// Creates a raw SQL operation with both up and down SQL.
    #[must_use]
    pub fn raw_sql_reversible(up: impl Into<String>, down: impl Into<String>) -> Self {
        Self::RawSql(RawSqlOp {
            up: up.into(),
            down: Some(down.into()),
        })
    }

    /// Attempts to generate the reverse operation.
    ///
    /// Returns `None` if the operation is not reversible.
    #[must_use]
    pub fn reverse(&self) -> Option<Self> {
        match self {
            Self::CreateTable(op) => Some(Self::drop_table(&op.name)),
            Self::AddColumn(op) => Some(Self::drop_column(&op.table, &op.column.name)),
            Self::RenameColumn(op) => Some(Self::rename_column(
                &op.table,
                op.new_name.clone(),
                op.old_name.clone(),
            )),
            Self::CreateIndex(op) => Some(Self::drop_index(&op.name)),
            Self::RawSql(op) => op
                .down
                .as_ref()
                .map(|down| Self::raw_sql_reversible(down.clone(), op.up.clone())),
            // These lose the schema or rows they remove.
            Self::DropTable(_) | Self::DropColumn(_) | Self::DropIndex(_) | Self::Data(_) => None,
        }
    }

    /// Returns whether this operation is reversible.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.reverse().is_some()
    }

    /// A short description for logs and errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::CreateTable(op) => format!("create table {}", op.name),
            Self::DropTable(op) => format!("drop table {}", op.name),
            Self::AddColumn(op) => format!("add column {}.{}", op.table, op.column.name),
            Self::DropColumn(op) => format!("drop column {}.{}", op.table, op.column),
            Self::RenameColumn(op) => {
                format!("rename column {}.{} to {}", op.table, op.old_name, op.new_name)
            }
            Self::CreateIndex(op) => format!("create index {}", op.name),
            Self::DropIndex(op) => format!("drop index {}", op.name),
            Self::Data(_) => String::from("data statement"),
            Self::RawSql(_) => String::from("raw sql"),
        }
    }

    /// Generates the SQL for this operation.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> Result<String, MigrationError> {
        let q = |name: &str| dialect.quote_identifier(name);
        let sql = match self {
            Self::CreateTable(op) => {
                if op.columns.is_empty() {
                    return Err(MigrationError::EmptyTable(op.name.clone()));
                }
                let mut sql = String::from("CREATE TABLE ");
                if op.if_not_exists {
                    sql.push_str("IF NOT EXISTS ");
                }
                sql.push_str(&q(&op.name));
                sql.push_str(" (\n");
                let defs: Vec<String> = op
                    .columns
                    .iter()
                    .map(|c| format!("    {}", c.to_sql(dialect)))
                    .collect();
                sql.push_str(&defs.join(",\n"));
                sql.push_str("\n)");
                sql
            }
            Self::DropTable(op) => {
                let mut sql = String::from("DROP TABLE ");
                if op.if_exists {
                    sql.push_str("IF EXISTS ");
                }
                sql.push_str(&q(&op.name));
                sql
            }
            Self::AddColumn(op) => format!(
                "ALTER TABLE {} ADD COLUMN {}",
                q(&op.table),
                op.column.to_sql(dialect)
            ),
            Self::DropColumn(op) => {
                if !dialect.supports_drop_column() {
                    return Err(MigrationError::Unsupported {
                        dialect: dialect.name(),
                        operation: self.describe(),
                    });
                }
                format!("ALTER TABLE {} DROP COLUMN {}", q(&op.table), q(&op.column))
            }
            Self::RenameColumn(op) => format!(
                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                q(&op.table),
                q(&op.old_name),
                q(&op.new_name)
            ),
            Self::CreateIndex(op) => {
                let columns: Vec<String> = op.columns.iter().map(|c| q(c)).collect();
                format!(
                    "CREATE {}INDEX {} ON {} ({})",
                    if op.unique { "UNIQUE " } else { "" },
                    q(&op.name),
                    q(&op.table),
                    columns.join(", ")
                )
            }
            Self::DropIndex(op) => format!("DROP INDEX {}", q(&op.name)),
            Self::Data(op) => op.statement.render_inline(dialect),
            Self::RawSql(op) => op.up.clone(),
        };
        Ok(sql)
    }
}
